//! Security-group policy.
//!
//! A group is created empty, then one TCP ingress rule is submitted per
//! [`SecurityRule`]. A rule's source is either a CIDR or another security
//! group's id; the latter enables group-to-group ingress policies (the
//! manager group admitting the user group on internal service ports).

use async_trait::async_trait;

use crate::client::{NeutronApi, SecurityGroupCreate, SecurityGroupRuleCreate};
use crate::error::Result;
use crate::reconcile::{NamedResource, ResourceId};

/// Where an ingress rule admits traffic from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    /// A source CIDR, e.g. `0.0.0.0/0`
    Cidr(String),
    /// Another security group, by id
    Group(ResourceId),
}

/// One ingress rule: a single TCP port and its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityRule {
    /// TCP port, applied as both ends of the port range
    pub port: u16,
    /// Traffic source
    pub source: RuleSource,
}

impl SecurityRule {
    /// A rule admitting a CIDR on one port.
    pub fn from_cidr(port: u16, cidr: impl Into<String>) -> Self {
        Self {
            port,
            source: RuleSource::Cidr(cidr.into()),
        }
    }

    /// A rule admitting another security group on one port.
    pub fn from_group(port: u16, group_id: impl Into<ResourceId>) -> Self {
        Self {
            port,
            source: RuleSource::Group(group_id.into()),
        }
    }
}

/// Policy for Neutron security groups.
pub struct SecurityGroups<'a> {
    api: &'a dyn NeutronApi,
}

impl<'a> SecurityGroups<'a> {
    pub fn new(api: &'a dyn NeutronApi) -> Self {
        Self { api }
    }

    /// Creates a named group, then one ingress rule per entry of `rules`.
    pub async fn create(&self, name: &str, rules: &[SecurityRule]) -> Result<ResourceId> {
        let group_id = self
            .api
            .create_security_group(SecurityGroupCreate {
                name: name.to_string(),
            })
            .await?;

        for rule in rules {
            let payload = match &rule.source {
                RuleSource::Cidr(cidr) => {
                    SecurityGroupRuleCreate::from_cidr(group_id.clone(), rule.port, cidr.clone())
                }
                RuleSource::Group(source_group) => SecurityGroupRuleCreate::from_group(
                    group_id.clone(),
                    rule.port,
                    source_group.clone(),
                ),
            };
            self.api.create_security_group_rule(payload).await?;
        }

        Ok(group_id)
    }
}

#[async_trait]
impl NamedResource for SecurityGroups<'_> {
    fn kind(&self) -> &'static str {
        "security group"
    }

    async fn list_ids_by_name(&self, name: &str) -> Result<Vec<ResourceId>> {
        let groups = self.api.list_security_groups(name).await?;
        Ok(groups.into_iter().map(|g| g.id).collect())
    }
}
