//! The fixed orchestration sequence.
//!
//! [`Bootstrapper::run`] walks the management topology in dependency order,
//! reconciling each resource and threading the produced ids forward: the
//! subnet needs the network's id, the router needs the subnet's and the
//! external network's, the manager security group needs the user group's.
//! Every step is fail-fast; the first error aborts the remainder and no
//! already-created resource is rolled back.

use crate::client::{NeutronApi, RouterInterface};
use crate::config::ManagementConfig;
use crate::error::{Error, Result};
use crate::reconcile::{reconcile, ResourceId};
use crate::resources::{Networks, Routers, SecurityGroups, SecurityRule, Subnets};

/// The ids produced by one bootstrap run.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    /// Management network
    pub network_id: ResourceId,
    /// Management subnet
    pub subnet_id: ResourceId,
    /// External network
    pub ext_network_id: ResourceId,
    /// Management router
    pub router_id: ResourceId,
    /// User security group, when configured
    pub user_security_group_id: Option<ResourceId>,
    /// Manager security group, when configured
    pub manager_security_group_id: Option<ResourceId>,
    /// Externally-facing security group, when configured
    pub ext_security_group_id: Option<ResourceId>,
}

impl Topology {
    /// The produced ids as `(label, id)` pairs, in creation order.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        let mut entries = vec![
            ("network", self.network_id.as_str()),
            ("subnet", self.subnet_id.as_str()),
            ("external network", self.ext_network_id.as_str()),
            ("router", self.router_id.as_str()),
        ];
        if let Some(id) = &self.user_security_group_id {
            entries.push(("user security group", id));
        }
        if let Some(id) = &self.manager_security_group_id {
            entries.push(("manager security group", id));
        }
        if let Some(id) = &self.ext_security_group_id {
            entries.push(("ext security group", id));
        }
        entries
    }
}

/// Drives the ordered reconciliation of the whole management topology.
pub struct Bootstrapper<'a> {
    api: &'a dyn NeutronApi,
    config: &'a ManagementConfig,
}

impl<'a> Bootstrapper<'a> {
    pub fn new(api: &'a dyn NeutronApi, config: &'a ManagementConfig) -> Self {
        Self { api, config }
    }

    /// Runs the full sequence, returning the produced ids.
    pub async fn run(&self) -> Result<Topology> {
        let networks = Networks::new(self.api);
        let subnets = Subnets::new(self.api);
        let routers = Routers::new(self.api);
        let security_groups = SecurityGroups::new(self.api);

        let network = &self.config.network;
        let network_id = reconcile(&networks, &network.name, network.provisioning(), || {
            networks.create(&network.name, false)
        })
        .await?;

        let subnet = &self.config.subnet;
        let subnet_id = reconcile(&subnets, &subnet.name, subnet.provisioning(), || {
            subnets.create(&subnet.name, subnet.ip_version, &subnet.cidr, &network_id)
        })
        .await?;

        let ext_network = &self.config.ext_network;
        let ext_network_id =
            reconcile(&networks, &ext_network.name, ext_network.provisioning(), || {
                networks.create(&ext_network.name, true)
            })
            .await?;

        let router = &self.config.router;
        let interfaces = [RouterInterface {
            subnet_id: subnet_id.clone(),
        }];
        let router_id = reconcile(&routers, &router.name, router.provisioning(), || {
            routers.create(&router.name, &interfaces, Some(ext_network_id.clone()))
        })
        .await?;

        let mut topology = Topology {
            network_id,
            subnet_id,
            ext_network_id,
            router_id,
            ..Topology::default()
        };

        if let Some(user) = &self.config.security_group_user {
            let id = reconcile(&security_groups, &user.name, user.provisioning(), || {
                security_groups.create(&user.name, &[])
            })
            .await?;
            topology.user_security_group_id = Some(id);
        }

        if let Some(manager) = &self.config.security_group_manager {
            // Config validation guarantees the user group section is present.
            let user_id = topology.user_security_group_id.clone().ok_or_else(|| {
                Error::invalid_config(
                    "management.security_group_manager",
                    "requires management.security_group_user",
                )
            })?;

            let rules: Vec<SecurityRule> = manager
                .internal_ports
                .iter()
                .map(|&port| SecurityRule::from_group(port, user_id.clone()))
                .chain(
                    manager
                        .external_ports
                        .iter()
                        .map(|&port| SecurityRule::from_cidr(port, manager.cidr.clone())),
                )
                .collect();

            let id = reconcile(&security_groups, &manager.name, manager.provisioning(), || {
                security_groups.create(&manager.name, &rules)
            })
            .await?;
            topology.manager_security_group_id = Some(id);
        }

        if let Some(ext) = &self.config.security_group_ext {
            let id = reconcile(&security_groups, &ext.name, ext.provisioning(), || {
                security_groups.create(&ext.name, &[])
            })
            .await?;
            topology.ext_security_group_id = Some(id);
        }

        Ok(topology)
    }
}
