//! Subnet policy.

use async_trait::async_trait;

use crate::client::{NeutronApi, SubnetCreate};
use crate::error::Result;
use crate::reconcile::{NamedResource, ResourceId};

/// Policy for Neutron subnets.
pub struct Subnets<'a> {
    api: &'a dyn NeutronApi,
}

impl<'a> Subnets<'a> {
    pub fn new(api: &'a dyn NeutronApi) -> Self {
        Self { api }
    }

    /// Creates a subnet under an existing network.
    pub async fn create(
        &self,
        name: &str,
        ip_version: u8,
        cidr: &str,
        network_id: &str,
    ) -> Result<ResourceId> {
        self.api
            .create_subnet(SubnetCreate {
                name: name.to_string(),
                ip_version,
                cidr: cidr.to_string(),
                network_id: network_id.to_string(),
            })
            .await
    }
}

#[async_trait]
impl NamedResource for Subnets<'_> {
    fn kind(&self) -> &'static str {
        "subnet"
    }

    async fn list_ids_by_name(&self, name: &str) -> Result<Vec<ResourceId>> {
        let subnets = self.api.list_subnets(name).await?;
        Ok(subnets.into_iter().map(|s| s.id).collect())
    }
}
