//! Network policy.

use async_trait::async_trait;

use crate::client::{NetworkCreate, NeutronApi};
use crate::error::Result;
use crate::reconcile::{NamedResource, ResourceId};

/// Policy for Neutron networks.
pub struct Networks<'a> {
    api: &'a dyn NeutronApi,
}

impl<'a> Networks<'a> {
    pub fn new(api: &'a dyn NeutronApi) -> Self {
        Self { api }
    }

    /// Creates a network, administratively up; `external` marks it as the
    /// public-facing network.
    pub async fn create(&self, name: &str, external: bool) -> Result<ResourceId> {
        self.api.create_network(NetworkCreate::new(name, external)).await
    }
}

#[async_trait]
impl NamedResource for Networks<'_> {
    fn kind(&self) -> &'static str {
        "network"
    }

    async fn list_ids_by_name(&self, name: &str) -> Result<Vec<ResourceId>> {
        let networks = self.api.list_networks(name).await?;
        Ok(networks.into_iter().map(|n| n.id).collect())
    }
}
