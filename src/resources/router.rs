//! Router policy.

use async_trait::async_trait;

use crate::client::{NeutronApi, RouterCreate, RouterInterface};
use crate::error::Result;
use crate::reconcile::{NamedResource, ResourceId};

/// Policy for Neutron routers.
pub struct Routers<'a> {
    api: &'a dyn NeutronApi,
}

impl<'a> Routers<'a> {
    pub fn new(api: &'a dyn NeutronApi) -> Self {
        Self { api }
    }

    /// Creates a router, administratively up, optionally gatewayed onto an
    /// external network, then attaches each interface in order.
    ///
    /// Interface attachment is a follow-up call per interface; a failed
    /// attachment aborts the run and leaves the already-created router in
    /// place for the operator to inspect.
    pub async fn create(
        &self,
        name: &str,
        interfaces: &[RouterInterface],
        external_gateway: Option<ResourceId>,
    ) -> Result<ResourceId> {
        let router_id = self
            .api
            .create_router(RouterCreate::new(name, external_gateway))
            .await?;
        for interface in interfaces {
            self.api
                .add_router_interface(&router_id, interface.clone())
                .await?;
        }
        Ok(router_id)
    }
}

#[async_trait]
impl NamedResource for Routers<'_> {
    fn kind(&self) -> &'static str {
        "router"
    }

    async fn list_ids_by_name(&self, name: &str) -> Result<Vec<ResourceId>> {
        let routers = self.api.list_routers(name).await?;
        Ok(routers.into_iter().map(|r| r.id).collect())
    }
}
