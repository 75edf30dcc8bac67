//! reqwest-backed implementation of [`NeutronApi`].
//!
//! [`NeutronClient::connect`] authenticates against Keystone once, resolves
//! the Neutron endpoint (explicit `neutron.url` or service-catalog
//! discovery) and then issues plain token-authenticated HTTP calls under
//! `<endpoint>/v2.0/`. Requests and replies use Neutron's envelope
//! convention: a singular key wraps create bodies, a plural key wraps list
//! replies.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::client::{
    ApiResource, KeystoneClient, NetworkCreate, NeutronApi, RouterCreate, RouterInterface,
    SecurityGroupCreate, SecurityGroupRuleCreate, SubnetCreate,
};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::reconcile::ResourceId;

/// Applied when the configuration does not set `neutron.request_timeout`.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Token-authenticated client for the Neutron v2.0 API.
#[derive(Debug)]
pub struct NeutronClient {
    http: Client,
    endpoint: String,
    token: String,
}

impl NeutronClient {
    /// Authenticates and resolves the endpoint, returning a ready client.
    pub async fn connect(config: &Config) -> Result<Self> {
        let timeout = config
            .neutron
            .request_timeout
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT);
        let http = Client::builder().timeout(timeout).build()?;

        let keystone = KeystoneClient::new(http.clone(), config.keystone.auth_url.clone());
        let token = keystone.authenticate(&config.keystone).await?;

        let endpoint = match &config.neutron.url {
            Some(url) => url.clone(),
            None => token
                .catalog
                .network_endpoint(config.keystone.region.as_deref())?,
        };
        debug!(endpoint = %endpoint, "neutron endpoint resolved");

        Ok(Self::with_token(http, endpoint, token.id))
    }

    /// A client for a known endpoint and token, no authentication performed.
    pub fn with_token(
        http: Client,
        endpoint: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        let endpoint = endpoint.into();
        Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v2.0/{path}", self.endpoint)
    }

    async fn check(response: Response) -> Result<Value> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }

    /// GET `<path>?name=<name>`, unwrapping the plural envelope.
    async fn list(&self, path: &str, envelope: &str, name: &str) -> Result<Vec<ApiResource>> {
        debug!(path, name, "listing resources");
        let response = self
            .http
            .get(self.url(path))
            .header(AUTH_TOKEN_HEADER, &self.token)
            .query(&[("name", name)])
            .send()
            .await?;
        let body = Self::check(response).await?;
        let resources = body.get(envelope).cloned().ok_or_else(|| Error::Api {
            status: 200,
            message: format!("reply is missing the '{envelope}' envelope"),
        })?;
        Ok(serde_json::from_value(resources)?)
    }

    /// POST `<path>` with the payload inside its singular envelope,
    /// returning the created resource's id.
    async fn create<T: Serialize>(&self, path: &str, envelope: &str, payload: &T) -> Result<ResourceId> {
        debug!(path, "creating resource");
        let body = serde_json::json!({ envelope: payload });
        let response = self
            .http
            .post(self.url(path))
            .header(AUTH_TOKEN_HEADER, &self.token)
            .json(&body)
            .send()
            .await?;
        let reply = Self::check(response).await?;
        reply
            .get(envelope)
            .and_then(|resource| resource.get("id"))
            .and_then(Value::as_str)
            .map(ToString::to_string)
            .ok_or_else(|| Error::Api {
                status: 200,
                message: format!("create reply is missing '{envelope}.id'"),
            })
    }
}

#[async_trait]
impl NeutronApi for NeutronClient {
    async fn list_networks(&self, name: &str) -> Result<Vec<ApiResource>> {
        self.list("networks", "networks", name).await
    }

    async fn create_network(&self, network: NetworkCreate) -> Result<ResourceId> {
        self.create("networks", "network", &network).await
    }

    async fn list_subnets(&self, name: &str) -> Result<Vec<ApiResource>> {
        self.list("subnets", "subnets", name).await
    }

    async fn create_subnet(&self, subnet: SubnetCreate) -> Result<ResourceId> {
        self.create("subnets", "subnet", &subnet).await
    }

    async fn list_routers(&self, name: &str) -> Result<Vec<ApiResource>> {
        self.list("routers", "routers", name).await
    }

    async fn create_router(&self, router: RouterCreate) -> Result<ResourceId> {
        self.create("routers", "router", &router).await
    }

    async fn add_router_interface(
        &self,
        router_id: &str,
        interface: RouterInterface,
    ) -> Result<()> {
        debug!(router_id, subnet_id = %interface.subnet_id, "attaching router interface");
        let response = self
            .http
            .put(self.url(&format!("routers/{router_id}/add_router_interface")))
            .header(AUTH_TOKEN_HEADER, &self.token)
            .json(&interface)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn list_security_groups(&self, name: &str) -> Result<Vec<ApiResource>> {
        self.list("security-groups", "security_groups", name).await
    }

    async fn create_security_group(&self, group: SecurityGroupCreate) -> Result<ResourceId> {
        self.create("security-groups", "security_group", &group).await
    }

    async fn create_security_group_rule(
        &self,
        rule: SecurityGroupRuleCreate,
    ) -> Result<ResourceId> {
        self.create("security-group-rules", "security_group_rule", &rule)
            .await
    }
}
