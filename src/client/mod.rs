//! Control-plane client boundary.
//!
//! The topology core only talks to OpenStack through the [`NeutronApi`]
//! trait: a list and a create call per resource kind, plus router interface
//! attachment. [`NeutronClient`] is the real reqwest-backed implementation;
//! tests substitute recording fakes.
//!
//! The payload structs in this module mirror Neutron's v2.0 wire format
//! field for field, so serializing one of them yields exactly the JSON body
//! Neutron expects inside its singular envelope (`{"network": {...}}`).

pub mod keystone;
pub mod neutron;

pub use keystone::{KeystoneClient, ServiceCatalog, Token};
pub use neutron::NeutronClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::reconcile::ResourceId;

/// One element of a Neutron list reply. Fields beyond id and name are
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResource {
    /// Control-plane identifier
    pub id: ResourceId,
    /// Resource name
    #[serde(default)]
    pub name: String,
}

/// Creation payload for a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkCreate {
    /// Network name
    pub name: String,
    /// Networks are always created administratively up
    pub admin_state_up: bool,
    /// Marks the network as public-facing
    #[serde(rename = "router:external")]
    pub external: bool,
}

impl NetworkCreate {
    /// A new network payload, administratively up.
    pub fn new(name: impl Into<String>, external: bool) -> Self {
        Self {
            name: name.into(),
            admin_state_up: true,
            external,
        }
    }
}

/// Creation payload for a subnet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetCreate {
    /// Subnet name
    pub name: String,
    /// 4 or 6
    pub ip_version: u8,
    /// Subnet CIDR
    pub cidr: String,
    /// The network this subnet lives under
    pub network_id: ResourceId,
}

/// The `external_gateway_info` sub-object of a router payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalGatewayInfo {
    /// The external network acting as default gateway
    pub network_id: ResourceId,
}

/// Creation payload for a router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterCreate {
    /// Router name
    pub name: String,
    /// Routers are always created administratively up
    pub admin_state_up: bool,
    /// Default gateway attachment, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_gateway_info: Option<ExternalGatewayInfo>,
}

impl RouterCreate {
    /// A new router payload, administratively up, optionally gatewayed.
    pub fn new(name: impl Into<String>, external_gateway: Option<ResourceId>) -> Self {
        Self {
            name: name.into(),
            admin_state_up: true,
            external_gateway_info: external_gateway
                .map(|network_id| ExternalGatewayInfo { network_id }),
        }
    }
}

/// One router interface descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterInterface {
    /// The subnet to attach
    pub subnet_id: ResourceId,
}

/// Creation payload for a security group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroupCreate {
    /// Group name
    pub name: String,
}

/// Creation payload for one ingress rule of a security group.
///
/// Exactly one of `remote_ip_prefix` / `remote_group_id` is set; use
/// [`SecurityGroupRuleCreate::from_cidr`] or
/// [`SecurityGroupRuleCreate::from_group`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroupRuleCreate {
    /// The group the rule belongs to
    pub security_group_id: ResourceId,
    /// Always `ingress`
    pub direction: String,
    /// Always `IPv4`
    pub ethertype: String,
    /// Always `tcp`
    pub protocol: String,
    /// Single-port rule: min == max == port
    pub port_range_min: u16,
    /// Single-port rule: min == max == port
    pub port_range_max: u16,
    /// Source CIDR, for CIDR-scoped rules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_ip_prefix: Option<String>,
    /// Source group, for group-scoped rules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_group_id: Option<ResourceId>,
}

impl SecurityGroupRuleCreate {
    fn base(security_group_id: impl Into<ResourceId>, port: u16) -> Self {
        Self {
            security_group_id: security_group_id.into(),
            direction: "ingress".to_string(),
            ethertype: "IPv4".to_string(),
            protocol: "tcp".to_string(),
            port_range_min: port,
            port_range_max: port,
            remote_ip_prefix: None,
            remote_group_id: None,
        }
    }

    /// A TCP ingress rule admitting a source CIDR on one port.
    pub fn from_cidr(
        security_group_id: impl Into<ResourceId>,
        port: u16,
        cidr: impl Into<String>,
    ) -> Self {
        Self {
            remote_ip_prefix: Some(cidr.into()),
            ..Self::base(security_group_id, port)
        }
    }

    /// A TCP ingress rule admitting another security group on one port.
    pub fn from_group(
        security_group_id: impl Into<ResourceId>,
        port: u16,
        source_group_id: impl Into<ResourceId>,
    ) -> Self {
        Self {
            remote_group_id: Some(source_group_id.into()),
            ..Self::base(security_group_id, port)
        }
    }
}

/// The list/create capability set the topology core consumes.
///
/// List calls take an exact-name filter; create calls return the new
/// resource's id. Transport and API errors pass through uninterpreted, every
/// one of them aborts the run.
#[async_trait]
pub trait NeutronApi: Send + Sync {
    /// Lists networks carrying exactly this name.
    async fn list_networks(&self, name: &str) -> Result<Vec<ApiResource>>;

    /// Creates a network, returning its id.
    async fn create_network(&self, network: NetworkCreate) -> Result<ResourceId>;

    /// Lists subnets carrying exactly this name.
    async fn list_subnets(&self, name: &str) -> Result<Vec<ApiResource>>;

    /// Creates a subnet, returning its id.
    async fn create_subnet(&self, subnet: SubnetCreate) -> Result<ResourceId>;

    /// Lists routers carrying exactly this name.
    async fn list_routers(&self, name: &str) -> Result<Vec<ApiResource>>;

    /// Creates a router, returning its id.
    async fn create_router(&self, router: RouterCreate) -> Result<ResourceId>;

    /// Attaches a subnet interface to an existing router.
    async fn add_router_interface(
        &self,
        router_id: &str,
        interface: RouterInterface,
    ) -> Result<()>;

    /// Lists security groups carrying exactly this name.
    async fn list_security_groups(&self, name: &str) -> Result<Vec<ApiResource>>;

    /// Creates a security group, returning its id.
    async fn create_security_group(&self, group: SecurityGroupCreate) -> Result<ResourceId>;

    /// Creates one ingress rule on an existing security group.
    async fn create_security_group_rule(
        &self,
        rule: SecurityGroupRuleCreate,
    ) -> Result<ResourceId>;
}
