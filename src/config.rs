//! Configuration module for stackstrap.
//!
//! The configuration is a single declarative document naming the management
//! topology: keystone credentials, the neutron endpoint, and one section per
//! resource to reconcile. The file format is chosen by extension (YAML, JSON
//! or TOML); every resource section carries a `name` and an optional
//! `externally_provisioned` flag that selects the reconciliation branch.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};
use crate::reconcile::Provisioning;

/// Environment variable consulted when `keystone.password` is absent.
pub const PASSWORD_ENV_VAR: &str = "STACKSTRAP_OS_PASSWORD";

/// Default ports opened towards the user security group (message broker and
/// metrics collector).
pub const DEFAULT_INTERNAL_PORTS: &[u16] = &[5672, 5555];

/// Default ports opened towards the manager's external CIDR.
pub const DEFAULT_EXTERNAL_PORTS: &[u16] = &[9000];

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Keystone credentials for the cloud control plane
    pub keystone: KeystoneConfig,

    /// Neutron endpoint settings
    #[serde(default)]
    pub neutron: NeutronConfig,

    /// The management topology to provision
    pub management: ManagementConfig,
}

/// Keystone v2 credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeystoneConfig {
    /// Identity endpoint, e.g. `http://keystone:5000/v2.0`
    pub auth_url: String,

    /// User name
    pub username: String,

    /// Password; falls back to the `STACKSTRAP_OS_PASSWORD` environment
    /// variable when omitted from the file
    #[serde(default)]
    pub password: Option<String>,

    /// Tenant the resources are created under
    pub tenant_name: String,

    /// Region used to filter service-catalog endpoint discovery
    #[serde(default)]
    pub region: Option<String>,
}

/// Neutron endpoint settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NeutronConfig {
    /// Explicit endpoint URL; discovered from the service catalog when absent
    pub url: Option<String>,

    /// Per-request timeout, in humantime format (e.g. `30s`)
    #[serde(with = "humantime_serde")]
    pub request_timeout: Option<Duration>,
}

/// The `management` section: one sub-section per topology resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagementConfig {
    /// Management network
    pub network: ResourceConfig,

    /// Management subnet, created under the management network
    pub subnet: SubnetConfig,

    /// Public-facing network the router's default gateway points at
    pub ext_network: ResourceConfig,

    /// Management router
    pub router: ResourceConfig,

    /// Security group applied to provisioned instances (optional step)
    #[serde(default)]
    pub security_group_user: Option<ResourceConfig>,

    /// Security group applied to the manager node (optional step)
    #[serde(default)]
    pub security_group_manager: Option<ManagerSecurityGroupConfig>,

    /// Externally-facing security group with no initial rules (optional step)
    #[serde(default)]
    pub security_group_ext: Option<ResourceConfig>,
}

/// A resource section carrying only the common fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Resource name, the unique lookup key
    pub name: String,

    /// Whether the operator created this resource out-of-band
    #[serde(default)]
    pub externally_provisioned: bool,
}

impl ResourceConfig {
    /// The reconciliation branch this section selects.
    pub fn provisioning(&self) -> Provisioning {
        Provisioning::from_flag(self.externally_provisioned)
    }
}

/// The `management.subnet` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubnetConfig {
    /// Subnet name
    pub name: String,

    /// IP version, 4 or 6
    #[serde(default = "default_ip_version")]
    pub ip_version: u8,

    /// Subnet CIDR, e.g. `10.0.0.0/24`
    pub cidr: String,

    /// Whether the operator created this subnet out-of-band
    #[serde(default)]
    pub externally_provisioned: bool,
}

impl SubnetConfig {
    /// The reconciliation branch this section selects.
    pub fn provisioning(&self) -> Provisioning {
        Provisioning::from_flag(self.externally_provisioned)
    }
}

/// The `management.security_group_manager` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerSecurityGroupConfig {
    /// Security group name
    pub name: String,

    /// Source CIDR for the externally exposed ports
    pub cidr: String,

    /// Ports opened towards the user security group
    #[serde(default = "default_internal_ports")]
    pub internal_ports: Vec<u16>,

    /// Ports opened towards the external CIDR
    #[serde(default = "default_external_ports")]
    pub external_ports: Vec<u16>,

    /// Whether the operator created this group out-of-band
    #[serde(default)]
    pub externally_provisioned: bool,
}

impl ManagerSecurityGroupConfig {
    /// The reconciliation branch this section selects.
    pub fn provisioning(&self) -> Provisioning {
        Provisioning::from_flag(self.externally_provisioned)
    }
}

fn default_ip_version() -> u8 {
    4
}

fn default_internal_ports() -> Vec<u16> {
    DEFAULT_INTERNAL_PORTS.to_vec()
}

fn default_external_ports() -> Vec<u16> {
    DEFAULT_EXTERNAL_PORTS.to_vec()
}

impl Config {
    /// Loads and validates the configuration from a file.
    ///
    /// The format is chosen by extension: `yml`/`yaml`, `json` or `toml`.
    /// Any other extension is parsed as YAML first and JSON second.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read '{}': {e}", path.display()))
        })?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let mut config: Config = match extension {
            "yml" | "yaml" => serde_yaml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            "toml" => toml::from_str(&content)?,
            _ => serde_yaml::from_str(&content).or_else(|_| {
                serde_json::from_str(&content).map_err(|_| {
                    Error::Config(format!(
                        "failed to parse '{}' as YAML or JSON",
                        path.display()
                    ))
                })
            })?,
        };

        if config.keystone.password.is_none() {
            config.keystone.password = std::env::var(PASSWORD_ENV_VAR).ok();
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates the loaded configuration.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.keystone.auth_url).map_err(|e| {
            Error::invalid_config("keystone.auth_url", format!("not a valid URL: {e}"))
        })?;
        if self.keystone.username.is_empty() {
            return Err(Error::invalid_config("keystone.username", "must not be empty"));
        }
        if self.keystone.password.as_deref().unwrap_or("").is_empty() {
            return Err(Error::invalid_config(
                "keystone.password",
                format!("must be set in the file or via {PASSWORD_ENV_VAR}"),
            ));
        }
        if self.keystone.tenant_name.is_empty() {
            return Err(Error::invalid_config("keystone.tenant_name", "must not be empty"));
        }
        if let Some(url) = &self.neutron.url {
            Url::parse(url).map_err(|e| {
                Error::invalid_config("neutron.url", format!("not a valid URL: {e}"))
            })?;
        }

        let m = &self.management;
        validate_name("management.network.name", &m.network.name)?;
        validate_name("management.subnet.name", &m.subnet.name)?;
        validate_name("management.ext_network.name", &m.ext_network.name)?;
        validate_name("management.router.name", &m.router.name)?;

        if !matches!(m.subnet.ip_version, 4 | 6) {
            return Err(Error::invalid_config(
                "management.subnet.ip_version",
                format!("must be 4 or 6, got {}", m.subnet.ip_version),
            ));
        }
        validate_cidr("management.subnet.cidr", &m.subnet.cidr)?;

        if let Some(user) = &m.security_group_user {
            validate_name("management.security_group_user.name", &user.name)?;
        }
        if let Some(manager) = &m.security_group_manager {
            validate_name("management.security_group_manager.name", &manager.name)?;
            validate_cidr("management.security_group_manager.cidr", &manager.cidr)?;
            // The manager group's internal rules reference the user group's id.
            if m.security_group_user.is_none() {
                return Err(Error::invalid_config(
                    "management.security_group_manager",
                    "requires management.security_group_user",
                ));
            }
        }
        if let Some(ext) = &m.security_group_ext {
            validate_name("management.security_group_ext.name", &ext.name)?;
        }

        Ok(())
    }
}

fn validate_name(key: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_config(key, "must not be empty"));
    }
    Ok(())
}

/// Checks that a CIDR is `address/prefix` with the prefix in bounds for the
/// address family.
fn validate_cidr(key: &str, cidr: &str) -> Result<()> {
    let invalid = |message: String| Error::invalid_config(key, message);

    let (address, prefix) = cidr
        .split_once('/')
        .ok_or_else(|| invalid(format!("'{cidr}' is not in address/prefix form")))?;
    let address: std::net::IpAddr = address
        .parse()
        .map_err(|_| invalid(format!("'{address}' is not an IP address")))?;
    let prefix: u8 = prefix
        .parse()
        .map_err(|_| invalid(format!("'{prefix}' is not a prefix length")))?;

    let max_prefix = if address.is_ipv4() { 32 } else { 128 };
    if prefix > max_prefix {
        return Err(invalid(format!(
            "prefix /{prefix} exceeds /{max_prefix} for this address family"
        )));
    }
    Ok(())
}
