//! Keystone v2 authentication.
//!
//! One `POST <auth_url>/tokens` with password credentials yields a token and
//! the service catalog; stackstrap authenticates exactly once at startup and
//! reuses the token for every Neutron call.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::KeystoneConfig;
use crate::error::{Error, Result};

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    auth: AuthPayload<'a>,
}

#[derive(Debug, Serialize)]
struct AuthPayload<'a> {
    #[serde(rename = "passwordCredentials")]
    password_credentials: PasswordCredentials<'a>,
    #[serde(rename = "tenantName")]
    tenant_name: &'a str,
}

#[derive(Debug, Serialize)]
struct PasswordCredentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenReply {
    access: Access,
}

#[derive(Debug, Deserialize)]
struct Access {
    token: TokenBody,
    #[serde(rename = "serviceCatalog", default)]
    service_catalog: Vec<CatalogService>,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    id: String,
}

/// One service entry of the Keystone catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogService {
    /// Service type, e.g. `network`
    #[serde(rename = "type")]
    pub service_type: String,
    /// Endpoints by region
    #[serde(default)]
    pub endpoints: Vec<CatalogEndpoint>,
}

/// One endpoint of a catalog service.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEndpoint {
    /// Region the endpoint serves
    #[serde(default)]
    pub region: Option<String>,
    /// Public URL of the endpoint
    #[serde(rename = "publicURL")]
    pub public_url: String,
}

/// The service catalog returned alongside a token.
#[derive(Debug, Clone)]
pub struct ServiceCatalog {
    services: Vec<CatalogService>,
}

impl ServiceCatalog {
    /// Picks the public URL of the `network` service, filtered by region when
    /// one is configured.
    pub fn network_endpoint(&self, region: Option<&str>) -> Result<String> {
        let mut endpoints = self
            .services
            .iter()
            .filter(|service| service.service_type == "network")
            .flat_map(|service| service.endpoints.iter());

        let chosen = match region {
            Some(region) => {
                endpoints.find(|endpoint| endpoint.region.as_deref() == Some(region))
            }
            None => endpoints.next(),
        };

        chosen.map(|endpoint| endpoint.public_url.clone()).ok_or_else(|| {
            Error::EndpointDiscovery {
                message: match region {
                    Some(region) => {
                        format!("no network endpoint for region '{region}' in the service catalog")
                    }
                    None => "no network endpoint in the service catalog".to_string(),
                },
            }
        })
    }
}

/// An authenticated token and the catalog it came with.
#[derive(Debug, Clone)]
pub struct Token {
    /// Token id, sent as `X-Auth-Token` on every Neutron request
    pub id: String,
    /// Service catalog for endpoint discovery
    pub catalog: ServiceCatalog,
}

/// Thin client for the Keystone v2 identity API.
pub struct KeystoneClient {
    http: Client,
    auth_url: String,
}

impl KeystoneClient {
    /// A client for the given identity endpoint, e.g.
    /// `http://keystone:5000/v2.0`.
    pub fn new(http: Client, auth_url: impl Into<String>) -> Self {
        let auth_url = auth_url.into();
        Self {
            http,
            auth_url: auth_url.trim_end_matches('/').to_string(),
        }
    }

    /// Exchanges password credentials for a token and the service catalog.
    pub async fn authenticate(&self, config: &KeystoneConfig) -> Result<Token> {
        let url = format!("{}/tokens", self.auth_url);
        debug!(url = %url, username = %config.username, "authenticating against keystone");

        let request = TokenRequest {
            auth: AuthPayload {
                password_credentials: PasswordCredentials {
                    username: &config.username,
                    password: config.password.as_deref().unwrap_or(""),
                },
                tenant_name: &config.tenant_name,
            },
        };

        let response = self.http.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::authentication(format!(
                "keystone returned {status}: {body}"
            )));
        }

        let reply: TokenReply = response
            .json()
            .await
            .map_err(|e| Error::authentication(format!("malformed token reply: {e}")))?;

        Ok(Token {
            id: reply.access.token.id,
            catalog: ServiceCatalog {
                services: reply.access.service_catalog,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn catalog(services: serde_json::Value) -> ServiceCatalog {
        ServiceCatalog {
            services: serde_json::from_value(services).unwrap(),
        }
    }

    #[test]
    fn test_token_request_body_shape() {
        let request = TokenRequest {
            auth: AuthPayload {
                password_credentials: PasswordCredentials {
                    username: "admin",
                    password: "secret",
                },
                tenant_name: "admin",
            },
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "auth": {
                    "passwordCredentials": {"username": "admin", "password": "secret"},
                    "tenantName": "admin"
                }
            })
        );
    }

    #[test]
    fn test_network_endpoint_without_region() {
        let catalog = catalog(json!([
            {"type": "compute", "endpoints": [{"publicURL": "http://nova:8774"}]},
            {"type": "network", "endpoints": [{"publicURL": "http://neutron:9696"}]}
        ]));
        assert_eq!(
            catalog.network_endpoint(None).unwrap(),
            "http://neutron:9696"
        );
    }

    #[test]
    fn test_network_endpoint_filters_by_region() {
        let catalog = catalog(json!([
            {"type": "network", "endpoints": [
                {"region": "RegionOne", "publicURL": "http://one:9696"},
                {"region": "RegionTwo", "publicURL": "http://two:9696"}
            ]}
        ]));
        assert_eq!(
            catalog.network_endpoint(Some("RegionTwo")).unwrap(),
            "http://two:9696"
        );
    }

    #[test]
    fn test_missing_network_endpoint_is_a_discovery_error() {
        let catalog = catalog(json!([
            {"type": "compute", "endpoints": [{"publicURL": "http://nova:8774"}]}
        ]));
        let error = catalog.network_endpoint(None).unwrap_err();
        assert!(matches!(error, Error::EndpointDiscovery { .. }));

        let error = catalog.network_endpoint(Some("RegionNine")).unwrap_err();
        assert!(error.to_string().contains("RegionNine"));
    }
}
