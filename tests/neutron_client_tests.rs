//! HTTP-level tests for the Keystone/Neutron client against wiremock.

use serde_json::json;
use stackstrap::client::{
    NetworkCreate, NeutronApi, NeutronClient, RouterInterface, SecurityGroupRuleCreate,
};
use stackstrap::config::{Config, KeystoneConfig, ManagementConfig, NeutronConfig, ResourceConfig, SubnetConfig};
use stackstrap::Error;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, neutron_url: Option<String>, region: Option<&str>) -> Config {
    Config {
        keystone: KeystoneConfig {
            auth_url: format!("{}/v2.0", server.uri()),
            username: "admin".to_string(),
            password: Some("secret".to_string()),
            tenant_name: "admin".to_string(),
            region: region.map(ToString::to_string),
        },
        neutron: NeutronConfig {
            url: neutron_url,
            request_timeout: None,
        },
        management: ManagementConfig {
            network: ResourceConfig {
                name: "mgmt-net".to_string(),
                externally_provisioned: false,
            },
            subnet: SubnetConfig {
                name: "mgmt-subnet".to_string(),
                ip_version: 4,
                cidr: "10.0.0.0/24".to_string(),
                externally_provisioned: false,
            },
            ext_network: ResourceConfig {
                name: "ext-net".to_string(),
                externally_provisioned: true,
            },
            router: ResourceConfig {
                name: "mgmt-router".to_string(),
                externally_provisioned: false,
            },
            security_group_user: None,
            security_group_manager: None,
            security_group_ext: None,
        },
    }
}

async fn mock_token(server: &MockServer, catalog: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/v2.0/tokens"))
        .and(body_json(json!({
            "auth": {
                "passwordCredentials": {"username": "admin", "password": "secret"},
                "tenantName": "admin"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": {
                "token": {"id": "tok-1"},
                "serviceCatalog": catalog
            }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn connect_authenticates_and_sends_the_token_on_lists() {
    let server = MockServer::start().await;
    mock_token(&server, json!([])).await;

    Mock::given(method("GET"))
        .and(path("/v2.0/networks"))
        .and(query_param("name", "mgmt-net"))
        .and(header("X-Auth-Token", "tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "networks": [
                {"id": "net-1", "name": "mgmt-net", "status": "ACTIVE"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, Some(server.uri()), None);
    let client = NeutronClient::connect(&config).await.unwrap();

    let networks = client.list_networks("mgmt-net").await.unwrap();
    assert_eq!(networks.len(), 1);
    assert_eq!(networks[0].id, "net-1");
}

#[tokio::test]
async fn create_wraps_the_payload_in_its_envelope_and_unwraps_the_id() {
    let server = MockServer::start().await;
    mock_token(&server, json!([])).await;

    Mock::given(method("POST"))
        .and(path("/v2.0/networks"))
        .and(header("X-Auth-Token", "tok-1"))
        .and(body_json(json!({
            "network": {
                "name": "mgmt-net",
                "admin_state_up": true,
                "router:external": false
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "network": {"id": "net-123", "name": "mgmt-net"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, Some(server.uri()), None);
    let client = NeutronClient::connect(&config).await.unwrap();

    let id = client
        .create_network(NetworkCreate::new("mgmt-net", false))
        .await
        .unwrap();
    assert_eq!(id, "net-123");
}

#[tokio::test]
async fn router_interface_attachment_puts_the_subnet_id() {
    let server = MockServer::start().await;
    mock_token(&server, json!([])).await;

    Mock::given(method("PUT"))
        .and(path("/v2.0/routers/router-3/add_router_interface"))
        .and(header("X-Auth-Token", "tok-1"))
        .and(body_json(json!({"subnet_id": "subnet-7"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "iface-1", "subnet_id": "subnet-7"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, Some(server.uri()), None);
    let client = NeutronClient::connect(&config).await.unwrap();

    client
        .add_router_interface(
            "router-3",
            RouterInterface {
                subnet_id: "subnet-7".to_string(),
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn security_group_rule_posts_to_the_rules_collection() {
    let server = MockServer::start().await;
    mock_token(&server, json!([])).await;

    Mock::given(method("POST"))
        .and(path("/v2.0/security-group-rules"))
        .and(body_json(json!({
            "security_group_rule": {
                "security_group_id": "sg-1",
                "direction": "ingress",
                "ethertype": "IPv4",
                "protocol": "tcp",
                "port_range_min": 9000,
                "port_range_max": 9000,
                "remote_ip_prefix": "0.0.0.0/0"
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "security_group_rule": {"id": "rule-1"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, Some(server.uri()), None);
    let client = NeutronClient::connect(&config).await.unwrap();

    let id = client
        .create_security_group_rule(SecurityGroupRuleCreate::from_cidr("sg-1", 9000, "0.0.0.0/0"))
        .await
        .unwrap();
    assert_eq!(id, "rule-1");
}

#[tokio::test]
async fn non_success_replies_become_api_errors() {
    let server = MockServer::start().await;
    mock_token(&server, json!([])).await;

    Mock::given(method("POST"))
        .and(path("/v2.0/networks"))
        .respond_with(
            ResponseTemplate::new(409)
                .set_body_string(r#"{"NeutronError": "quota exceeded"}"#),
        )
        .mount(&server)
        .await;

    let config = config_for(&server, Some(server.uri()), None);
    let client = NeutronClient::connect(&config).await.unwrap();

    let error = client
        .create_network(NetworkCreate::new("mgmt-net", false))
        .await
        .unwrap_err();
    match error {
        Error::Api { status, message } => {
            assert_eq!(status, 409);
            assert!(message.contains("quota exceeded"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn rejected_credentials_fail_authentication() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2.0/tokens"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let config = config_for(&server, Some(server.uri()), None);
    let error = NeutronClient::connect(&config).await.unwrap_err();
    assert!(matches!(error, Error::AuthenticationFailed { .. }));
    assert!(error.to_string().contains("401"));
}

#[tokio::test]
async fn endpoint_is_discovered_from_the_catalog_by_region() {
    let server = MockServer::start().await;
    mock_token(
        &server,
        json!([
            {
                "type": "network",
                "endpoints": [
                    {"region": "RegionOne", "publicURL": "http://unreachable.invalid:9696"},
                    {"region": "RegionTwo", "publicURL": server.uri()}
                ]
            }
        ]),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/v2.0/networks"))
        .and(query_param("name", "ext-net"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"networks": []})))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, None, Some("RegionTwo"));
    let client = NeutronClient::connect(&config).await.unwrap();

    let networks = client.list_networks("ext-net").await.unwrap();
    assert!(networks.is_empty());
}

#[tokio::test]
async fn missing_catalog_endpoint_is_a_discovery_error() {
    let server = MockServer::start().await;
    mock_token(&server, json!([])).await;

    let config = config_for(&server, None, None);
    let error = NeutronClient::connect(&config).await.unwrap_err();
    assert!(matches!(error, Error::EndpointDiscovery { .. }));
}
