//! Shared test support: a recording in-memory fake of the Neutron API.
//!
//! Include this module in your integration tests:
//!
//! ```rust,ignore
//! mod common;
//! use common::{Call, FakeNeutron};
//! ```

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use stackstrap::client::{
    ApiResource, NetworkCreate, NeutronApi, RouterCreate, RouterInterface, SecurityGroupCreate,
    SecurityGroupRuleCreate, SubnetCreate,
};
use stackstrap::reconcile::ResourceId;
use stackstrap::Result;

/// Resource-kind keys used by the fake's backing store.
pub const NETWORK: &str = "network";
pub const SUBNET: &str = "subnet";
pub const ROUTER: &str = "router";
pub const SECURITY_GROUP: &str = "security_group";

/// One recorded API call, payloads included.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListNetworks(String),
    CreateNetwork(NetworkCreate),
    ListSubnets(String),
    CreateSubnet(SubnetCreate),
    ListRouters(String),
    CreateRouter(RouterCreate),
    AddRouterInterface {
        router_id: String,
        interface: RouterInterface,
    },
    ListSecurityGroups(String),
    CreateSecurityGroup(SecurityGroupCreate),
    CreateSecurityGroupRule(SecurityGroupRuleCreate),
}

#[derive(Default)]
struct State {
    existing: HashMap<&'static str, Vec<ApiResource>>,
    queued_ids: HashMap<&'static str, VecDeque<String>>,
    counter: usize,
    calls: Vec<Call>,
}

/// In-memory [`NeutronApi`] that records every call.
///
/// Lookups filter the per-kind backing store by exact name; creates return a
/// queued id when one was seeded (or a generated one otherwise) and insert
/// the new resource into the store so later lookups see it.
#[derive(Default)]
pub struct FakeNeutron {
    state: Mutex<State>,
}

impl FakeNeutron {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds one pre-existing resource of the given kind.
    #[must_use]
    pub fn with_existing(self, kind: &'static str, name: &str, id: &str) -> Self {
        self.state
            .lock()
            .existing
            .entry(kind)
            .or_default()
            .push(ApiResource {
                id: id.to_string(),
                name: name.to_string(),
            });
        self
    }

    /// Queues the id the next create of the given kind will return.
    #[must_use]
    pub fn queue_id(self, kind: &'static str, id: &str) -> Self {
        self.state
            .lock()
            .queued_ids
            .entry(kind)
            .or_default()
            .push_back(id.to_string());
        self
    }

    /// Everything that was called, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    /// The recorded calls matching a predicate.
    pub fn calls_where(&self, predicate: impl Fn(&Call) -> bool) -> Vec<Call> {
        self.calls().into_iter().filter(|c| predicate(c)).collect()
    }

    fn list(&self, kind: &'static str, name: &str, call: Call) -> Vec<ApiResource> {
        let mut state = self.state.lock();
        state.calls.push(call);
        state
            .existing
            .get(kind)
            .map(|resources| {
                resources
                    .iter()
                    .filter(|r| r.name == name)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn create(&self, kind: &'static str, name: &str, call: Call) -> ResourceId {
        let mut state = self.state.lock();
        state.calls.push(call);
        let id = match state.queued_ids.get_mut(kind).and_then(VecDeque::pop_front) {
            Some(id) => id,
            None => {
                state.counter += 1;
                format!("{kind}-{}", state.counter)
            }
        };
        state.existing.entry(kind).or_default().push(ApiResource {
            id: id.clone(),
            name: name.to_string(),
        });
        id
    }
}

#[async_trait]
impl NeutronApi for FakeNeutron {
    async fn list_networks(&self, name: &str) -> Result<Vec<ApiResource>> {
        Ok(self.list(NETWORK, name, Call::ListNetworks(name.to_string())))
    }

    async fn create_network(&self, network: NetworkCreate) -> Result<ResourceId> {
        let name = network.name.clone();
        Ok(self.create(NETWORK, &name, Call::CreateNetwork(network)))
    }

    async fn list_subnets(&self, name: &str) -> Result<Vec<ApiResource>> {
        Ok(self.list(SUBNET, name, Call::ListSubnets(name.to_string())))
    }

    async fn create_subnet(&self, subnet: SubnetCreate) -> Result<ResourceId> {
        let name = subnet.name.clone();
        Ok(self.create(SUBNET, &name, Call::CreateSubnet(subnet)))
    }

    async fn list_routers(&self, name: &str) -> Result<Vec<ApiResource>> {
        Ok(self.list(ROUTER, name, Call::ListRouters(name.to_string())))
    }

    async fn create_router(&self, router: RouterCreate) -> Result<ResourceId> {
        let name = router.name.clone();
        Ok(self.create(ROUTER, &name, Call::CreateRouter(router)))
    }

    async fn add_router_interface(
        &self,
        router_id: &str,
        interface: RouterInterface,
    ) -> Result<()> {
        self.state.lock().calls.push(Call::AddRouterInterface {
            router_id: router_id.to_string(),
            interface,
        });
        Ok(())
    }

    async fn list_security_groups(&self, name: &str) -> Result<Vec<ApiResource>> {
        Ok(self.list(
            SECURITY_GROUP,
            name,
            Call::ListSecurityGroups(name.to_string()),
        ))
    }

    async fn create_security_group(&self, group: SecurityGroupCreate) -> Result<ResourceId> {
        let name = group.name.clone();
        Ok(self.create(SECURITY_GROUP, &name, Call::CreateSecurityGroup(group)))
    }

    async fn create_security_group_rule(
        &self,
        rule: SecurityGroupRuleCreate,
    ) -> Result<ResourceId> {
        let mut state = self.state.lock();
        state.calls.push(Call::CreateSecurityGroupRule(rule));
        state.counter += 1;
        Ok(format!("rule-{}", state.counter))
    }
}
