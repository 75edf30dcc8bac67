//! # Stackstrap - OpenStack management-topology bootstrapper
//!
//! Stackstrap provisions the fixed networking and security topology a
//! management node needs on an OpenStack cloud: the management network and
//! subnet, the external network, a router tying them together, and the
//! security groups. It runs exactly once per invocation, synchronously and
//! in dependency order, and it is idempotent in a strict sense: every
//! resource is either created (and must not exist yet) or verified (and must
//! already exist), selected by its `externally_provisioned` flag.
//!
//! ## Core Concepts
//!
//! - **Reconciliation**: the create-or-ensure-exists protocol in
//!   [`reconcile`] - look a resource up by name, then either assert the name
//!   is free and create, or require exactly one match and reuse its id
//! - **Resource policies**: one per kind in [`resources`], supplying the
//!   name filter and the kind-specific creation payloads
//! - **Topology driver**: [`topology::Bootstrapper`] runs the fixed ordered
//!   sequence, threading each produced id into the steps that depend on it
//! - **Client boundary**: the [`client::NeutronApi`] trait; the real
//!   [`client::NeutronClient`] authenticates via Keystone v2 and speaks
//!   Neutron's v2.0 wire format
//!
//! ## Architecture Overview
//!
//! ```text
//! config file ──▶ Config ──▶ Bootstrapper ──▶ reconcile() per resource
//!                                │                  │
//!                                │                  ▼
//!                                │        Networks / Subnets / Routers /
//!                                │        SecurityGroups (policies)
//!                                │                  │
//!                                ▼                  ▼
//!                          Topology (ids)     NeutronApi (HTTP)
//! ```
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use stackstrap::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load("bootstrap-config.yaml")?;
//!     let client = NeutronClient::connect(&config).await?;
//!     let topology = Bootstrapper::new(&client, &config.management).run().await?;
//!     println!("management network: {}", topology.network_id);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod client;
pub mod config;
pub mod error;
pub mod reconcile;
pub mod resources;
pub mod topology;

// Re-export commonly used items in prelude
pub mod prelude {
    //! Convenient re-exports of the types most callers need.

    pub use crate::client::{NeutronApi, NeutronClient};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::reconcile::{NamedResource, Provisioning, ResourceId};
    pub use crate::resources::{RuleSource, SecurityRule};
    pub use crate::topology::{Bootstrapper, Topology};
}

pub use error::{Error, Result};
