//! Per-kind resource policies.
//!
//! One policy per resource kind, each a thin borrowing wrapper over the
//! control-plane client: it supplies the kind's name filter for the
//! reconciliation lookup and the kind-specific creation logic.

pub mod network;
pub mod router;
pub mod security_group;
pub mod subnet;

pub use network::Networks;
pub use router::Routers;
pub use security_group::{RuleSource, SecurityGroups, SecurityRule};
pub use subnet::Subnets;
