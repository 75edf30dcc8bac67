//! The create-or-ensure-exists reconciliation protocol.
//!
//! Every resource in the management topology is reconciled the same way: the
//! configuration names the resource and says whether stackstrap owns it. For
//! an owned ([`Managed`](Provisioning::Managed)) resource the name must be
//! free and stackstrap creates it; for an operator-owned
//! ([`External`](Provisioning::External)) resource the name must resolve to
//! exactly one existing object and stackstrap reuses its id. Both branches
//! fail fast, so a run either completes the whole topology or stops at the
//! first resource whose state contradicts the configuration.

use std::future::Future;

use async_trait::async_trait;
use tracing::info;

use crate::error::{Error, Result};

/// Opaque identifier assigned by the control plane to a resource.
pub type ResourceId = String;

/// Who owns a resource's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioning {
    /// Stackstrap creates the resource and fails if the name is taken.
    Managed,
    /// The operator created the resource out-of-band; stackstrap verifies it
    /// exists and reuses it.
    External,
}

impl Provisioning {
    /// Maps the `externally_provisioned` configuration flag onto a variant.
    pub fn from_flag(externally_provisioned: bool) -> Self {
        if externally_provisioned {
            Self::External
        } else {
            Self::Managed
        }
    }
}

/// A resource kind that can be looked up by name.
///
/// Each topology resource (network, subnet, router, security group)
/// implements this once, delegating the lookup to the control plane client.
/// The provided [`find_by_name`](NamedResource::find_by_name) applies the
/// shared zero/one/many decision on top of the raw listing.
#[async_trait]
pub trait NamedResource {
    /// Human-readable kind, used in log lines and error messages.
    fn kind(&self) -> &'static str;

    /// Lists the ids of all existing resources carrying exactly this name.
    async fn list_ids_by_name(&self, name: &str) -> Result<Vec<ResourceId>>;

    /// Resolves a name to at most one id.
    ///
    /// Zero matches is `None`, one match is its id, and two or more matches
    /// is an [`Error::AmbiguousName`] carrying the match count.
    async fn find_by_name(&self, name: &str) -> Result<Option<ResourceId>> {
        let mut ids = self.list_ids_by_name(name).await?;
        match ids.len() {
            0 => Ok(None),
            1 => Ok(ids.pop()),
            matches => Err(Error::ambiguous_name(self.kind(), name, matches)),
        }
    }
}

/// Reconciles one named resource, branching on ownership.
///
/// [`Managed`](Provisioning::Managed) resources go through
/// [`check_and_create`]; [`External`](Provisioning::External) resources go
/// through [`ensure_exists`]. The `create` closure is only invoked on the
/// managed branch, after the name has been confirmed free.
pub async fn reconcile<R, C, Fut>(
    resource: &R,
    name: &str,
    provisioning: Provisioning,
    create: C,
) -> Result<ResourceId>
where
    R: NamedResource + Sync,
    C: FnOnce() -> Fut,
    Fut: Future<Output = Result<ResourceId>>,
{
    match provisioning {
        Provisioning::Managed => check_and_create(resource, name, create).await,
        Provisioning::External => ensure_exists(resource, name).await,
    }
}

/// Asserts the name is unused, then creates the resource.
///
/// Any existing resource under the name, one or several, is an
/// [`Error::AlreadyExists`]; the `create` closure never runs in that case.
pub async fn check_and_create<R, C, Fut>(resource: &R, name: &str, create: C) -> Result<ResourceId>
where
    R: NamedResource + Sync,
    C: FnOnce() -> Fut,
    Fut: Future<Output = Result<ResourceId>>,
{
    if !resource.list_ids_by_name(name).await?.is_empty() {
        return Err(Error::already_exists(resource.kind(), name));
    }
    info!("Will create {} '{}'", resource.kind(), name);
    create().await
}

/// Verifies the resource exists and returns its id.
///
/// Zero matches is an [`Error::NotFound`]; two or more surface as
/// [`Error::AmbiguousName`] from the underlying lookup. This branch never
/// creates anything.
pub async fn ensure_exists<R>(resource: &R, name: &str) -> Result<ResourceId>
where
    R: NamedResource + Sync,
{
    match resource.find_by_name(name).await? {
        Some(id) => {
            info!("Will use existing {} '{}'", resource.kind(), name);
            Ok(id)
        }
        None => Err(Error::not_found(resource.kind(), name)),
    }
}
