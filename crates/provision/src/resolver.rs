//! Per-request configuration resolution.
//!
//! One resolution per incoming request or CLI process:
//! `Unresolved -> Identified -> {CacheHit | Provisioning} ->
//! Resolved | Failed`. The flow below runs that machine in a single
//! pass; provisioning is never re-entered once a path is resolved.

use std::path::PathBuf;
use std::sync::Arc;

use tenantgate_core::directory::LookupKey;
use tenantgate_core::error::ProvisionError;
use tenantgate_core::identity::{strip_port, RequestContext, TenantIdentifier, TenantKey};

use crate::store::ConfigArtifactStore;

/// How a resolution ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No tenant key in the context; the tenant-less default applies.
    Default,
    /// The tenant's artifact already existed.
    CacheHit,
    /// This resolution generated the artifact.
    Provisioned,
}

/// The configuration file the framework should load for this
/// request/process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: Outcome,
    pub path: PathBuf,
    pub tenant: Option<TenantKey>,
}

/// Orchestrates identification and artifact provisioning for one
/// inbound context.
pub struct RequestConfigResolver {
    identifier: TenantIdentifier,
    store: Arc<ConfigArtifactStore>,
}

impl RequestConfigResolver {
    pub fn new(identifier: TenantIdentifier, store: Arc<ConfigArtifactStore>) -> Self {
        Self { identifier, store }
    }

    pub fn identifier(&self) -> &TenantIdentifier {
        &self.identifier
    }

    pub fn store(&self) -> &ConfigArtifactStore {
        &self.store
    }

    /// Resolve the config file for `context`.
    ///
    /// Without a tenant key the default file is returned: a web host
    /// that matches no pattern runs against the global config, and a
    /// CLI invocation without a tenant is fanned out by the caller.
    /// With a key, every sub-failure is terminal for this request --
    /// never silently replaced by the default config, which could
    /// serve one tenant's request against another's database.
    pub async fn resolve(&self, context: &RequestContext) -> Result<Resolution, ProvisionError> {
        let Some(tenant) = self.identifier.identify(context) else {
            return Ok(Resolution {
                outcome: Outcome::Default,
                path: self.store.layout().default_path(),
                tenant: None,
            });
        };

        let (key, host) = lookup_for(context, &tenant);
        let artifact = self.store.resolve(&tenant, &key, host.as_deref()).await?;

        Ok(Resolution {
            outcome: if artifact.generated {
                Outcome::Provisioned
            } else {
                Outcome::CacheHit
            },
            path: artifact.path,
            tenant: Some(tenant),
        })
    }
}

/// The directory lookup key and `site_url` host for a context: web
/// requests look up by (port-stripped) host and keep that host for
/// `site_url`; CLI invocations look up by tenant id and fall back to
/// the record's canonical url.
fn lookup_for(context: &RequestContext, tenant: &TenantKey) -> (LookupKey, Option<String>) {
    match context {
        RequestContext::Web { host } => {
            let host = strip_port(host).to_string();
            (LookupKey::Host(host.clone()), Some(host))
        }
        RequestContext::Cli { .. } => (LookupKey::TenantId(tenant.as_str().to_string()), None),
    }
}
