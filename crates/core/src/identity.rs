//! Tenant identification from inbound request contexts.
//!
//! A tenant key is the leading alphanumeric label of the request host
//! (`acme.example.com` -> `acme`) or an explicit CLI token. The exact
//! host pattern differs between deployments, so it is configuration
//! ([`HostPattern`]) rather than a constant.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ProvisionError;

/// Maximum accepted length of a tenant key.
pub const MAX_KEY_LEN: usize = 64;

/// A validated tenant identifier: non-empty, alphanumeric, at most
/// [`MAX_KEY_LEN`] characters. Immutable once derived for an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantKey(String);

impl TenantKey {
    /// Validate and wrap a raw tenant token (e.g. from `--tenant`).
    pub fn new(raw: &str) -> Result<Self, ProvisionError> {
        if raw.is_empty() || raw.len() > MAX_KEY_LEN {
            return Err(ProvisionError::IdentificationFailed);
        }
        if !raw.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ProvisionError::IdentificationFailed);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TenantKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which host shape carries the tenant label.
///
/// Observed deployments disagree on the separator (`acme.example.com`
/// vs `acme-mt.example.com`), so both are supported and the choice is
/// part of deployment configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostPattern {
    /// `^([a-zA-Z0-9]+)\.` -- plain leading subdomain label.
    Subdomain,
    /// `^([a-zA-Z0-9]+)<suffix>\.` -- label plus a fixed suffix,
    /// e.g. `SubdomainSuffix("-mt")` matches `acme-mt.example.com`.
    SubdomainSuffix(String),
}

impl HostPattern {
    fn to_regex(&self) -> Regex {
        let source = match self {
            HostPattern::Subdomain => "^([a-zA-Z0-9]+)\\.".to_string(),
            HostPattern::SubdomainSuffix(suffix) => {
                format!("^([a-zA-Z0-9]+){}\\.", regex::escape(suffix))
            }
        };
        // Both arms produce a valid pattern for any suffix (escaped).
        Regex::new(&source).expect("host pattern regex must compile")
    }
}

/// The inbound context a resolution starts from, built once at the
/// process boundary (HTTP layer or argument parser) and passed down
/// explicitly. Components never read host or tenant state ambiently.
#[derive(Debug, Clone)]
pub enum RequestContext {
    /// A web request carrying its `Host` header value.
    Web { host: String },
    /// A CLI invocation; `tenant` comes from `--tenant` or the
    /// `TENANT` variable propagated by a parent fan-out invocation.
    /// `None` means "run for all tenants", handled by the caller.
    Cli { tenant: Option<TenantKey> },
}

/// Derives tenant keys from hosts according to a configured pattern.
#[derive(Debug, Clone)]
pub struct TenantIdentifier {
    pattern: Regex,
}

impl TenantIdentifier {
    pub fn new(pattern: &HostPattern) -> Self {
        Self {
            pattern: pattern.to_regex(),
        }
    }

    /// Extract the tenant key from a host string, ignoring any trailing
    /// `:port`. Returns `None` when the pattern does not match.
    pub fn from_host(&self, host: &str) -> Option<TenantKey> {
        let host = strip_port(host);
        let captures = self.pattern.captures(host)?;
        let label = captures.get(1)?.as_str();
        TenantKey::new(label).ok()
    }

    /// Extract the tenant key from a full request context.
    pub fn identify(&self, context: &RequestContext) -> Option<TenantKey> {
        match context {
            RequestContext::Web { host } => self.from_host(host),
            RequestContext::Cli { tenant } => tenant.clone(),
        }
    }
}

/// Drop a trailing `:port` from a host string, if present.
pub fn strip_port(host: &str) -> &str {
    match host.find(':') {
        Some(idx) => &host[..idx],
        None => host,
    }
}
