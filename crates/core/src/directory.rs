//! The tenant directory seam.
//!
//! Provisioning depends on this trait rather than a concrete database
//! client so the at-most-once-generation and cache-hit properties can
//! be tested with counted mocks. `tenantgate-db` provides the MySQL
//! implementation.

use async_trait::async_trait;

use crate::error::ProvisionError;
use crate::record::TenantRecord;

/// What a directory lookup matches against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    /// Match the canonical `url` column (web flow; host already
    /// stripped of any `:port`). Depending on the configured lookup
    /// strategy this may also match the tenant-id column.
    Host(String),
    /// Match the stored tenant identifier column (CLI flow).
    TenantId(String),
}

impl LookupKey {
    /// The raw key material, for error messages and log fields.
    pub fn material(&self) -> &str {
        match self {
            LookupKey::Host(h) => h,
            LookupKey::TenantId(t) => t,
        }
    }
}

impl std::fmt::Display for LookupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.material())
    }
}

/// Read access to the tenant directory in the main database.
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    /// Find the tenant record for a lookup key.
    ///
    /// `Ok(None)` is a genuine miss (404-class). Connectivity and query
    /// failures surface as [`ProvisionError::DirectoryUnavailable`]
    /// and must never be conflated with a miss.
    async fn lookup(&self, key: &LookupKey) -> Result<Option<TenantRecord>, ProvisionError>;

    /// All active tenants, in stable primary-key order. Used by CLI
    /// fan-out when no tenant is specified.
    async fn list_active(&self) -> Result<Vec<TenantRecord>, ProvisionError>;
}
