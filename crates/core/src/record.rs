//! The tenant directory record as the domain sees it.

use serde::{Deserialize, Serialize};

/// One row of the tenant directory in the main database.
///
/// Read-only from this crate's perspective: provisioning consumes
/// records, it never writes them. Every field here other than
/// `tenant_id` and `active` ends up in a generated artifact and is
/// therefore treated as tenant-controlled input (validated by the
/// generator before any write).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantRecord {
    /// Alternate lookup key (stable short identifier).
    pub tenant_id: String,
    /// Canonical host for the tenant.
    pub url: String,
    /// Name of the tenant's own database.
    pub db_name: String,
    /// Credentials for the tenant's own database.
    pub username: String,
    pub password: String,
    /// Mailer identity fields.
    pub from_name: String,
    pub from_email: String,
    pub reply_to_email: String,
    pub mailer_dsn: String,
    /// Inactive tenants are skipped by CLI fan-out.
    pub active: bool,
}
