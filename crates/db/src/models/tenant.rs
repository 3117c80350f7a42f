//! Tenant directory row model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use tenantgate_core::record::TenantRecord;

/// A row from the `tenants` table. This crate only ever reads it;
/// writes belong to the tenant-management tooling upstream.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TenantRow {
    pub id: i64,
    pub tenant_id: String,
    pub url: String,
    pub db_name: String,
    pub username: String,
    pub password: String,
    pub from_name: String,
    pub from_email: String,
    pub reply_to_email: String,
    pub mailer_dsn: String,
    pub active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<TenantRow> for TenantRecord {
    fn from(row: TenantRow) -> Self {
        TenantRecord {
            tenant_id: row.tenant_id,
            url: row.url,
            db_name: row.db_name,
            username: row.username,
            password: row.password,
            from_name: row.from_name,
            from_email: row.from_email,
            reply_to_email: row.reply_to_email,
            mailer_dsn: row.mailer_dsn,
            active: row.active,
        }
    }
}
