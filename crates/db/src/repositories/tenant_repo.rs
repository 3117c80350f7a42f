//! Repository for the `tenants` table.

use std::time::Duration;

use async_trait::async_trait;
use tenantgate_core::directory::{LookupKey, TenantDirectory};
use tenantgate_core::error::ProvisionError;
use tenantgate_core::record::TenantRecord;

use crate::models::tenant::TenantRow;
use crate::DbPool;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, tenant_id, url, db_name, username, password, from_name, from_email, \
                       reply_to_email, mailer_dsn, active, created_at, updated_at";

/// Which column(s) a host lookup matches against.
///
/// Deployments disagree on this (plain `url` matching vs `url OR
/// tenant_id`), so it is configuration rather than a constant.
/// Explicit tenant-id lookups (CLI) always use the `tenant_id` column
/// regardless of strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupStrategy {
    #[default]
    UrlOnly,
    UrlOrTenantId,
}

impl std::str::FromStr for LookupStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "url" => Ok(LookupStrategy::UrlOnly),
            "url-or-tenant-id" => Ok(LookupStrategy::UrlOrTenantId),
            other => Err(format!(
                "unknown lookup strategy '{other}' (expected 'url' or 'url-or-tenant-id')"
            )),
        }
    }
}

/// Read-only access to the tenant directory.
#[derive(Clone)]
pub struct TenantRepo {
    pool: DbPool,
    strategy: LookupStrategy,
    timeout: Duration,
}

impl TenantRepo {
    pub fn new(pool: DbPool, strategy: LookupStrategy, timeout: Duration) -> Self {
        Self {
            pool,
            strategy,
            timeout,
        }
    }

    /// Run `future` under the configured query timeout, folding both
    /// timeouts and query errors into `DirectoryUnavailable`.
    async fn bounded<T>(
        &self,
        future: impl std::future::Future<Output = Result<T, sqlx::Error>>,
    ) -> Result<T, ProvisionError> {
        match tokio::time::timeout(self.timeout, future).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                tracing::error!(error = %err, "Tenant directory query failed");
                Err(ProvisionError::DirectoryUnavailable(err.to_string()))
            }
            Err(_) => Err(ProvisionError::DirectoryUnavailable(format!(
                "query exceeded {}s timeout",
                self.timeout.as_secs()
            ))),
        }
    }
}

#[async_trait]
impl TenantDirectory for TenantRepo {
    async fn lookup(&self, key: &LookupKey) -> Result<Option<TenantRecord>, ProvisionError> {
        // `ORDER BY id LIMIT 1` keeps the result deterministic should
        // the directory ever hold more than one matching row.
        let row: Option<TenantRow> = match (key, self.strategy) {
            (LookupKey::Host(host), LookupStrategy::UrlOnly) => {
                let query =
                    format!("SELECT {COLUMNS} FROM tenants WHERE url = ? ORDER BY id LIMIT 1");
                self.bounded(
                    sqlx::query_as::<_, TenantRow>(&query)
                        .bind(host)
                        .fetch_optional(&self.pool),
                )
                .await?
            }
            (LookupKey::Host(host), LookupStrategy::UrlOrTenantId) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM tenants WHERE url = ? OR tenant_id = ? \
                     ORDER BY id LIMIT 1"
                );
                self.bounded(
                    sqlx::query_as::<_, TenantRow>(&query)
                        .bind(host)
                        .bind(host)
                        .fetch_optional(&self.pool),
                )
                .await?
            }
            (LookupKey::TenantId(tenant_id), _) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM tenants WHERE tenant_id = ? ORDER BY id LIMIT 1"
                );
                self.bounded(
                    sqlx::query_as::<_, TenantRow>(&query)
                        .bind(tenant_id)
                        .fetch_optional(&self.pool),
                )
                .await?
            }
        };
        Ok(row.map(TenantRecord::from))
    }

    async fn list_active(&self) -> Result<Vec<TenantRecord>, ProvisionError> {
        let query = format!("SELECT {COLUMNS} FROM tenants WHERE active = 1 ORDER BY id");
        let rows: Vec<TenantRow> = self
            .bounded(sqlx::query_as::<_, TenantRow>(&query).fetch_all(&self.pool))
            .await?;
        Ok(rows.into_iter().map(TenantRecord::from).collect())
    }
}
