//! Shared fixtures for provisioning tests: a counted in-memory tenant
//! directory and a temp config directory seeded with a template.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use tenantgate_core::directory::{LookupKey, TenantDirectory};
use tenantgate_core::error::ProvisionError;
use tenantgate_core::generator::MainDbInfo;
use tenantgate_core::record::TenantRecord;
use tenantgate_provision::{ArtifactLayout, ConfigArtifactStore};

pub const TEMPLATE: &str = "<?php\n$parameters = array(\n    'db_driver' => 'pdo_mysql',\n    'db_host' => '{{db_host}}',\n    'db_port' => 3306,\n    'api_enabled' => true,\n    'install_source' => null,\n);\n";

/// In-memory directory that counts lookups, so tests can assert the
/// cache-hit short-circuit (0 lookups) and at-most-once generation
/// (1 lookup under contention).
pub struct CountingDirectory {
    records: Vec<TenantRecord>,
    lookups: AtomicUsize,
    unavailable: bool,
}

impl CountingDirectory {
    pub fn new(records: Vec<TenantRecord>) -> Self {
        Self {
            records,
            lookups: AtomicUsize::new(0),
            unavailable: false,
        }
    }

    /// A directory whose every call fails as unavailable.
    pub fn down() -> Self {
        Self {
            records: Vec::new(),
            lookups: AtomicUsize::new(0),
            unavailable: true,
        }
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TenantDirectory for CountingDirectory {
    async fn lookup(&self, key: &LookupKey) -> Result<Option<TenantRecord>, ProvisionError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(ProvisionError::DirectoryUnavailable(
                "connection refused".to_string(),
            ));
        }
        let hit = self.records.iter().find(|r| match key {
            LookupKey::Host(host) => &r.url == host,
            LookupKey::TenantId(id) => &r.tenant_id == id,
        });
        Ok(hit.cloned())
    }

    async fn list_active(&self) -> Result<Vec<TenantRecord>, ProvisionError> {
        if self.unavailable {
            return Err(ProvisionError::DirectoryUnavailable(
                "connection refused".to_string(),
            ));
        }
        Ok(self.records.iter().filter(|r| r.active).cloned().collect())
    }
}

pub fn acme_record() -> TenantRecord {
    TenantRecord {
        tenant_id: "acme".to_string(),
        url: "acme.example.com".to_string(),
        db_name: "acme_db".to_string(),
        username: "acme_user".to_string(),
        password: "p@ss".to_string(),
        from_name: "ACME".to_string(),
        from_email: "a@acme.com".to_string(),
        reply_to_email: "r@acme.com".to_string(),
        mailer_dsn: "smtp://mail:25".to_string(),
        active: true,
    }
}

pub fn main_db() -> MainDbInfo {
    MainDbInfo {
        host: "db.internal".to_string(),
        port: 3306,
    }
}

/// A temp config dir seeded with the default template, plus a store
/// over the given directory.
pub fn store_with(directory: Arc<CountingDirectory>) -> (TempDir, Arc<ConfigArtifactStore>) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config_template.php"), TEMPLATE).unwrap();
    let layout = ArtifactLayout::new(dir.path());
    let store = Arc::new(ConfigArtifactStore::new(directory, layout, main_db()));
    (dir, store)
}
