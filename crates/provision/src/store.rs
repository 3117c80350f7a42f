//! The config artifact store: lazily provisions `local-<tenant>.php`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tenantgate_core::directory::{LookupKey, TenantDirectory};
use tenantgate_core::error::ProvisionError;
use tenantgate_core::generator::{self, MainDbInfo};
use tenantgate_core::identity::TenantKey;
use tenantgate_core::params::{self, ParamMap};
use tenantgate_core::template;

use crate::layout::ArtifactLayout;
use crate::lock;

/// The artifact a resolution ended on, and whether this call created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    pub path: PathBuf,
    /// `false` on a cache hit, `true` when this call generated the file.
    pub generated: bool,
}

/// Provisions per-tenant configuration artifacts, at most once per
/// tenant unless a file is externally removed or regeneration is
/// explicitly requested.
pub struct ConfigArtifactStore {
    directory: Arc<dyn TenantDirectory>,
    layout: ArtifactLayout,
    main_db: MainDbInfo,
}

impl ConfigArtifactStore {
    pub fn new(
        directory: Arc<dyn TenantDirectory>,
        layout: ArtifactLayout,
        main_db: MainDbInfo,
    ) -> Self {
        Self {
            directory,
            layout,
            main_db,
        }
    }

    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    /// Resolve the artifact for `tenant`, generating it if absent.
    ///
    /// Existence of the file short-circuits everything: no lock, no
    /// directory round-trip, no re-validation. On a miss the pipeline
    /// runs under an exclusive per-tenant lock with a second existence
    /// check after acquiring, so concurrent resolvers generate once.
    ///
    /// `host` overrides the `site_url` host; when `None` (CLI flows)
    /// the record's canonical url is used.
    pub async fn resolve(
        &self,
        tenant: &TenantKey,
        key: &LookupKey,
        host: Option<&str>,
    ) -> Result<ResolvedArtifact, ProvisionError> {
        let path = self.layout.artifact_path(tenant);
        if path.exists() {
            tracing::debug!(tenant = %tenant, path = %path.display(), "Artifact cache hit");
            return Ok(ResolvedArtifact {
                path,
                generated: false,
            });
        }

        let _guard = lock::acquire(&self.layout.lock_path(tenant)).await?;

        // Another process may have provisioned while we waited.
        if path.exists() {
            tracing::debug!(tenant = %tenant, "Artifact appeared while waiting for lock");
            return Ok(ResolvedArtifact {
                path,
                generated: false,
            });
        }

        self.generate_locked(tenant, key, host, None, &path).await?;
        Ok(ResolvedArtifact {
            path,
            generated: true,
        })
    }

    /// Regenerate the artifact unconditionally, preserving the
    /// existing `secret_key` (and any manually added keys) when the
    /// current file can be parsed.
    pub async fn regenerate(
        &self,
        tenant: &TenantKey,
        key: &LookupKey,
        host: Option<&str>,
    ) -> Result<ResolvedArtifact, ProvisionError> {
        let path = self.layout.artifact_path(tenant);
        let _guard = lock::acquire(&self.layout.lock_path(tenant)).await?;

        let artifact = path.clone();
        let raw = tokio::task::spawn_blocking(move || std::fs::read_to_string(artifact))
            .await
            .map_err(|e| ProvisionError::PersistFailed(format!("artifact read task failed: {e}")))?;
        let existing = match raw {
            Ok(raw) => match params::parse(&raw) {
                Ok(map) => Some(map),
                Err(err) => {
                    // Unparseable artifacts are repaired, not fatal;
                    // the old secret is unrecoverable either way.
                    tracing::warn!(
                        tenant = %tenant,
                        error = %err,
                        "Existing artifact is unparseable; regenerating from template"
                    );
                    None
                }
            },
            Err(_) => None,
        };

        self.generate_locked(tenant, key, host, existing, &path).await?;
        Ok(ResolvedArtifact {
            path,
            generated: true,
        })
    }

    /// Lookup + template + generate + atomic write. Caller holds the
    /// per-tenant lock.
    async fn generate_locked(
        &self,
        tenant: &TenantKey,
        key: &LookupKey,
        host: Option<&str>,
        existing: Option<ParamMap>,
        path: &Path,
    ) -> Result<(), ProvisionError> {
        let record = self
            .directory
            .lookup(key)
            .await?
            .ok_or_else(|| ProvisionError::TenantNotFound(key.material().to_string()))?;

        // Template and artifact I/O go through the blocking pool, same
        // as the lock acquisition above.
        let template_path = self.layout.template_path().to_path_buf();
        let template = tokio::task::spawn_blocking(move || template::load(&template_path))
            .await
            .map_err(|e| ProvisionError::PersistFailed(format!("template load task failed: {e}")))??;

        let host = host.unwrap_or(&record.url);
        let generated = generator::generate(existing, &template, &record, host, &self.main_db)?;

        let document = params::serialize(&generated);
        let target = path.to_path_buf();
        tokio::task::spawn_blocking(move || write_atomic(&target, &document))
            .await
            .map_err(|e| ProvisionError::PersistFailed(format!("artifact write task failed: {e}")))??;
        tracing::info!(tenant = %tenant, path = %path.display(), "Generated tenant config artifact");
        Ok(())
    }
}

/// Write `contents` to `path` via a temp file in the same directory
/// plus an atomic rename, so concurrent readers never observe a
/// half-written artifact.
fn write_atomic(path: &Path, contents: &str) -> Result<(), ProvisionError> {
    use std::io::Write;

    let dir = path
        .parent()
        .ok_or_else(|| ProvisionError::PersistFailed("artifact path has no parent".to_string()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
        ProvisionError::PersistFailed(format!("cannot create temp file in {}: {e}", dir.display()))
    })?;
    tmp.write_all(contents.as_bytes())
        .and_then(|()| tmp.flush())
        .map_err(|e| ProvisionError::PersistFailed(format!("cannot write temp file: {e}")))?;
    tmp.persist(path).map_err(|e| {
        ProvisionError::PersistFailed(format!("cannot rename into {}: {e}", path.display()))
    })?;
    Ok(())
}
