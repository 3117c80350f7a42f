//! Filesystem layout of configuration artifacts.
//!
//! One config directory holds everything: the tenant-less default
//! (`local.php`), the default parameter template
//! (`config_template.php`), and one generated `local-<tenant>.php`
//! per tenant. Existence of a tenant's file is the sole "already
//! provisioned" signal.

use std::path::{Path, PathBuf};

use tenantgate_core::identity::TenantKey;

#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    config_dir: PathBuf,
    template_path: PathBuf,
}

impl ArtifactLayout {
    /// Layout with the template at its conventional location,
    /// `<config_dir>/config_template.php`.
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        let template_path = config_dir.join("config_template.php");
        Self {
            config_dir,
            template_path,
        }
    }

    /// Layout with an explicit template location.
    pub fn with_template(config_dir: impl Into<PathBuf>, template_path: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            template_path: template_path.into(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    /// The generated artifact for a tenant: `local-<tenant>.php`.
    /// `TenantKey` is validated alphanumeric, so the key can never
    /// traverse out of the config directory.
    pub fn artifact_path(&self, tenant: &TenantKey) -> PathBuf {
        self.config_dir.join(format!("local-{tenant}.php"))
    }

    /// Sidecar lock file guarding a tenant's artifact generation.
    pub fn lock_path(&self, tenant: &TenantKey) -> PathBuf {
        self.config_dir.join(format!("local-{tenant}.php.lock"))
    }

    /// The tenant-less default configuration, `local.php`.
    pub fn default_path(&self) -> PathBuf {
        self.config_dir.join("local.php")
    }
}
