use std::path::PathBuf;

use tenantgate_core::identity::HostPattern;
use tenantgate_db::repositories::LookupStrategy;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables. Main-database
/// credentials live in [`tenantgate_db::config::MainDbConfig`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Directory holding `local.php`, `config_template.php`, and the
    /// generated `local-<tenant>.php` artifacts.
    pub config_dir: PathBuf,
    /// Optional override for the template location; defaults to
    /// `<config_dir>/config_template.php`.
    pub template_path: Option<PathBuf>,
    /// Host pattern deriving tenant keys; `TENANT_HOST_SUFFIX` set to
    /// e.g. `-mt` matches `acme-mt.example.com`, unset matches the
    /// plain leading subdomain.
    pub host_pattern: HostPattern,
    /// Which column(s) directory host lookups match (`TENANT_LOOKUP`:
    /// `url` or `url-or-tenant-id`).
    pub lookup_strategy: LookupStrategy,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `CONFIG_DIR`           | `config`                   |
    /// | `CONFIG_TEMPLATE`      | `<config_dir>/config_template.php` |
    /// | `TENANT_HOST_SUFFIX`   | unset (plain subdomain)    |
    /// | `TENANT_LOOKUP`        | `url`                      |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let config_dir = PathBuf::from(std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".into()));

        let template_path = std::env::var("CONFIG_TEMPLATE").ok().map(PathBuf::from);

        let host_pattern = match std::env::var("TENANT_HOST_SUFFIX") {
            Ok(suffix) if !suffix.is_empty() => HostPattern::SubdomainSuffix(suffix),
            _ => HostPattern::Subdomain,
        };

        let lookup_strategy = std::env::var("TENANT_LOOKUP")
            .unwrap_or_else(|_| "url".into())
            .parse()
            .expect("TENANT_LOOKUP must be 'url' or 'url-or-tenant-id'");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            config_dir,
            template_path,
            host_pattern,
            lookup_strategy,
        }
    }
}
