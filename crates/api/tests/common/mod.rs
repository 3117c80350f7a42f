//! Shared test harness: a full application router wired to an
//! in-memory tenant directory and a temp config directory.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method, Request, Response, StatusCode};
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;

use tenantgate_api::config::ServerConfig;
use tenantgate_api::routes;
use tenantgate_api::state::AppState;
use tenantgate_core::directory::{LookupKey, TenantDirectory};
use tenantgate_core::error::ProvisionError;
use tenantgate_core::generator::MainDbInfo;
use tenantgate_core::identity::{HostPattern, TenantIdentifier};
use tenantgate_core::record::TenantRecord;
use tenantgate_db::repositories::LookupStrategy;
use tenantgate_provision::{ArtifactLayout, ConfigArtifactStore, RequestConfigResolver};

pub const TEMPLATE: &str = "<?php\n$parameters = array(\n    'db_driver' => 'pdo_mysql',\n    'db_host' => '{{db_host}}',\n    'db_port' => 3306,\n);\n";

/// In-memory tenant directory with a lookup counter.
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

/// Build a test `ServerConfig` rooted at `config_dir`.
pub fn test_config(config_dir: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        config_dir: config_dir.to_path_buf(),
        template_path: None,
        host_pattern: HostPattern::Subdomain,
        lookup_strategy: LookupStrategy::UrlOnly,
    }
}

/// Build the full application router with all middleware layers, a
/// temp config directory seeded with the template, and the given
/// directory backing the resolver.
///
/// This mirrors the router construction in `main.rs` so integration
/// tests exercise the same middleware stack that production uses.
pub fn build_test_app(directory: Arc<CountingDirectory>) -> (TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config_template.php"), TEMPLATE).unwrap();

    let config = test_config(dir.path());
    let layout = ArtifactLayout::new(dir.path());
    let store = Arc::new(ConfigArtifactStore::new(
        directory,
        layout,
        MainDbInfo {
            host: "db.internal".to_string(),
            port: 3306,
        },
    ));
    let resolver = Arc::new(RequestConfigResolver::new(
        TenantIdentifier::new(&config.host_pattern),
        store,
    ));

    let state = AppState {
        resolver,
        config: Arc::new(config),
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    let app = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state);

    (dir, app)
}

/// Issue a request with an optional `Host` header.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    host: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(host) = host {
        builder = builder.header("host", host);
    }
    let request = builder.body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    use http_body_util::BodyExt;
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
