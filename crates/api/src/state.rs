use std::sync::Arc;

use tenantgate_provision::RequestConfigResolver;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Per-request tenant/config resolver.
    pub resolver: Arc<RequestConfigResolver>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
