//! Handlers for the `/config` resource: bootstrap-style resolution and
//! administrative regeneration, both keyed off the request `Host`.

use axum::extract::State;
use axum::http::header::HOST;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use tenantgate_core::directory::LookupKey;
use tenantgate_core::error::ProvisionError;
use tenantgate_core::identity::{strip_port, RequestContext};
use tenantgate_provision::Outcome;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RegenerateResponse {
    pub success: bool,
    pub message: &'static str,
    pub tenant: String,
    pub config_path: String,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub outcome: &'static str,
    pub tenant: Option<String>,
    pub config_path: String,
}

/// The `Host` header value, required for every tenant-keyed endpoint.
fn request_host(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| AppError::BadRequest("Missing Host header".to_string()))
}

/// POST /api/v1/config/regenerate
///
/// Force regeneration of the requesting tenant's config artifact. The
/// existing `secret_key` is preserved; only the tenant-specific keys
/// are refreshed from the directory record.
pub async fn regenerate(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<RegenerateResponse>> {
    let host = request_host(&headers)?;

    let tenant = state
        .resolver
        .identifier()
        .from_host(&host)
        .ok_or(AppError::Provision(ProvisionError::IdentificationFailed))?;

    let stripped = strip_port(&host).to_string();
    let artifact = state
        .resolver
        .store()
        .regenerate(&tenant, &LookupKey::Host(stripped.clone()), Some(&stripped))
        .await?;

    Ok(Json(RegenerateResponse {
        success: true,
        message: "Config regenerated successfully",
        tenant: tenant.to_string(),
        config_path: artifact.path.display().to_string(),
    }))
}

/// GET /api/v1/config/resolve
///
/// Resolve (and lazily provision) the config file this request's host
/// maps to -- the same pipeline the framework bootstrap runs.
pub async fn resolve(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<ResolveResponse>> {
    let host = request_host(&headers)?;

    let resolution = state
        .resolver
        .resolve(&RequestContext::Web { host })
        .await?;

    Ok(Json(ResolveResponse {
        outcome: match resolution.outcome {
            Outcome::Default => "default",
            Outcome::CacheHit => "cache_hit",
            Outcome::Provisioned => "provisioned",
        },
        tenant: resolution.tenant.map(|t| t.to_string()),
        config_path: resolution.path.display().to_string(),
    }))
}
