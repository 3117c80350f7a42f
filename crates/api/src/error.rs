use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tenantgate_core::error::ProvisionError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`ProvisionError`] for domain errors and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to produce the `{"error": ...}`
/// JSON body with the status mapping contract: identification failures
/// are the caller's fault (400), directory misses are 404, everything
/// else is a server-side 500.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level resolution/provisioning failure.
    #[error(transparent)]
    Provision(#[from] ProvisionError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Provision(err) => {
                let status = match err {
                    ProvisionError::IdentificationFailed => StatusCode::BAD_REQUEST,
                    ProvisionError::TenantNotFound(_) => StatusCode::NOT_FOUND,
                    ProvisionError::DirectoryUnavailable(_)
                    | ProvisionError::TemplateInvalid(_)
                    | ProvisionError::ValidationFailed { .. }
                    | ProvisionError::PersistFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    tracing::error!(error = %err, "Config provisioning failed");
                }
                (status, err.to_string())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let body = json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}
