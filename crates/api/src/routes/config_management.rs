//! Route definitions for the `/config` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::provision;
use crate::state::AppState;

/// Routes mounted at `/config`.
///
/// ```text
/// GET  /resolve     -> resolve (lazily provision) for the request Host
/// POST /regenerate  -> force regeneration for the request Host
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/resolve", get(provision::resolve))
        .route("/regenerate", post(provision::regenerate))
}
