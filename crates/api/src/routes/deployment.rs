//! Route definitions for deployment.

use axum::routing::post;
use axum::Router;

use crate::handlers::deployment;
use crate::state::AppState;

/// Routes mounted at `/deployment`.
///
/// ```text
/// POST /deploy    submit a batch of combinations to the ad platform
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/deploy", post(deployment::deploy))
}
