pub mod ad_set;
pub mod deployment;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ad-sets/{adset_id}/fragments                    list (GET, ?kind=)
/// /ad-sets/{adset_id}/combinations                 list (GET)
/// /ad-sets/{adset_id}/combinations/generate        generate (POST)
/// /ad-sets/{adset_id}/combinations/bulk-delete     bulk delete (POST)
/// /ad-sets/{adset_id}/combinations/{id}            update CTA type (PUT), delete (DELETE)
/// /ad-sets/{adset_id}/variants/generate            variant job (POST, SSE)
///
/// /deployment/deploy                               deploy batch (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/ad-sets/{adset_id}", ad_set::router())
        .nest("/deployment", deployment::router())
}
