//! Route definitions for ad-set-scoped sub-resources.
//!
//! These routes are mounted at `/ad-sets/{adset_id}` and cover the
//! fragment listing, the combination lifecycle, and variant generation.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{combination, fragment, variant};
use crate::state::AppState;

/// Routes mounted at `/ad-sets/{adset_id}`.
///
/// ```text
/// GET    /fragments                    list (optionally ?kind=)
/// GET    /combinations                 list, best score first
/// POST   /combinations/generate        expand, score, persist
/// POST   /combinations/bulk-delete     delete a batch, skipping deployed
/// PUT    /combinations/{id}            change CTA type
/// DELETE /combinations/{id}            delete one
/// POST   /variants/generate            variant job (text/event-stream)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/fragments", get(fragment::list))
        .route("/combinations", get(combination::list))
        .route("/combinations/generate", post(combination::generate))
        .route("/combinations/bulk-delete", post(combination::bulk_delete))
        .route(
            "/combinations/{id}",
            put(combination::update_cta_type).delete(combination::delete),
        )
        .route("/variants/generate", post(variant::generate))
}
