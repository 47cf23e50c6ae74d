//! Route table.

use axum::routing::{delete, get, post};
use axum::{middleware, Router};

use crate::auth::require_api_key;
use crate::handlers;
use crate::state::AppState;

/// Build the API router with the key check applied to every route.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/info", get(handlers::server_info))
        .route("/api/v1/accounts/list", get(handlers::list_accounts))
        .route("/api/v1/accounts/stats", get(handlers::account_stats))
        .route("/api/v1/logs", get(handlers::activity_logs))
        .route(
            "/api/v1/admin/keys",
            get(handlers::list_keys).post(handlers::mint_key),
        )
        .route("/api/v1/trial/:proto", post(handlers::create_trial))
        .route("/api/v1/:proto/create", post(handlers::create_account))
        .route("/api/v1/:proto/list", get(handlers::list_protocol))
        .route(
            "/api/v1/:proto/delete/:username",
            delete(handlers::delete_account),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ))
        .with_state(state)
}
