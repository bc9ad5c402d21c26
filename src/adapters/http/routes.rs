//! Route definitions for the REST API.

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use super::handlers::{self, AppState};

/// Builds the full API router with tracing.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/users", user_routes())
        .nest("/api/raffles", raffle_routes())
        .nest("/api/referrals", referral_routes())
        .nest("/api/webhooks", webhook_routes())
        .nest("/api/payments", payment_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::register_user))
        .route("/:id", get(handlers::get_user))
        .route("/:id", delete(handlers::delete_user))
        .route("/:id/spin", post(handlers::spin_wheel))
}

fn raffle_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_raffle))
        .route("/", get(handlers::list_raffles))
        .route("/:id", get(handlers::get_raffle))
}

fn referral_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_referral))
        .route("/:id", get(handlers::get_referral))
}

fn webhook_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(handlers::handle_checkout_webhook))
        .route("/bank", post(handlers::handle_bank_webhook))
}

fn payment_routes() -> Router<AppState> {
    Router::new().route("/result/:user_id", get(handlers::payment_result_redirect))
}
