// HTTP surface over the linking and payment-plan pipelines

pub mod accounts;
pub mod health;
pub mod payment_plan;
pub mod plaid;

use crate::app::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub fn plaid_routes() -> Router<AppState> {
    Router::new()
        .route("/link-token", post(plaid::create_link_token))
        .route(
            "/exchange",
            post(plaid::link_account).put(plaid::relink_account),
        )
}

pub fn payment_plan_routes() -> Router<AppState> {
    Router::new()
        .route("/payment-plans", post(payment_plan::create_payment_plans))
        .route(
            "/users/{user_id}/payment-plans",
            get(payment_plan::list_user_payment_plans),
        )
}

pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/users/{user_id}/accounts", get(accounts::list_user_accounts))
        .route(
            "/users/{user_id}/transactions",
            get(accounts::list_user_transactions),
        )
}

/// Full router with request tracing
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/v1/plaid", plaid_routes())
        .nest("/v1", payment_plan_routes().merge(account_routes()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
