// Account linking endpoints

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::{
    app::AppState,
    models::Purpose,
    services::token::LinkOperation,
    utils::service_error::ServiceError,
};

// =============================================================================
// REQUEST TYPES
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LinkTokenRequestBody {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ExchangeRequestBody {
    pub user_id: String,
    pub public_token: String,
    #[serde(default)]
    pub purpose: Option<String>,
}

impl ExchangeRequestBody {
    fn purpose(&self) -> Purpose {
        self.purpose
            .as_deref()
            .and_then(Purpose::from_string)
            .unwrap_or_default()
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// POST /v1/plaid/link-token
pub async fn create_link_token(
    State(state): State<AppState>,
    Json(request): Json<LinkTokenRequestBody>,
) -> Result<impl IntoResponse, ServiceError> {
    let link_token = state
        .token_service
        .create_link_token(&request.user_id)
        .await?;

    Ok(Json(json!({ "link_token": link_token })))
}

/// POST /v1/plaid/exchange
pub async fn link_account(
    State(state): State<AppState>,
    Json(request): Json<ExchangeRequestBody>,
) -> Result<impl IntoResponse, ServiceError> {
    exchange(state, request, LinkOperation::Create).await
}

/// PUT /v1/plaid/exchange
pub async fn relink_account(
    State(state): State<AppState>,
    Json(request): Json<ExchangeRequestBody>,
) -> Result<impl IntoResponse, ServiceError> {
    exchange(state, request, LinkOperation::Refresh).await
}

async fn exchange(
    state: AppState,
    request: ExchangeRequestBody,
    operation: LinkOperation,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let outcome = state
        .linking_service
        .link_account(
            &request.user_id,
            &request.public_token,
            request.purpose(),
            operation,
        )
        .await?;

    info!(
        "Link {} for user {}",
        if outcome.created { "created" } else { "refreshed" },
        request.user_id
    );

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(json!(outcome))))
}
