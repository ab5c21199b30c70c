use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{app::AppState, utils::service_error::ServiceError};

pub async fn list_user_accounts(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let accounts = state.account_service.list_user_accounts(&user_id).await?;
    Ok(Json(json!({ "accounts": accounts })))
}

pub async fn list_user_transactions(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let transactions = state
        .account_service
        .list_user_transactions(&user_id)
        .await?;
    Ok(Json(json!({ "transactions": transactions })))
}
