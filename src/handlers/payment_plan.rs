// Payment plan endpoints

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{
    app::AppState, services::payment_task::PaymentPlanRequest, utils::service_error::ServiceError,
};

/// POST /v1/payment-plans
pub async fn create_payment_plans(
    State(state): State<AppState>,
    Json(request): Json<PaymentPlanRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let plans = state.payment_task_service.get_payment_plan(request).await?;
    Ok(Json(json!({ "payment_plans": plans })))
}

/// GET /v1/users/{user_id}/payment-plans
pub async fn list_user_payment_plans(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let plans = state
        .payment_task_service
        .list_user_payment_plans(&user_id)
        .await?;
    Ok(Json(json!({ "payment_plans": plans })))
}
