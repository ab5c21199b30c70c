// Planning capability
// Plan computation lives in an external service; this module only calls it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::models::{PaymentPlan, PaymentTask, PlanPreferences};

#[derive(Debug, Error)]
pub enum PlanningError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Planning service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(String),
}

#[async_trait]
pub trait Planner: Send + Sync {
    async fn create_payment_plan(
        &self,
        tasks: Vec<PaymentTask>,
        preferences: PlanPreferences,
        save_plan: bool,
    ) -> Result<Vec<PaymentPlan>, PlanningError>;

    async fn list_user_payment_plans(&self, user_id: Uuid)
        -> Result<Vec<PaymentPlan>, PlanningError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

#[derive(Debug, Clone)]
pub struct PlanningConfig {
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Serialize)]
struct CreatePaymentPlanBody<'a> {
    payment_tasks: &'a [PaymentTask],
    meta_data: &'a PlanPreferences,
    save_plan: bool,
}

#[derive(Debug, Deserialize)]
struct PaymentPlansResponse {
    #[serde(default)]
    payment_plans: Vec<PaymentPlan>,
}

pub struct HttpPlanningClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpPlanningClient {
    pub fn new(config: PlanningConfig) -> Result<Self, PlanningError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent("account-link-core/1.0")
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    async fn decode_plans(response: reqwest::Response) -> Result<Vec<PaymentPlan>, PlanningError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Planning service returned {}", status);
            return Err(PlanningError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let decoded: PaymentPlansResponse =
            serde_json::from_slice(&bytes).map_err(|e| PlanningError::Decode(e.to_string()))?;
        Ok(decoded.payment_plans)
    }
}

#[async_trait]
impl Planner for HttpPlanningClient {
    #[instrument(skip(self, tasks, preferences), fields(tasks = tasks.len()))]
    async fn create_payment_plan(
        &self,
        tasks: Vec<PaymentTask>,
        preferences: PlanPreferences,
        save_plan: bool,
    ) -> Result<Vec<PaymentPlan>, PlanningError> {
        let body = CreatePaymentPlanBody {
            payment_tasks: &tasks,
            meta_data: &preferences,
            save_plan,
        };

        let response = self
            .http_client
            .post(format!("{}/payment-plans", self.base_url))
            .json(&body)
            .send()
            .await?;

        let plans = Self::decode_plans(response).await?;
        info!("Planning service returned {} plans", plans.len());
        Ok(plans)
    }

    #[instrument(skip(self))]
    async fn list_user_payment_plans(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<PaymentPlan>, PlanningError> {
        let response = self
            .http_client
            .get(format!("{}/users/{}/payment-plans", self.base_url, user_id))
            .send()
            .await?;

        Self::decode_plans(response).await
    }
}
