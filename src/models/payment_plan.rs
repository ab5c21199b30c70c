// Payment plans are produced and owned by the planning service.
// This crate only forwards them, so these types are wire shapes with no table.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::payment_task::{PaymentFrequency, PlanType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Current,
    Completed,
    Cancelled,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentActionStatus {
    Pending,
    Completed,
    Failed,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A single scheduled transfer toward one account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentAction {
    pub account_id: Uuid,
    pub amount: f64,
    /// `YYYY-MM-DD`
    pub transaction_date: String,
    #[serde(default)]
    pub status: PaymentActionStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentPlan {
    #[serde(default)]
    pub payment_plan_id: String,
    pub user_id: Uuid,
    pub payment_task_ids: Vec<Uuid>,
    pub timeline: f64,
    pub payment_freq: PaymentFrequency,
    pub amount_per_payment: f64,
    pub plan_type: PlanType,
    pub end_date: String,
    pub active: bool,
    #[serde(default)]
    pub status: PaymentStatus,
    #[serde(default)]
    pub payment_actions: Vec<PaymentAction>,
}

impl PaymentPlan {
    pub fn total_scheduled(&self) -> f64 {
        self.payment_actions.iter().map(|action| action.amount).sum()
    }
}
