// Payment task orchestration
//
// Draft -> Persisted -> Rehydrated -> SubmittedForPlanning
//
// Selections become payment tasks, are written in one batch, read back one by
// one, and handed to the planner. Plans come back untouched. Tasks already
// written stay written if a later step fails.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::models::{NewPaymentTask, PaymentPlan, PaymentTask, PlanPreferences};
use crate::services::persistence::Persistence;
use crate::services::planning::Planner;
use crate::utils::{parse_id, parse_user_id, validate_amount, ServiceError};

/// One user-selected (account, amount) unit. The amount is trusted as given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSelection {
    pub account_id: String,
    #[serde(default)]
    pub transaction_ids: Vec<String>,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PaymentPlanRequest {
    pub user_id: String,
    #[validate(length(min = 1, message = "at least one account selection is required"))]
    pub account_info: Vec<AccountSelection>,
    #[serde(default)]
    pub meta_data: PlanPreferences,
    #[serde(default)]
    pub save_plan: bool,
}

pub struct PaymentTaskService {
    store: Arc<dyn Persistence>,
    planner: Arc<dyn Planner>,
}

impl PaymentTaskService {
    pub fn new(store: Arc<dyn Persistence>, planner: Arc<dyn Planner>) -> Self {
        Self { store, planner }
    }

    fn draft_tasks(
        user_id: Uuid,
        request: &PaymentPlanRequest,
    ) -> Result<Vec<NewPaymentTask>, ServiceError> {
        request
            .account_info
            .iter()
            .map(|selection| {
                Ok(NewPaymentTask {
                    user_id,
                    account_id: parse_id("account_id", &selection.account_id)?,
                    transaction_ids: selection.transaction_ids.clone(),
                    amount: validate_amount("amount", selection.amount)?,
                    preferences: request.meta_data.clone(),
                })
            })
            .collect()
    }

    #[instrument(skip(self, request), fields(user_id = %request.user_id, selections = request.account_info.len()))]
    pub async fn get_payment_plan(
        &self,
        request: PaymentPlanRequest,
    ) -> Result<Vec<PaymentPlan>, ServiceError> {
        request.validate()?;
        let user_id = parse_user_id(&request.user_id)?;

        let drafts = Self::draft_tasks(user_id, &request)?;

        let ids = self.store.create_many_payment_tasks(drafts).await?;

        let mut tasks: Vec<PaymentTask> = Vec::with_capacity(ids.len());
        for id in ids {
            tasks.push(self.store.get_payment_task(id).await?);
        }

        let plans = self
            .planner
            .create_payment_plan(tasks, request.meta_data, request.save_plan)
            .await?;

        info!("Received {} payment plans for user {}", plans.len(), user_id);
        Ok(plans)
    }

    #[instrument(skip(self))]
    pub async fn list_user_payment_plans(
        &self,
        user_id: &str,
    ) -> Result<Vec<PaymentPlan>, ServiceError> {
        let uid = parse_user_id(user_id)?;
        Ok(self.planner.list_user_payment_plans(uid).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(account_id: &str, amount: f64) -> AccountSelection {
        AccountSelection {
            account_id: account_id.to_string(),
            transaction_ids: vec![],
            amount,
        }
    }

    #[test]
    fn test_draft_tasks_carry_preferences() {
        let user_id = Uuid::new_v4();
        let account_id = Uuid::new_v4();
        let request = PaymentPlanRequest {
            user_id: user_id.to_string(),
            account_info: vec![selection(&account_id.to_string(), 325.0)],
            meta_data: PlanPreferences {
                preferred_timeline_in_months: 3.0,
                ..Default::default()
            },
            save_plan: false,
        };

        let drafts = PaymentTaskService::draft_tasks(user_id, &request).unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].account_id, account_id);
        assert_eq!(drafts[0].preferences.preferred_timeline_in_months, 3.0);
    }

    #[test]
    fn test_draft_tasks_reject_bad_account_id() {
        let request = PaymentPlanRequest {
            user_id: Uuid::new_v4().to_string(),
            account_info: vec![selection("not-a-uuid", 10.0)],
            meta_data: PlanPreferences::default(),
            save_plan: false,
        };

        let err = PaymentTaskService::draft_tasks(Uuid::new_v4(), &request).unwrap_err();
        assert!(matches!(err, ServiceError::ValidationFailure(_)));
    }

    #[test]
    fn test_empty_selection_fails_validation() {
        let request = PaymentPlanRequest {
            user_id: Uuid::new_v4().to_string(),
            account_info: vec![],
            meta_data: PlanPreferences::default(),
            save_plan: false,
        };
        assert!(request.validate().is_err());
    }
}
