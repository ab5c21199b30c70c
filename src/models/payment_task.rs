// Payment task: one user-selected (account, amount) unit submitted for planning

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::sql::text_column;
use crate::schema::payment_tasks;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    diesel::AsExpression,
    diesel::FromSqlRow,
)]
#[diesel(sql_type = diesel::sql_types::Text)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    #[default]
    Unknown,
    MinFees,
    OptimCreditScore,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Unknown => "unknown",
            PlanType::MinFees => "min_fees",
            PlanType::OptimCreditScore => "optim_credit_score",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "unknown" => Some(PlanType::Unknown),
            "min_fees" => Some(PlanType::MinFees),
            "optim_credit_score" => Some(PlanType::OptimCreditScore),
            _ => None,
        }
    }
}

text_column!(PlanType);

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    diesel::AsExpression,
    diesel::FromSqlRow,
)]
#[diesel(sql_type = diesel::sql_types::Text)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    #[default]
    Unknown,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
}

impl PaymentFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentFrequency::Unknown => "unknown",
            PaymentFrequency::Weekly => "weekly",
            PaymentFrequency::Biweekly => "biweekly",
            PaymentFrequency::Monthly => "monthly",
            PaymentFrequency::Quarterly => "quarterly",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "unknown" => Some(PaymentFrequency::Unknown),
            "weekly" => Some(PaymentFrequency::Weekly),
            "biweekly" => Some(PaymentFrequency::Biweekly),
            "monthly" => Some(PaymentFrequency::Monthly),
            "quarterly" => Some(PaymentFrequency::Quarterly),
            _ => None,
        }
    }
}

text_column!(PaymentFrequency);

/// User preferences forwarded to planning and stored alongside each task
#[derive(
    Debug, Clone, Default, PartialEq, Serialize, Deserialize, Queryable, Selectable, Insertable,
)]
#[diesel(table_name = payment_tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(default)]
pub struct PlanPreferences {
    pub preferred_plan_type: PlanType,
    pub preferred_timeline_in_months: f64,
    pub preferred_payment_freq: PaymentFrequency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = payment_tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PaymentTask {
    pub id: Uuid,
    pub user_id: Uuid,
    pub account_id: Uuid,
    pub transaction_ids: Vec<String>,
    pub amount: f64,
    #[diesel(embed)]
    pub preferences: PlanPreferences,
    pub created_at: DateTime<Utc>,
}

/// Draft task synthesized from a user selection, before storage assigns an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Insertable)]
#[diesel(table_name = payment_tasks)]
pub struct NewPaymentTask {
    pub user_id: Uuid,
    pub account_id: Uuid,
    pub transaction_ids: Vec<String>,
    pub amount: f64,
    #[diesel(embed)]
    pub preferences: PlanPreferences,
}

impl NewPaymentTask {
    pub async fn insert(
        self,
        conn: &mut AsyncPgConnection,
    ) -> Result<PaymentTask, diesel::result::Error> {
        diesel::insert_into(payment_tasks::table)
            .values(&self)
            .returning(PaymentTask::as_returning())
            .get_result(conn)
            .await
    }

    /// Single multi-row INSERT; ids come back in input order
    pub async fn insert_many(
        tasks: &[NewPaymentTask],
        conn: &mut AsyncPgConnection,
    ) -> Result<Vec<Uuid>, diesel::result::Error> {
        diesel::insert_into(payment_tasks::table)
            .values(tasks)
            .returning(payment_tasks::id)
            .get_results(conn)
            .await
    }

    pub fn into_payment_task(self, id: Uuid, created_at: DateTime<Utc>) -> PaymentTask {
        PaymentTask {
            id,
            user_id: self.user_id,
            account_id: self.account_id,
            transaction_ids: self.transaction_ids,
            amount: self.amount,
            preferences: self.preferences,
            created_at,
        }
    }
}

impl PaymentTask {
    pub async fn find(conn: &mut AsyncPgConnection, id: Uuid) -> Result<Self, diesel::result::Error> {
        use crate::schema::payment_tasks::dsl;

        dsl::payment_tasks
            .find(id)
            .select(PaymentTask::as_select())
            .first::<Self>(conn)
            .await
    }
}
