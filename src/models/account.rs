// Canonical credit account built from an aggregator account joined to its liability

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::sql::jsonb_column;
use crate::schema::accounts;

/// One APR bucket from a credit liability statement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnualPercentageRate {
    pub apr_percentage: f64,
    pub apr_type: String,
    pub balance_subject_to_apr: f64,
    pub interest_charge_amount: f64,
}

/// APR list persisted as a single JSONB document
#[derive(
    Debug, Clone, Default, PartialEq, Serialize, Deserialize, diesel::AsExpression, diesel::FromSqlRow,
)]
#[diesel(sql_type = diesel::sql_types::Jsonb)]
#[serde(transparent)]
pub struct AprList(pub Vec<AnnualPercentageRate>);

jsonb_column!(AprList);

impl AprList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AnnualPercentageRate> {
        self.0.iter()
    }
}

impl From<Vec<AnnualPercentageRate>> for AprList {
    fn from(aprs: Vec<AnnualPercentageRate>) -> Self {
        AprList(aprs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Account {
    pub id: Uuid,
    pub plaid_account_id: String,
    pub user_id: Uuid,
    pub name: String,
    pub official_name: String,
    pub account_type: String,
    pub subtype: String,
    pub available_balance: f64,
    pub current_balance: f64,
    pub credit_limit: f64,
    pub iso_currency_code: String,
    pub aprs: AprList,
    pub is_overdue: bool,
    pub last_payment_amount: f64,
    pub last_payment_date: String,
    pub last_statement_issue_date: String,
    pub last_statement_balance: f64,
    pub minimum_payment_amount: f64,
    pub next_payment_due_date: String,
    pub created_at: DateTime<Utc>,
}

/// Normalized account that has not been assigned an internal id yet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Insertable)]
#[diesel(table_name = accounts)]
pub struct NewAccount {
    pub plaid_account_id: String,
    pub user_id: Uuid,
    pub name: String,
    pub official_name: String,
    pub account_type: String,
    pub subtype: String,
    pub available_balance: f64,
    pub current_balance: f64,
    pub credit_limit: f64,
    pub iso_currency_code: String,
    pub aprs: AprList,
    pub is_overdue: bool,
    pub last_payment_amount: f64,
    pub last_payment_date: String,
    pub last_statement_issue_date: String,
    pub last_statement_balance: f64,
    pub minimum_payment_amount: f64,
    pub next_payment_due_date: String,
}

impl NewAccount {
    pub async fn insert(self, conn: &mut AsyncPgConnection) -> Result<Account, diesel::result::Error> {
        diesel::insert_into(accounts::table)
            .values(&self)
            .returning(Account::as_returning())
            .get_result(conn)
            .await
    }

    /// Attach an internal id without touching storage
    pub fn into_account(self, id: Uuid, created_at: DateTime<Utc>) -> Account {
        Account {
            id,
            plaid_account_id: self.plaid_account_id,
            user_id: self.user_id,
            name: self.name,
            official_name: self.official_name,
            account_type: self.account_type,
            subtype: self.subtype,
            available_balance: self.available_balance,
            current_balance: self.current_balance,
            credit_limit: self.credit_limit,
            iso_currency_code: self.iso_currency_code,
            aprs: self.aprs,
            is_overdue: self.is_overdue,
            last_payment_amount: self.last_payment_amount,
            last_payment_date: self.last_payment_date,
            last_statement_issue_date: self.last_statement_issue_date,
            last_statement_balance: self.last_statement_balance,
            minimum_payment_amount: self.minimum_payment_amount,
            next_payment_due_date: self.next_payment_due_date,
            created_at,
        }
    }
}

impl Account {
    pub async fn find(conn: &mut AsyncPgConnection, id: Uuid) -> Result<Self, diesel::result::Error> {
        use crate::schema::accounts::dsl;

        dsl::accounts
            .find(id)
            .select(Account::as_select())
            .first::<Self>(conn)
            .await
    }

    /// Sum of interest charged across all APR buckets
    pub async fn list_by_user(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::accounts::dsl;

        dsl::accounts
            .filter(dsl::user_id.eq(user_id))
            .order(dsl::created_at.asc())
            .select(Account::as_select())
            .load::<Self>(conn)
            .await
    }

    pub fn total_interest_charged(&self) -> f64 {
        self.aprs.iter().map(|apr| apr.interest_charge_amount).sum()
    }
}
