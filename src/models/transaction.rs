// Canonical transaction record for a linked account

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::sql::jsonb_column;
use crate::schema::transactions;

/// Location and payment metadata copied from the aggregator
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Serialize,
    Deserialize,
    diesel::AsExpression,
    diesel::FromSqlRow,
)]
#[diesel(sql_type = diesel::sql_types::Jsonb)]
#[serde(default)]
pub struct TransactionDetails {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub country: String,
    pub store_number: String,
    pub reference_number: String,
}

jsonb_column!(TransactionDetails);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = transactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Transaction {
    pub id: Uuid,
    pub plaid_transaction_id: String,
    /// `None` when the owning account was never stored
    pub account_id: Option<Uuid>,
    pub plaid_account_id: String,
    pub user_id: Uuid,
    pub transaction_type: String,
    pub pending_transaction_id: String,
    pub category_id: String,
    pub category: Vec<String>,
    pub details: TransactionDetails,
    pub name: String,
    pub original_description: String,
    pub amount: f64,
    pub iso_currency_code: String,
    pub date: String,
    pub pending: bool,
    pub merchant_name: String,
    pub payment_channel: String,
    pub authorized_date: String,
    pub primary_category: String,
    pub detailed_category: String,
    pub created_at: DateTime<Utc>,
}

/// Normalized transaction, still keyed by the aggregator account id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Insertable)]
#[diesel(table_name = transactions)]
pub struct NewTransaction {
    pub plaid_transaction_id: String,
    pub account_id: Option<Uuid>,
    pub plaid_account_id: String,
    pub user_id: Uuid,
    pub transaction_type: String,
    pub pending_transaction_id: String,
    pub category_id: String,
    pub category: Vec<String>,
    pub details: TransactionDetails,
    pub name: String,
    pub original_description: String,
    pub amount: f64,
    pub iso_currency_code: String,
    pub date: String,
    pub pending: bool,
    pub merchant_name: String,
    pub payment_channel: String,
    pub authorized_date: String,
    pub primary_category: String,
    pub detailed_category: String,
}

impl NewTransaction {
    pub async fn insert(
        self,
        conn: &mut AsyncPgConnection,
    ) -> Result<Transaction, diesel::result::Error> {
        diesel::insert_into(transactions::table)
            .values(&self)
            .returning(Transaction::as_returning())
            .get_result(conn)
            .await
    }

    pub fn into_transaction(self, id: Uuid, created_at: DateTime<Utc>) -> Transaction {
        Transaction {
            id,
            plaid_transaction_id: self.plaid_transaction_id,
            account_id: self.account_id,
            plaid_account_id: self.plaid_account_id,
            user_id: self.user_id,
            transaction_type: self.transaction_type,
            pending_transaction_id: self.pending_transaction_id,
            category_id: self.category_id,
            category: self.category,
            details: self.details,
            name: self.name,
            original_description: self.original_description,
            amount: self.amount,
            iso_currency_code: self.iso_currency_code,
            date: self.date,
            pending: self.pending,
            merchant_name: self.merchant_name,
            payment_channel: self.payment_channel,
            authorized_date: self.authorized_date,
            primary_category: self.primary_category,
            detailed_category: self.detailed_category,
            created_at,
        }
    }
}

impl Transaction {
    /// Newest first
    pub async fn list_by_user(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::transactions::dsl;

        dsl::transactions
            .filter(dsl::user_id.eq(user_id))
            .order((dsl::date.desc(), dsl::created_at.asc()))
            .select(Transaction::as_select())
            .load::<Self>(conn)
            .await
    }
}
