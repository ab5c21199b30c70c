// Aggregator access token linked to a user's institution

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::sql::text_column;
use crate::schema::plaid_tokens;

/// What the user linked the institution for
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
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    Credit,
    Debit,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Purpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::Credit => "credit",
            Purpose::Debit => "debit",
            Purpose::Unknown => "unknown",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "credit" => Some(Purpose::Credit),
            "debit" => Some(Purpose::Debit),
            "unknown" => Some(Purpose::Unknown),
            _ => None,
        }
    }
}

text_column!(Purpose);

/// One row per (user, item). Re-linking rewrites `value`/`item_id` in place.
#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = plaid_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Token {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing)]
    pub value: String,
    pub item_id: String,
    pub institution: String,
    pub institution_id: String,
    pub purpose: Purpose,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = plaid_tokens)]
pub struct NewToken {
    pub user_id: Uuid,
    pub value: String,
    pub item_id: String,
    pub institution: String,
    pub institution_id: String,
    pub purpose: Purpose,
}

impl Token {
    /// Latest token stored for the user
    pub async fn find_by_user_id(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::plaid_tokens::dsl;

        dsl::plaid_tokens
            .filter(dsl::user_id.eq(user_id))
            .order(dsl::updated_at.desc())
            .select(Token::as_select())
            .first::<Self>(conn)
            .await
    }

    pub async fn find_by_user_and_item(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
        item_id: &str,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::plaid_tokens::dsl;

        dsl::plaid_tokens
            .filter(dsl::user_id.eq(user_id))
            .filter(dsl::item_id.eq(item_id))
            .select(Token::as_select())
            .first::<Self>(conn)
            .await
    }

    pub async fn update_credentials(
        conn: &mut AsyncPgConnection,
        id: Uuid,
        value: &str,
        item_id: &str,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::plaid_tokens::dsl;

        diesel::update(dsl::plaid_tokens.find(id))
            .set((
                dsl::value.eq(value),
                dsl::item_id.eq(item_id),
                dsl::updated_at.eq(Utc::now()),
            ))
            .returning(Token::as_returning())
            .get_result(conn)
            .await
    }
}

impl NewToken {
    pub async fn insert(self, conn: &mut AsyncPgConnection) -> Result<Token, diesel::result::Error> {
        diesel::insert_into(plaid_tokens::table)
            .values(&self)
            .returning(Token::as_returning())
            .get_result(conn)
            .await
    }
}
