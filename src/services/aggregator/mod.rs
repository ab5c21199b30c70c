// Aggregator capability: the bank-data provider the core links accounts through

pub mod plaid;
pub mod types;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

pub use plaid::{PlaidClient, PlaidConfig, PlaidEnvironment};
pub use types::{
    AccountBase, Institution, LiabilitiesSnapshot, LinkTokenRequest, PublicTokenExchange,
    RawTransaction, TransactionsSnapshot,
};

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Debug, Error)]
pub enum AggregatorError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Aggregator API error {error_type}/{error_code}: {error_message}")]
    Api {
        error_type: String,
        error_code: String,
        error_message: String,
    },

    #[error("Decode error: {0}")]
    Decode(String),
}

// =============================================================================
// CAPABILITY
// =============================================================================

/// Calls into the external aggregator. Implementations are constructed once at
/// bootstrap and shared; none of them retry.
#[async_trait]
pub trait Aggregator: Send + Sync {
    async fn create_link_token(&self, request: LinkTokenRequest) -> Result<String, AggregatorError>;

    async fn exchange_public_token(
        &self,
        public_token: &str,
    ) -> Result<PublicTokenExchange, AggregatorError>;

    /// Institution behind the item the access token belongs to
    async fn get_institution(&self, access_token: &str) -> Result<Institution, AggregatorError>;

    async fn get_liabilities(
        &self,
        access_token: &str,
    ) -> Result<LiabilitiesSnapshot, AggregatorError>;

    async fn get_transactions(
        &self,
        access_token: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<TransactionsSnapshot, AggregatorError>;
}
