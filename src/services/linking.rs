// Account linking pipeline
// exchange -> save token -> (new link) fetch -> normalize -> persist

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::models::{Purpose, Token};
use crate::services::account_details::fetch_account_details;
use crate::services::aggregator::Aggregator;
use crate::services::normalizer::normalize;
use crate::services::persistence::{persist_account_details, Persistence};
use crate::services::token::{LinkOperation, TokenService};
use crate::utils::{parse_user_id, ServiceError};

#[derive(Debug, Clone, Serialize)]
pub struct LinkOutcome {
    pub token: Token,
    pub created: bool,
    pub accounts_linked: usize,
    pub transactions_linked: usize,
}

pub struct LinkingService {
    tokens: Arc<TokenService>,
    aggregator: Arc<dyn Aggregator>,
    store: Arc<dyn Persistence>,
    lookback_months: u32,
}

impl LinkingService {
    pub fn new(
        tokens: Arc<TokenService>,
        aggregator: Arc<dyn Aggregator>,
        store: Arc<dyn Persistence>,
        lookback_months: u32,
    ) -> Self {
        Self {
            tokens,
            aggregator,
            store,
            lookback_months,
        }
    }

    /// A refresh of an existing link only rewrites the token; account details
    /// are fetched and written for new links.
    #[instrument(skip(self, public_token))]
    pub async fn link_account(
        &self,
        user_id: &str,
        public_token: &str,
        purpose: Purpose,
        operation: LinkOperation,
    ) -> Result<LinkOutcome, ServiceError> {
        let uid = parse_user_id(user_id)?;

        let exchanged = self.tokens.exchange_public_token(public_token).await?;
        let saved = self
            .tokens
            .save_token(uid, &exchanged, purpose, operation)
            .await?;

        if !saved.is_created() {
            return Ok(LinkOutcome {
                created: false,
                token: saved.token().clone(),
                accounts_linked: 0,
                transactions_linked: 0,
            });
        }

        let today = Utc::now().date_naive();
        let details = fetch_account_details(
            self.aggregator.as_ref(),
            &exchanged.access_token,
            today,
            self.lookback_months,
        )
        .await?;
        let normalized = normalize(details, uid)?;
        let persisted = persist_account_details(self.store.as_ref(), normalized).await?;

        info!(
            "Linked item {} for user {}: {} accounts, {} transactions",
            exchanged.item_id,
            uid,
            persisted.accounts.len(),
            persisted.transactions.len()
        );

        Ok(LinkOutcome {
            created: true,
            token: saved.token().clone(),
            accounts_linked: persisted.accounts.len(),
            transactions_linked: persisted.transactions.len(),
        })
    }
}
