// Read side of the linking pipeline: what a user has linked so far

use std::sync::Arc;
use tracing::{debug, instrument};

use crate::models::{Account, Transaction};
use crate::services::persistence::Persistence;
use crate::utils::{parse_user_id, ServiceError};

pub struct AccountService {
    store: Arc<dyn Persistence>,
}

impl AccountService {
    pub fn new(store: Arc<dyn Persistence>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn list_user_accounts(&self, user_id: &str) -> Result<Vec<Account>, ServiceError> {
        let uid = parse_user_id(user_id)?;
        let accounts = self.store.list_user_accounts(uid).await?;
        debug!("Found {} accounts for user {}", accounts.len(), uid);
        Ok(accounts)
    }

    /// Includes transactions whose account was never stored (`account_id` empty)
    #[instrument(skip(self))]
    pub async fn list_user_transactions(
        &self,
        user_id: &str,
    ) -> Result<Vec<Transaction>, ServiceError> {
        let uid = parse_user_id(user_id)?;
        let transactions = self.store.list_user_transactions(uid).await?;
        debug!("Found {} transactions for user {}", transactions.len(), uid);
        Ok(transactions)
    }
}
