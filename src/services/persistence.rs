// Persistence capability and the gateway that writes normalized account details

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::models::{
    Account, NewAccount, NewPaymentTask, NewToken, NewTransaction, PaymentTask, Token, Transaction,
};
use crate::services::normalizer::NormalizedDetails;
use crate::utils::{ServiceError, WriteStage};

// =============================================================================
// CAPABILITY
// =============================================================================

/// Storage the core writes through. Misses come back as `ServiceError::NotFound`.
#[async_trait]
pub trait Persistence: Send + Sync {
    async fn find_user_token(&self, user_id: Uuid) -> Result<Token, ServiceError>;

    /// Token already stored for this (user, item) pair
    async fn find_item_token(&self, user_id: Uuid, item_id: &str) -> Result<Token, ServiceError>;

    /// Fails with `Conflict` when the (user, item) pair is already stored
    async fn insert_token(&self, token: NewToken) -> Result<Token, ServiceError>;

    async fn update_token(
        &self,
        id: Uuid,
        value: &str,
        item_id: &str,
    ) -> Result<Token, ServiceError>;

    async fn create_account(&self, account: NewAccount) -> Result<Account, ServiceError>;

    async fn get_account(&self, id: Uuid) -> Result<Account, ServiceError>;

    async fn list_user_accounts(&self, user_id: Uuid) -> Result<Vec<Account>, ServiceError>;

    /// Newest transaction date first
    async fn list_user_transactions(&self, user_id: Uuid)
        -> Result<Vec<Transaction>, ServiceError>;

    async fn create_transaction(
        &self,
        transaction: NewTransaction,
    ) -> Result<Transaction, ServiceError>;

    async fn create_payment_task(&self, task: NewPaymentTask) -> Result<PaymentTask, ServiceError>;

    /// Single batch insert; returns ids in input order
    /// Single-statement batch insert. A failed insert is reported as
    /// `PartialWriteFailure` with nothing written; failing to reach the
    /// store at all stays an `UpstreamFailure`.
    async fn create_many_payment_tasks(
        &self,
        tasks: Vec<NewPaymentTask>,
    ) -> Result<Vec<Uuid>, ServiceError>;

    async fn get_payment_task(&self, id: Uuid) -> Result<PaymentTask, ServiceError>;
}

// =============================================================================
// GATEWAY
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedDetails {
    pub accounts: Vec<Account>,
    pub transactions: Vec<Transaction>,
}

pub(crate) fn partial_write(stage: WriteStage, written: usize, err: ServiceError) -> ServiceError {
    error!("Write of {} aborted after {} rows: {}", stage, written, err);
    ServiceError::PartialWriteFailure {
        stage,
        written,
        reason: err.to_string(),
    }
}

/// External account id -> internal account id, scoped to one linking run
pub fn account_id_map(accounts: &[Account]) -> HashMap<String, Uuid> {
    accounts
        .iter()
        .map(|account| (account.plaid_account_id.clone(), account.id))
        .collect()
}

/// Write accounts one at a time. The first failure stops the batch.
pub async fn persist_accounts(
    store: &dyn Persistence,
    accounts: Vec<NewAccount>,
) -> Result<Vec<Account>, ServiceError> {
    let mut created = Vec::with_capacity(accounts.len());
    for account in accounts {
        match store.create_account(account).await {
            Ok(account) => created.push(account),
            Err(e) => return Err(partial_write(WriteStage::Accounts, created.len(), e)),
        }
    }
    Ok(created)
}

/// Write transactions with their account reference resolved through `account_ids`.
/// A transaction whose external account id is unmapped is written with no reference.
pub async fn persist_transactions(
    store: &dyn Persistence,
    transactions: Vec<NewTransaction>,
    account_ids: &HashMap<String, Uuid>,
) -> Result<Vec<Transaction>, ServiceError> {
    let mut created = Vec::with_capacity(transactions.len());
    for mut transaction in transactions {
        transaction.account_id = account_ids.get(&transaction.plaid_account_id).copied();

        match store.create_transaction(transaction).await {
            Ok(transaction) => created.push(transaction),
            Err(e) => return Err(partial_write(WriteStage::Transactions, created.len(), e)),
        }
    }
    Ok(created)
}

/// Accounts first, then transactions. Nothing is rolled back on failure.
#[instrument(skip_all, fields(accounts = details.accounts.len(), transactions = details.transactions.len()))]
pub async fn persist_account_details(
    store: &dyn Persistence,
    details: NormalizedDetails,
) -> Result<PersistedDetails, ServiceError> {
    let accounts = persist_accounts(store, details.accounts).await?;
    let account_ids = account_id_map(&accounts);

    let transactions = persist_transactions(store, details.transactions, &account_ids).await?;

    let unresolved = transactions.iter().filter(|t| t.account_id.is_none()).count();
    info!(
        "Persisted {} accounts and {} transactions ({} without an account reference)",
        accounts.len(),
        transactions.len(),
        unresolved
    );

    Ok(PersistedDetails {
        accounts,
        transactions,
    })
}
