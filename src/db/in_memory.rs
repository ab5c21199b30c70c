// In-memory persistence
// Same capability as `PgStore`, held in `Arc<RwLock<..>>` maps. Used by tests
// and by local runs without a database.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    Account, NewAccount, NewPaymentTask, NewToken, NewTransaction, PaymentTask, Token, Transaction,
};
use crate::services::persistence::Persistence;
use crate::utils::ServiceError;

#[derive(Default)]
struct Tables {
    tokens: HashMap<Uuid, Token>,
    accounts: HashMap<Uuid, Account>,
    transactions: Vec<Transaction>,
    payment_tasks: HashMap<Uuid, PaymentTask>,
}

#[derive(Default, Clone)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transactions in insertion order
    pub async fn transactions(&self) -> Vec<Transaction> {
        self.tables.read().await.transactions.clone()
    }

    pub async fn accounts(&self) -> Vec<Account> {
        self.tables.read().await.accounts.values().cloned().collect()
    }

    pub async fn tokens(&self) -> Vec<Token> {
        self.tables.read().await.tokens.values().cloned().collect()
    }

    pub async fn payment_task_count(&self) -> usize {
        self.tables.read().await.payment_tasks.len()
    }
}

#[async_trait]
impl Persistence for InMemoryStore {
    async fn find_user_token(&self, user_id: Uuid) -> Result<Token, ServiceError> {
        let tables = self.tables.read().await;
        tables
            .tokens
            .values()
            .filter(|token| token.user_id == user_id)
            .max_by_key(|token| token.updated_at)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("token for user {}", user_id)))
    }

    async fn find_item_token(&self, user_id: Uuid, item_id: &str) -> Result<Token, ServiceError> {
        self.tables
            .read()
            .await
            .tokens
            .values()
            .find(|token| token.user_id == user_id && token.item_id == item_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("token for item {}", item_id)))
    }

    async fn insert_token(&self, token: NewToken) -> Result<Token, ServiceError> {
        let mut tables = self.tables.write().await;
        let duplicate = tables
            .tokens
            .values()
            .any(|t| t.user_id == token.user_id && t.item_id == token.item_id);
        if duplicate {
            return Err(ServiceError::Conflict(format!(
                "token for user {} and item {} already exists",
                token.user_id, token.item_id
            )));
        }

        let now = Utc::now();
        let stored = Token {
            id: Uuid::new_v4(),
            user_id: token.user_id,
            value: token.value,
            item_id: token.item_id,
            institution: token.institution,
            institution_id: token.institution_id,
            purpose: token.purpose,
            created_at: now,
            updated_at: now,
        };
        tables.tokens.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_token(
        &self,
        id: Uuid,
        value: &str,
        item_id: &str,
    ) -> Result<Token, ServiceError> {
        let mut tables = self.tables.write().await;
        let token = tables
            .tokens
            .get_mut(&id)
            .ok_or_else(|| ServiceError::NotFound(format!("token {}", id)))?;

        token.value = value.to_string();
        token.item_id = item_id.to_string();
        token.updated_at = Utc::now();
        Ok(token.clone())
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account, ServiceError> {
        let account = account.into_account(Uuid::new_v4(), Utc::now());
        self.tables
            .write()
            .await
            .accounts
            .insert(account.id, account.clone());
        Ok(account)
    }

    async fn get_account(&self, id: Uuid) -> Result<Account, ServiceError> {
        self.tables
            .read()
            .await
            .accounts
            .get(&id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("account {}", id)))
    }

    async fn list_user_accounts(&self, user_id: Uuid) -> Result<Vec<Account>, ServiceError> {
        let mut accounts: Vec<Account> = self
            .tables
            .read()
            .await
            .accounts
            .values()
            .filter(|account| account.user_id == user_id)
            .cloned()
            .collect();
        accounts.sort_by_key(|account| account.created_at);
        Ok(accounts)
    }

    async fn list_user_transactions(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Transaction>, ServiceError> {
        let mut transactions: Vec<Transaction> = self
            .tables
            .read()
            .await
            .transactions
            .iter()
            .filter(|transaction| transaction.user_id == user_id)
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(transactions)
    }

    async fn create_transaction(
        &self,
        transaction: NewTransaction,
    ) -> Result<Transaction, ServiceError> {
        let mut tables = self.tables.write().await;
        if let Some(account_id) = transaction.account_id {
            if !tables.accounts.contains_key(&account_id) {
                return Err(ServiceError::UpstreamFailure(format!(
                    "account {} does not exist",
                    account_id
                )));
            }
        }

        let transaction = transaction.into_transaction(Uuid::new_v4(), Utc::now());
        tables.transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn create_payment_task(&self, task: NewPaymentTask) -> Result<PaymentTask, ServiceError> {
        let task = task.into_payment_task(Uuid::new_v4(), Utc::now());
        self.tables
            .write()
            .await
            .payment_tasks
            .insert(task.id, task.clone());
        Ok(task)
    }

    async fn create_many_payment_tasks(
        &self,
        tasks: Vec<NewPaymentTask>,
    ) -> Result<Vec<Uuid>, ServiceError> {
        let mut tables = self.tables.write().await;
        let created_at = Utc::now();
        let ids = tasks
            .into_iter()
            .map(|task| {
                let task = task.into_payment_task(Uuid::new_v4(), created_at);
                let id = task.id;
                tables.payment_tasks.insert(id, task);
                id
            })
            .collect();
        Ok(ids)
    }

    async fn get_payment_task(&self, id: Uuid) -> Result<PaymentTask, ServiceError> {
        self.tables
            .read()
            .await
            .payment_tasks
            .get(&id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("payment task {}", id)))
    }
}
