// Postgres-backed persistence over the diesel-async pool

use async_trait::async_trait;
use uuid::Uuid;

use super::diesel_pool::DieselPool;
use crate::models::{
    Account, NewAccount, NewPaymentTask, NewToken, NewTransaction, PaymentTask, Token, Transaction,
};
use crate::services::persistence::{partial_write, Persistence};
use crate::utils::{ServiceError, WriteStage};

#[derive(Clone)]
pub struct PgStore {
    pool: DieselPool,
}

impl PgStore {
    pub fn new(pool: DieselPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DieselPool {
        &self.pool
    }
}

fn not_found(what: &str, id: Uuid) -> impl FnOnce(diesel::result::Error) -> ServiceError + '_ {
    move |e| match e {
        diesel::result::Error::NotFound => ServiceError::NotFound(format!("{} {}", what, id)),
        other => other.into(),
    }
}

#[async_trait]
impl Persistence for PgStore {
    async fn find_user_token(&self, user_id: Uuid) -> Result<Token, ServiceError> {
        let mut conn = self.pool.get().await?;
        Token::find_by_user_id(&mut conn, user_id)
            .await
            .map_err(not_found("token for user", user_id))
    }

    async fn find_item_token(&self, user_id: Uuid, item_id: &str) -> Result<Token, ServiceError> {
        let mut conn = self.pool.get().await?;
        Token::find_by_user_and_item(&mut conn, user_id, item_id)
            .await
            .map_err(not_found("token for user", user_id))
    }

    async fn insert_token(&self, token: NewToken) -> Result<Token, ServiceError> {
        let mut conn = self.pool.get().await?;
        Ok(token.insert(&mut conn).await?)
    }

    async fn update_token(
        &self,
        id: Uuid,
        value: &str,
        item_id: &str,
    ) -> Result<Token, ServiceError> {
        let mut conn = self.pool.get().await?;
        Token::update_credentials(&mut conn, id, value, item_id)
            .await
            .map_err(not_found("token", id))
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account, ServiceError> {
        let mut conn = self.pool.get().await?;
        Ok(account.insert(&mut conn).await?)
    }

    async fn get_account(&self, id: Uuid) -> Result<Account, ServiceError> {
        let mut conn = self.pool.get().await?;
        Account::find(&mut conn, id).await.map_err(not_found("account", id))
    }

    async fn list_user_accounts(&self, user_id: Uuid) -> Result<Vec<Account>, ServiceError> {
        let mut conn = self.pool.get().await?;
        Ok(Account::list_by_user(&mut conn, user_id).await?)
    }

    async fn list_user_transactions(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Transaction>, ServiceError> {
        let mut conn = self.pool.get().await?;
        Ok(Transaction::list_by_user(&mut conn, user_id).await?)
    }

    async fn create_transaction(
        &self,
        transaction: NewTransaction,
    ) -> Result<Transaction, ServiceError> {
        let mut conn = self.pool.get().await?;
        Ok(transaction.insert(&mut conn).await?)
    }

    async fn create_payment_task(&self, task: NewPaymentTask) -> Result<PaymentTask, ServiceError> {
        let mut conn = self.pool.get().await?;
        Ok(task.insert(&mut conn).await?)
    }

    async fn create_many_payment_tasks(
        &self,
        tasks: Vec<NewPaymentTask>,
    ) -> Result<Vec<Uuid>, ServiceError> {
        if tasks.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await?;
        NewPaymentTask::insert_many(&tasks, &mut conn)
            .await
            .map_err(|e| partial_write(WriteStage::PaymentTasks, 0, e.into()))
    }

    async fn get_payment_task(&self, id: Uuid) -> Result<PaymentTask, ServiceError> {
        let mut conn = self.pool.get().await?;
        PaymentTask::find(&mut conn, id)
            .await
            .map_err(not_found("payment task", id))
    }
}

