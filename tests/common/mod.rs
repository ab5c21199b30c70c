// Common test utilities: capability fakes and an in-process router
// Shared across all test files to avoid duplication

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
    Router,
};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;
use uuid::Uuid;

use account_link_core::{
    app::AppState,
    db::InMemoryStore,
    models::{
        Account, NewAccount, NewPaymentTask, NewToken, NewTransaction, PaymentAction,
        PaymentActionStatus, PaymentPlan, PaymentStatus, PaymentTask, PlanPreferences, Token,
        Transaction,
    },
    router,
    services::{
        aggregator::{
            types::{Apr, CreditCardLiability},
            AccountBase, Aggregator, AggregatorError, Institution, LiabilitiesSnapshot,
            LinkTokenRequest, PublicTokenExchange, RawTransaction, TransactionsSnapshot,
        },
        persistence::Persistence,
        planning::{Planner, PlanningError},
    },
    utils::{ServiceError, WriteStage},
};

pub const PRODUCTS: &[&str] = &["liabilities", "transactions"];

pub fn products() -> Vec<String> {
    PRODUCTS.iter().map(|s| s.to_string()).collect()
}

// =============================================================================
// FIXTURES
// =============================================================================

pub fn account(id: &str, account_type: &str) -> AccountBase {
    AccountBase {
        account_id: id.to_string(),
        name: format!("Account {}", id),
        account_type: account_type.to_string(),
        ..Default::default()
    }
}

pub fn liability(account_id: &str) -> CreditCardLiability {
    CreditCardLiability {
        account_id: Some(account_id.to_string()),
        aprs: vec![Apr {
            apr_percentage: 22.99,
            apr_type: "purchase_apr".to_string(),
            balance_subject_to_apr: Some(900.0),
            interest_charge_amount: Some(17.25),
        }],
        is_overdue: Some(false),
        minimum_payment_amount: Some(35.0),
        ..Default::default()
    }
}

pub fn transaction(id: &str, account_id: &str, amount: f64) -> RawTransaction {
    RawTransaction {
        transaction_id: id.to_string(),
        account_id: account_id.to_string(),
        amount,
        date: "2024-03-01".to_string(),
        name: format!("Purchase {}", id),
        ..Default::default()
    }
}

// =============================================================================
// FAKE AGGREGATOR
// =============================================================================

/// Serves canned snapshots and records every call it receives
pub struct FakeAggregator {
    pub exchange: PublicTokenExchange,
    pub institution: Institution,
    pub liabilities: LiabilitiesSnapshot,
    pub transactions: TransactionsSnapshot,
    pub fail_liabilities: bool,
    pub link_requests: Mutex<Vec<LinkTokenRequest>>,
    pub windows: Mutex<Vec<(NaiveDate, NaiveDate)>>,
    pub detail_fetches: AtomicUsize,
}

impl Default for FakeAggregator {
    fn default() -> Self {
        Self {
            exchange: PublicTokenExchange {
                access_token: "access-sandbox-1".to_string(),
                item_id: "item-1".to_string(),
            },
            institution: Institution {
                institution_id: "ins_3".to_string(),
                name: "Chase".to_string(),
            },
            liabilities: LiabilitiesSnapshot::default(),
            transactions: TransactionsSnapshot::default(),
            fail_liabilities: false,
            link_requests: Mutex::new(Vec::new()),
            windows: Mutex::new(Vec::new()),
            detail_fetches: AtomicUsize::new(0),
        }
    }
}

impl FakeAggregator {
    /// Two credit accounts (c1 with a liability, c2 without) plus a depository account
    pub fn with_credit_activity() -> Self {
        Self {
            liabilities: LiabilitiesSnapshot {
                credit: vec![liability("c1")],
            },
            transactions: TransactionsSnapshot {
                accounts: vec![
                    account("c1", "credit"),
                    account("c2", "credit"),
                    account("d1", "depository"),
                ],
                transactions: vec![
                    transaction("t1", "c1", 42.5),
                    transaction("t2", "c2", 10.0),
                    transaction("t3", "d1", 99.0),
                ],
            },
            ..Default::default()
        }
    }

    pub fn link_requests(&self) -> Vec<LinkTokenRequest> {
        self.link_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Aggregator for FakeAggregator {
    async fn create_link_token(&self, request: LinkTokenRequest) -> Result<String, AggregatorError> {
        self.link_requests.lock().unwrap().push(request);
        Ok("link-sandbox-token".to_string())
    }

    async fn exchange_public_token(
        &self,
        public_token: &str,
    ) -> Result<PublicTokenExchange, AggregatorError> {
        if public_token == "expired" {
            return Err(AggregatorError::Api {
                error_type: "INVALID_INPUT".to_string(),
                error_code: "INVALID_PUBLIC_TOKEN".to_string(),
                error_message: "provided public token is expired".to_string(),
            });
        }
        Ok(self.exchange.clone())
    }

    async fn get_institution(&self, _access_token: &str) -> Result<Institution, AggregatorError> {
        Ok(self.institution.clone())
    }

    async fn get_liabilities(
        &self,
        _access_token: &str,
    ) -> Result<LiabilitiesSnapshot, AggregatorError> {
        self.detail_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_liabilities {
            return Err(AggregatorError::Decode("connection reset".to_string()));
        }
        Ok(self.liabilities.clone())
    }

    async fn get_transactions(
        &self,
        _access_token: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<TransactionsSnapshot, AggregatorError> {
        self.windows.lock().unwrap().push((start_date, end_date));
        Ok(self.transactions.clone())
    }
}

// =============================================================================
// FAKE PLANNER
// =============================================================================

/// Spreads the selected total evenly over the preferred timeline, one action
/// per task per month.
#[derive(Default)]
pub struct FakePlanner {
    pub received: Mutex<Vec<(Vec<PaymentTask>, bool)>>,
    pub saved: Mutex<Vec<PaymentPlan>>,
    pub fail: bool,
}

impl FakePlanner {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn received(&self) -> Vec<(Vec<PaymentTask>, bool)> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl Planner for FakePlanner {
    async fn create_payment_plan(
        &self,
        tasks: Vec<PaymentTask>,
        preferences: PlanPreferences,
        save_plan: bool,
    ) -> Result<Vec<PaymentPlan>, PlanningError> {
        self.received
            .lock()
            .unwrap()
            .push((tasks.clone(), save_plan));
        if self.fail {
            return Err(PlanningError::Status {
                status: 503,
                body: "planner unavailable".to_string(),
            });
        }

        let timeline = preferences.preferred_timeline_in_months;
        let total: f64 = tasks.iter().map(|t| t.amount).sum();
        let months = timeline.ceil() as usize;

        let mut payment_actions = Vec::new();
        for month in 0..months {
            for task in &tasks {
                payment_actions.push(PaymentAction {
                    account_id: task.account_id,
                    amount: task.amount / timeline,
                    transaction_date: format!("2024-{:02}-01", month + 1),
                    status: PaymentActionStatus::Pending,
                });
            }
        }

        let plan = PaymentPlan {
            payment_plan_id: format!("plan-{}", Uuid::new_v4().simple()),
            user_id: tasks.first().map(|t| t.user_id).unwrap_or_default(),
            payment_task_ids: tasks.iter().map(|t| t.id).collect(),
            timeline,
            payment_freq: preferences.preferred_payment_freq,
            amount_per_payment: total / timeline,
            plan_type: preferences.preferred_plan_type,
            end_date: format!("2024-{:02}-01", months),
            active: true,
            status: PaymentStatus::Current,
            payment_actions,
        };

        if save_plan {
            self.saved.lock().unwrap().push(plan.clone());
        }
        Ok(vec![plan])
    }

    async fn list_user_payment_plans(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<PaymentPlan>, PlanningError> {
        Ok(self
            .saved
            .lock()
            .unwrap()
            .iter()
            .filter(|plan| plan.user_id == user_id)
            .cloned()
            .collect())
    }
}

// =============================================================================
// FAILING STORE
// =============================================================================

/// `InMemoryStore` that starts failing a given write kind after N successes
#[derive(Clone, Default)]
pub struct FailingStore {
    pub inner: InMemoryStore,
    pub accounts_before_failure: Option<usize>,
    pub transactions_before_failure: Option<usize>,
    pub fail_task_batch: bool,
    pub task_store_unreachable: bool,
    pub fail_task_reads: bool,
    pub account_writes: Arc<AtomicUsize>,
    pub transaction_writes: Arc<AtomicUsize>,
}

impl FailingStore {
    pub fn new(inner: InMemoryStore) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }
}

fn injected() -> ServiceError {
    ServiceError::UpstreamFailure("injected write failure".to_string())
}

#[async_trait]
impl Persistence for FailingStore {
    async fn find_user_token(&self, user_id: Uuid) -> Result<Token, ServiceError> {
        self.inner.find_user_token(user_id).await
    }

    async fn find_item_token(&self, user_id: Uuid, item_id: &str) -> Result<Token, ServiceError> {
        self.inner.find_item_token(user_id, item_id).await
    }

    async fn insert_token(&self, token: NewToken) -> Result<Token, ServiceError> {
        self.inner.insert_token(token).await
    }

    async fn update_token(
        &self,
        id: Uuid,
        value: &str,
        item_id: &str,
    ) -> Result<Token, ServiceError> {
        self.inner.update_token(id, value, item_id).await
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account, ServiceError> {
        let attempt = self.account_writes.fetch_add(1, Ordering::SeqCst);
        if matches!(self.accounts_before_failure, Some(limit) if attempt >= limit) {
            return Err(injected());
        }
        self.inner.create_account(account).await
    }

    async fn get_account(&self, id: Uuid) -> Result<Account, ServiceError> {
        self.inner.get_account(id).await
    }

    async fn list_user_accounts(&self, user_id: Uuid) -> Result<Vec<Account>, ServiceError> {
        self.inner.list_user_accounts(user_id).await
    }

    async fn list_user_transactions(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Transaction>, ServiceError> {
        self.inner.list_user_transactions(user_id).await
    }

    async fn create_transaction(
        &self,
        transaction: NewTransaction,
    ) -> Result<Transaction, ServiceError> {
        let attempt = self.transaction_writes.fetch_add(1, Ordering::SeqCst);
        if matches!(self.transactions_before_failure, Some(limit) if attempt >= limit) {
            return Err(injected());
        }
        self.inner.create_transaction(transaction).await
    }

    async fn create_payment_task(&self, task: NewPaymentTask) -> Result<PaymentTask, ServiceError> {
        self.inner.create_payment_task(task).await
    }

    async fn create_many_payment_tasks(
        &self,
        tasks: Vec<NewPaymentTask>,
    ) -> Result<Vec<Uuid>, ServiceError> {
        if self.task_store_unreachable {
            return Err(ServiceError::UpstreamFailure(
                "Database pool error: timed out waiting for connection".to_string(),
            ));
        }
        if self.fail_task_batch {
            return Err(ServiceError::PartialWriteFailure {
                stage: WriteStage::PaymentTasks,
                written: 0,
                reason: "injected batch insert failure".to_string(),
            });
        }
        self.inner.create_many_payment_tasks(tasks).await
    }

    async fn get_payment_task(&self, id: Uuid) -> Result<PaymentTask, ServiceError> {
        if self.fail_task_reads {
            return Err(ServiceError::UpstreamFailure("read timed out".to_string()));
        }
        self.inner.get_payment_task(id).await
    }
}

/// Seed a stored token for `user_id` so the user is in update mode
pub async fn seed_token(store: &dyn Persistence, user_id: Uuid, value: &str) -> Token {
    seed_item_token(store, user_id, "item-0", value).await
}

pub async fn seed_item_token(
    store: &dyn Persistence,
    user_id: Uuid,
    item_id: &str,
    value: &str,
) -> Token {
    store
        .insert_token(NewToken {
            user_id,
            value: value.to_string(),
            item_id: item_id.to_string(),
            institution: "Chase".to_string(),
            institution_id: "ins_3".to_string(),
            purpose: Default::default(),
        })
        .await
        .unwrap()
}

// =============================================================================
// HTTP HARNESS
// =============================================================================

pub struct TestApp {
    pub app: Router,
    pub store: InMemoryStore,
    pub aggregator: Arc<FakeAggregator>,
    pub planner: Arc<FakePlanner>,
}

impl TestApp {
    pub fn post(&self, uri: &str) -> TestRequest {
        TestRequest::new(self, "POST", uri)
    }

    pub fn put(&self, uri: &str) -> TestRequest {
        TestRequest::new(self, "PUT", uri)
    }

    pub fn get(&self, uri: &str) -> TestRequest {
        TestRequest::new(self, "GET", uri)
    }
}

pub struct TestRequest<'a> {
    app: &'a TestApp,
    request: Request<Body>,
}

impl<'a> TestRequest<'a> {
    fn new(app: &'a TestApp, method: &str, uri: &str) -> Self {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();

        Self { app, request }
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Self {
        let body_bytes = serde_json::to_vec(body).unwrap();
        self.request = Request::builder()
            .method(self.request.method().clone())
            .uri(self.request.uri().clone())
            .header("content-type", "application/json")
            .body(Body::from(body_bytes))
            .unwrap();
        self
    }

    pub async fn send(self) -> TestResponse {
        let response = self.app.app.clone().oneshot(self.request).await.unwrap();
        TestResponse { response }
    }
}

pub struct TestResponse {
    response: Response<Body>,
}

impl TestResponse {
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub async fn json<T: serde::de::DeserializeOwned>(self) -> T {
        let body = axum::body::to_bytes(self.response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }
}

/// Router over fakes and an in-memory store; no database or network
pub fn setup_test_app(aggregator: FakeAggregator) -> TestApp {
    let store = InMemoryStore::new();
    let aggregator = Arc::new(aggregator);
    let planner = Arc::new(FakePlanner::default());

    let state = AppState::new(
        aggregator.clone(),
        Arc::new(store.clone()),
        planner.clone(),
        products(),
        12,
        None,
    );

    TestApp {
        app: router(state),
        store,
        aggregator,
        planner,
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
