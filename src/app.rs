// Application state shared across handlers
use std::sync::Arc;

use crate::{
    db::DieselPool,
    services::{
        accounts::AccountService, aggregator::Aggregator, linking::LinkingService,
        payment_task::PaymentTaskService, persistence::Persistence, planning::Planner,
        token::TokenService,
    },
};

/// Capabilities are built once at bootstrap and handed in; nothing here is global.
#[derive(Clone)]
pub struct AppState {
    /// `None` when running over a non-Postgres store
    pub diesel_pool: Option<DieselPool>,
    pub token_service: Arc<TokenService>,
    pub linking_service: Arc<LinkingService>,
    pub payment_task_service: Arc<PaymentTaskService>,
    pub account_service: Arc<AccountService>,
}

impl AppState {
    pub fn new(
        aggregator: Arc<dyn Aggregator>,
        store: Arc<dyn Persistence>,
        planner: Arc<dyn Planner>,
        products: Vec<String>,
        lookback_months: u32,
        diesel_pool: Option<DieselPool>,
    ) -> Self {
        let token_service = Arc::new(TokenService::new(
            aggregator.clone(),
            store.clone(),
            products,
        ));
        let linking_service = Arc::new(LinkingService::new(
            token_service.clone(),
            aggregator,
            store.clone(),
            lookback_months,
        ));
        let account_service = Arc::new(AccountService::new(store.clone()));
        let payment_task_service = Arc::new(PaymentTaskService::new(store, planner));

        Self {
            diesel_pool,
            token_service,
            linking_service,
            payment_task_service,
            account_service,
        }
    }
}
