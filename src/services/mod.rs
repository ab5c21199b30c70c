// Account-linking, normalization and payment-task pipelines

pub mod account_details;
pub mod accounts;
pub mod aggregator;
pub mod linking;
pub mod normalizer;
pub mod payment_task;
pub mod persistence;
pub mod planning;
pub mod token;

pub use account_details::{fetch_account_details, AccountDetails};
pub use accounts::AccountService;
pub use aggregator::{Aggregator, AggregatorError, PlaidClient};
pub use linking::{LinkOutcome, LinkingService};
pub use normalizer::{normalize, NormalizedDetails};
pub use payment_task::{AccountSelection, PaymentPlanRequest, PaymentTaskService};
pub use persistence::{
    persist_account_details, persist_accounts, persist_transactions, PersistedDetails, Persistence,
};
pub use planning::{HttpPlanningClient, Planner, PlanningError};
pub use token::{ExchangedToken, LinkOperation, SavedToken, TokenService};
