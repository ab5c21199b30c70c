mod sql;

pub mod account;
pub mod payment_plan;
pub mod payment_task;
pub mod token;
pub mod transaction;

// Re-export common types
pub use account::{Account, AnnualPercentageRate, AprList, NewAccount};
pub use payment_plan::{PaymentAction, PaymentActionStatus, PaymentPlan, PaymentStatus};
pub use payment_task::{NewPaymentTask, PaymentFrequency, PaymentTask, PlanPreferences, PlanType};
pub use token::{NewToken, Purpose, Token};
pub use transaction::{NewTransaction, Transaction, TransactionDetails};
