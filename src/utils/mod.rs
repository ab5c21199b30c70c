// Utility modules for the account-linking core

pub mod service_error;
pub mod validation;

pub use service_error::{ServiceError, WriteStage};
pub use validation::{parse_id, parse_user_id, trim_and_validate_field, validate_amount};
