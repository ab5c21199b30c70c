// Raw aggregator wire shapes (Plaid JSON).
// Nullable upstream fields stay `Option` here; the normalizer decides defaults.

use serde::{Deserialize, Serialize};

// =============================================================================
// LIABILITIES
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Apr {
    #[serde(default)]
    pub apr_percentage: f64,
    #[serde(default)]
    pub apr_type: String,
    pub balance_subject_to_apr: Option<f64>,
    pub interest_charge_amount: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreditCardLiability {
    pub account_id: Option<String>,
    #[serde(default)]
    pub aprs: Vec<Apr>,
    pub is_overdue: Option<bool>,
    pub last_payment_amount: Option<f64>,
    pub last_payment_date: Option<String>,
    pub last_statement_issue_date: Option<String>,
    pub last_statement_balance: Option<f64>,
    pub minimum_payment_amount: Option<f64>,
    pub next_payment_due_date: Option<String>,
}

/// Credit liabilities for one item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiabilitiesSnapshot {
    #[serde(default)]
    pub credit: Vec<CreditCardLiability>,
}

// =============================================================================
// ACCOUNTS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountBalances {
    pub available: Option<f64>,
    pub current: Option<f64>,
    pub limit: Option<f64>,
    pub iso_currency_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountBase {
    pub account_id: String,
    #[serde(default)]
    pub balances: AccountBalances,
    #[serde(default)]
    pub name: String,
    pub official_name: Option<String>,
    #[serde(rename = "type")]
    pub account_type: String,
    pub subtype: Option<String>,
}

impl AccountBase {
    pub fn is_credit(&self) -> bool {
        self.account_type == "credit"
    }
}

// =============================================================================
// TRANSACTIONS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub store_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentMeta {
    pub reference_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalFinanceCategory {
    pub primary: String,
    pub detailed: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub transaction_id: String,
    pub account_id: String,
    pub amount: f64,
    pub iso_currency_code: Option<String>,
    pub date: String,
    pub authorized_date: Option<String>,
    #[serde(default)]
    pub name: String,
    pub merchant_name: Option<String>,
    pub original_description: Option<String>,
    #[serde(default)]
    pub pending: bool,
    pub pending_transaction_id: Option<String>,
    pub category: Option<Vec<String>>,
    pub category_id: Option<String>,
    pub transaction_type: Option<String>,
    #[serde(default)]
    pub payment_channel: String,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub payment_meta: PaymentMeta,
    pub personal_finance_category: Option<PersonalFinanceCategory>,
}

/// Accounts and transactions returned for a date window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionsSnapshot {
    #[serde(default)]
    pub accounts: Vec<AccountBase>,
    #[serde(default)]
    pub transactions: Vec<RawTransaction>,
}

// =============================================================================
// LINK / ITEM
// =============================================================================

/// Link-token request. `products` and `access_token` are mutually exclusive:
/// create mode declares products, update mode attaches the stored access token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkTokenRequest {
    pub client_user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl LinkTokenRequest {
    pub fn create(client_user_id: String, products: Vec<String>) -> Self {
        Self {
            client_user_id,
            products: Some(products),
            access_token: None,
        }
    }

    pub fn update(client_user_id: String, access_token: String) -> Self {
        Self {
            client_user_id,
            products: None,
            access_token: Some(access_token),
        }
    }

    pub fn is_update_mode(&self) -> bool {
        self.access_token.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PublicTokenExchange {
    pub access_token: String,
    pub item_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Institution {
    pub institution_id: String,
    pub name: String,
}
