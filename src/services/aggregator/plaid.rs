// Plaid HTTP client
// Thin reqwest wrapper over the Plaid REST endpoints the linking pipeline needs

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::types::{
    AccountBase, CreditCardLiability, Institution, LiabilitiesSnapshot, LinkTokenRequest,
    PublicTokenExchange, RawTransaction, TransactionsSnapshot,
};
use super::{Aggregator, AggregatorError};

/// Page size for /transactions/get (Plaid maximum)
const TRANSACTIONS_PAGE_SIZE: usize = 500;

const ISO8601_DATE: &str = "%Y-%m-%d";

// =============================================================================
// CONFIGURATION
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum PlaidEnvironment {
    Sandbox,
    Development,
    Production,
}

impl PlaidEnvironment {
    pub fn base_url(&self) -> &'static str {
        match self {
            PlaidEnvironment::Sandbox => "https://sandbox.plaid.com",
            PlaidEnvironment::Development => "https://development.plaid.com",
            PlaidEnvironment::Production => "https://production.plaid.com",
        }
    }
}

impl From<String> for PlaidEnvironment {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => PlaidEnvironment::Production,
            "development" | "dev" => PlaidEnvironment::Development,
            _ => PlaidEnvironment::Sandbox,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlaidConfig {
    pub client_id: String,
    pub secret: String,
    pub base_url: String,
    pub client_name: String,
    pub language: String,
    pub products: Vec<String>,
    pub country_codes: Vec<String>,
    pub redirect_uri: Option<String>,
    pub timeout: Duration,
}

// =============================================================================
// REQUEST / RESPONSE BODIES
// =============================================================================

#[derive(Debug, Serialize)]
struct LinkTokenUser<'a> {
    client_user_id: &'a str,
}

#[derive(Debug, Serialize)]
struct LinkTokenCreateBody<'a> {
    client_name: &'a str,
    language: &'a str,
    country_codes: &'a [String],
    user: LinkTokenUser<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    products: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect_uri: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct LinkTokenCreateResponse {
    link_token: String,
}

#[derive(Debug, Serialize)]
struct PublicTokenBody<'a> {
    public_token: &'a str,
}

#[derive(Debug, Serialize)]
struct AccessTokenBody<'a> {
    access_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct ItemGetResponse {
    item: Item,
}

#[derive(Debug, Deserialize)]
struct Item {
    institution_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct InstitutionByIdBody<'a> {
    institution_id: &'a str,
    country_codes: &'a [String],
}

#[derive(Debug, Deserialize)]
struct InstitutionByIdResponse {
    institution: Institution,
}

#[derive(Debug, Deserialize)]
struct LiabilitiesGetResponse {
    liabilities: LiabilitiesObject,
}

#[derive(Debug, Deserialize)]
struct LiabilitiesObject {
    credit: Option<Vec<CreditCardLiability>>,
}

#[derive(Debug, Serialize)]
struct TransactionsOptions {
    count: usize,
    offset: usize,
}

#[derive(Debug, Serialize)]
struct TransactionsGetBody<'a> {
    access_token: &'a str,
    start_date: String,
    end_date: String,
    options: TransactionsOptions,
}

#[derive(Debug, Deserialize)]
struct TransactionsGetResponse {
    #[serde(default)]
    accounts: Vec<AccountBase>,
    #[serde(default)]
    transactions: Vec<RawTransaction>,
    total_transactions: usize,
}

#[derive(Debug, Deserialize)]
struct PlaidErrorBody {
    error_type: String,
    error_code: String,
    error_message: String,
}

// =============================================================================
// PLAID CLIENT
// =============================================================================

pub struct PlaidClient {
    config: PlaidConfig,
    http_client: reqwest::Client,
}

impl PlaidClient {
    pub fn new(config: PlaidConfig) -> Result<Self, AggregatorError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent("account-link-core/1.0")
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn link_token_body<'a>(&'a self, request: &'a LinkTokenRequest) -> LinkTokenCreateBody<'a> {
        LinkTokenCreateBody {
            client_name: &self.config.client_name,
            language: &self.config.language,
            country_codes: &self.config.country_codes,
            user: LinkTokenUser {
                client_user_id: &request.client_user_id,
            },
            products: request.products.as_deref(),
            access_token: request.access_token.as_deref(),
            redirect_uri: self.config.redirect_uri.as_deref(),
        }
    }

    /// POST a JSON body and decode either the success payload or Plaid's error body
    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, AggregatorError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.config.base_url, path);
        let response = self
            .http_client
            .post(&url)
            .header("PLAID-CLIENT-ID", &self.config.client_id)
            .header("PLAID-SECRET", &self.config.secret)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(error_from_body(path, status, &bytes));
        }

        serde_json::from_slice(&bytes)
            .map_err(|e| AggregatorError::Decode(format!("{}: {}", path, e)))
    }
}

const ERROR_BODY_LIMIT: usize = 512;

/// Plaid error JSON when the body parses as one, otherwise the raw body text
fn error_from_body(path: &str, status: reqwest::StatusCode, bytes: &[u8]) -> AggregatorError {
    match serde_json::from_slice::<PlaidErrorBody>(bytes) {
        Ok(err) => {
            warn!(
                "Plaid {} failed: {} {} ({})",
                path, err.error_type, err.error_code, status
            );
            AggregatorError::Api {
                error_type: err.error_type,
                error_code: err.error_code,
                error_message: err.error_message,
            }
        },
        Err(_) => {
            let text = String::from_utf8_lossy(bytes);
            let body: String = text.chars().take(ERROR_BODY_LIMIT).collect();
            warn!("Plaid {} failed with {} and a non-Plaid body", path, status);
            AggregatorError::Decode(format!("HTTP {} from {}: {}", status, path, body.trim()))
        },
    }
}

#[async_trait]
impl Aggregator for PlaidClient {
    #[instrument(skip(self, request), fields(update_mode = request.is_update_mode()))]
    async fn create_link_token(&self, request: LinkTokenRequest) -> Result<String, AggregatorError> {
        let body = self.link_token_body(&request);
        let response: LinkTokenCreateResponse = self.post("/link/token/create", &body).await?;

        info!("Link token created for user {}", request.client_user_id);
        Ok(response.link_token)
    }

    #[instrument(skip_all)]
    async fn exchange_public_token(
        &self,
        public_token: &str,
    ) -> Result<PublicTokenExchange, AggregatorError> {
        let exchange: PublicTokenExchange = self
            .post("/item/public_token/exchange", &PublicTokenBody { public_token })
            .await?;

        info!("Public token exchanged for item {}", exchange.item_id);
        Ok(exchange)
    }

    #[instrument(skip_all)]
    async fn get_institution(&self, access_token: &str) -> Result<Institution, AggregatorError> {
        let item: ItemGetResponse = self
            .post("/item/get", &AccessTokenBody { access_token })
            .await?;

        let Some(institution_id) = item.item.institution_id else {
            return Err(AggregatorError::Decode(
                "item has no institution_id".to_string(),
            ));
        };

        let response: InstitutionByIdResponse = self
            .post(
                "/institutions/get_by_id",
                &InstitutionByIdBody {
                    institution_id: &institution_id,
                    country_codes: &self.config.country_codes,
                },
            )
            .await?;

        Ok(response.institution)
    }

    #[instrument(skip_all)]
    async fn get_liabilities(
        &self,
        access_token: &str,
    ) -> Result<LiabilitiesSnapshot, AggregatorError> {
        let response: LiabilitiesGetResponse = self
            .post("/liabilities/get", &AccessTokenBody { access_token })
            .await?;

        let credit = response.liabilities.credit.unwrap_or_default();
        debug!("Fetched {} credit liabilities", credit.len());
        Ok(LiabilitiesSnapshot { credit })
    }

    #[instrument(skip(self, access_token))]
    async fn get_transactions(
        &self,
        access_token: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<TransactionsSnapshot, AggregatorError> {
        let mut snapshot = TransactionsSnapshot::default();

        loop {
            let body = TransactionsGetBody {
                access_token,
                start_date: start_date.format(ISO8601_DATE).to_string(),
                end_date: end_date.format(ISO8601_DATE).to_string(),
                options: TransactionsOptions {
                    count: TRANSACTIONS_PAGE_SIZE,
                    offset: snapshot.transactions.len(),
                },
            };
            let page: TransactionsGetResponse = self.post("/transactions/get", &body).await?;

            if snapshot.accounts.is_empty() {
                snapshot.accounts = page.accounts;
            }
            let page_len = page.transactions.len();
            snapshot.transactions.extend(page.transactions);

            if page_len == 0 || snapshot.transactions.len() >= page.total_transactions {
                break;
            }
        }

        debug!(
            "Fetched {} accounts and {} transactions",
            snapshot.accounts.len(),
            snapshot.transactions.len()
        );
        Ok(snapshot)
    }
}
