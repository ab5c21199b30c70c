// Centralized configuration for the account-linking service
// Every env var is read once at bootstrap; core services receive plain values.

use std::env;
use std::time::Duration;
use thiserror::Error;

use crate::db::DieselDatabaseConfig;
use crate::services::aggregator::{PlaidConfig, PlaidEnvironment};
use crate::services::planning::PlanningConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub plaid: PlaidSettings,
    pub planning: PlanningSettings,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub environment: Environment,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

impl From<String> for Environment {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: u64,
    pub idle_timeout: u64,
    pub max_lifetime: u64,
    pub disable_embedded_migrations: bool,
}

#[derive(Debug, Clone)]
pub struct PlaidSettings {
    pub client_id: String,
    pub secret: String,
    pub environment: PlaidEnvironment,
    pub products: Vec<String>,
    pub country_codes: Vec<String>,
    pub redirect_uri: Option<String>,
    pub client_name: String,
    pub language: String,
    pub timeout_seconds: u64,
    pub transactions_lookback_months: u32,
}

#[derive(Debug, Clone)]
pub struct PlanningSettings {
    pub url: String,
    pub timeout_seconds: u64,
}

/// Split a comma-separated list, dropping blanks
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let get_required = |key: &str| -> Result<String, ConfigError> {
            env::var(key).map_err(|_| ConfigError::MissingVar(key.to_string()))
        };

        let get_or_default = |key: &str, default: &str| -> String {
            env::var(key).unwrap_or_else(|_| default.to_string())
        };

        let parse_or_default = |key: &str, default: &str| -> Result<u32, ConfigError> {
            get_or_default(key, default).parse().map_err(|_| {
                ConfigError::InvalidValue(key.to_string(), "not a valid u32".to_string())
            })
        };

        let parse_u64_or_default = |key: &str, default: &str| -> Result<u64, ConfigError> {
            get_or_default(key, default).parse().map_err(|_| {
                ConfigError::InvalidValue(key.to_string(), "not a valid u64".to_string())
            })
        };

        let parse_bool_or_default = |key: &str, default: &str| -> bool {
            get_or_default(key, default).to_lowercase() == "true"
        };

        let server = ServerConfig {
            bind_address: get_or_default("BIND_ADDRESS", "0.0.0.0:8080"),
            environment: Environment::from(get_or_default("ENVIRONMENT", "development")),
        };

        let database = DatabaseConfig {
            url: get_required("DATABASE_URL")?,
            max_connections: parse_or_default("DATABASE_MAX_CONNECTIONS", "20")?,
            min_connections: parse_or_default("DATABASE_MIN_CONNECTIONS", "2")?,
            connect_timeout: parse_u64_or_default("DATABASE_CONNECT_TIMEOUT", "30")?,
            idle_timeout: parse_u64_or_default("DATABASE_IDLE_TIMEOUT", "600")?,
            max_lifetime: parse_u64_or_default("DATABASE_MAX_LIFETIME", "1800")?,
            disable_embedded_migrations: parse_bool_or_default(
                "DISABLE_EMBEDDED_MIGRATIONS",
                "false",
            ),
        };

        let products = parse_list(&get_or_default("PLAID_PRODUCTS", "liabilities,transactions"));
        if products.is_empty() {
            return Err(ConfigError::InvalidValue(
                "PLAID_PRODUCTS".to_string(),
                "at least one product is required".to_string(),
            ));
        }

        let redirect_uri = env::var("PLAID_REDIRECT_URI")
            .ok()
            .filter(|uri| !uri.trim().is_empty());
        if let Some(ref uri) = redirect_uri {
            url::Url::parse(uri).map_err(|e| {
                ConfigError::InvalidValue("PLAID_REDIRECT_URI".to_string(), e.to_string())
            })?;
        }

        let plaid = PlaidSettings {
            client_id: get_required("PLAID_CLIENT_ID")?,
            secret: get_required("PLAID_SECRET")?,
            environment: PlaidEnvironment::from(get_or_default("PLAID_ENV", "sandbox")),
            products,
            country_codes: parse_list(&get_or_default("PLAID_COUNTRY_CODES", "US")),
            redirect_uri,
            client_name: get_or_default("PLAID_CLIENT_NAME", "Account Link"),
            language: get_or_default("PLAID_LANGUAGE", "en"),
            timeout_seconds: parse_u64_or_default("PLAID_TIMEOUT_SECONDS", "30")?,
            transactions_lookback_months: parse_or_default("TRANSACTIONS_LOOKBACK_MONTHS", "12")?,
        };

        let planning_url = get_or_default("PLANNING_URL", "http://localhost:9000");
        url::Url::parse(&planning_url)
            .map_err(|e| ConfigError::InvalidValue("PLANNING_URL".to_string(), e.to_string()))?;

        let planning = PlanningSettings {
            url: planning_url,
            timeout_seconds: parse_u64_or_default("PLANNING_TIMEOUT_SECONDS", "30")?,
        };

        Ok(AppConfig {
            server,
            database,
            plaid,
            planning,
        })
    }

    pub fn is_production(&self) -> bool {
        self.server.environment == Environment::Production
    }

    pub fn diesel_database_config(&self) -> DieselDatabaseConfig {
        DieselDatabaseConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            min_connections: self.database.min_connections,
            connection_timeout: Duration::from_secs(self.database.connect_timeout),
            idle_timeout: Duration::from_secs(self.database.idle_timeout),
            max_lifetime: Duration::from_secs(self.database.max_lifetime),
            test_on_checkout: true,
        }
    }

    pub fn plaid_config(&self) -> PlaidConfig {
        PlaidConfig {
            client_id: self.plaid.client_id.clone(),
            secret: self.plaid.secret.clone(),
            base_url: self.plaid.environment.base_url().to_string(),
            client_name: self.plaid.client_name.clone(),
            language: self.plaid.language.clone(),
            products: self.plaid.products.clone(),
            country_codes: self.plaid.country_codes.clone(),
            redirect_uri: self.plaid.redirect_uri.clone(),
            timeout: Duration::from_secs(self.plaid.timeout_seconds),
        }
    }

    pub fn planning_config(&self) -> PlanningConfig {
        PlanningConfig {
            base_url: self.planning.url.clone(),
            timeout: Duration::from_secs(self.planning.timeout_seconds),
        }
    }
}
