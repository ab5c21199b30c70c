// Token lifecycle
// Link-token creation (create vs update mode), public-token exchange, and
// storing the resulting access token.

use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::models::{NewToken, Purpose, Token};
use crate::services::aggregator::{Aggregator, LinkTokenRequest};
use crate::services::persistence::Persistence;
use crate::utils::{parse_user_id, trim_and_validate_field, ServiceError};

/// How the caller triggered the link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOperation {
    /// First-time link; always inserts a token row
    Create,
    /// Re-link; updates the stored token when one exists
    Refresh,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExchangedToken {
    pub access_token: String,
    pub item_id: String,
    pub institution_name: String,
    pub institution_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SavedToken {
    Created(Token),
    Updated(Token),
}

impl SavedToken {
    pub fn token(&self) -> &Token {
        match self {
            SavedToken::Created(token) | SavedToken::Updated(token) => token,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, SavedToken::Created(_))
    }
}

pub struct TokenService {
    aggregator: Arc<dyn Aggregator>,
    store: Arc<dyn Persistence>,
    products: Vec<String>,
}

impl TokenService {
    pub fn new(
        aggregator: Arc<dyn Aggregator>,
        store: Arc<dyn Persistence>,
        products: Vec<String>,
    ) -> Self {
        Self {
            aggregator,
            store,
            products,
        }
    }

    /// Stored token for the user, or `None` on a miss
    async fn existing_token(&self, user_id: Uuid) -> Result<Option<Token>, ServiceError> {
        match self.store.find_user_token(user_id).await {
            Ok(token) => Ok(Some(token)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Update mode when the user already holds an access token, create mode otherwise
    #[instrument(skip(self))]
    pub async fn create_link_token(&self, user_id: &str) -> Result<String, ServiceError> {
        let uid = parse_user_id(user_id)?;

        let request = match self.existing_token(uid).await? {
            Some(token) => LinkTokenRequest::update(uid.to_string(), token.value),
            None => LinkTokenRequest::create(uid.to_string(), self.products.clone()),
        };

        info!(
            "Requesting {} link token for user {}",
            if request.is_update_mode() { "update-mode" } else { "create-mode" },
            uid
        );
        Ok(self.aggregator.create_link_token(request).await?)
    }

    /// Exchange plus institution lookup. Nothing is stored.
    #[instrument(skip_all)]
    pub async fn exchange_public_token(
        &self,
        public_token: &str,
    ) -> Result<ExchangedToken, ServiceError> {
        let public_token = trim_and_validate_field("public_token", public_token)?;

        let exchange = self.aggregator.exchange_public_token(&public_token).await?;
        let institution = self.aggregator.get_institution(&exchange.access_token).await?;

        Ok(ExchangedToken {
            access_token: exchange.access_token,
            item_id: exchange.item_id,
            institution_name: institution.name,
            institution_id: institution.institution_id,
        })
    }

    async fn item_token(&self, user_id: Uuid, item_id: &str) -> Result<Option<Token>, ServiceError> {
        match self.store.find_item_token(user_id, item_id).await {
            Ok(token) => Ok(Some(token)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// A token already stored for the exchanged item is always rewritten in
    /// place. Otherwise a refresh rewrites the user's latest token and a
    /// create (or a user with no token) inserts.
    #[instrument(skip(self, exchanged), fields(item_id = %exchanged.item_id))]
    pub async fn save_token(
        &self,
        user_id: Uuid,
        exchanged: &ExchangedToken,
        purpose: Purpose,
        operation: LinkOperation,
    ) -> Result<SavedToken, ServiceError> {
        let target = match self.item_token(user_id, &exchanged.item_id).await? {
            Some(token) => Some(token),
            None if operation == LinkOperation::Refresh => self.existing_token(user_id).await?,
            None => None,
        };

        if let Some(token) = target {
            let updated = self
                .store
                .update_token(token.id, &exchanged.access_token, &exchanged.item_id)
                .await?;
            info!("Updated token {} for user {}", updated.id, user_id);
            return Ok(SavedToken::Updated(updated));
        }

        let created = self
            .store
            .insert_token(NewToken {
                user_id,
                value: exchanged.access_token.clone(),
                item_id: exchanged.item_id.clone(),
                institution: exchanged.institution_name.clone(),
                institution_id: exchanged.institution_id.clone(),
                purpose,
            })
            .await?;
        info!("Stored new token {} for user {}", created.id, user_id);
        Ok(SavedToken::Created(created))
    }
}
