//! Shopping-list API client
//!
//! Talks to the recipe backend over HTTP with a bearer token taken from a
//! [`TokenStore`]. Only the two shopping-list endpoints are covered:
//! listing entries and setting a recipe's serving count (0 removes it).

use std::collections::HashSet;
use std::sync::Arc;

use rbox_common::config::ClientSettings;
use rbox_common::{RecipeId, ShoppingListEntry};
use reqwest::{RequestBuilder, Response, StatusCode};
use thiserror::Error;

use super::types::{ServingsRequest, ServingsResponse, ShoppingListPage};
use crate::session::TokenStore;

const USER_AGENT: &str = concat!("rbox-sl/", env!("CARGO_PKG_VERSION"));
const SHOPPING_LIST_PATH: &str = "/recipes/shopping-list/";

/// Shopping-list client errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not logged in: no bearer token stored")]
    NotAuthenticated,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// Response decoded but failed validation, or local storage failed
    #[error(transparent)]
    Common(#[from] rbox_common::Error),
}

/// Outcome of [`ApiClient::set_servings`]
#[derive(Debug, Clone, PartialEq)]
pub enum ServingsUpdate {
    /// Entry created or changed
    Updated(ShoppingListEntry),
    /// Servings were 0 and the entry is gone
    Removed,
}

impl ServingsUpdate {
    /// Whether the recipe no longer contributes to the list.
    ///
    /// Posting 0 servings for a recipe that is not on the list makes the
    /// backend create a 0-serving entry instead of answering with a removal
    /// message; that entry adds nothing, so it counts as removed.
    pub fn is_removal(&self) -> bool {
        match self {
            ServingsUpdate::Removed => true,
            ServingsUpdate::Updated(entry) => entry.servings == 0,
        }
    }
}

/// Authenticated client for the shopping-list endpoints
#[derive(Clone)]
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(settings: &ClientSettings, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch every entry on the current user's shopping list.
    ///
    /// Follows `next` links when the backend paginates. A `next` link that
    /// points back at a page already fetched is a [`ApiError::Parse`] error.
    pub async fn fetch_shopping_list(&self) -> Result<Vec<ShoppingListEntry>, ApiError> {
        let token = self.require_token()?;
        let mut url = format!("{}{}", self.base_url, SHOPPING_LIST_PATH);
        let mut visited = HashSet::new();
        let mut entries = Vec::new();

        loop {
            tracing::debug!(url = %url, "Fetching shopping list");
            visited.insert(url.clone());

            let response = self
                .send(self.http_client.get(&url).bearer_auth(&token), "shopping list")
                .await?;

            let page: ShoppingListPage = response
                .json()
                .await
                .map_err(|e| ApiError::Parse(e.to_string()))?;

            let (items, next) = page.into_parts();
            for item in items {
                entries.push(item.into_entry(&self.base_url)?);
            }

            match next {
                Some(next_url) if visited.contains(&next_url) => {
                    tracing::warn!(url = %next_url, "Shopping list pagination loops");
                    return Err(ApiError::Parse(format!(
                        "pagination loops back to {}",
                        next_url
                    )));
                }
                Some(next_url) => url = next_url,
                None => break,
            }
        }

        tracing::info!(entries = entries.len(), "Retrieved shopping list");
        Ok(entries)
    }

    /// Add a recipe to the list, change its serving count, or remove it
    /// with `servings = 0`
    pub async fn set_servings(
        &self,
        recipe_id: RecipeId,
        servings: u32,
    ) -> Result<ServingsUpdate, ApiError> {
        let token = self.require_token()?;
        let url = format!("{}/recipes/{}/add-to-shopping-list/", self.base_url, recipe_id);

        tracing::debug!(recipe_id, servings, url = %url, "Setting servings");

        let request = self
            .http_client
            .post(&url)
            .bearer_auth(&token)
            .json(&ServingsRequest {
                num_servings: servings,
            });
        let response = self.send(request, &format!("recipe {}", recipe_id)).await?;

        let body: ServingsResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        let update = match body {
            ServingsResponse::Item(item) => {
                ServingsUpdate::Updated(item.into_entry(&self.base_url)?)
            }
            ServingsResponse::Message { .. } => ServingsUpdate::Removed,
        };

        match &update {
            ServingsUpdate::Updated(entry) => tracing::info!(
                recipe_id,
                servings = entry.servings,
                "Updated shopping list entry"
            ),
            ServingsUpdate::Removed => {
                tracing::info!(recipe_id, "Removed recipe from shopping list")
            }
        }

        Ok(update)
    }

    /// Remove a recipe from the list
    pub async fn remove_recipe(&self, recipe_id: RecipeId) -> Result<ServingsUpdate, ApiError> {
        self.set_servings(recipe_id, 0).await
    }

    fn require_token(&self) -> Result<String, ApiError> {
        self.tokens.token().ok_or(ApiError::NotAuthenticated)
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), body = %error_text, "Request for {} failed", what);

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized(error_text),
            StatusCode::NOT_FOUND => ApiError::NotFound(what.to_string()),
            StatusCode::BAD_REQUEST => ApiError::Rejected(error_text),
            _ => ApiError::Api(status.as_u16(), error_text),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryTokenStore;
    use std::time::Duration;

    fn settings(base: &str) -> ClientSettings {
        ClientSettings {
            api_base_url: base.to_string(),
            token_file: "/tmp/unused-token".into(),
            request_timeout: Duration::from_secs(5),
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_client_creation_trims_base_url() {
        let client = ApiClient::new(
            &settings("http://localhost:8000/"),
            Arc::new(MemoryTokenStore::default()),
        )
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[tokio::test]
    async fn test_missing_token_fails_without_request() {
        // Port 9 (discard) is never contacted because the token check comes first
        let client = ApiClient::new(
            &settings("http://127.0.0.1:9"),
            Arc::new(MemoryTokenStore::default()),
        )
        .unwrap();

        assert!(matches!(
            client.fetch_shopping_list().await,
            Err(ApiError::NotAuthenticated)
        ));
        assert!(matches!(
            client.set_servings(1, 2).await,
            Err(ApiError::NotAuthenticated)
        ));
    }
}
