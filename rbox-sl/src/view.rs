//! Shopping list view state
//!
//! Owns the fetch lifecycle (loading, ready, failed) and hands the fetched
//! entries to the aggregator. Both the combined summary and the per-recipe
//! table are derived from one snapshot.

use rbox_common::{summarize, table_view, IngredientSummaryRow, RecipeId, ShoppingListEntry};
use serde::Serialize;

use crate::api::{ApiClient, ApiError, ServingsUpdate};

/// Lifecycle of an asynchronous fetch
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> FetchState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            FetchState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }
}

/// Entries plus their combined summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShoppingListSnapshot {
    pub entries: Vec<ShoppingListEntry>,
    pub summary: Vec<IngredientSummaryRow>,
}

impl ShoppingListSnapshot {
    pub fn from_entries(entries: Vec<ShoppingListEntry>) -> Self {
        let summary = summarize(&entries);
        Self { entries, summary }
    }

    /// Per-recipe rows, unaggregated
    pub fn table(&self) -> &[ShoppingListEntry] {
        table_view(&self.entries)
    }
}

/// Fetch-then-aggregate driver for one user's shopping list
pub struct ShoppingListView {
    client: ApiClient,
    state: FetchState<ShoppingListSnapshot>,
}

impl ShoppingListView {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: FetchState::Loading,
        }
    }

    pub fn state(&self) -> &FetchState<ShoppingListSnapshot> {
        &self.state
    }

    /// Re-fetch the list and rebuild the summary.
    ///
    /// On failure the state becomes `Failed` and the error is returned too.
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        self.state = FetchState::Loading;

        match self.client.fetch_shopping_list().await {
            Ok(entries) => {
                self.state = FetchState::Ready(ShoppingListSnapshot::from_entries(entries));
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Shopping list fetch failed: {}", e);
                self.state = FetchState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Change a recipe's serving count, then refresh
    pub async fn update_servings(
        &mut self,
        recipe_id: RecipeId,
        servings: u32,
    ) -> Result<ServingsUpdate, ApiError> {
        let update = self.client.set_servings(recipe_id, servings).await?;
        self.refresh().await?;
        Ok(update)
    }
}
