//! # Recipe Box Common Library
//!
//! Shared code for the Recipe Box shopping-list tools:
//! - Shopping list model (ingredients, entries, summary rows)
//! - Ingredient aggregation across recipes
//! - Configuration loading
//! - Common error type

pub mod config;
pub mod error;
pub mod shopping_list;

pub use error::{Error, Result};
pub use shopping_list::{
    summarize, summarize_ingredients, table_view, Ingredient, IngredientSummaryRow, RecipeId,
    ShoppingListEntry,
};
