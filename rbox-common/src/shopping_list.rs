//! Shopping list model and ingredient aggregation
//!
//! The backend returns one entry per recipe the user has added to their
//! shopping list. Each entry carries the recipe's authored ingredients and a
//! second copy already scaled to the chosen serving count. Nothing in this
//! module rescales quantities: [`summarize`] only adds up what the backend
//! computed.
//!
//! # Grouping
//!
//! Ingredients merge when their lowercased `(name, units)` pair matches.
//! Units are compared literally after lowercasing, so "g" and "gram" stay
//! separate rows. The first-seen spelling of a group is what gets displayed.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Separates name and units inside a grouping key. [`Ingredient::validate`]
/// rejects fields containing it.
const KEY_SEPARATOR: char = '\u{0}';

/// Backend identifier of a recipe
pub type RecipeId = u64;

/// One ingredient line of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Free-text ingredient name as the author typed it
    pub name: String,
    /// Unit label ("g", "cup", "" for countable items)
    pub units: String,
    /// Amount in `units`, never negative
    pub quantity: f64,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, units: impl Into<String>, quantity: f64) -> Self {
        Self {
            name: name.into(),
            units: units.into(),
            quantity,
        }
    }

    /// Reject quantities that cannot take part in a summary.
    ///
    /// Called by the boundary layer before entries reach [`summarize`].
    pub fn validate(&self) -> Result<()> {
        if self.name.contains(KEY_SEPARATOR) || self.units.contains(KEY_SEPARATOR) {
            return Err(Error::InvalidInput(format!(
                "ingredient '{}' contains a NUL character",
                self.name.escape_default()
            )));
        }
        if !self.quantity.is_finite() {
            return Err(Error::InvalidInput(format!(
                "ingredient '{}' has non-finite quantity {}",
                self.name, self.quantity
            )));
        }
        if self.quantity < 0.0 {
            return Err(Error::InvalidInput(format!(
                "ingredient '{}' has negative quantity {}",
                self.name, self.quantity
            )));
        }
        Ok(())
    }

    /// Case-insensitive `(name, units)` identity used for merging
    pub fn grouping_key(&self) -> String {
        let mut key = String::with_capacity(self.name.len() + self.units.len() + 1);
        key.push_str(&self.name.to_lowercase());
        key.push(KEY_SEPARATOR);
        key.push_str(&self.units.to_lowercase());
        key
    }
}

/// A user's "N servings of recipe R" record, as fetched from the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingListEntry {
    pub recipe_id: RecipeId,
    pub recipe_name: String,
    /// Chosen serving count; 0 means the entry is being removed
    pub servings: u32,
    /// Ingredients as authored for the recipe's base serving count
    pub original_ingredients: Vec<Ingredient>,
    /// Ingredients scaled to `servings` by the backend
    pub scaled_ingredients: Vec<Ingredient>,
    /// Absolute image URLs, first one is the cover
    #[serde(default)]
    pub image_urls: Vec<String>,
}

impl ShoppingListEntry {
    /// Validate every ingredient on both lists
    pub fn validate(&self) -> Result<()> {
        self.original_ingredients
            .iter()
            .chain(self.scaled_ingredients.iter())
            .try_for_each(Ingredient::validate)
            .map_err(|e| match e {
                Error::InvalidInput(msg) => {
                    Error::InvalidInput(format!("recipe {}: {}", self.recipe_id, msg))
                }
                other => other,
            })
    }
}

/// One line of the combined shopping list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientSummaryRow {
    /// First-seen spelling of the name
    pub name: String,
    /// First-seen spelling of the units
    pub units: String,
    pub total_quantity: f64,
}

/// Neumaier compensated sum
///
/// Keeps the running error term so totals agree regardless of the order
/// recipes were added to the list.
#[derive(Debug, Default, Clone, Copy)]
struct CompensatedSum {
    sum: f64,
    compensation: f64,
}

impl CompensatedSum {
    fn new(value: f64) -> Self {
        Self {
            sum: value,
            compensation: 0.0,
        }
    }

    fn add(&mut self, value: f64) {
        let t = self.sum + value;
        // Past f64::MAX the correction term is inf - inf
        if !t.is_finite() {
            self.sum = t;
            self.compensation = 0.0;
            return;
        }
        if self.sum.abs() >= value.abs() {
            self.compensation += (self.sum - t) + value;
        } else {
            self.compensation += (value - t) + self.sum;
        }
        self.sum = t;
    }

    fn total(&self) -> f64 {
        self.sum + self.compensation
    }
}

struct PendingRow<'a> {
    name: &'a str,
    units: &'a str,
    total: CompensatedSum,
}

/// Combine a flat ingredient sequence into one row per grouping key.
///
/// Rows come out in the order their key was first seen.
pub fn summarize_ingredients<'a, I>(ingredients: I) -> Vec<IngredientSummaryRow>
where
    I: IntoIterator<Item = &'a Ingredient>,
{
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut rows: Vec<PendingRow<'a>> = Vec::new();

    for ingredient in ingredients {
        match slots.entry(ingredient.grouping_key()) {
            Entry::Occupied(slot) => rows[*slot.get()].total.add(ingredient.quantity),
            Entry::Vacant(slot) => {
                slot.insert(rows.len());
                rows.push(PendingRow {
                    name: &ingredient.name,
                    units: &ingredient.units,
                    total: CompensatedSum::new(ingredient.quantity),
                });
            }
        }
    }

    rows.into_iter()
        .map(|row| IngredientSummaryRow {
            name: row.name.to_string(),
            units: row.units.to_string(),
            total_quantity: row.total.total(),
        })
        .collect()
}

/// Combined shopping list across all entries' scaled ingredients.
///
/// Entries are walked in order, and each entry's ingredients in order, so
/// the row order is deterministic for a given input. An empty list yields
/// an empty summary.
pub fn summarize(entries: &[ShoppingListEntry]) -> Vec<IngredientSummaryRow> {
    let rows = summarize_ingredients(entries.iter().flat_map(|e| e.scaled_ingredients.iter()));
    tracing::debug!(
        entries = entries.len(),
        rows = rows.len(),
        "Summarized shopping list"
    );
    rows
}

/// Per-recipe table: the entries themselves, untouched
pub fn table_view(entries: &[ShoppingListEntry]) -> &[ShoppingListEntry] {
    entries
}
