//! Wire types for the shopping-list endpoints
//!
//! Shapes follow the backend's serializers:
//!
//! ```text
//! GET /recipes/shopping-list/
//! [
//!   {
//!     "num_servings": 2.0,
//!     "user": "alice",
//!     "recipe": {
//!       "modified_ingredients": [{"name": "Flour", "units": "g", "quantity": 400.0}],
//!       "original_recipe": {
//!         "id": 7, "name": "Bread", "num_servings": 1,
//!         "ingredients": [{"name": "Flour", "units": "g", "quantity": 200.0}],
//!         "images": [{"url": "/media/recipe/images/bread.jpg"}]
//!       }
//!     }
//!   }
//! ]
//! ```
//!
//! The list may also arrive wrapped in a limit/offset page.

use rbox_common::{Error, Ingredient, RecipeId, Result, ShoppingListEntry};
use serde::{Deserialize, Serialize};

/// Ingredient as serialized by the backend
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngredientDto {
    pub name: String,
    /// Empty unit is a valid backend choice
    #[serde(default)]
    pub units: String,
    pub quantity: f64,
}

impl From<IngredientDto> for Ingredient {
    fn from(dto: IngredientDto) -> Self {
        Ingredient::new(dto.name, dto.units, dto.quantity)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImageDto {
    pub url: String,
}

/// The subset of the backend's recipe object the shopping list needs
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OriginalRecipeDto {
    pub id: RecipeId,
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<IngredientDto>,
    #[serde(default)]
    pub images: Vec<ImageDto>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScaledRecipeDto {
    pub modified_ingredients: Vec<IngredientDto>,
    pub original_recipe: OriginalRecipeDto,
}

/// One shopping-list item
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShoppingListItemDto {
    /// Serialized as a float even though it is a whole number
    pub num_servings: f64,
    #[serde(default)]
    pub user: Option<String>,
    pub recipe: ScaledRecipeDto,
}

impl ShoppingListItemDto {
    /// Convert into a validated domain entry.
    ///
    /// Relative image URLs are resolved against `media_base`.
    pub fn into_entry(self, media_base: &str) -> Result<ShoppingListEntry> {
        let recipe = self.recipe.original_recipe;
        let servings = servings_from_wire(self.num_servings).map_err(|e| match e {
            Error::InvalidInput(msg) => {
                Error::InvalidInput(format!("recipe {}: {}", recipe.id, msg))
            }
            other => other,
        })?;

        let entry = ShoppingListEntry {
            recipe_id: recipe.id,
            recipe_name: recipe.name,
            servings,
            original_ingredients: recipe.ingredients.into_iter().map(Ingredient::from).collect(),
            scaled_ingredients: self
                .recipe
                .modified_ingredients
                .into_iter()
                .map(Ingredient::from)
                .collect(),
            image_urls: recipe
                .images
                .iter()
                .map(|img| resolve_media_url(media_base, &img.url))
                .collect(),
        };

        entry.validate()?;
        Ok(entry)
    }
}

/// Listing response: a bare array, or a limit/offset page when the client
/// asked for one
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ShoppingListPage {
    Paginated {
        count: u64,
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
        results: Vec<ShoppingListItemDto>,
    },
    Plain(Vec<ShoppingListItemDto>),
}

impl ShoppingListPage {
    /// Split into this page's items and the next page's URL, if any
    pub fn into_parts(self) -> (Vec<ShoppingListItemDto>, Option<String>) {
        match self {
            ShoppingListPage::Paginated { results, next, .. } => (results, next),
            ShoppingListPage::Plain(items) => (items, None),
        }
    }
}

/// Body of the add/update/remove call
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServingsRequest {
    pub num_servings: u32,
}

/// Response of the add/update/remove call
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ServingsResponse {
    Item(ShoppingListItemDto),
    /// Returned when servings = 0 removed the entry
    Message { message: String },
}

/// Accept whole, non-negative serving counts only
pub fn servings_from_wire(value: f64) -> Result<u32> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(Error::InvalidInput(format!(
            "servings must be a non-negative whole number, got {}",
            value
        )));
    }
    Ok(value as u32)
}

/// Make a media path absolute against the API base URL
pub fn resolve_media_url(base: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else if url.starts_with('/') {
        format!("{}{}", base.trim_end_matches('/'), url)
    } else {
        format!("{}/{}", base.trim_end_matches('/'), url)
    }
}
