//! # rbox-sl (Shopping List)
//!
//! Client for a user's recipe shopping list:
//! - `api`: HTTP client and wire types for the shopping-list endpoints
//! - `session`: bearer token storage
//! - `view`: fetch lifecycle feeding the ingredient aggregator
//! - `render`: plain-text tables for the terminal

pub mod api;
pub mod render;
pub mod session;
pub mod view;

pub use api::{ApiClient, ApiError, ServingsUpdate};
pub use session::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use view::{FetchState, ShoppingListSnapshot, ShoppingListView};
