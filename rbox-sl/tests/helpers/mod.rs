//! Mock recipe backend for integration tests
//!
//! Serves the two shopping-list endpoints from in-memory state on an
//! ephemeral port, scaling ingredients the way the real backend does
//! (quantity * servings / base servings, rounded to 2 decimals).

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rbox_common::config::ClientSettings;
use rbox_sl::{ApiClient, MemoryTokenStore};
use serde_json::{json, Value};

pub const TOKEN: &str = "test-token";

#[derive(Debug, Clone)]
pub struct MockRecipe {
    pub id: u64,
    pub name: String,
    pub base_servings: u32,
    /// (name, units, quantity) for the base serving count
    pub ingredients: Vec<(String, String, f64)>,
    pub images: Vec<String>,
}

impl MockRecipe {
    pub fn new(id: u64, name: &str, base_servings: u32, ingredients: &[(&str, &str, f64)]) -> Self {
        Self {
            id,
            name: name.to_string(),
            base_servings,
            ingredients: ingredients
                .iter()
                .map(|(n, u, q)| (n.to_string(), u.to_string(), *q))
                .collect(),
            images: vec![],
        }
    }
}

#[derive(Debug, Default)]
pub struct MockBackend {
    pub base_url: String,
    pub recipes: HashMap<u64, MockRecipe>,
    /// (recipe id, servings) in the order they were added
    pub list: Vec<(u64, u32)>,
    /// Paginate listing responses with this page size
    pub page_size: Option<usize>,
    /// Last page links back to the first instead of ending
    pub cyclic_pages: bool,
    /// Serve this body for listings instead of the real list
    pub list_body: Option<Value>,
    /// Force every request to fail with this status
    pub fail_with: Option<StatusCode>,
    /// Number of listing requests served
    pub list_requests: usize,
}

pub type SharedBackend = Arc<Mutex<MockBackend>>;

fn ingredient_json(name: &str, units: &str, quantity: f64) -> Value {
    json!({"name": name, "units": units, "quantity": quantity})
}

fn item_json(recipe: &MockRecipe, servings: u32) -> Value {
    let multiplier = servings as f64 / recipe.base_servings as f64;
    let scaled: Vec<Value> = recipe
        .ingredients
        .iter()
        .map(|(n, u, q)| ingredient_json(n, u, (q * multiplier * 100.0).round() / 100.0))
        .collect();
    let original: Vec<Value> = recipe
        .ingredients
        .iter()
        .map(|(n, u, q)| ingredient_json(n, u, *q))
        .collect();
    let images: Vec<Value> = recipe.images.iter().map(|url| json!({"url": url})).collect();

    json!({
        "num_servings": servings as f64,
        "user": "alice",
        "recipe": {
            "modified_ingredients": scaled,
            "original_recipe": {
                "id": recipe.id,
                "name": recipe.name,
                "num_servings": recipe.base_servings,
                "ingredients": original,
                "images": images,
                "likes": 0
            }
        }
    })
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TOKEN))
        .unwrap_or(false)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Authentication credentials were not provided."})),
    )
        .into_response()
}

async fn list_handler(
    State(backend): State<SharedBackend>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }

    let mut backend = backend.lock().unwrap();
    backend.list_requests += 1;
    if let Some(status) = backend.fail_with {
        return (status, "backend exploded").into_response();
    }
    if let Some(body) = &backend.list_body {
        return Json(body.clone()).into_response();
    }

    let items: Vec<Value> = backend
        .list
        .iter()
        .filter_map(|(id, servings)| backend.recipes.get(id).map(|r| item_json(r, *servings)))
        .collect();

    match backend.page_size {
        None => Json(Value::Array(items)).into_response(),
        Some(limit) => {
            let offset: usize = query
                .get("offset")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            let results: Vec<Value> = items.iter().skip(offset).take(limit).cloned().collect();
            let next_offset = if offset + limit < items.len() {
                Some(offset + limit)
            } else if backend.cyclic_pages {
                Some(0)
            } else {
                None
            };
            let next = next_offset.map(|next_offset| {
                format!(
                    "{}/recipes/shopping-list/?limit={}&offset={}",
                    backend.base_url, limit, next_offset
                )
            });
            Json(json!({
                "count": items.len(),
                "next": next,
                "previous": null,
                "results": results
            }))
            .into_response()
        }
    }
}

async fn servings_handler(
    State(backend): State<SharedBackend>,
    headers: HeaderMap,
    Path(recipe_id): Path<u64>,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }

    let mut backend = backend.lock().unwrap();
    if let Some(status) = backend.fail_with {
        return (status, "backend exploded").into_response();
    }

    let Some(recipe) = backend.recipes.get(&recipe_id).cloned() else {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response();
    };

    let servings = match body.get("num_servings").and_then(Value::as_f64) {
        Some(n) if n >= 0.0 => n as u32,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"num_servings": ["A valid number is required."]})),
            )
                .into_response()
        }
    };

    if let Some(pos) = backend.list.iter().position(|(id, _)| *id == recipe_id) {
        if servings == 0 {
            backend.list.remove(pos);
            return Json(json!({"message": "removed from shopping list"})).into_response();
        }
        backend.list[pos].1 = servings;
    } else {
        backend.list.push((recipe_id, servings));
    }

    Json(item_json(&recipe, servings)).into_response()
}

/// Start the mock backend and return its state and base URL
pub async fn spawn_backend(recipes: Vec<MockRecipe>) -> (SharedBackend, String) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let backend = Arc::new(Mutex::new(MockBackend {
        base_url: base_url.clone(),
        recipes: recipes.into_iter().map(|r| (r.id, r)).collect(),
        ..MockBackend::default()
    }));

    let app = Router::new()
        .route("/recipes/shopping-list/", get(list_handler))
        .route("/recipes/:recipe_id/add-to-shopping-list/", post(servings_handler))
        .with_state(Arc::clone(&backend));

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (backend, base_url)
}

pub fn settings(base_url: &str) -> ClientSettings {
    ClientSettings {
        api_base_url: base_url.to_string(),
        token_file: "/tmp/rbox-test-unused-token".into(),
        request_timeout: Duration::from_secs(5),
        log_level: "debug".to_string(),
    }
}

/// Client logged in with the token the mock accepts
pub fn client(base_url: &str) -> ApiClient {
    ApiClient::new(&settings(base_url), Arc::new(MemoryTokenStore::new(TOKEN))).unwrap()
}

pub fn bread() -> MockRecipe {
    let mut recipe = MockRecipe::new(
        7,
        "Bread",
        1,
        &[("Flour", "g", 200.0), ("Egg", "", 1.0), ("Salt", "tsp", 0.5)],
    );
    recipe.images = vec!["/media/recipe/images/bread.jpg".to_string()];
    recipe
}

pub fn pancakes() -> MockRecipe {
    MockRecipe::new(
        9,
        "Pancakes",
        4,
        &[("flour", "G", 300.0), ("Milk", "mL", 500.0), ("egg", "", 2.0)],
    )
}

pub fn fudge() -> MockRecipe {
    MockRecipe::new(11, "Fudge", 1, &[("Sugar", "cup", 1.0), ("Butter", "g", 50.0)])
}
