pub mod auth;
pub mod customers;
pub mod orders;
pub mod products;

use axum::Json;
use serde_json::{json, Value};

pub async fn index() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the storefront API",
        "version": env!("CARGO_PKG_VERSION"),
        "auth": {
            "token": "POST /token (form: username, password)",
            "me": "GET /users/me (Authorization: Bearer <token>)",
        },
        "endpoints": {
            "customers": "/api/customers",
            "products": "/api/products",
            "orders": "/api/orders",
        },
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
