pub mod customer;
pub mod order;
pub mod product;
pub mod user;
pub mod validation;

use serde::Serialize;

use validation::ValidationErrors;

pub const DEFAULT_PAGE_LIMIT: i64 = 100;
pub const MAX_PAGE_LIMIT: i64 = 1000;

fn default_limit() -> i64 {
    DEFAULT_PAGE_LIMIT
}

fn validate_page(skip: i64, limit: i64) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors.check_ge(&["query", "skip"], skip as f64, 0.0);
    errors.check_ge(&["query", "limit"], limit as f64, 1.0);
    errors.check_le(&["query", "limit"], limit as f64, MAX_PAGE_LIMIT as f64);
    errors.into_result()
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
