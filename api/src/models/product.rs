use serde::{Deserialize, Serialize};

use super::validation::{Validate, ValidationErrors};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i64,
    pub category: Option<String>,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: Option<chrono::NaiveDateTime>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub stock: i64,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StockAdjustment {
    pub quantity_change: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "super::default_limit")]
    pub limit: i64,
    pub category: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub in_stock: Option<bool>,
}

impl Validate for CreateProduct {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.check_len(&["body", "name"], &self.name, 1, 100);
        errors.check_gt(&["body", "price"], self.price, 0.0);
        errors.check_ge(&["body", "stock"], self.stock as f64, 0.0);
        if let Some(category) = &self.category {
            errors.check_len(&["body", "category"], category, 0, 50);
        }
        errors.into_result()
    }
}

impl Validate for UpdateProduct {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if let Some(name) = &self.name {
            errors.check_len(&["body", "name"], name, 1, 100);
        }
        if let Some(price) = self.price {
            errors.check_gt(&["body", "price"], price, 0.0);
        }
        if let Some(stock) = self.stock {
            errors.check_ge(&["body", "stock"], stock as f64, 0.0);
        }
        if let Some(category) = &self.category {
            errors.check_len(&["body", "category"], category, 0, 50);
        }
        errors.into_result()
    }
}

impl Validate for ProductFilter {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = match super::validate_page(self.skip, self.limit) {
            Ok(()) => ValidationErrors::default(),
            Err(errors) => errors,
        };
        if let Some(min) = self.min_price {
            errors.check_ge(&["query", "min_price"], min, 0.0);
        }
        if let Some(max) = self.max_price {
            errors.check_ge(&["query", "max_price"], max, 0.0);
        }
        errors.into_result()
    }
}
