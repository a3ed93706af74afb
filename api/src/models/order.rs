use serde::{Deserialize, Serialize};

use super::validation::{Validate, ValidationErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRow {
    pub id: i64,
    pub customer_id: i64,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: Option<chrono::NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub price_at_time: f64,
    pub created_at: chrono::NaiveDateTime,
}

/// An order together with its line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: Option<chrono::NaiveDateTime>,
    pub items: Vec<OrderItem>,
}

impl Order {
    pub fn from_parts(row: OrderRow, items: Vec<OrderItem>) -> Self {
        Self {
            id: row.id,
            customer_id: row.customer_id,
            total_amount: row.total_amount,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
            items,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderItem {
    pub product_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrder {
    pub customer_id: i64,
    pub items: Vec<CreateOrderItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateOrder {
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilter {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "super::default_limit")]
    pub limit: i64,
    pub customer_id: Option<i64>,
    pub status: Option<OrderStatus>,
}

impl Validate for CreateOrder {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.check_gt(&["body", "customer_id"], self.customer_id as f64, 0.0);
        if self.items.is_empty() {
            errors.push(
                &["body", "items"],
                "List should have at least 1 item after validation, not 0",
                "too_short",
            );
        }
        for (i, item) in self.items.iter().enumerate() {
            let idx = i.to_string();
            let product_loc = ["body", "items", idx.as_str(), "product_id"];
            let quantity_loc = ["body", "items", idx.as_str(), "quantity"];
            errors.check_gt(&product_loc, item.product_id as f64, 0.0);
            errors.check_gt(&quantity_loc, item.quantity as f64, 0.0);
        }
        errors.into_result()
    }
}

impl Validate for OrderFilter {
    fn validate(&self) -> Result<(), ValidationErrors> {
        super::validate_page(self.skip, self.limit)
    }
}
