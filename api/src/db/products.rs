use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::like_pattern;
use crate::error::AppError;
use crate::models::product::{CreateProduct, Product, ProductFilter, UpdateProduct};

pub(crate) const PRODUCT_COLUMNS: &str =
    "id, name, description, price, stock, category, created_at, updated_at";

pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: i64) -> Result<Option<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
    }

    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, sqlx::Error> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE 1 = 1"));

        if let Some(category) = filter.category.as_deref().filter(|c| !c.is_empty()) {
            query.push(" AND category = ").push_bind(category.to_string());
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = like_pattern(search);
            query
                .push(" AND (name LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR description LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }
        if let Some(min_price) = filter.min_price {
            query.push(" AND price >= ").push_bind(min_price);
        }
        if let Some(max_price) = filter.max_price {
            query.push(" AND price <= ").push_bind(max_price);
        }
        if filter.in_stock == Some(true) {
            query.push(" AND stock > 0");
        }

        query
            .push(" ORDER BY id LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.skip);

        query.build_query_as::<Product>().fetch_all(self.pool).await
    }

    pub async fn create(&self, input: &CreateProduct) -> Result<Product, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products (name, description, price, stock, category) \
             VALUES (?, ?, ?, ?, ?) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.stock)
        .bind(&input.category)
        .fetch_one(self.pool)
        .await
    }

    pub async fn update(
        &self,
        id: i64,
        input: &UpdateProduct,
    ) -> Result<Option<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET \
                name = COALESCE(?, name), \
                description = COALESCE(?, description), \
                price = COALESCE(?, price), \
                stock = COALESCE(?, stock), \
                category = COALESCE(?, category), \
                updated_at = CURRENT_TIMESTAMP \
             WHERE id = ? \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.stock)
        .bind(&input.category)
        .bind(id)
        .fetch_optional(self.pool)
        .await
    }

    /// Add `quantity_change` (which may be negative) to the stock level.
    /// `Ok(None)` if the product doesn't exist. The new level is computed in
    /// `i64` and must land in `0..=i64::MAX`.
    pub async fn adjust_stock(
        &self,
        id: i64,
        quantity_change: i64,
    ) -> Result<Option<Product>, AppError> {
        let mut tx = self.pool.begin().await?;

        let Some(product) = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(None);
        };

        let stock = match product.stock.checked_add(quantity_change) {
            Some(stock) if stock >= 0 => stock,
            Some(_) => {
                return Err(AppError::BadRequest(format!(
                    "Insufficient stock for product {}",
                    product.name
                )))
            }
            None => {
                return Err(AppError::BadRequest(format!(
                    "Stock level out of range for product {}",
                    product.name
                )))
            }
        };

        let updated = sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET stock = ?, updated_at = CURRENT_TIMESTAMP \
             WHERE id = ? \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(stock)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(updated))
    }

    /// Delete a product. Products that appear on any order are kept.
    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                let referenced = e
                    .as_database_error()
                    .is_some_and(|db_err| db_err.is_foreign_key_violation());
                if referenced {
                    AppError::Conflict(format!(
                        "Product with id {id} is referenced by existing orders"
                    ))
                } else {
                    AppError::Sqlx(e)
                }
            })?;
        Ok(result.rows_affected() > 0)
    }
}
