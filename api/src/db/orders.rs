use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use super::products::PRODUCT_COLUMNS;
use crate::error::AppError;
use crate::models::order::{CreateOrder, Order, OrderFilter, OrderItem, OrderRow, OrderStatus};
use crate::models::product::Product;

const ORDER_COLUMNS: &str = "id, customer_id, total_amount, status, created_at, updated_at";
const ITEM_COLUMNS: &str = "id, order_id, product_id, quantity, price_at_time, created_at";

pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: i64) -> Result<Option<Order>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        fetch_order(&mut *conn, id).await
    }

    pub async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, sqlx::Error> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {ORDER_COLUMNS} FROM orders WHERE 1 = 1"));

        if let Some(customer_id) = filter.customer_id {
            query.push(" AND customer_id = ").push_bind(customer_id);
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status);
        }

        query
            .push(" ORDER BY id LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.skip);

        let rows = query.build_query_as::<OrderRow>().fetch_all(self.pool).await?;
        self.with_items(rows).await
    }

    pub async fn list_for_customer(&self, customer_id: i64) -> Result<Vec<Order>, sqlx::Error> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE customer_id = ? ORDER BY id"
        ))
        .bind(customer_id)
        .fetch_all(self.pool)
        .await?;
        self.with_items(rows).await
    }

    /// Place an order: one order row, one item row per line, stock decremented
    /// and the total stored, all in a single transaction. Any failing line
    /// rolls the whole order back.
    pub async fn create(&self, input: &CreateOrder) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await?;

        let customer_exists: Option<i64> =
            sqlx::query_scalar("SELECT id FROM customers WHERE id = ?")
                .bind(input.customer_id)
                .fetch_optional(&mut *tx)
                .await?;
        if customer_exists.is_none() {
            return Err(AppError::not_found("Customer", input.customer_id));
        }

        let order_id: i64 = sqlx::query_scalar(
            "INSERT INTO orders (customer_id, total_amount, status) VALUES (?, 0, ?) RETURNING id",
        )
        .bind(input.customer_id)
        .bind(OrderStatus::Pending)
        .fetch_one(&mut *tx)
        .await?;

        let mut total_amount = 0.0;
        for line in &input.items {
            let product = sqlx::query_as::<_, Product>(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"
            ))
            .bind(line.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                AppError::BadRequest(format!("Product with id {} not found", line.product_id))
            })?;

            let decremented = sqlx::query(
                "UPDATE products SET stock = stock - ?, updated_at = CURRENT_TIMESTAMP \
                 WHERE id = ? AND stock >= ?",
            )
            .bind(line.quantity)
            .bind(product.id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
            if decremented.rows_affected() == 0 {
                return Err(AppError::BadRequest(format!(
                    "Insufficient stock for product {}",
                    product.name
                )));
            }

            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, quantity, price_at_time) \
                 VALUES (?, ?, ?, ?)",
            )
            .bind(order_id)
            .bind(product.id)
            .bind(line.quantity)
            .bind(product.price)
            .execute(&mut *tx)
            .await?;

            total_amount += product.price * line.quantity as f64;
        }

        sqlx::query("UPDATE orders SET total_amount = ? WHERE id = ?")
            .bind(total_amount)
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        let order = fetch_order(&mut *tx, order_id)
            .await?
            .ok_or_else(|| AppError::not_found("Order", order_id))?;

        tx.commit().await?;

        tracing::info!(
            order_id,
            customer_id = input.customer_id,
            lines = input.items.len(),
            total_amount,
            "order placed"
        );
        Ok(order)
    }

    pub async fn update_status(
        &self,
        id: i64,
        status: OrderStatus,
    ) -> Result<Option<Order>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        let updated = sqlx::query(
            "UPDATE orders SET status = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(status)
        .bind(id)
        .execute(&mut *conn)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        fetch_order(&mut *conn, id).await
    }

    /// Delete an order and its items.
    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn with_items(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, sqlx::Error> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id IN ("
        ));
        let mut ids = query.separated(", ");
        for row in &rows {
            ids.push_bind(row.id);
        }
        ids.push_unseparated(") ORDER BY id");

        let items = query.build_query_as::<OrderItem>().fetch_all(self.pool).await?;

        let mut by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
        for item in items {
            by_order.entry(item.order_id).or_default().push(item);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let items = by_order.remove(&row.id).unwrap_or_default();
                Order::from_parts(row, items)
            })
            .collect())
    }
}

async fn fetch_order(conn: &mut SqliteConnection, id: i64) -> Result<Option<Order>, sqlx::Error> {
    let Some(row) = sqlx::query_as::<_, OrderRow>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    else {
        return Ok(None);
    };

    let items = sqlx::query_as::<_, OrderItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ? ORDER BY id"
    ))
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Some(Order::from_parts(row, items)))
}
