use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::like_pattern;
use crate::error::AppError;
use crate::models::customer::{CreateCustomer, Customer, CustomerFilter, UpdateCustomer};

const CUSTOMER_COLUMNS: &str = "id, name, email, phone, address, created_at, updated_at";

pub struct CustomerRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CustomerRepository<'a> {
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: i64) -> Result<Option<Customer>, sqlx::Error> {
        sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<Customer>, sqlx::Error> {
        sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await
    }

    /// Page through customers, optionally matching `search` against name or email.
    pub async fn list(&self, filter: &CustomerFilter) -> Result<Vec<Customer>, sqlx::Error> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE 1 = 1"
        ));

        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = like_pattern(search);
            query
                .push(" AND (name LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR email LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }

        query
            .push(" ORDER BY id LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.skip);

        query.build_query_as::<Customer>().fetch_all(self.pool).await
    }

    pub async fn create(&self, input: &CreateCustomer) -> Result<Customer, AppError> {
        if self.get_by_email(&input.email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".into()));
        }

        sqlx::query_as::<_, Customer>(&format!(
            "INSERT INTO customers (name, email, phone, address) VALUES (?, ?, ?, ?) \
             RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .fetch_one(self.pool)
        .await
        .map_err(email_conflict)
    }

    /// Apply the provided fields. `Ok(None)` if the customer doesn't exist.
    pub async fn update(
        &self,
        id: i64,
        input: &UpdateCustomer,
    ) -> Result<Option<Customer>, AppError> {
        sqlx::query_as::<_, Customer>(&format!(
            "UPDATE customers SET \
                name = COALESCE(?, name), \
                email = COALESCE(?, email), \
                phone = COALESCE(?, phone), \
                address = COALESCE(?, address), \
                updated_at = CURRENT_TIMESTAMP \
             WHERE id = ? \
             RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(email_conflict)
    }

    /// Delete a customer; their orders and order items go with them.
    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn email_conflict(e: sqlx::Error) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::Conflict("Email already registered".into());
        }
    }
    AppError::Sqlx(e)
}
