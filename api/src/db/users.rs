use sqlx::SqlitePool;

use crate::auth::{password, UserLookup};
use crate::error::AppError;
use crate::models::user::{NewUser, User};

const USER_COLUMNS: &str = "id, username, full_name, email, hashed_password, disabled, created_at";

pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await
    }

    /// Hash the password and insert the user. Returns `false` if the username
    /// is already taken.
    pub async fn create_if_absent(&self, new_user: &NewUser) -> Result<bool, AppError> {
        let hashed_password = password::hash(&new_user.password)?;

        let result = sqlx::query(
            "INSERT OR IGNORE INTO users (username, full_name, email, hashed_password, disabled) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&new_user.username)
        .bind(&new_user.full_name)
        .bind(&new_user.email)
        .bind(&hashed_password)
        .bind(new_user.disabled)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

impl UserLookup for UserRepository<'_> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        self.get_by_username(username).await
    }
}
