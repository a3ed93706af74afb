//! SQLite persistence. One repository per table family, each borrowing the
//! shared pool.

pub mod customers;
pub mod orders;
pub mod products;
pub mod users;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::AppError;
use crate::models::user::NewUser;

pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Insert the given accounts unless a user with the same name already exists.
pub async fn seed_users(pool: &SqlitePool, seed: &[NewUser]) -> Result<usize, AppError> {
    let users = users::UserRepository::new(pool);
    let mut created = 0;
    for new_user in seed {
        if users.create_if_absent(new_user).await? {
            tracing::info!(username = %new_user.username, "seeded user");
            created += 1;
        }
    }
    Ok(created)
}

/// Escape `%`, `_` and `\` so user text matches literally inside a LIKE pattern.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// An in-memory database with the schema applied.
///
/// Every connection to `sqlite::memory:` is a separate database, so the pool
/// is pinned to a single connection that is never recycled.
#[cfg(test)]
pub async fn memory_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();
    migrate(&pool).await.unwrap();
    pool
}
