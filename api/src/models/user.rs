use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub email: String,
    #[serde(skip)]
    pub hashed_password: String,
    pub disabled: bool,
    pub created_at: chrono::NaiveDateTime,
}

impl User {
    pub fn is_active(&self) -> bool {
        !self.disabled
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub sub: String, // username
    pub iat: usize,
    pub exp: usize,
}

/// `application/x-www-form-urlencoded` body of the OAuth2 password grant.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    #[allow(dead_code)]
    pub grant_type: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    pub scope: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// A user to insert at startup; the password is hashed on the way in.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub disabled: bool,
}

impl NewUser {
    pub fn new(username: &str, full_name: &str, email: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            full_name: full_name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            disabled: false,
        }
    }
}

pub fn demo_users() -> Vec<NewUser> {
    vec![
        NewUser::new("john", "John Doe", "john@example.com", "secret"),
        NewUser::new("jane", "Jane Doe", "jane@example.com", "secret"),
        NewUser::new("admin", "Admin User", "admin@example.com", "admin123"),
    ]
}
