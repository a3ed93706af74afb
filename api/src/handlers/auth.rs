use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{
    auth::{authenticate, CurrentUser},
    db::users::UserRepository,
    error::AppError,
    extract::AppForm,
    models::user::{LoginForm, TokenResponse, User},
    AppState,
};

/// OAuth2 password grant: exchange a username and password for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    AppForm(form): AppForm<LoginForm>,
) -> Result<Json<TokenResponse>, AppError> {
    let users = UserRepository::new(&state.db);
    let user = authenticate(&users, &form.username, &form.password).await?;

    let token = state.tokens.issue(&user.username)?;
    tracing::info!(username = %user.username, "issued access token");

    Ok(Json(TokenResponse::bearer(token)))
}

pub async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

pub async fn my_items(CurrentUser(user): CurrentUser) -> Json<Value> {
    Json(json!({
        "user": user.username,
        "items": [
            {"id": 1, "title": "My Item 1", "description": "First item"},
            {"id": 2, "title": "My Item 2", "description": "Second item"},
        ],
    }))
}

pub async fn admin(CurrentUser(user): CurrentUser) -> Json<Value> {
    Json(json!({
        "message": "Welcome to the admin area!",
        "user": user.username,
    }))
}

pub async fn public_data() -> Json<Value> {
    Json(json!({
        "data": "This is public data",
        "accessible_by": "Everyone",
    }))
}

pub async fn protected_data(CurrentUser(user): CurrentUser) -> Json<Value> {
    Json(json!({
        "data": "This is protected data",
        "accessible_by": "Authenticated users only",
        "accessed_by": user.username,
    }))
}
