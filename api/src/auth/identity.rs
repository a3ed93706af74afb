use std::future::Future;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use super::{password, AuthError, TokenService};
use crate::{db::users::UserRepository, error::AppError, models::user::User, AppState};

/// Anything that can find a user by username.
pub trait UserLookup {
    fn find_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<User>, sqlx::Error>> + Send;
}

/// Check a username/password pair. Unknown users and wrong passwords fail
/// with the same error.
pub async fn authenticate<L: UserLookup>(
    users: &L,
    username: &str,
    password: &str,
) -> Result<User, AppError> {
    let Some(user) = users.find_by_username(username).await? else {
        password::verify_dummy(password);
        tracing::info!(username, "login rejected: unknown user");
        return Err(AuthError::IncorrectCredentials.into());
    };

    if !password::verify(password, &user.hashed_password) {
        tracing::info!(username, "login rejected: bad password");
        return Err(AuthError::IncorrectCredentials.into());
    }

    Ok(user)
}

/// Resolve a bearer token to the enabled user it was issued for.
///
/// `None` means the request carried no usable bearer credentials at all.
/// Anything wrong with a presented token (signature, expiry, shape, or a
/// subject that no longer exists) is reported as `InvalidToken`. A disabled
/// account is `InactiveUser`.
pub async fn resolve_current_user<L: UserLookup>(
    token: Option<&str>,
    tokens: &TokenService,
    users: &L,
) -> Result<User, AppError> {
    let token = token.ok_or(AuthError::MissingCredentials)?;

    let claims = tokens.decode(token).map_err(|e| {
        tracing::debug!(error = %e, "bearer token rejected");
        AuthError::InvalidToken
    })?;

    let Some(user) = users.find_by_username(&claims.sub).await? else {
        tracing::debug!(sub = %claims.sub, "token subject no longer exists");
        return Err(AuthError::InvalidToken.into());
    };

    if !user.is_active() {
        tracing::debug!(username = %user.username, "token for disabled account");
        return Err(AuthError::InactiveUser.into());
    }

    Ok(user)
}

/// Pull the token out of `Authorization: Bearer <token>`. Any other scheme,
/// or an empty token, counts as no credentials.
pub fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Extractor for routes that need a signed-in, enabled user.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let users = UserRepository::new(&state.db);
        let user = resolve_current_user(bearer_token(parts), &state.tokens, &users).await?;
        Ok(Self(user))
    }
}
