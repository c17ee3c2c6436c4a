//! `Authorization: Token <key>` authentication.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use super::{with_store, SharedState};
use crate::error::AppError;
use crate::models::User;

const TOKEN_SCHEME: &str = "Token";

/// Extracts the token from the header, if one was sent.
///
/// A header that is present but malformed is an authentication failure, not
/// an anonymous request.
fn token_from_headers(headers: &HeaderMap) -> Result<Option<String>, AppError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| AppError::Unauthorized)?;
    match value.split_once(' ') {
        Some((scheme, token)) if scheme == TOKEN_SCHEME && !token.trim().is_empty() => {
            Ok(Some(token.trim().to_string()))
        }
        _ => Err(AppError::Unauthorized),
    }
}

async fn resolve_user(parts: &Parts, state: &SharedState) -> Result<Option<User>, AppError> {
    let Some(token) = token_from_headers(&parts.headers)? else {
        return Ok(None);
    };
    match with_store(state, move |store| store.user_by_token(&token)).await? {
        Some(user) => Ok(Some(user)),
        None => Err(AppError::Unauthorized),
    }
}

/// The authenticated caller; rejects anonymous requests with 401.
pub struct CurrentUser(pub User);

impl FromRequestParts<SharedState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self, Self::Rejection> {
        resolve_user(parts, state)
            .await?
            .map(CurrentUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// The caller if a token was sent, `None` for anonymous requests.
pub struct MaybeUser(pub Option<User>);

impl MaybeUser {
    pub fn id(&self) -> Option<i64> {
        self.0.as_ref().map(|user| user.id)
    }
}

impl FromRequestParts<SharedState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(resolve_user(parts, state).await?))
    }
}
