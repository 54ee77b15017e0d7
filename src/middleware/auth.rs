use axum::{
    extract::{FromRef, FromRequestParts, Query},
    http::{header, request::Parts},
};
use serde::Deserialize;

use crate::{
    error::{AppError, AuthError},
    state::AppState,
};

/// The authenticated caller, produced by the access gate in front of every
/// protected handler. Taking this extractor as a parameter is the only way
/// identity reaches downstream logic; handlers never re-verify tokens.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Pull the raw token out of the request: `Authorization` header first
/// (an optional `Bearer ` prefix is tolerated), then the `token` query
/// parameter.
fn token_from_parts(parts: &Parts) -> Option<String> {
    let header_token = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.strip_prefix("Bearer ").unwrap_or(value).trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string);
    if header_token.is_some() {
        return header_token;
    }

    Query::<TokenQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(q)| q.token)
        .filter(|t| !t.is_empty())
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let token = token_from_parts(parts).ok_or(AuthError::MissingToken)?;
        let subject = state.tokens.verify(&token)?;

        let user = state
            .users
            .user_by_id(subject)
            .await?
            .ok_or(AuthError::UnknownSubject(subject))?;

        Ok(AuthUser { user_id: user.id })
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts_for(uri: &str, auth_header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = auth_header {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn header_token_wins_over_query() {
        let parts = parts_for("/checkout?token=from-query", Some("from-header"));
        assert_eq!(token_from_parts(&parts).as_deref(), Some("from-header"));
    }

    #[test]
    fn bearer_prefix_is_stripped() {
        let parts = parts_for("/checkout", Some("Bearer abc.def.ghi"));
        assert_eq!(token_from_parts(&parts).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn query_fallback_is_used_when_header_absent() {
        let parts = parts_for("/checkout?token=from-query", None);
        assert_eq!(token_from_parts(&parts).as_deref(), Some("from-query"));
    }

    #[test]
    fn no_token_anywhere_is_none() {
        let parts = parts_for("/checkout?other=1", None);
        assert_eq!(token_from_parts(&parts), None);
    }

    #[test]
    fn empty_values_count_as_missing() {
        let parts = parts_for("/checkout?token=", Some("Bearer "));
        assert_eq!(token_from_parts(&parts), None);
    }
}
