use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Failures of the access gate. Every variant surfaces to the client as the
/// same 403 "permission denied" response; the variant is only logged.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no token in Authorization header or token query parameter")]
    MissingToken,

    #[error("token signature or claims invalid")]
    InvalidToken,

    #[error("token expired")]
    Expired,

    #[error("token subject {0} does not exist")]
    UnknownSubject(i32),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("permission denied")]
    Auth(#[from] AuthError),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("product with id {0} not found")]
    ProductNotFound(i32),

    #[error("not found")]
    NotFound,

    #[error("database error")]
    Db(#[from] sqlx::Error),

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Auth(kind) => {
                // The concrete failure stays server-side; callers always see
                // the same body regardless of what went wrong.
                tracing::warn!(reason = %kind, "request rejected by access gate");
                (StatusCode::FORBIDDEN, self.to_string())
            }
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::ProductNotFound(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::Db(err) => {
                tracing::error!(error = %err, "database failure");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal failure");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_share_one_status() {
        for kind in [
            AuthError::MissingToken,
            AuthError::InvalidToken,
            AuthError::Expired,
            AuthError::UnknownSubject(42),
        ] {
            let response = AppError::from(kind).into_response();
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
        }
    }

    #[test]
    fn db_errors_map_to_500() {
        let err = AppError::Db(sqlx::Error::RowNotFound);
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
