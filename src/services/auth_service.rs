use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use password_hash::rand_core::OsRng;

use crate::{
    dto::auth::{LoginRequest, LoginResponse, RegisterRequest},
    error::{AppError, AppResult},
    models::NewUser,
    state::AppState,
    validate,
};

pub async fn register_user(state: &AppState, payload: RegisterRequest) -> AppResult<()> {
    validate::validate_register(&payload).map_err(AppError::Validation)?;

    if state.users.user_by_email(&payload.email).await?.is_some() {
        return Err(AppError::Validation(format!(
            "user with email {} already exists",
            payload.email
        )));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = state
        .users
        .create_user(NewUser {
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            password_hash,
        })
        .await?;

    tracing::debug!(user_id = user.id, "user registered");
    Ok(())
}

/// Unknown email and wrong password take the same exit so responses stay
/// indistinguishable and the endpoint cannot be used to enumerate users.
pub async fn login_user(state: &AppState, payload: LoginRequest) -> AppResult<LoginResponse> {
    validate::validate_login(&payload).map_err(AppError::Validation)?;

    let user = state
        .users
        .user_by_email(&payload.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&payload.password, &user.password_hash) {
        return Err(AppError::InvalidCredentials);
    }

    let token = state.tokens.issue(user.id)?;
    Ok(LoginResponse { token })
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, password_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(password_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        store::{MemoryOrderStore, MemoryProductStore, MemoryUserStore},
        token::TokenIssuer,
    };

    use super::*;

    fn memory_state() -> AppState {
        AppState {
            users: Arc::new(MemoryUserStore::new()),
            products: Arc::new(MemoryProductStore::new()),
            orders: Arc::new(MemoryOrderStore::new()),
            tokens: TokenIssuer::new("test-secret", 3600),
        }
    }

    fn register_payload(email: &str) -> RegisterRequest {
        RegisterRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: email.to_string(),
            password: "hunter2".to_string(),
        }
    }

    #[test]
    fn stored_hash_is_never_the_plaintext() {
        let hash = hash_password("hunter2").unwrap();
        assert_ne!(hash, "hunter2");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[tokio::test]
    async fn register_persists_a_hashed_password() {
        let state = memory_state();
        register_user(&state, register_payload("ada@example.com"))
            .await
            .unwrap();

        let user = state
            .users
            .user_by_email("ada@example.com")
            .await
            .unwrap()
            .expect("user stored");
        assert_ne!(user.password_hash, "hunter2");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let state = memory_state();
        register_user(&state, register_payload("ada@example.com"))
            .await
            .unwrap();

        let err = register_user(&state, register_payload("ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn unknown_email_and_bad_password_are_indistinguishable() {
        let state = memory_state();
        register_user(&state, register_payload("ada@example.com"))
            .await
            .unwrap();

        let unknown = login_user(
            &state,
            LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "hunter2".to_string(),
            },
        )
        .await
        .unwrap_err();
        let wrong = login_user(
            &state,
            LoginRequest {
                email: "ada@example.com".to_string(),
                password: "wrong".to_string(),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(unknown, AppError::InvalidCredentials));
        assert!(matches!(wrong, AppError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn login_returns_a_verifiable_token() {
        let state = memory_state();
        register_user(&state, register_payload("ada@example.com"))
            .await
            .unwrap();

        let resp = login_user(
            &state,
            LoginRequest {
                email: "ada@example.com".to_string(),
                password: "hunter2".to_string(),
            },
        )
        .await
        .unwrap();

        let subject = state.tokens.verify(&resp.token).unwrap();
        let user = state.users.user_by_id(subject).await.unwrap().unwrap();
        assert_eq!(user.email, "ada@example.com");
    }
}
