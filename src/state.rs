use std::sync::Arc;

use crate::{
    db::DbPool,
    store::{OrderStore, PgOrderStore, PgProductStore, PgUserStore, ProductStore, UserStore},
    token::TokenIssuer,
};

/// Read-only shared state, built once before the listener starts and cloned
/// per request.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub products: Arc<dyn ProductStore>,
    pub orders: Arc<dyn OrderStore>,
    pub tokens: TokenIssuer,
}

impl AppState {
    /// Wire the Postgres-backed stores over one shared pool.
    pub fn postgres(pool: DbPool, tokens: TokenIssuer) -> Self {
        Self {
            users: Arc::new(PgUserStore::new(pool.clone())),
            products: Arc::new(PgProductStore::new(pool.clone())),
            orders: Arc::new(PgOrderStore::new(pool)),
            tokens,
        }
    }
}
