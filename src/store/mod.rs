//! Storage capabilities, one trait per entity family.
//!
//! Handlers and services only ever see these traits; `AppState` carries them
//! as `Arc<dyn …>` so the Postgres implementations and the in-memory test
//! implementations are interchangeable.

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{NewOrder, NewOrderItem, NewProduct, NewUser, Order, Product, User},
};

pub mod memory;
pub mod postgres;

pub use memory::{MemoryOrderStore, MemoryProductStore, MemoryUserStore};
pub use postgres::{PgOrderStore, PgProductStore, PgUserStore};

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn user_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn user_by_id(&self, id: i32) -> AppResult<Option<User>>;
    async fn create_user(&self, user: NewUser) -> AppResult<User>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn products(&self) -> AppResult<Vec<Product>>;

    /// Fetch exactly the requested ids. Callers must not assume every id was
    /// found; the result may be smaller than the input.
    async fn products_by_ids(&self, ids: &[i32]) -> AppResult<Vec<Product>>;

    async fn create_product(&self, product: NewProduct) -> AppResult<Product>;
    async fn update_product(&self, product: Product) -> AppResult<Product>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist an order and its line items as a single atomic unit: either
    /// the order row and every item row commit, or nothing does.
    async fn create_order_with_items(
        &self,
        order: NewOrder,
        items: Vec<NewOrderItem>,
    ) -> AppResult<Order>;
}
