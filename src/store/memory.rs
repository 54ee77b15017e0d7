//! In-memory store implementations backing the tests.
//!
//! Data lives in mutex-guarded vectors and is lost on drop. Each store also
//! exposes a few inspection helpers the trait does not need, so tests can
//! assert on what was (or was not) persisted.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{
        NewOrder, NewOrderItem, NewProduct, NewUser, Order, OrderItem, OrderStatus, Product, User,
    },
    store::{OrderStore, ProductStore, UserStore},
};

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn user_by_id(&self, id: i32) -> AppResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Validation(format!(
                "user with email {} already exists",
                user.email
            )));
        }
        let created = User {
            id: users.len() as i32 + 1,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.push(created.clone());
        Ok(created)
    }
}

#[derive(Default)]
pub struct MemoryProductStore {
    products: Mutex<Vec<Product>>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed one product, assigning the next id.
    pub fn insert(&self, product: NewProduct) -> Product {
        let mut products = self.products.lock().unwrap();
        let created = Product {
            id: products.len() as i32 + 1,
            name: product.name,
            description: product.description,
            image: product.image,
            unit_price: product.unit_price,
            quantity_available: product.quantity_available,
            created_at: Utc::now(),
        };
        products.push(created.clone());
        created
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn products(&self) -> AppResult<Vec<Product>> {
        Ok(self.products.lock().unwrap().clone())
    }

    async fn products_by_ids(&self, ids: &[i32]) -> AppResult<Vec<Product>> {
        // One row per matching id, like `WHERE id = ANY($1)`.
        let wanted: HashSet<i32> = ids.iter().copied().collect();
        let products = self.products.lock().unwrap();
        Ok(products
            .iter()
            .filter(|p| wanted.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn create_product(&self, product: NewProduct) -> AppResult<Product> {
        Ok(self.insert(product))
    }

    async fn update_product(&self, product: Product) -> AppResult<Product> {
        let mut products = self.products.lock().unwrap();
        let slot = products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or(AppError::NotFound)?;
        *slot = product.clone();
        Ok(product)
    }
}

#[derive(Default)]
pub struct MemoryOrderStore {
    inner: Mutex<OrderRows>,
}

#[derive(Default)]
struct OrderRows {
    orders: Vec<Order>,
    items: Vec<OrderItem>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn orders(&self) -> Vec<Order> {
        self.inner.lock().unwrap().orders.clone()
    }

    pub fn items_for(&self, order_id: i32) -> Vec<OrderItem> {
        self.inner
            .lock()
            .unwrap()
            .items
            .iter()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect()
    }

    pub fn order_count(&self) -> usize {
        self.inner.lock().unwrap().orders.len()
    }

    pub fn item_count(&self) -> usize {
        self.inner.lock().unwrap().items.len()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn create_order_with_items(
        &self,
        order: NewOrder,
        items: Vec<NewOrderItem>,
    ) -> AppResult<Order> {
        // A single lock makes the pair of inserts as atomic as the
        // Postgres transaction it stands in for.
        let mut rows = self.inner.lock().unwrap();
        let created = Order {
            id: rows.orders.len() as i32 + 1,
            user_id: order.user_id,
            total: order.total,
            status: OrderStatus::Pending,
            address: order.address,
            created_at: Utc::now(),
        };
        rows.orders.push(created.clone());
        for item in items {
            let id = rows.items.len() as i32 + 1;
            rows.items.push(OrderItem {
                id,
                order_id: created.id,
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price,
                created_at: created.created_at,
            });
        }
        Ok(created)
    }
}
