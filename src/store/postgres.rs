use async_trait::async_trait;

use crate::{
    db::DbPool,
    error::{AppError, AppResult},
    models::{NewOrder, NewOrderItem, NewProduct, NewUser, Order, OrderStatus, Product, User},
    store::{OrderStore, ProductStore, UserStore},
};

#[derive(Clone)]
pub struct PgUserStore {
    pool: DbPool,
}

impl PgUserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn user_by_id(&self, id: i32) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (first_name, last_name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(&user.email)
        .bind(user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            // The unique index on email backs up the service-level check.
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Validation(format!("user with email {} already exists", user.email))
            }
            _ => AppError::Db(e),
        })
    }
}

#[derive(Clone)]
pub struct PgProductStore {
    pool: DbPool,
}

impl PgProductStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn products(&self) -> AppResult<Vec<Product>> {
        let items = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    async fn products_by_ids(&self, ids: &[i32]) -> AppResult<Vec<Product>> {
        let items =
            sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ANY($1) ORDER BY id")
                .bind(ids)
                .fetch_all(&self.pool)
                .await?;
        Ok(items)
    }

    async fn create_product(&self, product: NewProduct) -> AppResult<Product> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, description, image, unit_price, quantity_available)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(product.name)
        .bind(product.description)
        .bind(product.image)
        .bind(product.unit_price)
        .bind(product.quantity_available)
        .fetch_one(&self.pool)
        .await?;
        Ok(product)
    }

    async fn update_product(&self, product: Product) -> AppResult<Product> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $2, description = $3, image = $4, unit_price = $5, quantity_available = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(product.id)
        .bind(product.name)
        .bind(product.description)
        .bind(product.image)
        .bind(product.unit_price)
        .bind(product.quantity_available)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound)?;
        Ok(product)
    }
}

#[derive(Clone)]
pub struct PgOrderStore {
    pool: DbPool,
}

impl PgOrderStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create_order_with_items(
        &self,
        order: NewOrder,
        items: Vec<NewOrderItem>,
    ) -> AppResult<Order> {
        let mut tx = self.pool.begin().await?;

        // The order row goes in first; item rows reference its generated id.
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (user_id, total, status, address)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(order.user_id)
        .bind(order.total)
        .bind(OrderStatus::Pending)
        .bind(order.address)
        .fetch_one(&mut *tx)
        .await?;

        for item in &items {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, product_id, quantity, unit_price)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(order.id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(order)
    }
}
