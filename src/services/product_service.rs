use crate::{
    dto::products::{CreateProductRequest, UpdateProductRequest},
    error::{AppError, AppResult},
    models::{NewProduct, Product},
    state::AppState,
    validate,
};

pub async fn list_products(state: &AppState) -> AppResult<Vec<Product>> {
    state.products.products().await
}

pub async fn create_product(
    state: &AppState,
    payload: CreateProductRequest,
) -> AppResult<Product> {
    validate::validate_product(
        &payload.name,
        &payload.description,
        payload.unit_price,
        payload.quantity_available,
    )
    .map_err(AppError::Validation)?;

    let product = state
        .products
        .create_product(NewProduct {
            name: payload.name,
            description: payload.description,
            image: payload.image.unwrap_or_default(),
            unit_price: payload.unit_price,
            quantity_available: payload.quantity_available,
        })
        .await?;

    tracing::debug!(product_id = product.id, "product created");
    Ok(product)
}

pub async fn update_product(
    state: &AppState,
    id: i32,
    payload: UpdateProductRequest,
) -> AppResult<Product> {
    let mut product = state
        .products
        .products_by_ids(&[id])
        .await?
        .into_iter()
        .next()
        .ok_or(AppError::NotFound)?;

    if let Some(name) = payload.name {
        product.name = name;
    }
    if let Some(description) = payload.description {
        product.description = description;
    }
    if let Some(image) = payload.image {
        product.image = image;
    }
    if let Some(unit_price) = payload.unit_price {
        product.unit_price = unit_price;
    }
    if let Some(quantity_available) = payload.quantity_available {
        product.quantity_available = quantity_available;
    }

    validate::validate_product(
        &product.name,
        &product.description,
        product.unit_price,
        product.quantity_available,
    )
    .map_err(AppError::Validation)?;

    state.products.update_product(product).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

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

    fn laptop() -> CreateProductRequest {
        CreateProductRequest {
            name: "Laptop".to_string(),
            description: "A portable computer".to_string(),
            image: None,
            unit_price: Decimal::new(99900, 2),
            quantity_available: 5,
        }
    }

    #[tokio::test]
    async fn created_product_shows_up_in_listing() {
        let state = memory_state();
        let created = create_product(&state, laptop()).await.unwrap();

        let listed = list_products(&state).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);
        assert_eq!(listed[0].image, "");
    }

    #[tokio::test]
    async fn invalid_price_is_rejected() {
        let state = memory_state();
        let mut payload = laptop();
        payload.unit_price = Decimal::ZERO;

        let err = create_product(&state, payload).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn update_merges_only_provided_fields() {
        let state = memory_state();
        let created = create_product(&state, laptop()).await.unwrap();

        let updated = update_product(
            &state,
            created.id,
            UpdateProductRequest {
                name: None,
                description: None,
                image: None,
                unit_price: Some(Decimal::new(89900, 2)),
                quantity_available: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.name, "Laptop");
        assert_eq!(updated.unit_price, Decimal::new(89900, 2));
        assert_eq!(updated.quantity_available, 5);
    }

    #[tokio::test]
    async fn update_of_missing_product_is_not_found() {
        let state = memory_state();
        let err = update_product(&state, 404, UpdateProductRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn update_cannot_break_validation() {
        let state = memory_state();
        let created = create_product(&state, laptop()).await.unwrap();

        let err = update_product(
            &state,
            created.id,
            UpdateProductRequest {
                name: Some("ab".to_string()),
                ..UpdateProductRequest::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
