use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::{
    dto::cart::{CartCheckoutRequest, CheckoutResponse},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{NewOrder, NewOrderItem, Product},
    state::AppState,
    validate,
};

/// Convert a submitted cart into a persisted order plus one line item per
/// cart entry. Single pass, no retries: validation, product resolution,
/// total computation, then one atomic insert.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CartCheckoutRequest,
) -> AppResult<CheckoutResponse> {
    validate::validate_cart(&payload.items).map_err(AppError::Validation)?;

    // Duplicate cart lines collapse to a single fetch per unique id.
    let mut ids: Vec<i32> = payload.items.iter().map(|i| i.product_id).collect();
    ids.sort_unstable();
    ids.dedup();

    let products = state.products.products_by_ids(&ids).await?;

    // The query silently drops unknown ids, so the cardinality check has to
    // be explicit: a partial cart must not become a partial order.
    if products.len() < ids.len() {
        let found: Vec<i32> = products.iter().map(|p| p.id).collect();
        let missing = ids
            .iter()
            .find(|id| !found.contains(*id))
            .copied()
            .unwrap_or_default();
        return Err(AppError::ProductNotFound(missing));
    }

    let by_id: HashMap<i32, &Product> = products.iter().map(|p| (p.id, p)).collect();

    let mut total = Decimal::ZERO;
    let mut items = Vec::with_capacity(payload.items.len());
    for line in &payload.items {
        // Re-checked independently of the resolver; cart ordering and
        // duplication are caller-controlled.
        let product = by_id.get(&line.product_id).ok_or_else(|| {
            AppError::Validation(format!("product with id {} not found", line.product_id))
        })?;

        total += product.unit_price * Decimal::from(line.quantity);
        items.push(NewOrderItem {
            product_id: product.id,
            quantity: line.quantity,
            unit_price: product.unit_price,
        });
    }

    let order = state
        .orders
        .create_order_with_items(
            NewOrder {
                user_id: user.user_id,
                total,
                address: String::new(),
            },
            items,
        )
        .await?;

    tracing::debug!(order_id = order.id, total = %order.total, "checkout completed");
    Ok(CheckoutResponse {
        order_id: order.id,
        total_price: order.total,
    })
}
