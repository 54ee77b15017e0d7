use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};

use crate::{
    dto::cart::{CartCheckoutRequest, CheckoutResponse},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/checkout", post(checkout))
}

#[utoipa::path(
    post,
    path = "/api/v1/cart/checkout",
    request_body = CartCheckoutRequest,
    responses(
        (status = 200, description = "Order placed", body = CheckoutResponse),
        (status = 400, description = "Invalid cart"),
        (status = 403, description = "Permission denied")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CartCheckoutRequest>, JsonRejection>,
) -> AppResult<Json<CheckoutResponse>> {
    let Json(payload) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let resp = order_service::checkout(&state, &user, payload).await?;
    Ok(Json(resp))
}
