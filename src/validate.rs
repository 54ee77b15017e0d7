//! Request payload validation.
//!
//! Validators return `Err(message)` with a client-facing description;
//! callers map the message into `AppError::Validation`.

use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::dto::{
    auth::{LoginRequest, RegisterRequest},
    cart::CartItem,
};

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("email is required".to_string());
    }
    if email.len() > 254 {
        return Err("email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("invalid email format".to_string());
    }
    Ok(())
}

pub fn validate_register(payload: &RegisterRequest) -> Result<(), String> {
    if payload.first_name.trim().is_empty() {
        return Err("first_name is required".to_string());
    }
    if payload.last_name.trim().is_empty() {
        return Err("last_name is required".to_string());
    }
    validate_email(&payload.email)?;
    if payload.password.len() < 3 {
        return Err("password must be at least 3 characters long".to_string());
    }
    if payload.password.len() > 130 {
        return Err("password must be at most 130 characters long".to_string());
    }
    Ok(())
}

pub fn validate_login(payload: &LoginRequest) -> Result<(), String> {
    validate_email(&payload.email)?;
    if payload.password.is_empty() {
        return Err("password is required".to_string());
    }
    Ok(())
}

/// Checkout policy: an empty cart is rejected rather than producing a
/// zero-total order, and every line must carry a quantity between 1 and
/// 10000. The cap keeps line totals inside the range the orders table
/// can store.
pub fn validate_cart(items: &[CartItem]) -> Result<(), String> {
    if items.is_empty() {
        return Err("cart is empty".to_string());
    }
    for item in items {
        if item.quantity <= 0 {
            return Err(format!("invalid quantity for product {}", item.product_id));
        }
        if item.quantity > 10_000 {
            return Err(format!(
                "quantity for product {} must be at most 10000",
                item.product_id
            ));
        }
    }
    Ok(())
}

/// Field-level product checks, shared by create and update (update validates
/// the merged result, not the patch).
pub fn validate_product(
    name: &str,
    description: &str,
    unit_price: Decimal,
    quantity_available: i32,
) -> Result<(), String> {
    if name.trim().len() < 3 {
        return Err("name must be at least 3 characters long".to_string());
    }
    if description.trim().is_empty() {
        return Err("description is required".to_string());
    }
    if unit_price.is_sign_negative() || unit_price.is_zero() {
        return Err("unit_price must be greater than 0".to_string());
    }
    if quantity_available < 0 {
        return Err("quantity_available must not be negative".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_email() {
        assert!(validate_email("user@example.com").is_ok());
    }

    #[test]
    fn rejects_bad_emails() {
        for email in ["", "no-at-sign", "user@", "@example.com", "user@host"] {
            assert!(validate_email(email).is_err(), "accepted {email:?}");
        }
    }

    #[test]
    fn register_requires_names_and_password_bounds() {
        let mut payload = RegisterRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "engine".to_string(),
        };
        assert!(validate_register(&payload).is_ok());

        payload.first_name = " ".to_string();
        assert!(validate_register(&payload).is_err());

        payload.first_name = "Ada".to_string();
        payload.password = "ab".to_string();
        assert!(validate_register(&payload).is_err());

        payload.password = "x".repeat(131);
        assert!(validate_register(&payload).is_err());
    }

    #[test]
    fn cart_rejects_empty_and_non_positive_quantities() {
        assert_eq!(validate_cart(&[]), Err("cart is empty".to_string()));

        let items = vec![CartItem {
            product_id: 3,
            quantity: 0,
        }];
        assert_eq!(
            validate_cart(&items),
            Err("invalid quantity for product 3".to_string())
        );

        let items = vec![CartItem {
            product_id: 3,
            quantity: 2,
        }];
        assert!(validate_cart(&items).is_ok());
    }

    #[test]
    fn cart_rejects_oversized_quantities() {
        let items = vec![CartItem {
            product_id: 7,
            quantity: 2_000_000_000,
        }];
        assert_eq!(
            validate_cart(&items),
            Err("quantity for product 7 must be at most 10000".to_string())
        );

        let items = vec![CartItem {
            product_id: 7,
            quantity: 10_000,
        }];
        assert!(validate_cart(&items).is_ok());
    }

    #[test]
    fn product_requires_positive_price() {
        assert!(validate_product("Widget", "A widget", Decimal::ZERO, 5).is_err());
        assert!(validate_product("Widget", "A widget", Decimal::new(-100, 2), 5).is_err());
        assert!(validate_product("Widget", "A widget", Decimal::new(100, 2), -1).is_err());
        assert!(validate_product("ab", "A widget", Decimal::new(100, 2), 5).is_err());
        assert!(validate_product("Widget", "A widget", Decimal::new(100, 2), 0).is_ok());
    }
}
