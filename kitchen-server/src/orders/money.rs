//! Money calculation using rust_decimal
//!
//! Totals are computed with `Decimal` and stored as `f64` rounded to 2 decimal
//! places (half-up).

use rust_decimal::prelude::*;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::order::LineItem;

const DECIMAL_PLACES: u32 = 2;

/// Minimum order total (0.50)
pub const MIN_ORDER_TOTAL: Decimal = Decimal::from_parts(50, 0, 0, false, 2);

/// Maximum allowed unit price
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per line
const MAX_QUANTITY: u32 = 9999;

pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64, rounded to 2 decimal places
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

fn out_of_range(msg: String) -> AppError {
    AppError::with_message(ErrorCode::ValueOutOfRange, msg)
}

/// Validate a single line item
pub fn validate_line_item(item: &LineItem) -> AppResult<()> {
    if item.title.trim().is_empty() {
        return Err(AppError::required_field("item title"));
    }
    if !item.price.is_finite() || item.price < 0.0 {
        return Err(out_of_range(format!(
            "price must be a non-negative number, got {}",
            item.price
        )));
    }
    if item.price > MAX_PRICE {
        return Err(out_of_range(format!(
            "price exceeds maximum allowed ({}), got {}",
            MAX_PRICE, item.price
        )));
    }
    if item.qty == 0 || item.qty > MAX_QUANTITY {
        return Err(out_of_range(format!(
            "qty must be between 1 and {}, got {}",
            MAX_QUANTITY, item.qty
        )));
    }
    Ok(())
}

/// Line total (unit price × qty)
pub fn line_total(item: &LineItem) -> Decimal {
    (to_decimal(item.price) * Decimal::from(item.qty))
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Validate items and compute the order total
///
/// Rejects empty orders and totals below [`MIN_ORDER_TOTAL`].
pub fn order_total(items: &[LineItem]) -> AppResult<f64> {
    if items.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }
    for item in items {
        validate_line_item(item)?;
    }

    let total: Decimal = items.iter().map(line_total).sum();
    if total < MIN_ORDER_TOTAL {
        return Err(AppError::with_message(
            ErrorCode::PaymentInsufficientAmount,
            format!("Order total must be at least {}", MIN_ORDER_TOTAL),
        )
        .with_detail("total", to_f64(total)));
    }

    Ok(to_f64(total))
}
