//! Shopping Cart Business Logic Helpers
//!
//! Pure transitions over a cart (`Vec<CartItem>`), the derived reads, and
//! display formatting. The state manager wraps these; they never fail.

use super::models::CartItem;
use crate::menu::MenuItem;
use uuid::Uuid;

/// Label printed in front of every displayed price
pub const CURRENCY_LABEL: &str = "PKR";

/// Creates a fresh, non-empty session identifier.
pub fn new_session_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Adds one unit of `item` to the cart.
///
/// # Behaviour
///
/// * If a line with the same item id exists, its `qty` is increased by 1.
/// * Otherwise a new line with `qty = 1` is appended, so display order
///   follows first insertion.
pub fn add_item(cart: &mut Vec<CartItem>, item: &MenuItem) {
    if let Some(existing) = cart.iter_mut().find(|line| line.item.id == item.id) {
        existing.qty = existing.qty.saturating_add(1);
    } else {
        cart.push(CartItem::new(item.clone()));
    }
}

/// Applies `delta` to the line matching `item_id`, removing the line once its
/// quantity reaches zero or below. Unknown ids leave the cart untouched.
pub fn change_item_qty(cart: &mut Vec<CartItem>, item_id: &str, delta: i32) {
    let Some(pos) = cart.iter().position(|line| line.item.id == item_id) else {
        return;
    };

    let new_qty = i64::from(cart[pos].qty) + i64::from(delta);
    if new_qty <= 0 {
        cart.remove(pos);
    } else {
        cart[pos].qty = u32::try_from(new_qty).unwrap_or(u32::MAX);
    }
}

/// Total number of units across all lines.
pub fn cart_count(cart: &[CartItem]) -> u32 {
    cart.iter().map(|line| line.qty).sum()
}

/// Sum of `price * qty` across all lines, unrounded.
pub fn cart_total(cart: &[CartItem]) -> f64 {
    cart.iter().fold(0.0, |total, line| total + line.line_total())
}

/// Renders an amount for display, rounded to whole units: `"PKR 1200"`.
pub fn format_price(amount: f64) -> String {
    format!("{CURRENCY_LABEL} {amount:.0}")
}

/// Produces a human-readable one-line summary for a list of cart items.
///
/// Example output: `"2x Burger, 1x Fries"`.
pub fn format_item_summary(items: &[CartItem]) -> String {
    items
        .iter()
        .map(|i| format!("{}x {}", i.qty, i.item.name))
        .collect::<Vec<_>>()
        .join(", ")
}
