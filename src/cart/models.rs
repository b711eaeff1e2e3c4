//! Cart Domain Models
//!
//! This module contains the cart value records, the snapshot handed to
//! observers, and the HTTP request/response bodies.

use serde::{Deserialize, Serialize};

use crate::menu::MenuItem;

// =============================================================================
// Cart Domain Models
// =============================================================================

/// One line in the cart. `qty` is at least 1; a line that would drop to 0 is
/// removed from the cart instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    /// The menu item, copied by value
    pub item: MenuItem,

    /// Number of units ordered
    pub qty: u32,
}

impl CartItem {
    pub fn new(item: MenuItem) -> Self {
        Self { item, qty: 1 }
    }

    /// Price of this line, `price * qty`
    pub fn line_total(&self) -> f64 {
        self.item.price * f64::from(self.qty)
    }
}

/// Owned view of a store after a transition
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub menu: Vec<MenuItem>,
    pub cart: Vec<CartItem>,
    pub cart_count: u32,
    pub cart_total: f64,
}

// =============================================================================
// HTTP Bodies
// =============================================================================

/// Input for adding a menu item to the cart
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartInput {
    /// Id of a menu item in the session's current menu
    pub item_id: String,
}

/// Input for changing the quantity of a cart line
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeQtyInput {
    pub item_id: String,

    /// Signed change, usually `1` or `-1`
    pub delta: i32,
}

/// Response for session creation and inspection
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// Session identifier
    pub session_id: String,

    pub snapshot: StoreSnapshot,

    /// Display rendering of the cart total, e.g. `PKR 1200`
    pub total_display: String,

    /// Set when the menu load for this request failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu_error: Option<String>,
}
