//! Shopping Cart Domain Module
//!
//! This module contains the cart side of the application, including:
//! - Domain models (CartItem, StoreSnapshot, HTTP bodies)
//! - Pure cart transitions and formatting helpers
//! - The menu/cart state manager and the session table
//! - REST API handlers

pub mod handlers;
pub mod helpers;
pub mod models;
pub mod state;

// Re-export commonly used types for convenience
pub use handlers::routes;
pub use models::{CartItem, StoreSnapshot};
pub use state::{AppState, RestaurantStore, SharedState};
