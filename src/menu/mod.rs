//! Menu Domain Module
//!
//! This module contains everything needed to obtain the restaurant menu:
//! - Domain models (MenuItem, raw provider records)
//! - The repository contract and its static adapter
//! - The Firestore adapter

pub mod firestore;
pub mod models;
pub mod repository;

// Re-export commonly used types for convenience
pub use firestore::FirestoreRestaurantRepository;
pub use models::MenuItem;
pub use repository::{RestaurantRepository, StaticRestaurantRepository};
