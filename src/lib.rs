//! Restaurant Ordering Library
//!
//! This library provides the core of a restaurant ordering application: a
//! menu loaded from a remote document store, a cart built from it, and the
//! HTTP surface that drives both.

// Domain modules
pub mod cart;
pub mod menu;

// Infrastructure
pub mod config;
pub mod error;
pub mod router;
