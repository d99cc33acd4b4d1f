//! Axum route handlers.

pub mod crud;
pub mod policies;
pub mod stats;
