//! Shared types and models for the WMS Basic warehouse platform
//!
//! This crate contains the domain models and every deterministic rule of the
//! system (range expansion, stock mutation, stock aggregation, rack layout),
//! shared between the backend, the browser front-end (via WASM), and tests.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
