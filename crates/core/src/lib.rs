//! Core business logic for polling-system.

pub mod services;

pub use services::*;
