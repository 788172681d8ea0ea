// src/core/mod.rs

//! Core data structures and types

pub mod basis;
pub mod constants;
pub mod error;
pub mod rng;

// Re-export public types for convenient access via `qmines::core::TypeName`
pub use basis::Basis;
pub use error::{QmsError, Result};
pub use rng::BoardRng;
