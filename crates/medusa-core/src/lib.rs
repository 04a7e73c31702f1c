//! Medusa Core - Foundational types for the Medusa generation toolkit
//!
//! This crate provides the types every other Medusa crate depends on:
//! - `MedusaError` and the `Result` alias
//! - `ContentHash` - SHA-256 based content hashing for downloaded media

mod error;
mod hash;

pub use error::{MedusaError, Result};
pub use hash::ContentHash;
