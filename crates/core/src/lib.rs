//! `aula-core`: foundation primitives shared by every Aula crate.
//!
//! This crate contains **pure** building blocks (no I/O, no HTTP).

pub mod error;
pub mod role;

pub use error::{ApiError, ApiResult};
pub use role::Role;
