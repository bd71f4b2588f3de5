//! # boxoffice-core
//!
//! Core crate for BoxOffice. Contains configuration schemas, typed
//! identifiers, and the unified error system shared by the cache, venue,
//! and simulator crates.
//!
//! This crate has **no** internal dependencies on other BoxOffice crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
