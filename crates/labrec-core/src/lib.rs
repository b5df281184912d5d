//! # labrec-core
//!
//! Core types, traits, and abstractions for labrec, the research-group
//! record keeper (experiments, thesis progress, literature, daily logs).
//!
//! This crate provides the data structures and the repository traits that
//! the database layer implements and the HTTP layer consumes.

pub mod error;
pub mod models;
pub mod temporal;
pub mod traits;
pub mod upload;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use temporal::{day_bounds, local_day, parse_day, parse_utc_offset};
pub use traits::*;
pub use upload::{
    generate_stored_name, is_allowed_mime, within_size_limit, ALLOWED_MIME_TYPES,
    MAX_UPLOAD_BYTES, UPLOAD_FIELD,
};
