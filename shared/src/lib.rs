//! Bookshelf Shared Library
//!
//! Request/response types and input validation shared between the
//! backend and its clients.

pub mod types;
pub mod validation;

pub use types::*;
