//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod auth;
pub mod budgets;
pub mod expenses;

// Re-export all handlers for use in router
pub use auth::*;
pub use budgets::*;
pub use expenses::*;
