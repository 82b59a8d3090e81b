//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod advice;
pub mod expenses;
pub mod health;
pub mod qa;
pub mod sessions;

// Re-export all handlers for use in router
pub use advice::*;
pub use expenses::*;
pub use health::*;
pub use qa::*;
pub use sessions::*;
