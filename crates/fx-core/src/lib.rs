//! fixit/crates/fx-core/src/lib.rs
//!
//! The central domain logic and interface definitions for FixIt.

pub mod models;
pub mod traits;
pub mod error;

pub mod policy;
pub mod posting;
pub mod thread;
pub mod accounts;
pub mod communities;
pub mod media;
pub mod votes;

// Re-exporting for easier access in other crates
pub use models::*;
pub use traits::*;
pub use error::*;
