//! # crater_core - Shared Identifiers
//!
//! Small value types every Crater crate agrees on:
//! - Actor and connection identifiers
//! - Named identifiers with a precomputed hash
//! - A thread-safe generator for handle values

pub mod id;

pub use id::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::id::{ActorId, ConnectionId, IdGenerator, NamedId};
}
