//! # Directory Connector
//!
//! Core abstractions for talking to an identity store (the directory
//! service that holds user and group principals).
//!
//! The provisioning engine never talks to a concrete backend. It drives a
//! [`DirectoryClient`], which exposes exactly the capabilities the
//! reconciliation procedure needs:
//!
//! - look up a group by display name, create a group
//! - look up a user by username, create a user
//! - add a user to a group
//!
//! Lookups return `Ok(None)` when nothing matches; that is a valid outcome,
//! not an error. Any failure of the backend call itself is a
//! [`DirectoryError`].
//!
//! ## Crate Organization
//!
//! - [`ids`] - Opaque principal references (`UserRef`, `GroupRef`, `MembershipRef`)
//! - [`error`] - Backend failure types
//! - [`traits`] - The `DirectoryClient` capability trait and `NewUser`

pub mod error;
pub mod ids;
pub mod traits;

/// Prelude module for convenient imports.
///
/// ```
/// use idstore_connector::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{DirectoryError, DirectoryOperation, DirectoryResult};
    pub use crate::ids::{GroupRef, MembershipRef, UserRef};
    pub use crate::traits::{DirectoryClient, NewUser};
}

// Re-export async_trait for client implementors
pub use async_trait::async_trait;

pub use error::{DirectoryError, DirectoryOperation, DirectoryResult};
pub use ids::{GroupRef, MembershipRef, UserRef};
pub use traits::{DirectoryClient, NewUser};
