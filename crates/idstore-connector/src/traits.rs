//! Directory client trait
//!
//! Capability-based view of the identity store. Implementations wrap a
//! concrete backend (an SDK client, an HTTP API, an in-memory fake) and
//! translate its failures into [`DirectoryError`](crate::error::DirectoryError).

use async_trait::async_trait;

use crate::error::DirectoryResult;
use crate::ids::{GroupRef, MembershipRef, UserRef};

/// Attributes required to create a user principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewUser<'a> {
    /// Unique login name.
    pub username: &'a str,
    /// Given (first) name.
    pub given_name: &'a str,
    /// Family (last) name.
    pub family_name: &'a str,
    /// Human-readable display name.
    pub display_name: &'a str,
    /// Primary work email address.
    pub email: &'a str,
}

/// The identity store operations the provisioning engine relies on.
///
/// Lookups return `Ok(None)` when no principal matches. An `Err` always
/// means the call itself failed.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Find a group by its display name.
    ///
    /// Display names are not guaranteed unique by every backend; the first
    /// match is returned.
    async fn find_group_by_display_name(
        &self,
        display_name: &str,
    ) -> DirectoryResult<Option<GroupRef>>;

    /// Create a group with the given display name.
    async fn create_group(&self, display_name: &str) -> DirectoryResult<GroupRef>;

    /// Find a user by username.
    async fn find_user_by_username(&self, username: &str) -> DirectoryResult<Option<UserRef>>;

    /// Create a user.
    async fn create_user(&self, user: &NewUser<'_>) -> DirectoryResult<UserRef>;

    /// Add a user to a group.
    ///
    /// Does not check whether the membership already exists.
    async fn create_membership(
        &self,
        user: &UserRef,
        group: &GroupRef,
    ) -> DirectoryResult<MembershipRef>;
}
