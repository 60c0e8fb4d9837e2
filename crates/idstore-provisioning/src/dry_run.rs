//! Dry-run directory wrapper.
//!
//! Forwards lookups to the real directory and answers every write with a
//! synthetic reference, so a run can be previewed without changing the
//! identity store. Principals "created" during the preview are remembered,
//! so later lookups in the same run see them just as they would after a
//! real write.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use idstore_connector::{
    DirectoryClient, DirectoryResult, GroupRef, MembershipRef, NewUser, UserRef,
};
use tracing::info;

/// Prefix of every synthetic reference handed out in dry-run mode.
pub const DRY_RUN_PREFIX: &str = "dry-run:";

/// A [`DirectoryClient`] that never writes.
#[derive(Debug)]
pub struct DryRunDirectory<D> {
    inner: D,
    planned_groups: RwLock<HashMap<String, GroupRef>>,
    planned_users: RwLock<HashMap<String, UserRef>>,
}

impl<D: DirectoryClient> DryRunDirectory<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            planned_groups: RwLock::new(HashMap::new()),
            planned_users: RwLock::new(HashMap::new()),
        }
    }

    pub fn into_inner(self) -> D {
        self.inner
    }

    fn planned_group(&self, display_name: &str) -> Option<GroupRef> {
        self.planned_groups
            .read()
            .ok()
            .and_then(|groups| groups.get(display_name).cloned())
    }

    fn planned_user(&self, username: &str) -> Option<UserRef> {
        self.planned_users
            .read()
            .ok()
            .and_then(|users| users.get(username).cloned())
    }
}

#[async_trait]
impl<D: DirectoryClient> DirectoryClient for DryRunDirectory<D> {
    async fn find_group_by_display_name(
        &self,
        display_name: &str,
    ) -> DirectoryResult<Option<GroupRef>> {
        if let Some(group_id) = self.planned_group(display_name) {
            return Ok(Some(group_id));
        }
        self.inner.find_group_by_display_name(display_name).await
    }

    async fn create_group(&self, display_name: &str) -> DirectoryResult<GroupRef> {
        info!(group = %display_name, "Dry run: would create group");
        let group_id = GroupRef::new(format!("{DRY_RUN_PREFIX}group:{display_name}"));
        if let Ok(mut groups) = self.planned_groups.write() {
            groups.insert(display_name.to_string(), group_id.clone());
        }
        Ok(group_id)
    }

    async fn find_user_by_username(&self, username: &str) -> DirectoryResult<Option<UserRef>> {
        if let Some(user_id) = self.planned_user(username) {
            return Ok(Some(user_id));
        }
        self.inner.find_user_by_username(username).await
    }

    async fn create_user(&self, user: &NewUser<'_>) -> DirectoryResult<UserRef> {
        info!(username = %user.username, "Dry run: would create user");
        let user_id = UserRef::new(format!("{DRY_RUN_PREFIX}user:{}", user.username));
        if let Ok(mut users) = self.planned_users.write() {
            users.insert(user.username.to_string(), user_id.clone());
        }
        Ok(user_id)
    }

    async fn create_membership(
        &self,
        user: &UserRef,
        group: &GroupRef,
    ) -> DirectoryResult<MembershipRef> {
        info!(user_id = %user, group_id = %group, "Dry run: would add user to group");
        Ok(MembershipRef::new(format!("{DRY_RUN_PREFIX}membership:{user}:{group}")))
    }
}
