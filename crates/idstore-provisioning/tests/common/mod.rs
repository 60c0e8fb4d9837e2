//! Test helpers for idstore-provisioning.
//!
//! Provides an in-memory directory that records every call and can be
//! configured to fail specific operations.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, Once};

use async_trait::async_trait;
use idstore_connector::{
    DirectoryClient, DirectoryError, DirectoryOperation, DirectoryResult, GroupRef, MembershipRef,
    NewUser, UserRef,
};
use idstore_provisioning::UserRecord;

static INIT: Once = Once::new();

/// Initialize logging for tests (once).
pub fn init_test_logging() {
    INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::fmt()
                .with_test_writer()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .try_init()
                .ok();
        }
    });
}

/// A call observed by [`RecordingDirectory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    FindGroup(String),
    CreateGroup(String),
    FindUser(String),
    CreateUser(String),
    /// (username, group display name)
    CreateMembership(String, String),
}

#[derive(Debug, Default)]
struct State {
    users: HashMap<String, UserRef>,
    groups: HashMap<String, GroupRef>,
    memberships: Vec<(UserRef, GroupRef)>,
    calls: Vec<Call>,
    next_id: usize,
    fail_find_group: HashSet<String>,
    fail_create_group: HashSet<String>,
    fail_find_user: HashSet<String>,
    fail_create_user: HashSet<String>,
    fail_membership: HashSet<String>,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn username_of(&self, user: &UserRef) -> String {
        self.users
            .iter()
            .find(|(_, id)| *id == user)
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| user.to_string())
    }

    fn group_name_of(&self, group: &GroupRef) -> String {
        self.groups
            .iter()
            .find(|(_, id)| *id == group)
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| group.to_string())
    }
}

/// In-memory identity store that records every call.
#[derive(Debug, Default)]
pub struct RecordingDirectory {
    state: Mutex<State>,
}

impl RecordingDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing user.
    pub fn with_user(self, username: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let id = UserRef::new(state.next_id("user"));
            state.users.insert(username.to_string(), id);
        }
        self
    }

    /// Seed an existing group.
    pub fn with_group(self, display_name: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let id = GroupRef::new(state.next_id("group"));
            state.groups.insert(display_name.to_string(), id);
        }
        self
    }

    pub fn failing_find_group(self, display_name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .fail_find_group
            .insert(display_name.to_string());
        self
    }

    pub fn failing_create_group(self, display_name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .fail_create_group
            .insert(display_name.to_string());
        self
    }

    pub fn failing_find_user(self, username: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .fail_find_user
            .insert(username.to_string());
        self
    }

    pub fn failing_create_user(self, username: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .fail_create_user
            .insert(username.to_string());
        self
    }

    /// Fail every membership request targeting this group.
    pub fn failing_membership(self, display_name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .fail_membership
            .insert(display_name.to_string());
        self
    }

    /// Allow group creation again (simulates the backend recovering).
    pub fn recover_create_group(&self, display_name: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_create_group
            .remove(display_name);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state.lock().unwrap().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn create_user_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::CreateUser(_)))
    }

    pub fn create_group_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::CreateGroup(_)))
    }

    pub fn find_group_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::FindGroup(_)))
    }

    pub fn membership_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::CreateMembership(_, _)))
    }

    pub fn has_user(&self, username: &str) -> bool {
        self.state.lock().unwrap().users.contains_key(username)
    }

    pub fn has_group(&self, display_name: &str) -> bool {
        self.state.lock().unwrap().groups.contains_key(display_name)
    }

    /// Memberships as (username, group display name) pairs.
    pub fn memberships(&self) -> Vec<(String, String)> {
        let state = self.state.lock().unwrap();
        state
            .memberships
            .iter()
            .map(|(u, g)| (state.username_of(u), state.group_name_of(g)))
            .collect()
    }
}

#[async_trait]
impl DirectoryClient for RecordingDirectory {
    async fn find_group_by_display_name(
        &self,
        display_name: &str,
    ) -> DirectoryResult<Option<GroupRef>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::FindGroup(display_name.to_string()));

        if state.fail_find_group.contains(display_name) {
            return Err(DirectoryError::service_failure(
                DirectoryOperation::FindGroup,
                "simulated outage",
            ));
        }
        Ok(state.groups.get(display_name).cloned())
    }

    async fn create_group(&self, display_name: &str) -> DirectoryResult<GroupRef> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateGroup(display_name.to_string()));

        if state.fail_create_group.contains(display_name) {
            return Err(DirectoryError::service_failure(
                DirectoryOperation::CreateGroup,
                "simulated outage",
            ));
        }
        if state.groups.contains_key(display_name) {
            return Err(DirectoryError::conflict(
                DirectoryOperation::CreateGroup,
                display_name,
            ));
        }

        let id = GroupRef::new(state.next_id("group"));
        state.groups.insert(display_name.to_string(), id.clone());
        Ok(id)
    }

    async fn find_user_by_username(&self, username: &str) -> DirectoryResult<Option<UserRef>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::FindUser(username.to_string()));

        if state.fail_find_user.contains(username) {
            return Err(DirectoryError::service_failure(
                DirectoryOperation::FindUser,
                "simulated outage",
            ));
        }
        Ok(state.users.get(username).cloned())
    }

    async fn create_user(&self, user: &NewUser<'_>) -> DirectoryResult<UserRef> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateUser(user.username.to_string()));

        if state.fail_create_user.contains(user.username) {
            return Err(DirectoryError::invalid_request(
                DirectoryOperation::CreateUser,
                "simulated validation failure",
            ));
        }
        if state.users.contains_key(user.username) {
            return Err(DirectoryError::conflict(
                DirectoryOperation::CreateUser,
                user.username,
            ));
        }

        let id = UserRef::new(state.next_id("user"));
        state.users.insert(user.username.to_string(), id.clone());
        Ok(id)
    }

    async fn create_membership(
        &self,
        user: &UserRef,
        group: &GroupRef,
    ) -> DirectoryResult<MembershipRef> {
        let mut state = self.state.lock().unwrap();
        let username = state.username_of(user);
        let group_name = state.group_name_of(group);
        state
            .calls
            .push(Call::CreateMembership(username, group_name.clone()));

        if state.fail_membership.contains(&group_name) {
            return Err(DirectoryError::throttled(
                DirectoryOperation::CreateMembership,
                "simulated throttling",
            ));
        }

        state.memberships.push((user.clone(), group.clone()));
        Ok(MembershipRef::new(state.next_id("membership")))
    }
}

/// Build a record the way the input parser would.
pub fn record(line_number: usize, username: &str, groups: &[&str]) -> UserRecord {
    UserRecord {
        line_number,
        username: username.to_string(),
        first_name: "First".to_string(),
        last_name: "Last".to_string(),
        display_name: format!("{username} display"),
        email: format!("{username}@example.com"),
        groups: groups.iter().map(|g| (*g).to_string()).collect(),
    }
}
