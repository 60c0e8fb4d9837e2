//! Run report types
//!
//! Per-record and per-group outcomes of a provisioning run, with totals.

use chrono::{DateTime, Utc};
use idstore_connector::{GroupRef, UserRef};
use serde::Serialize;
use uuid::Uuid;

use crate::record::RowError;

/// Terminal state of one input record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// User was created; group links were attempted.
    Created,
    /// User already existed; nothing else was done.
    Existing,
    /// User creation failed; no group links were attempted.
    CreationFailed,
    /// Row was rejected before reaching the directory.
    Invalid,
}

/// Outcome of linking a user to one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupLinkStatus {
    /// Membership request succeeded.
    Linked,
    /// Group could be neither found nor created.
    GroupUnresolvable,
    /// Group resolved but the membership request failed.
    MembershipFailed,
}

/// Result for one group named by a record.
#[derive(Debug, Clone, Serialize)]
pub struct GroupLinkResult {
    /// Group display name as given in the input.
    pub group: String,
    pub status: GroupLinkStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupRef>,
    /// Whether this link created the group.
    pub group_created: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result for one input record.
#[derive(Debug, Clone, Serialize)]
pub struct RecordResult {
    pub line_number: usize,
    /// Empty when an invalid row had no username.
    pub username: String,
    pub status: RecordStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupLinkResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecordResult {
    /// A record whose user was created.
    pub fn created(
        line_number: usize,
        username: &str,
        user_id: UserRef,
        groups: Vec<GroupLinkResult>,
    ) -> Self {
        Self {
            line_number,
            username: username.to_string(),
            status: RecordStatus::Created,
            user_id: Some(user_id),
            groups,
            error: None,
        }
    }

    /// A record whose user already existed.
    pub fn existing(line_number: usize, username: &str, user_id: UserRef) -> Self {
        Self {
            line_number,
            username: username.to_string(),
            status: RecordStatus::Existing,
            user_id: Some(user_id),
            groups: Vec::new(),
            error: None,
        }
    }

    /// A record whose user could not be created.
    pub fn creation_failed(line_number: usize, username: &str, error: String) -> Self {
        Self {
            line_number,
            username: username.to_string(),
            status: RecordStatus::CreationFailed,
            user_id: None,
            groups: Vec::new(),
            error: Some(error),
        }
    }

    /// A row rejected at the input boundary.
    pub fn invalid(row: &RowError) -> Self {
        Self {
            line_number: row.line_number,
            username: row.username.clone().unwrap_or_default(),
            status: RecordStatus::Invalid,
            user_id: None,
            groups: Vec::new(),
            error: Some(row.message.clone()),
        }
    }
}

/// Summary of a completed provisioning run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// Records seen, including invalid rows.
    pub total: usize,
    pub created: usize,
    pub existing: usize,
    pub failed: usize,
    pub invalid: usize,
    pub memberships_added: usize,
    pub memberships_failed: usize,
    pub groups_created: usize,
    /// Per-record results ordered by line number.
    pub records: Vec<RecordResult>,
}

impl RunReport {
    /// Create an empty report for a run starting now.
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            started_at: Utc::now(),
            duration_ms: 0,
            total: 0,
            created: 0,
            existing: 0,
            failed: 0,
            invalid: 0,
            memberships_added: 0,
            memberships_failed: 0,
            groups_created: 0,
            records: Vec::new(),
        }
    }

    /// Record one result and update the totals.
    pub fn push(&mut self, result: RecordResult) {
        self.total += 1;
        match result.status {
            RecordStatus::Created => self.created += 1,
            RecordStatus::Existing => self.existing += 1,
            RecordStatus::CreationFailed => self.failed += 1,
            RecordStatus::Invalid => self.invalid += 1,
        }

        for link in &result.groups {
            if link.group_created {
                self.groups_created += 1;
            }
            match link.status {
                GroupLinkStatus::Linked => self.memberships_added += 1,
                GroupLinkStatus::GroupUnresolvable | GroupLinkStatus::MembershipFailed => {
                    self.memberships_failed += 1;
                }
            }
        }

        self.records.push(result);
    }

    /// Sort results by line and set the duration.
    pub fn finish(&mut self, duration_ms: u64) {
        self.records.sort_by_key(|r| r.line_number);
        self.duration_ms = duration_ms;
    }

    /// Whether any record or group link did not succeed.
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.invalid > 0 || self.memberships_failed > 0
    }

    /// Get only the records that did not reach a successful terminal state.
    pub fn failed_records(&self) -> impl Iterator<Item = &RecordResult> {
        self.records.iter().filter(|r| {
            matches!(
                r.status,
                RecordStatus::CreationFailed | RecordStatus::Invalid
            ) || r.groups.iter().any(|g| g.status != GroupLinkStatus::Linked)
        })
    }
}
