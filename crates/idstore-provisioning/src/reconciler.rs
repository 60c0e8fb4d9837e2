//! Idempotent reconciliation of input records against the identity store.
//!
//! For each record the reconciler looks the user up, creates it only when it
//! is absent, then resolves and links every group the record names. The
//! backend offers no upsert, so "check, then create" is best effort: a
//! concurrent writer between the two calls is not detected.
//!
//! Every directory failure is logged and turned into an outcome. A run never
//! aborts because of one record or one group.

use std::collections::HashMap;
use std::time::Instant;

use idstore_connector::{DirectoryClient, DirectoryError, GroupRef, UserRef};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::record::{ParsedInput, UserRecord};
use crate::report::{GroupLinkResult, GroupLinkStatus, RecordResult, RunReport};

/// Tuning knobs for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Remember resolved groups for the rest of the run.
    ///
    /// Unresolvable groups are never remembered, so later records retry
    /// both lookup and creation.
    pub cache_groups: bool,
}

/// How a group name was resolved.
#[derive(Debug)]
pub enum GroupResolution {
    /// The group already existed (or was resolved earlier in this run).
    Found(GroupRef),
    /// The group was created by this call.
    Created(GroupRef),
    /// Neither lookup nor creation produced a group.
    Unresolvable(DirectoryError),
}

/// How a record's user was resolved.
#[derive(Debug)]
pub enum UserResolution {
    /// The user did not exist and was created.
    Created(UserRef),
    /// The user already exists; the record is skipped.
    AlreadyExists(UserRef),
    /// Creation failed; the record is skipped.
    Unresolvable(DirectoryError),
}

/// Drives create-or-reuse semantics for users and groups.
pub struct Reconciler<'a, D: DirectoryClient + ?Sized> {
    directory: &'a D,
    options: ReconcileOptions,
    group_cache: HashMap<String, GroupRef>,
}

impl<'a, D: DirectoryClient + ?Sized> Reconciler<'a, D> {
    /// Create a reconciler over `directory`.
    pub fn new(directory: &'a D, options: ReconcileOptions) -> Self {
        Self {
            directory,
            options,
            group_cache: HashMap::new(),
        }
    }

    /// Resolve a group by display name, creating it when absent.
    ///
    /// A failed lookup is treated like "not found" and creation is attempted.
    pub async fn resolve_group(&mut self, name: &str) -> GroupResolution {
        if let Some(group_id) = self.group_cache.get(name) {
            debug!(group = %name, group_id = %group_id, "Group resolved from run cache");
            return GroupResolution::Found(group_id.clone());
        }

        match self.directory.find_group_by_display_name(name).await {
            Ok(Some(group_id)) => {
                debug!(group = %name, group_id = %group_id, "Group found");
                self.remember_group(name, &group_id);
                return GroupResolution::Found(group_id);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(group = %name, error = %e, "Group lookup failed, attempting creation");
            }
        }

        match self.directory.create_group(name).await {
            Ok(group_id) => {
                info!(group = %name, group_id = %group_id, "Group created");
                self.remember_group(name, &group_id);
                GroupResolution::Created(group_id)
            }
            Err(e) => {
                error!(group = %name, error = %e, "Group creation failed");
                GroupResolution::Unresolvable(e)
            }
        }
    }

    /// Resolve the record's user, creating it when absent.
    ///
    /// A failed lookup is treated like "not found" and creation is attempted;
    /// a user that does exist then surfaces as a creation conflict.
    pub async fn resolve_user(&self, record: &UserRecord) -> UserResolution {
        let username = record.username.as_str();

        match self.directory.find_user_by_username(username).await {
            Ok(Some(user_id)) => {
                info!(username = %username, user_id = %user_id, "User already exists, skipping");
                return UserResolution::AlreadyExists(user_id);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(username = %username, error = %e, "User lookup failed, attempting creation");
            }
        }

        match self.directory.create_user(&record.as_new_user()).await {
            Ok(user_id) => {
                info!(username = %username, user_id = %user_id, "User created");
                UserResolution::Created(user_id)
            }
            Err(e) => {
                error!(username = %username, error = %e, "User creation failed");
                UserResolution::Unresolvable(e)
            }
        }
    }

    /// Resolve each named group and add the user to it.
    ///
    /// Names are trimmed and empty names skipped. Each group is independent:
    /// a failure never prevents the following groups from being processed.
    pub async fn link_user_to_groups(
        &mut self,
        user_id: &UserRef,
        group_names: &[String],
    ) -> Vec<GroupLinkResult> {
        let mut links = Vec::with_capacity(group_names.len());

        for name in group_names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
            let (group_id, group_created) = match self.resolve_group(name).await {
                GroupResolution::Found(group_id) => (group_id, false),
                GroupResolution::Created(group_id) => (group_id, true),
                GroupResolution::Unresolvable(e) => {
                    error!(
                        user_id = %user_id,
                        group = %name,
                        error = %e,
                        "Skipping membership, group could not be resolved"
                    );
                    links.push(GroupLinkResult {
                        group: name.to_string(),
                        status: GroupLinkStatus::GroupUnresolvable,
                        group_id: None,
                        group_created: false,
                        error: Some(e.to_string()),
                    });
                    continue;
                }
            };

            let (status, error) = match self.directory.create_membership(user_id, &group_id).await
            {
                Ok(membership_id) => {
                    info!(
                        user_id = %user_id,
                        group = %name,
                        group_id = %group_id,
                        membership_id = %membership_id,
                        "User added to group"
                    );
                    (GroupLinkStatus::Linked, None)
                }
                Err(e) => {
                    error!(
                        user_id = %user_id,
                        group = %name,
                        group_id = %group_id,
                        error = %e,
                        "Membership creation failed"
                    );
                    (GroupLinkStatus::MembershipFailed, Some(e.to_string()))
                }
            };

            links.push(GroupLinkResult {
                group: name.to_string(),
                status,
                group_id: Some(group_id),
                group_created,
                error,
            });
        }

        links
    }

    /// Take one record to its terminal state.
    pub async fn process_record(&mut self, record: &UserRecord) -> RecordResult {
        match self.resolve_user(record).await {
            UserResolution::AlreadyExists(user_id) => {
                RecordResult::existing(record.line_number, &record.username, user_id)
            }
            UserResolution::Unresolvable(e) => {
                RecordResult::creation_failed(record.line_number, &record.username, e.to_string())
            }
            UserResolution::Created(user_id) => {
                let links = self.link_user_to_groups(&user_id, &record.groups).await;
                RecordResult::created(record.line_number, &record.username, user_id, links)
            }
        }
    }

    /// Process `records` in input order.
    pub async fn run(&mut self, records: &[UserRecord]) -> RunReport {
        self.run_with_rejects(records, &[]).await
    }

    /// Process a parsed input table, reporting rejected rows alongside.
    pub async fn run_input(&mut self, input: &ParsedInput) -> RunReport {
        for row in &input.errors {
            warn!(
                line = row.line_number,
                username = row.username.as_deref().unwrap_or(""),
                column = row.column.as_deref().unwrap_or(""),
                error = %row.message,
                "Skipping invalid row"
            );
        }

        self.run_with_rejects(&input.records, &input.errors).await
    }

    async fn run_with_rejects(
        &mut self,
        records: &[UserRecord],
        rejects: &[crate::record::RowError],
    ) -> RunReport {
        let started = Instant::now();
        let mut report = RunReport::new(Uuid::new_v4());

        info!(
            run_id = %report.run_id,
            records = records.len(),
            invalid_rows = rejects.len(),
            cache_groups = self.options.cache_groups,
            "Starting provisioning run"
        );

        for row in rejects {
            report.push(RecordResult::invalid(row));
        }

        for record in records {
            let result = self.process_record(record).await;
            report.push(result);
        }

        report.finish(u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX));

        info!(
            run_id = %report.run_id,
            created = report.created,
            existing = report.existing,
            failed = report.failed,
            invalid = report.invalid,
            memberships_added = report.memberships_added,
            memberships_failed = report.memberships_failed,
            groups_created = report.groups_created,
            duration_ms = report.duration_ms,
            "Provisioning run completed"
        );

        report
    }

    fn remember_group(&mut self, name: &str, group_id: &GroupRef) {
        if self.options.cache_groups {
            self.group_cache.insert(name.to_string(), group_id.clone());
        }
    }
}
