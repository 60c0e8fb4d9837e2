//! Idempotent identity store provisioning.
//!
//! This crate reads a table of users and converges an identity store towards
//! it without duplicating principals:
//! - each user is looked up by username and created only when absent
//! - each group named by a newly created user is looked up by display name
//!   and created on first reference
//! - the new user is then added to each of those groups
//!
//! Users that already exist are left untouched, so re-running the same input
//! is safe.
//!
//! # Example
//!
//! ```rust,ignore
//! use idstore_provisioning::{provision_file, ReconcileOptions};
//!
//! let report = provision_file(&directory, "users.csv", ReconcileOptions::default()).await?;
//! println!("{} created, {} already present", report.created, report.existing);
//! ```

pub mod dry_run;
pub mod error;
pub mod reconciler;
pub mod record;
pub mod report;
pub mod validation;

use std::path::Path;

use idstore_connector::DirectoryClient;

// Re-export public API
pub use dry_run::{DryRunDirectory, DRY_RUN_PREFIX};
pub use error::{ProvisionError, ProvisionResult};
pub use reconciler::{GroupResolution, ReconcileOptions, Reconciler, UserResolution};
pub use record::{parse_records, read_records, ParsedInput, RowError, UserRecord};
pub use report::{GroupLinkResult, GroupLinkStatus, RecordResult, RecordStatus, RunReport};

/// Read the input table at `path` and reconcile it against `directory`.
///
/// Input errors are returned before any directory call is made.
pub async fn provision_file<D, P>(
    directory: &D,
    path: P,
    options: ReconcileOptions,
) -> ProvisionResult<RunReport>
where
    D: DirectoryClient + ?Sized,
    P: AsRef<Path>,
{
    let input = read_records(path)?;
    let mut reconciler = Reconciler::new(directory, options);
    Ok(reconciler.run_input(&input).await)
}
