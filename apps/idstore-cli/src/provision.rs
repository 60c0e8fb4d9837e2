//! The provisioning command
//!
//! Settings and input are validated before the identity store client is
//! built, so a bad invocation never touches the directory.

use idstore_connector::DirectoryClient;
use idstore_connector_aws::{IdentityStoreDirectory, Settings};
use idstore_provisioning::{
    read_records, DryRunDirectory, ParsedInput, ReconcileOptions, Reconciler, RunReport,
};
use tracing::info;

use crate::args::Cli;
use crate::error::CliResult;
use crate::output::print_report;

/// Run one provisioning pass and print its report.
pub async fn execute(cli: &Cli) -> CliResult<RunReport> {
    let settings = Settings::load(&cli.settings)?;
    info!(
        settings = %cli.settings.display(),
        identity_store_id = %settings.identity_store_id,
        profile = %settings.sso_profile,
        "Settings loaded"
    );

    let input = read_records(&cli.input)?;
    info!(
        input = %cli.input.display(),
        rows = input.total_rows,
        valid = input.records.len(),
        invalid = input.errors.len(),
        "Input parsed"
    );

    let directory = IdentityStoreDirectory::connect(&settings).await?;
    let options = cli.reconcile_options();

    let report = if cli.dry_run {
        info!("Dry run enabled, no changes will be written");
        reconcile(&DryRunDirectory::new(directory), &input, options).await
    } else {
        reconcile(&directory, &input, options).await
    };

    print_report(&report, cli.json, cli.dry_run)?;
    Ok(report)
}

/// Reconcile parsed input against any directory.
pub async fn reconcile<D>(directory: &D, input: &ParsedInput, options: ReconcileOptions) -> RunReport
where
    D: DirectoryClient + ?Sized,
{
    Reconciler::new(directory, options).run_input(input).await
}
