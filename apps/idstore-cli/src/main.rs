//! idstore-provision - Idempotent identity store provisioning
//!
//! Reads users from a CSV file and makes sure each one exists in the
//! identity store, together with the groups it names:
//! - existing users are skipped
//! - missing groups are created on first reference
//! - new users are added to each of their groups

use clap::Parser;

use idstore_cli::logging::init_logging;
use idstore_cli::{provision, Cli, CliResult};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            tracing::error!(error = %e, exit_code = e.exit_code(), "Provisioning aborted");
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    init_logging(&cli.log_level, cli.log_format)?;
    provision::execute(&cli).await?;
    Ok(())
}
