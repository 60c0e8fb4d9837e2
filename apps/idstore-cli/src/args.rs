//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;
use idstore_provisioning::ReconcileOptions;

use crate::logging::LogFormat;

/// Provision identity store users and groups from a CSV file.
///
/// Users that already exist are skipped, so the same file can be applied
/// repeatedly.
#[derive(Debug, Parser)]
#[command(name = "idstore-provision")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// CSV file with one user per row
    #[arg(short, long, default_value = "users.csv")]
    pub input: PathBuf,

    /// YAML settings file (IDENTITY_STORE_ID, SSO_PROFILE, REGION)
    #[arg(short, long, default_value = "settings.yml")]
    pub settings: PathBuf,

    /// Look everything up but create nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Remember resolved groups for the rest of the run
    #[arg(long)]
    pub cache_groups: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,

    /// Log line format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Log filter (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            cache_groups: self.cache_groups,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["idstore-provision"]).unwrap();

        assert_eq!(cli.input, PathBuf::from("users.csv"));
        assert_eq!(cli.settings, PathBuf::from("settings.yml"));
        assert!(!cli.dry_run);
        assert!(!cli.json);
        assert_eq!(cli.log_format, LogFormat::Text);
        assert_eq!(cli.log_level, "info");
        assert_eq!(cli.reconcile_options(), ReconcileOptions::default());
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "idstore-provision",
            "-i",
            "people.csv",
            "-s",
            "prod.yml",
            "--dry-run",
            "--cache-groups",
            "--json",
            "--log-format",
            "json",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(cli.input, PathBuf::from("people.csv"));
        assert_eq!(cli.settings, PathBuf::from("prod.yml"));
        assert!(cli.dry_run);
        assert!(cli.json);
        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(cli.log_level, "debug");
        assert!(cli.reconcile_options().cache_groups);
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        assert!(Cli::try_parse_from(["idstore-provision", "--log-format", "xml"]).is_err());
    }
}
