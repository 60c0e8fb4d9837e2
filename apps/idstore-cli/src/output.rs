//! Run summary output

use std::fmt::Write;

use idstore_provisioning::{GroupLinkStatus, RecordStatus, RunReport};

use crate::error::CliResult;

/// Check if color output is enabled
fn use_color() -> bool {
    std::env::var("NO_COLOR").is_err()
}

/// Print the run report, as JSON or as a human summary.
pub fn print_report(report: &RunReport, json_output: bool, dry_run: bool) -> CliResult<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", render_summary(report, dry_run, use_color()));
    }
    Ok(())
}

/// Render the human-readable summary.
pub fn render_summary(report: &RunReport, dry_run: bool, color: bool) -> String {
    let mut out = String::new();

    let headline = match (dry_run, report.has_failures()) {
        (true, _) => "Dry run complete (nothing was written)",
        (false, false) => "Provisioning complete",
        (false, true) => "Provisioning completed with errors",
    };
    if color {
        let code = if report.has_failures() { 33 } else { 32 };
        let _ = writeln!(out, "\n\x1b[{code}m{headline}\x1b[0m");
    } else {
        let _ = writeln!(out, "\n{headline}");
    }

    let _ = writeln!(out, "\nSummary:");
    let _ = writeln!(out, "  Records:            {}", report.total);
    let _ = writeln!(out, "  Users created:      {}", report.created);
    let _ = writeln!(out, "  Already present:    {}", report.existing);
    if report.failed > 0 {
        let _ = writeln!(out, "  Failed:             {}", report.failed);
    }
    if report.invalid > 0 {
        let _ = writeln!(out, "  Invalid rows:       {}", report.invalid);
    }
    let _ = writeln!(out, "  Groups created:     {}", report.groups_created);
    let _ = writeln!(out, "  Memberships added:  {}", report.memberships_added);
    if report.memberships_failed > 0 {
        let _ = writeln!(out, "  Memberships failed: {}", report.memberships_failed);
    }

    if report.has_failures() {
        let _ = writeln!(out, "\nErrors:");
        for record in report.failed_records() {
            let name = if record.username.is_empty() {
                "<no username>"
            } else {
                record.username.as_str()
            };

            if matches!(
                record.status,
                RecordStatus::CreationFailed | RecordStatus::Invalid
            ) {
                let error = record.error.as_deref().unwrap_or("unknown error");
                let _ = writeln!(out, "  • Line {} ({}): {}", record.line_number, name, error);
            }

            for link in record
                .groups
                .iter()
                .filter(|g| g.status != GroupLinkStatus::Linked)
            {
                let error = link.error.as_deref().unwrap_or("unknown error");
                let _ = writeln!(
                    out,
                    "  • Line {} ({}) group '{}': {}",
                    record.line_number, name, link.group, error
                );
            }
        }
    }

    out
}
