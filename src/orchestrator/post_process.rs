//! Post-fetch processing.
//!
//! Handles exports requested on the command line once a report has been loaded.

use crate::cli::Cli;
use crate::model::{Role, TrendsReport};
use crate::storage;
use tracing::{info, warn};

/// Result of post-fetch processing, ready for presentation layers.
pub(crate) struct ProcessedReport {
    pub export_messages: Vec<String>,
}

/// Write the configured exports for a freshly loaded report.
pub(crate) fn process_report(args: &Cli, role: &Role, report: &TrendsReport) -> ProcessedReport {
    let mut export_messages = Vec::new();
    if let Some(export_path) = args.export_json.as_deref() {
        match storage::export_json(export_path, role, report) {
            Ok(_) => {
                info!(path = %export_path.display(), "exported JSON");
                export_messages.push(format!("Exported JSON: {}", export_path.display()))
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "JSON export failed");
                export_messages.push(format!("Export JSON failed: {e:#}"))
            }
        }
    }
    if let Some(export_path) = args.export_csv.as_deref() {
        match storage::export_csv(export_path, role, report) {
            Ok(_) => {
                info!(path = %export_path.display(), "exported CSV");
                export_messages.push(format!("Exported CSV: {}", export_path.display()))
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "CSV export failed");
                export_messages.push(format!("Export CSV failed: {e:#}"))
            }
        }
    }

    ProcessedReport { export_messages }
}
