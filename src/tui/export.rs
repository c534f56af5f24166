use anyhow::{anyhow, Result};
use std::path::PathBuf;

use super::state::UiState;

/// Export the displayed report as JSON in the current directory.
pub fn export_report_json(state: &UiState) -> Result<PathBuf> {
    let (role, report) = state
        .report
        .as_ref()
        .ok_or_else(|| anyhow!("no report loaded yet"))?;
    let path = crate::storage::default_export_path(role, "json")?;
    crate::storage::export_json(&path, role, report)?;
    Ok(path)
}

/// Export the displayed report as CSV in the current directory.
pub fn export_report_csv(state: &UiState) -> Result<PathBuf> {
    let (role, report) = state
        .report
        .as_ref()
        .ok_or_else(|| anyhow!("no report loaded yet"))?;
    let path = crate::storage::default_export_path(role, "csv")?;
    crate::storage::export_csv(&path, role, report)?;
    Ok(path)
}

/// Run an export and report the outcome in the info line.
pub fn export_and_show_path(state: &mut UiState, export: fn(&UiState) -> Result<PathBuf>) {
    match export(state) {
        Ok(path) => {
            state.info = format!("Exported: {}", path.display());
        }
        Err(e) => {
            state.info = format!("Export failed: {e:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_without_report_reports_failure() {
        let mut state = UiState::default();
        export_and_show_path(&mut state, export_report_json);
        assert_eq!(state.info, "Export failed: no report loaded yet");
    }
}
