//! Report exports (JSON and CSV).

use crate::model::{CountEntry, Role, TrendsReport};
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct ExportedReport<'a> {
    exported_at: String,
    role: &'a Role,
    report: &'a TrendsReport,
}

fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "now".into())
}

pub fn export_json(path: &Path, role: &Role, report: &TrendsReport) -> Result<()> {
    let doc = ExportedReport {
        exported_at: now_rfc3339(),
        role,
        report,
    };
    let out = serde_json::to_string_pretty(&doc)?;
    std::fs::write(path, out).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn export_csv(path: &Path, role: &Role, report: &TrendsReport) -> Result<()> {
    let file =
        std::fs::File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = std::io::BufWriter::new(file);
    write_csv(&mut w, role, report)?;
    w.flush().context("flush csv")?;
    Ok(())
}

fn write_csv(w: &mut impl Write, role: &Role, report: &TrendsReport) -> Result<()> {
    writeln!(w, "role,chart,label,count")?;
    let sections: [(&str, &[CountEntry]); 4] = [
        ("skills", report.top_skills.as_slice()),
        ("experience", report.experience_distribution.as_slice()),
        ("locations", report.top_locations.as_slice()),
        ("companies", report.top_companies.as_slice()),
    ];
    for (chart, entries) in sections {
        for e in entries {
            writeln!(
                w,
                "{},{},{},{}",
                csv_field(role.as_str()),
                chart,
                csv_field(&e.value),
                e.count
            )?;
        }
    }
    Ok(())
}

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Default export file name in the current directory, e.g. `job-trends-backend-engineer-2024-05-01_12-00-00.json`.
pub fn default_export_path(role: &Role, extension: &str) -> Result<PathBuf> {
    let slug: String = if role.is_empty() {
        "all-roles".into()
    } else {
        role.as_str()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '-'
                }
            })
            .collect()
    };
    let stamp = now_rfc3339().replace(':', "-").replace('T', "_");
    let stamp = stamp.split('.').next().unwrap_or(&stamp).to_string();
    let current_dir = std::env::current_dir().context("get current directory")?;
    Ok(current_dir.join(format!("job-trends-{slug}-{stamp}.{extension}")))
}
