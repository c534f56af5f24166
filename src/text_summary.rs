//! Text summary builder for CLI output.
//!
//! Formats the rendered chart models as labelled ASCII bars for text mode.

use crate::charts::{BarSeries, TrendCharts};
use crate::metrics;
use crate::model::Role;

const BAR_WIDTH: usize = 30;
const BAR_CHAR: char = '█';

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

/// Build a text summary of the four charts.
pub(crate) fn build_text_summary(role: &Role, charts: &TrendCharts) -> TextSummary {
    let mut lines = vec![format!("Job market trends: {role}")];

    for (title, series, _) in charts.panels() {
        lines.push(String::new());
        lines.push(format!("== {title} =="));
        push_series(&mut lines, series);
    }

    TextSummary { lines }
}

fn push_series(lines: &mut Vec<String>, series: &BarSeries) {
    if series.is_empty() {
        lines.push("  (no data)".into());
        return;
    }

    let label_width = series
        .categories
        .iter()
        .map(|c| c.chars().count())
        .max()
        .unwrap_or(0)
        .min(28);
    let max = series.max_value();
    let total = metrics::total(&series.values);

    for (label, value) in series.iter() {
        let label: String = label.chars().take(label_width).collect();
        let bar: String = std::iter::repeat(BAR_CHAR)
            .take(metrics::scaled_width(value, max, BAR_WIDTH))
            .collect();
        let share = metrics::share_percent(value, total)
            .map(|p| format!(" ({p:.0}%)"))
            .unwrap_or_default();
        lines.push(format!("  {label:<label_width$} {bar} {value}{share}"));
    }
}
