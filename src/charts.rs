//! Chart models fed by trends reports.
//!
//! The models are presentation-agnostic: the TUI draws them with ratatui bar charts and text mode
//! prints them as ASCII bars.

use crate::model::{CountEntry, TrendsReport};

/// Anything that can display a trends report.
///
/// Implementations must accept repeated calls (re-render in place) and empty collections.
pub trait ChartRenderer {
    fn render(&mut self, report: &TrendsReport);
}

/// One bar chart: parallel category labels and values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BarSeries {
    pub categories: Vec<String>,
    pub values: Vec<u64>,
}

impl BarSeries {
    pub fn from_entries(entries: &[CountEntry]) -> Self {
        Self {
            categories: entries.iter().map(|e| e.value.clone()).collect(),
            values: entries.iter().map(|e| e.count).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn max_value(&self) -> u64 {
        self.values.iter().copied().max().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.categories
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Orientation hint for presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// The four dashboard charts, owned by a single renderer.
#[derive(Debug, Clone, Default)]
pub struct TrendCharts {
    pub skills: BarSeries,
    pub experience: BarSeries,
    pub locations: BarSeries,
    pub companies: BarSeries,
}

impl TrendCharts {
    /// Title, series and orientation for each chart, in dashboard order.
    pub fn panels(&self) -> [(&'static str, &BarSeries, Orientation); 4] {
        [
            ("Top Skills", &self.skills, Orientation::Horizontal),
            ("Experience", &self.experience, Orientation::Vertical),
            ("Top Locations", &self.locations, Orientation::Horizontal),
            ("Top Companies", &self.companies, Orientation::Horizontal),
        ]
    }
}

impl ChartRenderer for TrendCharts {
    fn render(&mut self, report: &TrendsReport) {
        self.skills = BarSeries::from_entries(report.displayed_skills());
        self.experience = BarSeries::from_entries(&report.experience_distribution);
        self.locations = BarSeries::from_entries(&report.top_locations);
        self.companies = BarSeries::from_entries(&report.top_companies);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn skills_chart_shows_first_ten_in_input_order() {
        let report = TrendsReport {
            top_skills: (1..=14)
                .map(|i| CountEntry::new(format!("skill-{i}"), i))
                .collect(),
            ..Default::default()
        };
        let mut charts = TrendCharts::default();
        charts.render(&report);
        assert_eq!(charts.skills.values, (1..=10).collect::<Vec<u64>>());
        assert_eq!(charts.skills.categories[0], "skill-1");
        assert_eq!(charts.skills.categories[9], "skill-10");
    }

    #[test]
    fn short_skill_lists_are_not_padded() {
        let report = TrendsReport {
            top_skills: vec![CountEntry::new("Go", 12), CountEntry::new("SQL", 9)],
            ..Default::default()
        };
        let mut charts = TrendCharts::default();
        charts.render(&report);
        assert_eq!(
            charts.skills,
            BarSeries {
                categories: vec!["Go".into(), "SQL".into()],
                values: vec![12, 9],
            }
        );
        assert!(charts.experience.is_empty());
        assert!(charts.locations.is_empty());
        assert!(charts.companies.is_empty());
    }

    #[test]
    fn rerender_replaces_previous_data() {
        let mut charts = TrendCharts::default();
        charts.render(&TrendsReport {
            top_companies: vec![CountEntry::new("Acme", 5)],
            ..Default::default()
        });
        assert_eq!(charts.companies.max_value(), 5);
        charts.render(&TrendsReport::default());
        assert!(charts.companies.is_empty());
        assert_eq!(charts.companies.max_value(), 0);
    }

    #[test]
    fn other_charts_are_not_truncated() {
        let report = TrendsReport {
            top_locations: (0..20).map(|i| CountEntry::new(format!("l{i}"), 1)).collect(),
            ..Default::default()
        };
        let mut charts = TrendCharts::default();
        charts.render(&report);
        assert_eq!(charts.locations.values.len(), 20);
    }
}
