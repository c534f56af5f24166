use crate::charts::{ChartRenderer, TrendCharts};
use crate::model::{CrawlEvent, Role, SessionStatus, Tone, TrendsReport};
use ratatui::style::Color;

/// Label shown for the empty selection.
pub const ROLE_PLACEHOLDER: &str = "Select a role";

pub struct UiState {
    pub tab: usize,
    /// Selector entries; index 0 is the placeholder (empty role).
    pub roles: Vec<String>,
    pub selected: usize,

    pub session: SessionStatus,
    pub status: String,
    pub status_tone: Tone,
    pub countdown: String,
    pub info: String,

    pub results_visible: bool,
    // Chart models are owned here and only mutated on the UI thread.
    pub charts: TrendCharts,
    pub report: Option<(Role, TrendsReport)>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            tab: 0,
            roles: vec![String::new()],
            selected: 0,
            session: SessionStatus::Idle,
            status: String::new(),
            status_tone: Tone::Normal,
            countdown: String::new(),
            info: String::new(),
            results_visible: false,
            charts: TrendCharts::default(),
            report: None,
        }
    }
}

impl UiState {
    pub fn with_roles(roles: &[String]) -> Self {
        let mut entries = vec![String::new()];
        entries.extend(
            roles
                .iter()
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
        );
        Self {
            roles: entries,
            ..Default::default()
        }
    }

    /// Currently selected role; empty for the placeholder.
    pub fn selected_role(&self) -> &str {
        self.roles.get(self.selected).map(String::as_str).unwrap_or("")
    }

    pub fn selected_label(&self) -> &str {
        match self.selected_role() {
            "" => ROLE_PLACEHOLDER,
            role => role,
        }
    }

    pub fn action_label(&self) -> String {
        match self.selected_role() {
            "" => "Analyze Role".into(),
            role => format!("Analyze {role}"),
        }
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.roles.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn status_color(&self) -> Color {
        tone_color(self.status_tone)
    }

    /// Apply a workflow event. Returns the loaded report when results became ready.
    pub fn apply_event(&mut self, ev: CrawlEvent) -> Option<(Role, TrendsReport)> {
        match ev {
            CrawlEvent::Status {
                status,
                message,
                tone,
            } => {
                self.session = status;
                self.status = message;
                self.status_tone = tone;
            }
            CrawlEvent::Countdown(text) => self.countdown = text.unwrap_or_default(),
            CrawlEvent::ResultsHidden => self.results_visible = false,
            CrawlEvent::ResultsReady { role, report } => {
                self.charts.render(&report);
                self.results_visible = true;
                self.report = Some((role.clone(), (*report).clone()));
                return Some((role, *report));
            }
            CrawlEvent::Info(msg) => self.info = msg,
        }
        None
    }
}

pub fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Normal => Color::Rgb(0x43, 0x61, 0xee),
        Tone::Success => Color::Green,
        Tone::Error => Color::Rgb(0xef, 0x23, 0x3c),
    }
}
