use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::time::Duration;

/// Countdown shown to the user while the backend crawl runs.
pub const DEFAULT_COUNTDOWN_SECS: u64 = 80;

/// The countdown decrements once per elapsed second.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Number of skill entries the skills chart displays.
pub const TOP_SKILLS_LIMIT: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub base_url: String,
    #[serde(with = "humantime_serde")]
    pub countdown: Duration,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    pub user_agent: String,
    pub busy_policy: BusyPolicy,
    pub start_failure_policy: StartFailurePolicy,
}

impl RunConfig {
    /// Countdown length in ticks. The CLI only accepts whole seconds, so nothing is lost here.
    pub fn countdown_secs(&self) -> u64 {
        self.countdown.as_secs().max(1)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".into(),
            countdown: Duration::from_secs(DEFAULT_COUNTDOWN_SECS),
            request_timeout: Duration::from_secs(15),
            user_agent: format!("job-trends-cli/{}", env!("CARGO_PKG_VERSION")),
            busy_policy: BusyPolicy::default(),
            start_failure_policy: StartFailurePolicy::default(),
        }
    }
}

/// What to do when a crawl is requested while another one is still active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BusyPolicy {
    /// Keep the active session and refuse the new request.
    #[default]
    Reject,
    /// Drop the active countdown and start over with the new role.
    Replace,
}

/// What to do when the start-crawl request itself fails to send.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StartFailurePolicy {
    /// Log the failure and run the countdown anyway.
    #[default]
    Continue,
    /// Fail the session without counting down.
    Abort,
}

/// Job title filter. The empty role means "all roles" when fetching trends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_string())
    }

    /// The "all roles" filter used by the initial load.
    pub fn all() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Percent-encode for a query string the way browsers' `encodeURIComponent` does.
    pub fn query_value(&self) -> String {
        urlencoding::encode(&self.0).into_owned()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("all roles")
        } else {
            f.write_str(&self.0)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountEntry {
    pub value: String,
    pub count: u64,
}

#[cfg(test)]
impl CountEntry {
    pub fn new(value: impl Into<String>, count: u64) -> Self {
        Self {
            value: value.into(),
            count,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendsReport {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub top_skills: Vec<CountEntry>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub experience_distribution: Vec<CountEntry>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub top_locations: Vec<CountEntry>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub top_companies: Vec<CountEntry>,
}

impl TrendsReport {
    /// Skills as displayed: the first entries in server order.
    pub fn displayed_skills(&self) -> &[CountEntry] {
        let n = self.top_skills.len().min(TOP_SKILLS_LIMIT);
        &self.top_skills[..n]
    }
}

#[cfg(test)]
impl TrendsReport {
    pub fn is_empty(&self) -> bool {
        self.top_skills.is_empty()
            && self.experience_distribution.is_empty()
            && self.top_locations.is_empty()
            && self.top_companies.is_empty()
    }
}

// The backend serialises empty slices as `null`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<CountEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<CountEntry>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    #[default]
    Idle,
    Requesting,
    Waiting,
    Processing,
    Ready,
    Failed,
}

impl SessionStatus {
    /// A session in one of these states blocks or is replaced by a new crawl.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            SessionStatus::Requesting | SessionStatus::Waiting | SessionStatus::Processing
        )
    }
}

/// Presentation hint for a status line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tone {
    #[default]
    Normal,
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CrawlEvent {
    Status {
        status: SessionStatus,
        message: String,
        tone: Tone,
    },
    /// `None` clears the countdown line.
    Countdown(Option<String>),
    ResultsHidden,
    ResultsReady {
        role: Role,
        // Boxed to keep the event small on the channel.
        report: Box<TrendsReport>,
    },
    Info(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn role_is_trimmed_and_encoded_like_a_browser() {
        let role = Role::new("  Backend Engineer ");
        assert_eq!(role.as_str(), "Backend Engineer");
        assert_eq!(role.query_value(), "Backend%20Engineer");
        assert_eq!(Role::new("C++ / Rust").query_value(), "C%2B%2B%20%2F%20Rust");
        assert!(Role::new("   ").is_empty());
    }

    #[test]
    fn report_decodes_null_and_missing_collections_as_empty() {
        let json = r#"{"top_skills":[{"value":"Go","count":12}],"top_locations":null}"#;
        let report: TrendsReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.top_skills, vec![CountEntry::new("Go", 12)]);
        assert!(report.top_locations.is_empty());
        assert!(report.top_companies.is_empty());
        assert!(report.experience_distribution.is_empty());
    }

    #[test]
    fn displayed_skills_keep_first_ten_in_order() {
        let report = TrendsReport {
            top_skills: (0..15)
                .map(|i| CountEntry::new(format!("s{i}"), 100 - i))
                .collect(),
            ..Default::default()
        };
        let shown: Vec<&str> = report
            .displayed_skills()
            .iter()
            .map(|e| e.value.as_str())
            .collect();
        assert_eq!(
            shown,
            vec!["s0", "s1", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9"]
        );
    }

    #[test]
    fn only_in_flight_states_are_active() {
        assert!(!SessionStatus::Idle.is_active());
        assert!(SessionStatus::Waiting.is_active());
        assert!(!SessionStatus::Ready.is_active());
        assert!(!SessionStatus::Failed.is_active());
    }
}
