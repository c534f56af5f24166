//! The crawl-and-poll workflow.
//!
//! One orchestrator owns one [`CrawlSession`]. Every state change is reported to presentation
//! layers as a [`CrawlEvent`]; the orchestrator never touches chart state itself.

use super::session::{CrawlSession, Tick};
use crate::engine::TrendsApi;
use crate::error::{CrawlError, CrawlResult};
use crate::model::{
    BusyPolicy, CrawlEvent, Role, RunConfig, SessionStatus, StartFailurePolicy, Tone,
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info, warn};

/// Result of a start request, mostly for callers that need to know whether to tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StartOutcome {
    /// Empty role; nothing was sent.
    Invalid,
    /// Another session is active and the busy policy refused this one.
    Busy,
    /// The start request failed and the policy aborted the session.
    Aborted,
    /// The countdown is running.
    Counting,
}

pub(crate) struct CrawlOrchestrator<A> {
    api: A,
    cfg: RunConfig,
    events: UnboundedSender<CrawlEvent>,
    session: CrawlSession,
}

impl<A: TrendsApi> CrawlOrchestrator<A> {
    pub fn new(api: A, cfg: RunConfig, events: UnboundedSender<CrawlEvent>) -> Self {
        Self {
            api,
            cfg,
            events,
            session: CrawlSession::default(),
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status
    }

    pub fn is_waiting(&self) -> bool {
        self.session.is_waiting()
    }

    #[cfg(test)]
    pub fn remaining(&self) -> u64 {
        self.session.remaining
    }

    fn emit(&self, ev: CrawlEvent) {
        // The receiver going away only means the UI has shut down.
        let _ = self.events.send(ev);
    }

    fn set_status(&mut self, status: SessionStatus, message: impl Into<String>, tone: Tone) {
        self.session.status = status;
        self.emit(CrawlEvent::Status {
            status,
            message: message.into(),
            tone,
        });
    }

    /// Fetch unfiltered trends once at startup. No countdown.
    pub async fn load_initial_trends(&mut self) -> CrawlResult<()> {
        self.session.role = Role::all();
        self.fetch_results(&Role::all()).await
    }

    /// Reload the all-roles view, unless a crawl is in flight.
    pub async fn refresh_all_roles(&mut self) -> CrawlResult<()> {
        if self.session.status.is_active() {
            self.emit(CrawlEvent::Info(format!(
                "Still analyzing \"{}\"; overall trends will refresh afterwards.",
                self.session.role
            )));
            return Ok(());
        }
        self.load_initial_trends().await
    }

    pub async fn start_crawl(&mut self, raw_role: &str) -> StartOutcome {
        let role = Role::new(raw_role);
        if role.is_empty() {
            let status = self.session.status;
            self.emit(CrawlEvent::Status {
                status,
                message: CrawlError::Validation.user_message().into(),
                tone: Tone::Error,
            });
            return StartOutcome::Invalid;
        }

        if self.session.status.is_active() {
            match self.cfg.busy_policy {
                BusyPolicy::Reject => {
                    info!(active = %self.session.role, requested = %role, "crawl already running");
                    self.emit(CrawlEvent::Info(format!(
                        "Already analyzing \"{}\"; wait for it to finish.",
                        self.session.role
                    )));
                    return StartOutcome::Busy;
                }
                BusyPolicy::Replace => {
                    info!(active = %self.session.role, requested = %role, "replacing active crawl");
                }
            }
        }

        let secs = self.cfg.countdown_secs();
        self.session.begin(role.clone(), secs);
        self.set_status(
            SessionStatus::Requesting,
            format!("Analyzing \"{role}\" market trends..."),
            Tone::Normal,
        );
        self.emit(CrawlEvent::Countdown(Some(format!(
            "This typically takes about {secs} seconds..."
        ))));
        self.emit(CrawlEvent::ResultsHidden);

        if let Err(e) = self.api.start_crawl(&role).await {
            match self.cfg.start_failure_policy {
                StartFailurePolicy::Continue => {
                    warn!(role = %role, error = %e, detail = ?e, "start crawl failed; counting down anyway");
                }
                StartFailurePolicy::Abort => {
                    error!(role = %role, error = %e, detail = ?e, "start crawl failed");
                    self.emit(CrawlEvent::Countdown(None));
                    self.set_status(
                        SessionStatus::Failed,
                        "Failed to start analysis.",
                        Tone::Error,
                    );
                    return StartOutcome::Aborted;
                }
            }
        }

        info!(role = %role, countdown_secs = secs, "crawl started");
        self.session.start_waiting();
        StartOutcome::Counting
    }

    /// Advance the countdown by one second. Fetches results when it reaches zero.
    pub async fn tick(&mut self) -> Tick {
        let tick = self.session.tick();
        match tick {
            Tick::Remaining(n) => {
                self.emit(CrawlEvent::Countdown(Some(format!(
                    "⏳ {n} seconds remaining..."
                ))));
            }
            Tick::Elapsed => {
                self.set_status(
                    SessionStatus::Processing,
                    "Processing data...",
                    Tone::Normal,
                );
                self.emit(CrawlEvent::Countdown(None));
                let role = self.session.role.clone();
                // Failures are already reported and logged.
                let _ = self.fetch_results(&role).await;
            }
            Tick::Idle => {}
        }
        tick
    }

    pub async fn fetch_results(&mut self, role: &Role) -> CrawlResult<()> {
        self.set_status(SessionStatus::Processing, "Loading trends...", Tone::Normal);
        self.emit(CrawlEvent::ResultsHidden);

        match self.api.fetch_trends(role).await {
            Ok(report) => {
                info!(
                    role = %role,
                    skills = report.top_skills.len(),
                    companies = report.top_companies.len(),
                    "trends loaded"
                );
                self.emit(CrawlEvent::ResultsReady {
                    role: role.clone(),
                    report: Box::new(report),
                });
                self.set_status(SessionStatus::Ready, "Analysis complete!", Tone::Success);
                Ok(())
            }
            Err(e) => {
                error!(role = %role, error = %e, detail = ?e, "failed to load trends");
                self.set_status(SessionStatus::Failed, e.user_message(), Tone::Error);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::engine::{CRAWL_PATH, TRENDS_PATH};
    use crate::model::{CountEntry, TrendsReport};
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    /// In-memory backend that records every request as `path?role=...`.
    #[derive(Clone, Default)]
    pub(crate) struct FakeApi {
        pub calls: Arc<Mutex<Vec<String>>>,
        pub fail_start: bool,
        pub fail_fetch: bool,
        pub report: TrendsReport,
        /// Holds the fetch open this long (virtual time in paused tests).
        pub fetch_delay: Option<std::time::Duration>,
    }

    impl FakeApi {
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn count(&self, prefix: &str) -> usize {
            self.calls()
                .iter()
                .filter(|c| c.starts_with(prefix))
                .count()
        }

        fn record(&self, path: &str, role: &Role) {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{path}?role={}", role.query_value()));
        }
    }

    impl TrendsApi for FakeApi {
        async fn start_crawl(&self, role: &Role) -> CrawlResult<()> {
            self.record(CRAWL_PATH, role);
            if self.fail_start {
                return Err(CrawlError::Status {
                    endpoint: CRAWL_PATH,
                    status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                });
            }
            Ok(())
        }

        async fn fetch_trends(&self, role: &Role) -> CrawlResult<TrendsReport> {
            self.record(TRENDS_PATH, role);
            if let Some(delay) = self.fetch_delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_fetch {
                let source = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
                return Err(CrawlError::Parse {
                    endpoint: TRENDS_PATH,
                    source,
                });
            }
            Ok(self.report.clone())
        }
    }

    pub(crate) fn sample_report() -> TrendsReport {
        TrendsReport {
            top_skills: vec![CountEntry::new("Go", 12), CountEntry::new("SQL", 9)],
            ..Default::default()
        }
    }

    fn orchestrator(
        api: FakeApi,
        cfg: RunConfig,
    ) -> (CrawlOrchestrator<FakeApi>, UnboundedReceiver<CrawlEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (CrawlOrchestrator::new(api, cfg, tx), rx)
    }

    fn drain(rx: &mut UnboundedReceiver<CrawlEvent>) -> Vec<CrawlEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    fn last_status(events: &[CrawlEvent]) -> Option<(SessionStatus, String, Tone)> {
        events.iter().rev().find_map(|ev| match ev {
            CrawlEvent::Status {
                status,
                message,
                tone,
            } => Some((*status, message.clone(), *tone)),
            _ => None,
        })
    }

    #[tokio::test]
    async fn empty_role_is_rejected_without_network() {
        for raw in ["", "   ", "\t"] {
            let api = FakeApi::default();
            let (mut orch, mut rx) = orchestrator(api.clone(), RunConfig::default());
            assert_eq!(orch.start_crawl(raw).await, StartOutcome::Invalid);
            assert!(api.calls().is_empty());
            let (_, message, tone) = last_status(&drain(&mut rx)).unwrap();
            assert_eq!(message, "Please select a role first.");
            assert_eq!(tone, Tone::Error);
            assert_eq!(orch.status(), SessionStatus::Idle);
        }
    }

    #[tokio::test]
    async fn fetch_happens_exactly_on_the_last_tick() {
        let api = FakeApi {
            report: sample_report(),
            ..Default::default()
        };
        let (mut orch, mut rx) = orchestrator(api.clone(), RunConfig::default());

        assert_eq!(
            orch.start_crawl("Backend Engineer").await,
            StartOutcome::Counting
        );
        assert_eq!(api.calls(), vec!["/api/crawl?role=Backend%20Engineer"]);
        assert_eq!(orch.remaining(), 80);

        for n in 1..80 {
            assert_eq!(orch.tick().await, Tick::Remaining(80 - n));
            assert_eq!(api.count(TRENDS_PATH), 0, "fetched early at tick {n}");
        }
        assert_eq!(orch.tick().await, Tick::Elapsed);
        assert_eq!(
            api.calls(),
            vec![
                "/api/crawl?role=Backend%20Engineer",
                "/api/trends?role=Backend%20Engineer",
            ]
        );
        assert_eq!(orch.status(), SessionStatus::Ready);

        // Further ticks are inert.
        assert_eq!(orch.tick().await, Tick::Idle);
        assert_eq!(api.count(TRENDS_PATH), 1);

        let events = drain(&mut rx);
        let countdowns: Vec<_> = events
            .iter()
            .filter_map(|ev| match ev {
                CrawlEvent::Countdown(text) => Some(text.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            countdowns.first().cloned().flatten().as_deref(),
            Some("This typically takes about 80 seconds...")
        );
        assert_eq!(
            countdowns[1].as_deref(),
            Some("⏳ 79 seconds remaining...")
        );
        assert_eq!(countdowns.last(), Some(&None));
        assert!(events.iter().any(|ev| matches!(
            ev,
            CrawlEvent::ResultsReady { role, .. } if role.as_str() == "Backend Engineer"
        )));
        assert_eq!(
            last_status(&events).unwrap(),
            (
                SessionStatus::Ready,
                "Analysis complete!".to_string(),
                Tone::Success
            )
        );
    }

    #[tokio::test]
    async fn fetch_failure_keeps_results_hidden() {
        let api = FakeApi {
            fail_fetch: true,
            ..Default::default()
        };
        let (mut orch, mut rx) = orchestrator(api.clone(), RunConfig::default());

        assert!(orch.load_initial_trends().await.is_err());
        let events = drain(&mut rx);
        assert!(!events
            .iter()
            .any(|ev| matches!(ev, CrawlEvent::ResultsReady { .. })));
        assert_eq!(
            last_status(&events).unwrap(),
            (
                SessionStatus::Failed,
                "Failed to load trends.".to_string(),
                Tone::Error
            )
        );
        assert_eq!(api.calls(), vec!["/api/trends?role="]);

        // Failed is terminal but a new crawl can start.
        assert_eq!(orch.start_crawl("QA").await, StartOutcome::Counting);
    }

    #[tokio::test]
    async fn busy_reject_refuses_second_start() {
        let api = FakeApi::default();
        let (mut orch, mut rx) = orchestrator(api.clone(), RunConfig::default());

        orch.start_crawl("Backend Engineer").await;
        orch.tick().await;
        drain(&mut rx);

        assert_eq!(orch.start_crawl("Frontend").await, StartOutcome::Busy);
        assert_eq!(api.count(CRAWL_PATH), 1);
        assert_eq!(orch.remaining(), 79);
        assert!(matches!(drain(&mut rx).as_slice(), [CrawlEvent::Info(_)]));
    }

    #[tokio::test]
    async fn busy_replace_restarts_countdown_with_new_role() {
        let api = FakeApi::default();
        let cfg = RunConfig {
            busy_policy: BusyPolicy::Replace,
            ..Default::default()
        };
        let (mut orch, _rx) = orchestrator(api.clone(), cfg);

        orch.start_crawl("Backend Engineer").await;
        for _ in 0..30 {
            orch.tick().await;
        }
        assert_eq!(orch.start_crawl("Frontend").await, StartOutcome::Counting);
        assert_eq!(orch.remaining(), 80);
        for _ in 0..80 {
            orch.tick().await;
        }
        assert_eq!(
            api.calls(),
            vec![
                "/api/crawl?role=Backend%20Engineer",
                "/api/crawl?role=Frontend",
                "/api/trends?role=Frontend",
            ]
        );
    }

    #[tokio::test]
    async fn start_failure_continues_by_default() {
        let api = FakeApi {
            fail_start: true,
            ..Default::default()
        };
        let cfg = RunConfig {
            countdown: std::time::Duration::from_secs(2),
            ..Default::default()
        };
        let (mut orch, _rx) = orchestrator(api.clone(), cfg);

        assert_eq!(orch.start_crawl("SRE").await, StartOutcome::Counting);
        orch.tick().await;
        orch.tick().await;
        assert_eq!(api.count(TRENDS_PATH), 1);
    }

    #[tokio::test]
    async fn start_failure_can_abort_the_session() {
        let api = FakeApi {
            fail_start: true,
            ..Default::default()
        };
        let cfg = RunConfig {
            start_failure_policy: StartFailurePolicy::Abort,
            ..Default::default()
        };
        let (mut orch, mut rx) = orchestrator(api.clone(), cfg);

        assert_eq!(orch.start_crawl("SRE").await, StartOutcome::Aborted);
        assert_eq!(orch.status(), SessionStatus::Failed);
        assert_eq!(orch.tick().await, Tick::Idle);
        assert_eq!(api.count(TRENDS_PATH), 0);
        let (status, _, tone) = last_status(&drain(&mut rx)).unwrap();
        assert_eq!((status, tone), (SessionStatus::Failed, Tone::Error));
    }

    #[tokio::test]
    async fn refresh_is_deferred_while_counting() {
        let api = FakeApi::default();
        let (mut orch, _rx) = orchestrator(api.clone(), RunConfig::default());
        orch.start_crawl("QA").await;
        orch.refresh_all_roles().await.unwrap();
        assert_eq!(api.count(TRENDS_PATH), 0);
        assert!(orch.is_waiting());
    }
}
