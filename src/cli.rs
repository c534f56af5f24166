use crate::charts::{ChartRenderer, TrendCharts};
use crate::engine::HttpTrendsApi;
use crate::logging::{self, LogTarget};
use crate::model::{
    BusyPolicy, CrawlEvent, Role, RunConfig, SessionStatus, StartFailurePolicy, TrendsReport,
};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc;

/// Roles offered by the dashboard selector when `--roles` is not given.
pub const DEFAULT_ROLES: &[&str] = &[
    "Backend Engineer",
    "Frontend Engineer",
    "Full Stack Developer",
    "DevOps Engineer",
    "Data Scientist",
    "Machine Learning Engineer",
    "Mobile Developer",
    "Product Designer",
];

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "job-trends",
    version,
    about = "Trigger job-market crawls and chart the resulting trends"
)]
pub struct Cli {
    /// Base URL of the trends backend
    #[arg(long, default_value = "http://localhost:8080")]
    pub base_url: String,

    /// Role to analyze in text/JSON mode (omit for the all-roles report)
    #[arg(long)]
    pub role: Option<String>,

    /// Comma-separated roles offered by the dashboard selector
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_ROLES.iter().map(|r| r.to_string()))]
    pub roles: Vec<String>,

    /// Print the report as JSON and exit (no TUI)
    #[arg(long)]
    pub json: bool,

    /// Print a text summary and exit (no TUI)
    #[arg(long)]
    pub text: bool,

    /// How long to wait for the backend crawl before fetching results (whole seconds)
    #[arg(long, default_value = "80s", value_parser = parse_countdown)]
    pub countdown: Duration,

    /// Per-request HTTP timeout
    #[arg(long, default_value = "15s")]
    pub request_timeout: humantime::Duration,

    /// What to do when a crawl is requested while another is running
    #[arg(long, value_enum, default_value_t = BusyPolicy::Reject)]
    pub on_busy: BusyPolicy,

    /// What to do when the start-crawl request fails
    #[arg(long, value_enum, default_value_t = StartFailurePolicy::Continue)]
    pub on_start_failure: StartFailurePolicy,

    /// Load the all-roles report when the dashboard opens
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub load_on_launch: bool,

    /// Export the final report as JSON
    #[arg(long)]
    pub export_json: Option<std::path::PathBuf>,

    /// Export the final report as CSV
    #[arg(long)]
    pub export_csv: Option<std::path::PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Log file for the dashboard (defaults to the user cache directory)
    #[arg(long)]
    pub log_file: Option<std::path::PathBuf>,
}

/// The countdown is shown and ticked in seconds, so only whole, non-zero seconds are accepted.
fn parse_countdown(s: &str) -> Result<Duration, String> {
    let d = humantime::parse_duration(s).map_err(|e| e.to_string())?;
    if d.subsec_nanos() != 0 {
        return Err(format!("{s} is not a whole number of seconds"));
    }
    if d.is_zero() {
        return Err("countdown must be at least 1s".into());
    }
    Ok(d)
}

impl Cli {
    pub fn is_non_tui(&self) -> bool {
        self.json || self.text || cfg!(not(feature = "tui"))
    }
}

pub async fn run(args: Cli) -> Result<()> {
    if args.json && args.text {
        return Err(anyhow::anyhow!("--json and --text are mutually exclusive"));
    }

    if args.is_non_tui() {
        logging::init(&args.log_level, LogTarget::Stderr)?;
    } else {
        let path = args.log_file.clone().unwrap_or_else(logging::default_log_file);
        logging::init(&args.log_level, LogTarget::File(&path))?;
    }
    tracing::debug!(config = ?build_config(&args), "starting");

    if !args.json && !args.text {
        #[cfg(feature = "tui")]
        {
            return crate::tui::run(args).await;
        }
    }

    run_headless(args).await
}

/// Build a `RunConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> RunConfig {
    RunConfig {
        base_url: args.base_url.clone(),
        countdown: args.countdown,
        request_timeout: Duration::from(args.request_timeout),
        user_agent: format!("job-trends-cli/{}", env!("CARGO_PKG_VERSION")),
        busy_policy: args.on_busy,
        start_failure_policy: args.on_start_failure,
    }
}

/// Run one workflow cycle and print the result (text or JSON).
async fn run_headless(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let api = HttpTrendsApi::new(&cfg)?;
    let (out_tx, out_handle) = spawn_output_writer();
    let (evt_tx, mut evt_rx) = mpsc::unbounded_channel::<CrawlEvent>();

    let role = args.role.clone();
    let handle = tokio::spawn(async move {
        crate::orchestrator::run_cycle(api, cfg, role.as_deref(), evt_tx).await
    });

    let mut loaded: Option<(Role, TrendsReport)> = None;
    while let Some(ev) = evt_rx.recv().await {
        match ev {
            CrawlEvent::Status { message, .. } => {
                let _ = out_tx.send(OutputLine::Stderr(message));
            }
            CrawlEvent::Countdown(Some(text)) => {
                let _ = out_tx.send(OutputLine::Stderr(text));
            }
            CrawlEvent::Info(text) => {
                let _ = out_tx.send(OutputLine::Stderr(text));
            }
            CrawlEvent::ResultsReady { role, report } => {
                loaded = Some((role, *report));
            }
            CrawlEvent::Countdown(None) | CrawlEvent::ResultsHidden => {}
        }
    }

    let status = handle.await.context("workflow task failed")?;
    let result = match (status, loaded) {
        (SessionStatus::Ready, Some((role, report))) => {
            let processed = crate::orchestrator::process_report(&args, &role, &report);
            for msg in processed.export_messages {
                let _ = out_tx.send(OutputLine::Stderr(msg));
            }

            if args.json {
                let out = serde_json::to_string_pretty(&report)?;
                let _ = out_tx.send(OutputLine::Stdout(out));
            } else {
                let mut charts = TrendCharts::default();
                charts.render(&report);
                let summary = crate::text_summary::build_text_summary(&role, &charts);
                for line in summary.lines {
                    let _ = out_tx.send(OutputLine::Stdout(line));
                }
            }
            Ok(())
        }
        (status, _) => Err(anyhow::anyhow!(
            "analysis did not complete (status: {status:?})"
        )),
    };

    drop(out_tx);
    let _ = out_handle.await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_the_dashboard() {
        let args = Cli::parse_from(["job-trends"]);
        let cfg = build_config(&args);
        assert_eq!(cfg.countdown, Duration::from_secs(80));
        assert_eq!(cfg.busy_policy, BusyPolicy::Reject);
        assert_eq!(cfg.start_failure_policy, StartFailurePolicy::Continue);
        assert_eq!(args.roles.len(), DEFAULT_ROLES.len());
        assert!(args.load_on_launch);
    }

    #[test]
    fn policies_and_roles_parse_from_flags() {
        let args = Cli::parse_from([
            "job-trends",
            "--roles",
            "SRE,QA Engineer",
            "--on-busy",
            "replace",
            "--on-start-failure",
            "abort",
            "--countdown",
            "1m",
        ]);
        assert_eq!(args.roles, vec!["SRE", "QA Engineer"]);
        let cfg = build_config(&args);
        assert_eq!(cfg.busy_policy, BusyPolicy::Replace);
        assert_eq!(cfg.start_failure_policy, StartFailurePolicy::Abort);
        assert_eq!(cfg.countdown_secs(), 60);
    }

    #[test]
    fn countdown_must_be_whole_seconds() {
        for bad in ["500ms", "1500ms", "0s"] {
            let err = Cli::try_parse_from(["job-trends", "--countdown", bad]).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation, "{bad}");
        }
        let args = Cli::parse_from(["job-trends", "--countdown", "2m"]);
        assert_eq!(build_config(&args).countdown_secs(), 120);
    }

    #[test]
    fn tick_flag_is_gone() {
        assert!(Cli::try_parse_from(["job-trends", "--tick", "2s"]).is_err());
    }
}
