//! Crawl lifecycle controller.
//!
//! Owns the orchestrator on a single task, turns UI commands into workflow operations and drives
//! the countdown timer. Presentation layers only see the emitted events.

use super::crawl::{CrawlOrchestrator, StartOutcome};
use crate::engine::TrendsApi;
use crate::model::{CrawlEvent, RunConfig, SessionStatus, TICK_PERIOD};
use anyhow::Result;
use std::collections::VecDeque;
use std::future::Future;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::{Instant, Interval};
use tracing::debug;

/// Commands emitted by UI layers to control the workflow.
#[derive(Debug, Clone)]
pub(crate) enum UiCommand {
    StartCrawl(String),
    ShowAllRoles,
    Quit,
}

/// First tick fires one period after the crawl starts, not immediately.
fn countdown_interval() -> Interval {
    tokio::time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD)
}

/// Drive `work` while still listening for shutdown. Returns `None` on `Quit` or a closed
/// command channel; other commands received meanwhile are queued in arrival order.
async fn unless_quit<F: Future>(
    work: F,
    cmd_rx: &mut UnboundedReceiver<UiCommand>,
    queued: &mut VecDeque<UiCommand>,
) -> Option<F::Output> {
    tokio::pin!(work);
    loop {
        tokio::select! {
            // Work that is already done wins over a pending shutdown.
            biased;
            out = &mut work => return Some(out),
            cmd = cmd_rx.recv() => match cmd {
                Some(UiCommand::Quit) | None => return None,
                Some(cmd) => queued.push_back(cmd),
            },
        }
    }
}

enum Step {
    Command(Option<UiCommand>),
    Tick,
}

/// Serve UI commands until `Quit` (or the command channel closes).
pub(crate) async fn run_controller<A: TrendsApi>(
    api: A,
    cfg: RunConfig,
    load_on_launch: bool,
    event_tx: UnboundedSender<CrawlEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    let mut orch = CrawlOrchestrator::new(api, cfg, event_tx);
    let mut queued = VecDeque::new();

    // Failure is reported to the UI; the user can still start a crawl.
    if load_on_launch
        && unless_quit(orch.load_initial_trends(), &mut cmd_rx, &mut queued)
            .await
            .is_none()
    {
        debug!("controller stopping during initial load");
        return Ok(());
    }

    // Only present while a countdown is running.
    let mut ticker: Option<Interval> = None;

    loop {
        let step = match queued.pop_front() {
            Some(cmd) => Step::Command(Some(cmd)),
            None => {
                tokio::select! {
                    cmd = cmd_rx.recv() => Step::Command(cmd),
                    _ = async {
                        match ticker.as_mut() {
                            Some(t) => { t.tick().await; }
                            None => futures::future::pending::<()>().await,
                        }
                    } => Step::Tick,
                }
            }
        };

        let finished = match step {
            Step::Tick => {
                let done = unless_quit(orch.tick(), &mut cmd_rx, &mut queued).await;
                if !orch.is_waiting() {
                    ticker = None;
                }
                done.is_none()
            }
            Step::Command(Some(UiCommand::StartCrawl(role))) => {
                match unless_quit(orch.start_crawl(&role), &mut cmd_rx, &mut queued).await {
                    Some(StartOutcome::Counting) => {
                        // A replaced session gets a fresh timer.
                        ticker = Some(countdown_interval());
                        false
                    }
                    Some(_) => false,
                    None => true,
                }
            }
            Step::Command(Some(UiCommand::ShowAllRoles)) => {
                unless_quit(orch.refresh_all_roles(), &mut cmd_rx, &mut queued)
                    .await
                    .is_none()
            }
            Step::Command(Some(UiCommand::Quit) | None) => true,
        };

        if finished {
            debug!(status = ?orch.status(), "controller stopping");
            break;
        }
    }

    Ok(())
}

/// Run one workflow cycle without a UI: a full crawl for `role`, or the all-roles load.
/// Returns the terminal status of the cycle.
pub(crate) async fn run_cycle<A: TrendsApi>(
    api: A,
    cfg: RunConfig,
    role: Option<&str>,
    event_tx: UnboundedSender<CrawlEvent>,
) -> SessionStatus {
    let mut orch = CrawlOrchestrator::new(api, cfg, event_tx);

    let Some(role) = role else {
        let _ = orch.load_initial_trends().await;
        return orch.status();
    };

    match orch.start_crawl(role).await {
        StartOutcome::Counting => {
            let mut ticker = countdown_interval();
            while orch.is_waiting() {
                ticker.tick().await;
                orch.tick().await;
            }
            orch.status()
        }
        StartOutcome::Invalid | StartOutcome::Busy => SessionStatus::Idle,
        StartOutcome::Aborted => orch.status(),
    }
}
