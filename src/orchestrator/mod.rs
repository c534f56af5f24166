//! Application-level orchestration.
//!
//! This module owns the crawl-and-poll workflow (start request, countdown, result fetch), the
//! controller loop that serialises access to it, and post-fetch processing such as exports.
//! UI/CLI layers call into this module to keep responsibilities separated.

mod controller;
mod crawl;
mod post_process;
mod session;

pub(crate) use controller::{run_controller, run_cycle, UiCommand};
pub(crate) use post_process::process_report;
