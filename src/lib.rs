//! Report Desk Library
//!
//! This library drives a chat-style report download flow: a welcome view with
//! a "Download report" entry point, a credential prompt gating the download,
//! one authenticated request against the report service, and a local save of
//! the delivered file.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`session`] - Pure interaction state machine (inputs in, effects out)
//! - [`report`] - Report endpoint client, filename resolution, local save
//! - [`config`] - File/CLI configuration resolution

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod report;
pub mod session;
mod user_agent;

// Re-export commonly used types
pub use config::{Settings, load_default_file_config};
pub use report::{
    DirectorySaver, DownloadTransaction, ReportClient, ReportFormat, ReportOptions, ReportOutcome,
    ReportRequest, Settlement, TransactionError, resolve_filename,
};
pub use session::{Effect, FlowController, Input, SessionState};
