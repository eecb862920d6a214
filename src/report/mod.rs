//! Authenticated report download transaction.
//!
//! This module owns everything between a submitted credential prompt and a
//! file on disk:
//!
//! - [`ReportClient`] posts the request and classifies the response
//! - [`resolve_filename`] picks the file name from `Content-Disposition`
//! - [`DownloadTransaction`] saves successful responses through a
//!   [`TransientResource`] that is released exactly once
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use report_desk::report::{
//!     Credentials, DirectorySaver, DownloadTransaction, ReportClient, ReportOptions,
//!     ReportRequest,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ReportClient::new("http://127.0.0.1:5001".parse()?)?;
//! let transaction = DownloadTransaction::new(client, Arc::new(DirectorySaver::new(".")));
//! let credentials = Credentials {
//!     username: "alice".into(),
//!     password: "secret".into(),
//! };
//! let settlement = transaction
//!     .run(&ReportRequest::new(credentials, &ReportOptions::default()))
//!     .await;
//! println!("{settlement:?}");
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;
mod error;
mod filename;
mod request;
mod resource;
mod save;
mod transaction;

pub use client::{ReportClient, ReportOutcome};
pub use error::{SaveError, TransactionError};
pub use filename::{header_text, resolve_filename};
pub use request::{Credentials, ReportFormat, ReportOptions, ReportRequest, SheetSelector};
pub use resource::{ResourceLedger, TransientResource};
pub use save::{DirectorySaver, SaveTarget};
pub use transaction::{DownloadTransaction, Settlement};
