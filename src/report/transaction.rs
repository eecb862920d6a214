//! One authenticated request/response cycle, including the local save.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, instrument, warn};

use super::client::{ReportClient, ReportOutcome};
use super::error::TransactionError;
use super::request::ReportRequest;
use super::resource::{ResourceLedger, TransientResource};
use super::save::SaveTarget;

/// How a transaction settled, as seen by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// The report was fetched and saved.
    Saved {
        /// Name resolved from the response (before on-disk deduplication).
        filename: String,
        /// Where the save action put the file.
        location: PathBuf,
    },
    /// The transaction failed; the prompt stays usable for a retry.
    Failed(TransactionError),
}

/// Fetches a report and hands it to a [`SaveTarget`].
pub struct DownloadTransaction {
    client: ReportClient,
    saver: Arc<dyn SaveTarget>,
    ledger: Arc<ResourceLedger>,
}

impl DownloadTransaction {
    /// Creates a transaction runner with its own resource ledger.
    #[must_use]
    pub fn new(client: ReportClient, saver: Arc<dyn SaveTarget>) -> Self {
        Self {
            client,
            saver,
            ledger: ResourceLedger::new(),
        }
    }

    /// Ledger tracking transient resources created by this runner.
    #[must_use]
    pub fn ledger(&self) -> &Arc<ResourceLedger> {
        &self.ledger
    }

    /// Performs the request and classifies the response. Nothing is saved.
    pub async fn execute(&self, request: &ReportRequest) -> ReportOutcome {
        self.client.fetch_report(request).await
    }

    /// Performs the request and, on success, saves the bytes.
    ///
    /// For callers with nothing to abandon. The chat session calls
    /// [`execute`](Self::execute) and [`save`](Self::save) separately so a
    /// response nobody waits for any more is never written.
    #[instrument(skip(self, request), fields(format = %request.format))]
    pub async fn run(&self, request: &ReportRequest) -> Settlement {
        let outcome = self.execute(request).await;
        self.settle(outcome).await
    }

    /// Runs the token-protected quick download through the same save path.
    pub async fn run_quick(&self, token: Option<&str>) -> Settlement {
        let outcome = self.client.fetch_quick(token).await;
        self.settle(outcome).await
    }

    async fn settle(&self, outcome: ReportOutcome) -> Settlement {
        match outcome.into_result() {
            Ok((filename, bytes)) => self.save(filename, bytes).await,
            Err(error) => Settlement::Failed(error),
        }
    }

    /// Saves fetched bytes through a transient resource released on every path.
    pub async fn save(&self, filename: String, bytes: Vec<u8>) -> Settlement {
        let resource = TransientResource::create(&self.ledger, bytes);
        let saved = self.saver.save(&filename, &resource).await;
        resource.release();

        match saved {
            Ok(location) => {
                info!(%filename, location = %location.display(), "report download complete");
                Settlement::Saved { filename, location }
            }
            Err(error) => {
                warn!(%filename, %error, "save action failed");
                Settlement::Failed(TransactionError::save(filename, &error))
            }
        }
    }
}

impl std::fmt::Debug for DownloadTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadTransaction")
            .field("client", &self.client)
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}
