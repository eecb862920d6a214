//! HTTP client for the report endpoint.
//!
//! One call is one attempt: there are no retries at this layer, every retry is
//! a user resubmitting the prompt.

use std::time::Duration;

use reqwest::header::CONTENT_DISPOSITION;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::constants::{
    ACCESS_TOKEN_HEADER, CONNECT_TIMEOUT_SECS, QUICK_DOWNLOAD_PATH, READ_TIMEOUT_SECS,
    REPORT_PATH,
};
use super::error::TransactionError;
use super::filename::{header_text, resolve_filename};
use super::request::{ReportFormat, ReportRequest};
use super::save::is_usable_filename;
use crate::user_agent;

/// Result of one request against the report endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// File bytes and the name they should be saved under.
    Success { filename: String, bytes: Vec<u8> },
    /// Non-success status with the server's (or a derived) message.
    HttpError { status: u16, message: String },
    /// No response was received.
    NetworkError { message: String },
}

impl ReportOutcome {
    /// Splits the outcome into the fetched file or the error to surface.
    ///
    /// # Errors
    ///
    /// Returns the matching `TransactionError` for HTTP and transport failures.
    pub fn into_result(self) -> Result<(String, Vec<u8>), TransactionError> {
        match self {
            Self::Success { filename, bytes } => Ok((filename, bytes)),
            Self::HttpError { status, message } => Err(TransactionError::http(status, message)),
            Self::NetworkError { message } => Err(TransactionError::network(message)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Report endpoint client, created once and reused for the whole session.
#[derive(Debug, Clone)]
pub struct ReportClient {
    client: Client,
    base: Url,
}

impl ReportClient {
    /// Creates a client for `base` with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be built.
    pub fn new(base: Url) -> Result<Self, reqwest::Error> {
        Self::with_timeouts(base, CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a client for `base` with explicit timeout values.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be built.
    pub fn with_timeouts(
        base: Url,
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()?;
        Ok(Self { client, base })
    }

    /// Posts `request` to `/api/report` and classifies the response.
    #[instrument(skip(self, request), fields(format = %request.format))]
    pub async fn fetch_report(&self, request: &ReportRequest) -> ReportOutcome {
        let url = match endpoint_url(&self.base, REPORT_PATH) {
            Ok(url) => url,
            Err(message) => return ReportOutcome::NetworkError { message },
        };
        debug!(%url, "posting report request");

        match self.client.post(url).json(request).send().await {
            Ok(response) => read_outcome(response, request.format).await,
            Err(error) => network_outcome(&error),
        }
    }

    /// Fetches the service's token-protected CSV from `/download-report`.
    #[instrument(skip(self, token), fields(with_token = token.is_some()))]
    pub async fn fetch_quick(&self, token: Option<&str>) -> ReportOutcome {
        let url = match endpoint_url(&self.base, QUICK_DOWNLOAD_PATH) {
            Ok(url) => url,
            Err(message) => return ReportOutcome::NetworkError { message },
        };
        debug!(%url, "requesting quick download");

        let mut builder = self.client.get(url);
        if let Some(token) = token {
            builder = builder.header(ACCESS_TOKEN_HEADER, token);
        }
        match builder.send().await {
            Ok(response) => read_outcome(response, ReportFormat::Csv).await,
            Err(error) => network_outcome(&error),
        }
    }
}

/// Joins an endpoint path onto `base`, keeping any path prefix `base` carries.
pub(crate) fn endpoint_url(base: &Url, path: &str) -> Result<Url, String> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path.trim_start_matches('/'))
        .map_err(|e| format!("invalid report endpoint {base}: {e}"))
}

async fn read_outcome(response: Response, format: ReportFormat) -> ReportOutcome {
    let status = response.status();
    if !status.is_success() {
        let message = error_message(response).await;
        warn!(status = status.as_u16(), %message, "report endpoint returned an error");
        return ReportOutcome::HttpError {
            status: status.as_u16(),
            message,
        };
    }

    let disposition = response.headers().get(CONTENT_DISPOSITION).map(header_text);
    let bytes = match response.bytes().await {
        Ok(bytes) => bytes.to_vec(),
        Err(error) => return network_outcome(&error),
    };
    let filename = resolve_filename(disposition.as_deref())
        .filter(|name| is_usable_filename(name))
        .unwrap_or_else(|| {
            debug!(header = ?disposition, "no usable filename in Content-Disposition, using default");
            format.default_filename().to_string()
        });

    info!(%filename, bytes = bytes.len(), "report received");
    ReportOutcome::Success { filename, bytes }
}

async fn error_message(response: Response) -> String {
    let status = response.status();
    let parsed = match response.bytes().await {
        Ok(body) => serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.trim().is_empty()),
        Err(error) => {
            debug!(%error, "failed to read error body");
            None
        }
    };
    parsed.unwrap_or_else(|| status_message(status))
}

/// Generic message used when an error response has no usable JSON body.
pub(crate) fn status_message(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("Request failed with status {} ({reason})", status.as_u16()),
        None => format!("Request failed with status {}", status.as_u16()),
    }
}

fn network_outcome(error: &reqwest::Error) -> ReportOutcome {
    let message = if error.is_timeout() {
        "request timed out".to_string()
    } else {
        error.to_string()
    };
    warn!(%message, "report request failed before a response arrived");
    ReportOutcome::NetworkError { message }
}
