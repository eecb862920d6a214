//! Constants for the report endpoint (paths, headers, timeouts).

/// Authenticated report endpoint, relative to the configured base URL.
pub const REPORT_PATH: &str = "api/report";

/// Lightweight token-protected download endpoint.
pub const QUICK_DOWNLOAD_PATH: &str = "download-report";

/// Header carrying the quick download access token.
pub const ACCESS_TOKEN_HEADER: &str = "X-REPORT-TOKEN";

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes, report generation can be slow).
pub const READ_TIMEOUT_SECS: u64 = 300;
