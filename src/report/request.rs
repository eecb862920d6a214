//! Outbound report request payload and its supporting types.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// File format requested from the report endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Comma-separated values.
    #[default]
    Csv,
    /// Excel workbook.
    Xlsx,
}

impl ReportFormat {
    /// Returns the wire label sent in the request body.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
        }
    }

    /// Filename used when the response carries no usable `Content-Disposition`.
    #[must_use]
    pub fn default_filename(self) -> &'static str {
        match self {
            Self::Csv => "report.csv",
            Self::Xlsx => "report.xlsx",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" | "text/csv" => Ok(Self::Csv),
            "xlsx" | "excel" => Ok(Self::Xlsx),
            other => Err(format!(
                "unsupported report format '{other}' (expected csv or xlsx)"
            )),
        }
    }
}

/// Worksheet selector: zero-based index or worksheet name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SheetSelector {
    /// Zero-based worksheet position.
    Index(u32),
    /// Worksheet title.
    Name(String),
}

impl FromStr for SheetSelector {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err("sheet selector must not be empty".to_string());
        }
        Ok(trimmed
            .parse::<u32>()
            .map_or_else(|_| Self::Name(trimmed.to_string()), Self::Index))
    }
}

/// Optional report parameters that travel with every request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportOptions {
    /// Format requested when the prompt is opened.
    pub format: ReportFormat,
    /// Spreadsheet identifier override.
    pub sheet_id: Option<String>,
    /// Worksheet override.
    pub sheet: Option<SheetSelector>,
}

/// Username/password pair collected by the credential prompt.
///
/// Never persisted; `Debug` redacts the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account name, already trimmed.
    pub username: String,
    /// Secret, kept verbatim.
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// JSON body posted to `/api/report`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ReportRequest {
    pub username: String,
    pub password: String,
    pub format: ReportFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<SheetSelector>,
}

impl ReportRequest {
    /// Builds a request from submitted credentials and the session's report options.
    #[must_use]
    pub fn new(credentials: Credentials, options: &ReportOptions) -> Self {
        Self {
            username: credentials.username,
            password: credentials.password,
            format: options.format,
            sheet_id: options.sheet_id.clone(),
            sheet: options.sheet.clone(),
        }
    }
}

impl fmt::Debug for ReportRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("format", &self.format)
            .field("sheet_id", &self.sheet_id)
            .field("sheet", &self.sheet)
            .finish()
    }
}
