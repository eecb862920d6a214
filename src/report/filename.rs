//! Filename extraction from `Content-Disposition` headers.
//!
//! Matchers run in a fixed order and the first one that yields a name wins:
//! - `filename*=UTF-8''r%C3%A9sum%C3%A9.csv` (percent-decoded)
//! - `filename="report.csv"` (verbatim)
//! - `filename=report.csv` (verbatim, up to the next `;`)

use std::sync::LazyLock;

use regex::Regex;
use reqwest::header::HeaderValue;
use tracing::debug;

#[allow(clippy::expect_used)]
static EXTENDED_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)filename\*\s*=\s*UTF-8''([^;]+)").expect("extended filename regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static QUOTED_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)filename\s*=\s*"([^"]*)""#).expect("quoted filename regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static BARE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)filename\s*=\s*([^";\s][^;]*)"#).expect("bare filename regex is valid") // Static pattern, safe to panic
});

type Matcher = fn(&str) -> Option<String>;

/// Precedence order for [`resolve_filename`].
const MATCHERS: [(&str, Matcher); 3] = [
    ("extended", match_extended),
    ("quoted", match_quoted),
    ("bare", match_bare),
];

/// Resolves a filename from a raw `Content-Disposition` value.
///
/// Returns `None` when the header is absent or no matcher applies; the caller
/// substitutes its own default.
#[must_use]
pub fn resolve_filename(header: Option<&str>) -> Option<String> {
    let header = header?;
    MATCHERS.iter().find_map(|(label, matcher)| {
        let name = matcher(header)?;
        debug!(matcher = label, filename = %name, "resolved filename from Content-Disposition");
        Some(name)
    })
}

/// Reads a header value byte-wise so raw non-ASCII bytes are not rejected.
#[must_use]
pub fn header_text(value: &HeaderValue) -> String {
    String::from_utf8_lossy(value.as_bytes()).into_owned()
}

fn match_extended(header: &str) -> Option<String> {
    let encoded = EXTENDED_PATTERN.captures(header)?.get(1)?.as_str().trim();
    match urlencoding::decode(encoded) {
        Ok(decoded) if !decoded.is_empty() => Some(decoded.into_owned()),
        Ok(_) => None,
        Err(error) => {
            debug!(value = %encoded, %error, "extended filename is not valid UTF-8, trying next form");
            None
        }
    }
}

fn match_quoted(header: &str) -> Option<String> {
    let value = QUOTED_PATTERN.captures(header)?.get(1)?.as_str();
    (!value.is_empty()).then(|| value.to_string())
}

fn match_bare(header: &str) -> Option<String> {
    let value = BARE_PATTERN.captures(header)?.get(1)?.as_str().trim();
    (!value.is_empty()).then(|| value.to_string())
}
