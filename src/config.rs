//! Configuration loading and resolution.
//!
//! Precedence: command line (including its env fallbacks) > config file > defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::debug;
use url::Url;

use crate::report::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use crate::report::{ReportFormat, ReportOptions, SheetSelector};

/// Report service address used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5001";

/// Values read from `config.toml`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Base URL of the report service.
    pub endpoint: Option<Url>,
    /// Directory reports are saved into.
    pub output_dir: Option<PathBuf>,
    /// Format requested by the credential prompt.
    pub format: Option<ReportFormat>,
    /// Spreadsheet identifier override.
    pub sheet_id: Option<String>,
    /// Worksheet override (index or name).
    pub sheet: Option<SheetSelector>,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// HTTP read timeout in seconds.
    pub read_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Validates config values against runtime constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(endpoint) = &self.endpoint {
            validate_endpoint(endpoint)?;
        }
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        Ok(())
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

/// Values taken from the command line; `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub endpoint: Option<Url>,
    pub output_dir: Option<PathBuf>,
    pub format: Option<ReportFormat>,
    pub sheet_id: Option<String>,
    pub sheet: Option<SheetSelector>,
    pub connect_timeout_secs: Option<u64>,
    pub read_timeout_secs: Option<u64>,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub endpoint: Url,
    pub output_dir: PathBuf,
    pub report: ReportOptions,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
}

impl Settings {
    /// Merges command-line overrides over file values over defaults.
    pub fn resolve(overrides: SettingsOverrides, file: Option<&FileConfig>) -> Result<Self> {
        let file = file.cloned().unwrap_or_default();

        let endpoint = match overrides.endpoint.or(file.endpoint) {
            Some(endpoint) => endpoint,
            None => Url::parse(DEFAULT_ENDPOINT).context("default endpoint is not a URL")?,
        };
        validate_endpoint(&endpoint)?;

        let connect_timeout_secs = overrides
            .connect_timeout_secs
            .or(file.connect_timeout_secs)
            .unwrap_or(CONNECT_TIMEOUT_SECS);
        let read_timeout_secs = overrides
            .read_timeout_secs
            .or(file.read_timeout_secs)
            .unwrap_or(READ_TIMEOUT_SECS);
        validate_timeout_secs("connect_timeout_secs", Some(connect_timeout_secs))?;
        validate_timeout_secs("read_timeout_secs", Some(read_timeout_secs))?;

        let settings = Self {
            endpoint,
            output_dir: overrides
                .output_dir
                .or(file.output_dir)
                .unwrap_or_else(|| PathBuf::from(".")),
            report: ReportOptions {
                format: overrides.format.or(file.format).unwrap_or_default(),
                sheet_id: overrides.sheet_id.or(file.sheet_id),
                sheet: overrides.sheet.or(file.sheet),
            },
            connect_timeout_secs,
            read_timeout_secs,
        };
        debug!(?settings, "settings resolved");
        Ok(settings)
    }
}

fn validate_endpoint(endpoint: &Url) -> Result<()> {
    if !matches!(endpoint.scheme(), "http" | "https") {
        bail!(
            "Invalid endpoint '{endpoint}': expected an http:// or https:// URL"
        );
    }
    Ok(())
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/report-desk/config.toml`
/// 2. `$HOME/.config/report-desk/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("report-desk")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("report-desk")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from the default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(load_file_config(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

/// Loads and validates a config file.
pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };
        let key = raw_key.trim();
        let value = raw_value.trim();

        match key {
            "endpoint" => {
                let parsed = parse_string_literal(value)
                    .and_then(|s| Url::parse(&s).map_err(anyhow::Error::from))
                    .with_context(|| format!("Invalid `endpoint` value on line {line_no}"))?;
                cfg.endpoint = Some(parsed);
            }
            "output_dir" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `output_dir` value on line {line_no}"))?;
                cfg.output_dir = Some(PathBuf::from(parsed));
            }
            "format" => {
                let parsed = parse_string_literal(value)
                    .and_then(|s| s.parse::<ReportFormat>().map_err(anyhow::Error::msg))
                    .with_context(|| format!("Invalid `format` value on line {line_no}"))?;
                cfg.format = Some(parsed);
            }
            "sheet_id" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `sheet_id` value on line {line_no}"))?;
                cfg.sheet_id = Some(parsed);
            }
            "sheet" => {
                let parsed = parse_sheet(value)
                    .with_context(|| format!("Invalid `sheet` value on line {line_no}"))?;
                cfg.sheet = Some(parsed);
            }
            "connect_timeout_secs" => {
                let parsed = parse_integer_u64(value).with_context(|| {
                    format!("Invalid `connect_timeout_secs` value on line {line_no}")
                })?;
                cfg.connect_timeout_secs = Some(parsed);
            }
            "read_timeout_secs" => {
                let parsed = parse_integer_u64(value).with_context(|| {
                    format!("Invalid `read_timeout_secs` value on line {line_no}")
                })?;
                cfg.read_timeout_secs = Some(parsed);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

/// A bare integer selects by index, a quoted string by name.
fn parse_sheet(raw_value: &str) -> Result<SheetSelector> {
    if raw_value.starts_with('"') {
        let name = parse_string_literal(raw_value)?;
        if name.trim().is_empty() {
            bail!("Sheet name must not be empty");
        }
        return Ok(SheetSelector::Name(name));
    }
    let index = parse_integer_u64(raw_value)?;
    let index = u32::try_from(index).map_err(|_| anyhow::anyhow!("Sheet index out of range"))?;
    Ok(SheetSelector::Index(index))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_all_fields() {
        let cfg = parse_config_str(
            r#"
endpoint = "https://reports.example.com"
output_dir = "/tmp/reports"
format = "xlsx"
sheet_id = "1AbC"
sheet = 2
connect_timeout_secs = 10
read_timeout_secs = 120
"#,
        )
        .expect("full config should parse");
        assert_eq!(
            cfg.endpoint.as_ref().map(Url::as_str),
            Some("https://reports.example.com/")
        );
        assert_eq!(cfg.output_dir, Some(PathBuf::from("/tmp/reports")));
        assert_eq!(cfg.format, Some(ReportFormat::Xlsx));
        assert_eq!(cfg.sheet_id.as_deref(), Some("1AbC"));
        assert_eq!(cfg.sheet, Some(SheetSelector::Index(2)));
        assert_eq!(cfg.connect_timeout_secs, Some(10));
        assert_eq!(cfg.read_timeout_secs, Some(120));
    }

    #[test]
    fn test_parse_config_sheet_by_name() {
        let cfg = parse_config_str(r#"sheet = "Q3 Summary""#).expect("sheet name should parse");
        assert_eq!(cfg.sheet, Some(SheetSelector::Name("Q3 Summary".to_string())));
    }

    #[test]
    fn test_parse_config_supports_inline_comments() {
        let cfg = parse_config_str(
            r#"
format = "csv" # default for spreadsheets
output_dir = "/data/#reports" # hash inside string is kept
"#,
        )
        .expect("config with comments should parse");
        assert_eq!(cfg.format, Some(ReportFormat::Csv));
        assert_eq!(cfg.output_dir, Some(PathBuf::from("/data/#reports")));
    }

    #[test]
    fn test_parse_config_rejects_unknown_keys() {
        let err = parse_config_str("unknown_key = 123").expect_err("unknown key error expected");
        assert!(err.to_string().contains("Unknown configuration key"));
        assert!(err.to_string().contains("unknown_key"));
    }

    #[test]
    fn test_parse_config_rejects_invalid_format() {
        let err = parse_config_str(r#"format = "pdf""#).expect_err("invalid format expected");
        assert!(err.to_string().contains("format"));
    }

    #[test]
    fn test_parse_config_rejects_non_http_endpoint() {
        let err = parse_config_str(r#"endpoint = "ftp://reports.example.com""#)
            .expect_err("ftp endpoint should be rejected");
        assert!(err.to_string().contains("endpoint"), "got: {err}");
    }

    #[test]
    fn test_parse_config_rejects_invalid_timeout_value() {
        let err =
            parse_config_str("read_timeout_secs = 0").expect_err("invalid timeout expected");
        assert!(err.to_string().contains("read_timeout_secs"));
    }

    #[test]
    fn test_parse_config_rejects_missing_equals() {
        let err = parse_config_str("format").expect_err("syntax error expected");
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_resolve_defaults_without_file_or_overrides() {
        let settings = Settings::resolve(SettingsOverrides::default(), None).unwrap();
        assert_eq!(settings.endpoint.as_str(), "http://127.0.0.1:5001/");
        assert_eq!(settings.output_dir, PathBuf::from("."));
        assert_eq!(settings.report, ReportOptions::default());
        assert_eq!(settings.connect_timeout_secs, CONNECT_TIMEOUT_SECS);
        assert_eq!(settings.read_timeout_secs, READ_TIMEOUT_SECS);
    }

    #[test]
    fn test_resolve_cli_overrides_file_values() {
        let file = FileConfig {
            format: Some(ReportFormat::Xlsx),
            sheet_id: Some("from-file".to_string()),
            read_timeout_secs: Some(60),
            ..FileConfig::default()
        };
        let overrides = SettingsOverrides {
            format: Some(ReportFormat::Csv),
            ..SettingsOverrides::default()
        };

        let settings = Settings::resolve(overrides, Some(&file)).unwrap();

        assert_eq!(settings.report.format, ReportFormat::Csv);
        assert_eq!(settings.report.sheet_id.as_deref(), Some("from-file"));
        assert_eq!(settings.read_timeout_secs, 60);
    }

    #[test]
    fn test_resolve_rejects_out_of_range_cli_timeout() {
        let overrides = SettingsOverrides {
            connect_timeout_secs: Some(0),
            ..SettingsOverrides::default()
        };
        assert!(Settings::resolve(overrides, None).is_err());
    }
}
