//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use report_desk::config::SettingsOverrides;
use report_desk::report::{ReportFormat, SheetSelector};
use url::Url;

/// Chat-style client for downloading authenticated reports.
///
/// Starts an interactive session by default: pick "Download report" (or type
/// "download"), sign in, and the report is saved to the output directory.
#[derive(Parser, Debug)]
#[command(name = "report-desk")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error log output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(flatten)]
    pub report: ReportArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Options shared by every mode.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ReportArgs {
    /// Base URL of the report service
    #[arg(long, env = "REPORT_DESK_ENDPOINT", global = true)]
    pub endpoint: Option<Url>,

    /// Directory reports are saved into
    #[arg(short = 'o', long, env = "REPORT_DESK_OUTPUT_DIR", global = true)]
    pub output_dir: Option<PathBuf>,

    /// Report format to request (csv or xlsx)
    #[arg(short = 'f', long, env = "REPORT_DESK_FORMAT", global = true)]
    pub format: Option<ReportFormat>,

    /// Spreadsheet identifier to report on
    #[arg(long, global = true)]
    pub sheet_id: Option<String>,

    /// Worksheet index or name
    #[arg(long, global = true)]
    pub sheet: Option<SheetSelector>,

    /// HTTP connect timeout in seconds (1-3600)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub connect_timeout: Option<u64>,

    /// HTTP read timeout in seconds (1-3600)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub read_timeout: Option<u64>,
}

impl ReportArgs {
    /// Converts given flags into settings overrides.
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            endpoint: self.endpoint.clone(),
            output_dir: self.output_dir.clone(),
            format: self.format,
            sheet_id: self.sheet_id.clone(),
            sheet: self.sheet.clone(),
            connect_timeout_secs: self.connect_timeout,
            read_timeout_secs: self.read_timeout,
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Interactive chat session (default)
    Chat,
    /// Download the report once without the chat session
    Fetch {
        /// Account name
        #[arg(short = 'u', long)]
        username: String,

        /// Account password
        #[arg(long, env = "REPORT_DESK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Download the service's default CSV from /download-report
    Quick {
        /// Access token sent as X-REPORT-TOKEN
        #[arg(long, env = "REPORT_ACCESS_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["report-desk"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert!(args.command.is_none());
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["report-desk", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_format_parses_case_insensitively() {
        let args = Args::try_parse_from(["report-desk", "--format", "XLSX"]).unwrap();
        assert_eq!(args.report.format, Some(ReportFormat::Xlsx));
    }

    #[test]
    fn test_cli_invalid_format_rejected() {
        let result = Args::try_parse_from(["report-desk", "--format", "pdf"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_sheet_accepts_index_or_name() {
        let args = Args::try_parse_from(["report-desk", "--sheet", "3"]).unwrap();
        assert_eq!(args.report.sheet, Some(SheetSelector::Index(3)));
        let args = Args::try_parse_from(["report-desk", "--sheet", "Summary"]).unwrap();
        assert_eq!(
            args.report.sheet,
            Some(SheetSelector::Name("Summary".to_string()))
        );
    }

    #[test]
    fn test_cli_timeout_zero_rejected() {
        let result = Args::try_parse_from(["report-desk", "--connect-timeout", "0"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_fetch_subcommand_with_password_flag() {
        let args = Args::try_parse_from([
            "report-desk",
            "fetch",
            "-u",
            "alice",
            "--password",
            "pw",
            "--format",
            "csv",
        ])
        .unwrap();
        match args.command {
            Some(Command::Fetch { username, password }) => {
                assert_eq!(username, "alice");
                assert_eq!(password, "pw");
            }
            other => panic!("expected fetch, got {other:?}"),
        }
        assert_eq!(args.report.format, Some(ReportFormat::Csv));
    }

    #[test]
    fn test_cli_overrides_carry_given_values_only() {
        let args =
            Args::try_parse_from(["report-desk", "--endpoint", "http://localhost:9000"]).unwrap();
        let overrides = args.report.overrides();
        assert_eq!(
            overrides.endpoint.map(|u| u.to_string()),
            Some("http://localhost:9000/".to_string())
        );
        assert!(overrides.output_dir.is_none());
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let err = Args::try_parse_from(["report-desk", "--invalid-flag"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}
