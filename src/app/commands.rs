//! Non-interactive modes: `fetch` and `quick`.

use anyhow::{Result, bail};
use report_desk::report::{Credentials, ReportRequest, Settlement};
use report_desk::Settings;
use tracing::info;

use super::runtime::build_transaction;

pub(crate) async fn run_fetch(settings: &Settings, username: &str, password: &str) -> Result<()> {
    if username.trim().is_empty() || password.is_empty() {
        bail!("Please enter both username and password.");
    }
    let transaction = build_transaction(settings)?;
    let credentials = Credentials {
        username: username.trim().to_string(),
        password: password.to_string(),
    };
    let request = ReportRequest::new(credentials, &settings.report);
    print_settlement(transaction.run(&request).await)
}

pub(crate) async fn run_quick(settings: &Settings, token: Option<&str>) -> Result<()> {
    let transaction = build_transaction(settings)?;
    print_settlement(transaction.run_quick(token).await)
}

fn print_settlement(settlement: Settlement) -> Result<()> {
    match settlement {
        Settlement::Saved { filename, location } => {
            info!(%filename, "report saved");
            println!("{}", location.display());
            Ok(())
        }
        Settlement::Failed(error) => bail!("Download failed: {error}"),
    }
}
