//! Interactive chat loop: stdin lines, responses and saves drive one
//! `FlowController` on the current thread.

use std::io::{self, Write};
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures_util::future::LocalBoxFuture;
use futures_util::stream::FuturesUnordered;
use futures_util::{FutureExt, StreamExt};
use report_desk::report::{DirectorySaver, DownloadTransaction, ReportClient};
use report_desk::session::{Effect, FlowController, Input, PromptField};
use report_desk::Settings;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use super::input::{Routed, route_line};
use super::render::TerminalRenderer;

type Pending = FuturesUnordered<LocalBoxFuture<'static, Input>>;

pub(crate) fn build_transaction(settings: &Settings) -> Result<DownloadTransaction> {
    let client = ReportClient::with_timeouts(
        settings.endpoint.clone(),
        settings.connect_timeout_secs,
        settings.read_timeout_secs,
    )
    .context("Failed to build HTTP client")?;
    let saver = Arc::new(DirectorySaver::new(settings.output_dir.clone()));
    Ok(DownloadTransaction::new(client, saver))
}

pub(crate) async fn run_chat(settings: &Settings) -> Result<()> {
    let transaction = Rc::new(build_transaction(settings)?);
    let mut controller = FlowController::new(settings.report.clone());
    let mut renderer = TerminalRenderer::new(io::stdout());
    let mut pending: Pending = FuturesUnordered::new();

    info!(endpoint = %settings.endpoint, output_dir = %settings.output_dir.display(), "chat session started");
    let effects = controller.start();
    dispatch(&effects, &mut renderer, &mut pending, &transaction)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    debug!("end of input");
                    break;
                };
                let inputs = match route_line(&line, &renderer.routing()) {
                    Routed::Quit => {
                        if !pending.is_empty() {
                            info!(outstanding = pending.len(), "quitting with transactions in flight");
                        }
                        return Ok(());
                    }
                    Routed::Busy => {
                        debug!("prompt busy; line dropped");
                        continue;
                    }
                    Routed::Empty => continue,
                    Routed::Inputs(inputs) => inputs,
                };
                for input in inputs {
                    let advance = matches!(
                        input,
                        Input::PromptEdited { field: PromptField::Username, .. }
                    );
                    let effects = controller.handle(input);
                    dispatch(&effects, &mut renderer, &mut pending, &transaction)?;
                    if advance {
                        renderer.focus(PromptField::Password).context("Failed to write to stdout")?;
                    }
                }
            }
            Some(input) = pending.next(), if !pending.is_empty() => {
                let effects = controller.handle(input);
                dispatch(&effects, &mut renderer, &mut pending, &transaction)?;
            }
        }
    }

    // Scripted input can end before its download does.
    while let Some(input) = pending.next().await {
        let effects = controller.handle(input);
        dispatch(&effects, &mut renderer, &mut pending, &transaction)?;
    }
    let outstanding = transaction.ledger().outstanding();
    if outstanding > 0 {
        warn!(outstanding, "transient resources still held at exit");
    }
    io::stdout().flush().context("Failed to write to stdout")?;
    Ok(())
}

fn dispatch<W: Write>(
    effects: &[Effect],
    renderer: &mut TerminalRenderer<W>,
    pending: &mut Pending,
    transaction: &Rc<DownloadTransaction>,
) -> Result<()> {
    for effect in effects {
        match effect {
            Effect::BeginTransaction { prompt, request } => {
                let prompt = *prompt;
                let request = request.clone();
                let transaction = Rc::clone(transaction);
                pending.push(
                    async move {
                        let outcome = transaction.execute(&request).await;
                        Input::ResponseReceived { prompt, outcome }
                    }
                    .boxed_local(),
                );
                debug!(%prompt, "transaction started");
            }
            Effect::SaveReport {
                prompt,
                filename,
                bytes,
            } => {
                let prompt = *prompt;
                let (filename, bytes) = (filename.clone(), bytes.clone());
                let transaction = Rc::clone(transaction);
                pending.push(
                    async move {
                        let settlement = transaction.save(filename, bytes).await;
                        Input::TransactionSettled { prompt, settlement }
                    }
                    .boxed_local(),
                );
            }
            _ => renderer
                .apply(effect)
                .context("Failed to write to stdout")?,
        }
    }
    Ok(())
}
