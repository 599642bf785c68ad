//! Application entry point and dispatch.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use insucalc_cli::output::format_duration;
use insucalc_cli::presenter::CLIMatrixPresenter;
use insucalc_cli::progress::CLIProgressReporter;
use insucalc_cli::ui;
use insucalc_core::error::MatrixError;
use insucalc_core::gateway::LookupGateway;
use insucalc_core::observers::LoggingObserver;
use insucalc_core::progress::OperationToken;
use insucalc_gateway::{FixtureGateway, HttpGateway};
use insucalc_orchestration::catalog;
use insucalc_orchestration::interfaces::{MatrixPresenter, ReporterObserver};
use insucalc_orchestration::orchestrator::SelectionOrchestrator;

use crate::config::{AppConfig, ConfigError};
use crate::version::full_version;

/// Run the application.
pub fn run(config: &AppConfig) -> Result<()> {
    // Handle shell completion
    if let Some(shell) = config.completion {
        let mut cmd = <AppConfig as clap::CommandFactory>::command();
        insucalc_cli::completion::generate_completion(&mut cmd, shell, &mut std::io::stdout());
        return Ok(());
    }

    if !config.has_action() {
        return Err(ConfigError::NoAction.into());
    }
    debug!(version = %full_version(), "Starting");

    let gateway = build_gateway(config)?;
    let orchestrator = SelectionOrchestrator::new(gateway, config.selection_defaults());
    orchestrator.register(Arc::new(LoggingObserver::new()));
    orchestrator.register(Arc::new(ReporterObserver::new(CLIProgressReporter::new(
        config.quiet || config.json,
    ))));

    let interrupt = OperationToken::new(0);
    ctrlc_handler(orchestrator.clone(), interrupt.clone())?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(until_interrupted(&interrupt, run_cli(config, &orchestrator)))
}

/// Run `work` unless `interrupt` fires first, in which case the run ends
/// with [`MatrixError::Cancelled`] and pending lookups are dropped.
async fn until_interrupted<F>(interrupt: &OperationToken, work: F) -> Result<()>
where
    F: std::future::Future<Output = Result<()>>,
{
    tokio::select! {
        biased;
        () = interrupt.cancelled() => Err(MatrixError::Cancelled.into()),
        result = work => result,
    }
}

fn build_gateway(config: &AppConfig) -> Result<Arc<dyn LookupGateway>> {
    if let Some(path) = &config.fixture {
        debug!(path = %path.display(), "Using fixture backend");
        return Ok(Arc::new(FixtureGateway::from_file(path)?));
    }
    let gateway = HttpGateway::new(config.gateway_options()?)?;
    debug!(api_base = gateway.base_url(), "Using HTTP backend");
    Ok(Arc::new(gateway))
}

async fn run_cli(config: &AppConfig, orchestrator: &SelectionOrchestrator) -> Result<()> {
    let presenter = CLIMatrixPresenter::new(config.json, config.quiet);

    if config.list_documents {
        let documents = catalog::list_documents(orchestrator.gateway()).await?;
        presenter.present_documents(&documents);
    }

    if let Some(document) = &config.document {
        let listing = orchestrator.document_codes(document).await?;
        presenter.present_codes(&listing);
    }

    if let Some(code) = &config.inspect {
        let inspection = orchestrator.inspect(code).await;
        presenter.present_inspection(&inspection);
    }

    if let Some(code) = &config.code {
        let outcome = orchestrator.select_primary_code(code).await;
        presenter.present_matrix(&orchestrator.snapshot());
        let summary = outcome?;
        if !config.quiet && !config.json {
            ui::print_success(&format!(
                "{}행 완료 (실패 {}), {}",
                summary.rows,
                summary.failed_rows,
                format_duration(summary.elapsed)
            ));
        }
    }

    Ok(())
}

/// Ctrl+C cancels the running selection, so its late writes are dropped,
/// and interrupts whichever mode is running.
fn ctrlc_handler(orchestrator: SelectionOrchestrator, interrupt: OperationToken) -> Result<()> {
    ctrlc::set_handler(move || {
        orchestrator.store().current_token().cancel();
        interrupt.cancel();
    })
    .context("failed to install Ctrl+C handler")
}
