//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use contracts::ServerBlueprint;

use crate::cli::RunArgs;
use crate::commands::load_blueprint;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_server(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    let blueprint = load_blueprint(&args.config, &args.listen)?;

    info!(
        listeners = blueprint.listeners.len(),
        handlers = blueprint.handlers.len(),
        missing_priority = ?blueprint.parser.missing_priority,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let pipeline_config = PipelineConfig {
        blueprint,
        timeout: (args.timeout != 0).then(|| Duration::from_secs(args.timeout)),
        report_interval: (args.report_interval != 0)
            .then(|| Duration::from_secs(args.report_interval)),
    };

    let pipeline = Pipeline::new(pipeline_config);

    info!("Starting server...");

    let stats = pipeline
        .run(shutdown_signal())
        .await
        .context("Server execution failed")?;

    info!(
        datagrams = stats.listeners_total().datagrams_received,
        dispatched = stats.dispatch.dispatched,
        unhandled = stats.dispatch.unhandled,
        duration_secs = stats.duration.as_secs_f64(),
        "Server stopped"
    );
    stats.print_summary();

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &ServerBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Parser:");
    println!("  Missing priority: {:?}", blueprint.parser.missing_priority);

    println!("\nListeners ({}):", blueprint.listeners.len());
    for listener in &blueprint.listeners {
        println!(
            "  - {} ({}) - buffer {} bytes",
            listener.display_name(),
            listener.address,
            listener.recv_buffer_size
        );
    }

    if blueprint.handlers.is_empty() {
        println!("\nHandlers: none, every record will be unhandled");
    } else {
        println!("\nHandlers ({}):", blueprint.handlers.len());
        for handler in &blueprint.handlers {
            println!("  - {} ({:?})", handler.name, handler.kind);
        }
    }

    println!();
}
