//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::{HandlerKind, ServerBlueprint};

use crate::cli::ValidateArgs;
use crate::commands::load_blueprint;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    listener_count: usize,
    handler_count: usize,
    queue_count: usize,
    filter_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    match load_blueprint(&args.config, &[]) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            let count = |kind: HandlerKind| {
                blueprint.handlers.iter().filter(|h| h.kind == kind).count()
            };

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    listener_count: blueprint.listeners.len(),
                    handler_count: blueprint.handlers.len(),
                    queue_count: count(HandlerKind::Queue),
                    filter_count: count(HandlerKind::Filter),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("{e:#}")),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &ServerBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.handlers.is_empty() {
        warnings.push("No handlers configured - every record will be unhandled".to_string());
    }

    for handler in &blueprint.handlers {
        match handler.kind {
            HandlerKind::Queue if handler.queue_capacity == 0 => warnings.push(format!(
                "Handler '{}' has queue_capacity 0 - every record passes through",
                handler.name
            )),
            HandlerKind::Filter if handler.forward_on_queue || !handler.params.is_empty() => {
                warnings.push(format!(
                    "Handler '{}' is a filter - queue and sink settings are ignored",
                    handler.name
                ))
            }
            _ => {}
        }
    }

    if let Some(last) = blueprint.handlers.last() {
        if last.kind == HandlerKind::Queue && last.forward_on_queue {
            warnings.push(format!(
                "Handler '{}' forwards queued records but is the last handler - they will be counted as unhandled",
                last.name
            ));
        }
        if last.kind == HandlerKind::Filter {
            warnings.push(format!(
                "Handler '{}' is a filter at the end of the chain - matching records will be unhandled",
                last.name
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Listeners: {}", summary.listener_count);
            println!(
                "  Handlers: {} ({} queue, {} filter)",
                summary.handler_count, summary.queue_count, summary.filter_count
            );
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
