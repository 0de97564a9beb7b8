//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

use contracts::{FilterConfig, HandlerConfig, HandlerKind, ServerBlueprint};

use crate::cli::InfoArgs;
use crate::commands::load_blueprint;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    missing_priority: String,
    listeners: Vec<ListenerInfo>,
    handlers: Vec<HandlerInfo>,
}

#[derive(Serialize)]
struct ListenerInfo {
    name: String,
    address: String,
    recv_buffer_size: usize,
}

#[derive(Serialize)]
struct HandlerInfo {
    name: String,
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    queue_capacity: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    forward_on_queue: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sink: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    params: HashMap<String, String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    let blueprint = load_blueprint(&args.config, &[])?;

    if args.json {
        let info = build_config_info(&blueprint);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint);
    }

    Ok(())
}

fn build_config_info(blueprint: &ServerBlueprint) -> ConfigInfo {
    let listeners = blueprint
        .listeners
        .iter()
        .map(|l| ListenerInfo {
            name: l.display_name().to_string(),
            address: l.address.clone(),
            recv_buffer_size: l.recv_buffer_size,
        })
        .collect();

    let handlers = blueprint
        .handlers
        .iter()
        .map(|h| {
            let is_queue = h.kind == HandlerKind::Queue;
            HandlerInfo {
                name: h.name.clone(),
                kind: format!("{:?}", h.kind),
                queue_capacity: is_queue.then_some(h.queue_capacity),
                forward_on_queue: is_queue.then_some(h.forward_on_queue),
                sink: is_queue.then(|| format!("{:?}", h.sink)),
                filter: h.filter.as_ref().map(describe_filter),
                params: h.params.clone(),
            }
        })
        .collect();

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        missing_priority: format!("{:?}", blueprint.parser.missing_priority),
        listeners,
        handlers,
    }
}

/// One-line description of a filter, e.g. `tag in [named, bind] and severity >= err`
fn describe_filter(filter: &FilterConfig) -> String {
    if filter.is_empty() {
        return "any".to_string();
    }

    let mut parts = Vec::new();
    if !filter.tags.is_empty() {
        parts.push(format!("tag in [{}]", filter.tags.join(", ")));
    }
    if !filter.hostnames.is_empty() {
        parts.push(format!("hostname in [{}]", filter.hostnames.join(", ")));
    }
    if !filter.facilities.is_empty() {
        let names: Vec<&str> = filter.facilities.iter().map(|f| f.as_str()).collect();
        parts.push(format!("facility in [{}]", names.join(", ")));
    }
    if let Some(min) = filter.min_severity {
        parts.push(format!("severity >= {}", min.as_str()));
    }
    parts.join(" and ")
}

fn describe_handler(handler: &HandlerConfig) -> String {
    match handler.kind {
        HandlerKind::Queue => format!(
            "queue, capacity {}, sink {:?}{}",
            handler.queue_capacity,
            handler.sink,
            if handler.forward_on_queue {
                ", forwards"
            } else {
                ""
            }
        ),
        HandlerKind::Filter => "filter".to_string(),
    }
}

fn print_config_info(blueprint: &ServerBlueprint) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Syslog Server Configuration                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📍 Parser");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!(
        "   └─ Missing priority: {:?}",
        blueprint.parser.missing_priority
    );

    println!("\n📥 Listeners ({})", blueprint.listeners.len());
    for (i, listener) in blueprint.listeners.iter().enumerate() {
        let is_last = i == blueprint.listeners.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        println!(
            "   {} {} ({}, buffer {} bytes)",
            prefix,
            listener.display_name(),
            listener.address,
            listener.recv_buffer_size
        );
    }

    println!("\n⚙️  Handlers ({})", blueprint.handlers.len());
    if blueprint.handlers.is_empty() {
        println!("   └─ (none, every record is unhandled)");
    }
    for (i, handler) in blueprint.handlers.iter().enumerate() {
        let is_last = i == blueprint.handlers.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };

        println!("   {} {} ({})", prefix, handler.name, describe_handler(handler));
        if let Some(ref filter) = handler.filter {
            println!("   {}  └─ filter: {}", child_prefix, describe_filter(filter));
        }
    }

    println!();
}
