//! Configuration validation
//!
//! Rules:
//! - at least one listener
//! - listener addresses non-empty and unique, `recv_buffer_size > 0`
//! - handler names non-empty and unique
//! - filter handlers carry a non-empty filter
//! - network sinks carry a parseable `addr` param

use std::collections::HashSet;
use std::net::SocketAddr;

use contracts::{ContractError, HandlerConfig, HandlerKind, ServerBlueprint, SinkType};

/// Validate a ServerBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &ServerBlueprint) -> Result<(), ContractError> {
    validate_listeners(blueprint)?;
    validate_handler_names(blueprint)?;
    for (idx, handler) in blueprint.handlers.iter().enumerate() {
        validate_handler(idx, handler)?;
    }
    Ok(())
}

fn validate_listeners(blueprint: &ServerBlueprint) -> Result<(), ContractError> {
    if blueprint.listeners.is_empty() {
        return Err(ContractError::config_validation(
            "listeners",
            "at least one listener is required",
        ));
    }

    let mut seen = HashSet::new();
    for (idx, listener) in blueprint.listeners.iter().enumerate() {
        let address = listener.address.trim();
        if address.is_empty() {
            return Err(ContractError::config_validation(
                format!("listeners[{idx}].address"),
                "listener address cannot be empty",
            ));
        }
        if !seen.insert(address) {
            return Err(ContractError::config_validation(
                format!("listeners[address={address}]"),
                "duplicate listener address",
            ));
        }
        if listener.recv_buffer_size == 0 {
            return Err(ContractError::config_validation(
                format!("listeners[{idx}].recv_buffer_size"),
                "recv_buffer_size must be > 0",
            ));
        }
    }
    Ok(())
}

fn validate_handler_names(blueprint: &ServerBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, handler) in blueprint.handlers.iter().enumerate() {
        if handler.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("handlers[{idx}].name"),
                "handler name cannot be empty",
            ));
        }
        if !seen.insert(&handler.name) {
            return Err(ContractError::config_validation(
                format!("handlers[name={}]", handler.name),
                "duplicate handler name",
            ));
        }
    }
    Ok(())
}

fn validate_handler(idx: usize, handler: &HandlerConfig) -> Result<(), ContractError> {
    match handler.kind {
        HandlerKind::Filter => {
            if !handler.filter.as_ref().is_some_and(|f| !f.is_empty()) {
                return Err(ContractError::config_validation(
                    format!("handlers[{idx}].filter"),
                    "filter handler needs at least one filter criterion",
                ));
            }
        }
        HandlerKind::Queue if handler.sink == SinkType::Network => {
            let addr = handler.params.get("addr").ok_or_else(|| {
                ContractError::config_validation(
                    format!("handlers[{idx}].params.addr"),
                    "network sink requires 'addr'",
                )
            })?;
            addr.parse::<SocketAddr>().map_err(|e| {
                ContractError::config_validation(
                    format!("handlers[{idx}].params.addr"),
                    format!("invalid address '{addr}': {e}"),
                )
            })?;
        }
        HandlerKind::Queue => {}
    }
    Ok(())
}
