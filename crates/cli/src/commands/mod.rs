//! Command implementations.

mod info;
mod run;
mod validate;

pub use info::run_info;
pub use run::run_server;
pub use validate::run_validate;

use std::path::Path;

use anyhow::{Context, Result};
use contracts::ServerBlueprint;

use crate::error::CliError;

/// Load a configuration file, merge extra listen addresses, then validate.
///
/// Listen addresses are merged first so a file without listeners is valid
/// when `--listen` supplies them.
pub(crate) fn load_blueprint(path: &Path, listen: &[String]) -> Result<ServerBlueprint> {
    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()).into());
    }

    let mut blueprint = config_loader::ConfigLoader::parse_from_path(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    blueprint.add_listen_addresses(listen.iter().cloned());

    config_loader::ConfigLoader::validate(&blueprint)
        .map_err(|e| CliError::config_validation(e.to_string()))?;

    Ok(blueprint)
}
