//! Subcommands of the `chaincmd` tool.

pub mod route;
pub mod tokenize;
pub mod tree;

use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};

use crate::internal::config::{TreeConfig, load_tree_config};

/// Load the config named on the command line, or search the config hierarchy.
pub(crate) fn resolve_config(explicit: Option<&Path>) -> anyhow::Result<(PathBuf, TreeConfig)> {
    if let Some(path) = explicit {
        let config = TreeConfig::from_path(path)
            .with_context(|| format!("loading {}", path.display()))?;
        return Ok((path.to_path_buf(), config));
    }
    let working_dir = std::env::current_dir()?;
    load_tree_config(&working_dir).ok_or_else(|| {
        anyhow!(
            "no command config found in {}/.chaincmd or the user config directory",
            working_dir.display()
        )
    })
}
