//! Declarative command trees: loading from TOML or JSON and binding callbacks by name.
//!
//! ```toml
//! [[handlers]]
//! commands = ["/plan"]
//! description = "Manage plans"
//! default = "plan_help"
//!
//! [[handlers.children]]
//! commands = ["add"]
//! callback = "plan_add"
//! usage = "/plan add <title> [count]"
//! args = [
//!     { name = "title", type = "str" },
//!     { name = "count", type = "int", default = 1 },
//! ]
//! ```
//!
//! Config files are looked up in two tiers, first found wins:
//! 1. `{working_dir}/.chaincmd/commands.{toml,json}` (project-local)
//! 2. `~/.config/chaincmd/commands.{toml,json}` (user-global)

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::args::{ArgType, ArgValue, ArgumentSchema, Cast, DefaultValue, SchemaError};
use super::dispatcher::Dispatcher;
use super::filters::Filter;
use super::handler::{Callback, CommandNode, ConstructionError};
use super::message::{CallbackContext, Message};

const CONFIG_DIR: &str = ".chaincmd";
const CONFIG_STEM: &str = "commands";

/// Errors raised while loading or building a configured tree.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {cause}")]
    Io { path: PathBuf, cause: std::io::Error },

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("No callback registered under `{0}`")]
    UnknownCallback(String),

    #[error("Invalid default for `{name}`: {cause}")]
    InvalidDefault { name: String, cause: anyhow::Error },

    #[error("Invalid filter pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level config file: a list of handler trees.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreeConfig {
    #[serde(default)]
    pub handlers: Vec<HandlerConfig>,
}

/// A root tree and the dispatcher group it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerConfig {
    #[serde(default)]
    pub group: i32,
    #[serde(flatten)]
    pub node: NodeConfig,
}

/// One command node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeConfig {
    pub commands: Vec<String>,
    /// Shown next to the node by `chaincmd tree`.
    #[serde(default)]
    pub description: String,
    /// Registered callback name. Exactly one of `callback` and `children`.
    #[serde(default)]
    pub callback: Option<String>,
    #[serde(default)]
    pub children: Option<Vec<NodeConfig>>,
    /// Registered callback used when no child matches.
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub usage: Option<String>,
    #[serde(default)]
    pub args: Vec<ArgConfig>,
    /// Only accept messages from these chats.
    #[serde(default)]
    pub chats: Vec<i64>,
    /// Only accept messages from these users.
    #[serde(default)]
    pub users: Vec<i64>,
    /// Only accept messages matching this regex; matches reach the context.
    #[serde(default)]
    pub pattern: Option<String>,
}

/// One declared argument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArgConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ArgType,
    /// Optional without a default binds null when absent.
    #[serde(default)]
    pub optional: bool,
    /// Giving a default makes the argument optional. Date-time arguments
    /// accept `"now"`, evaluated at bind time.
    #[serde(default)]
    pub default: Option<Value>,
}

/// Callbacks available to configured trees, by name.
pub struct CallbackRegistry<R> {
    callbacks: HashMap<String, Callback<R>>,
}

impl<R> Default for CallbackRegistry<R> {
    fn default() -> Self {
        Self {
            callbacks: HashMap::new(),
        }
    }
}

impl<R> CallbackRegistry<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback under `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, callback: F)
    where
        F: Fn(&Message, &mut CallbackContext) -> R + Send + Sync + 'static,
    {
        self.register_shared(name, Arc::new(callback));
    }

    pub fn register_shared(&mut self, name: impl Into<String>, callback: Callback<R>) {
        let name = name.into();
        if self.callbacks.insert(name.clone(), callback).is_some() {
            tracing::warn!("Overwriting callback: {name}");
        }
    }

    pub fn get(&self, name: &str) -> Option<Callback<R>> {
        self.callbacks.get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.callbacks.keys().cloned().collect()
    }
}

impl TreeConfig {
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a config file, picking the format from its extension.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|cause| ConfigError::Io {
            path: path.to_path_buf(),
            cause,
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Every callback name referenced by the configured trees.
    pub fn callback_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        for handler in &self.handlers {
            handler.node.collect_callback_names(&mut names);
        }
        names
    }

    /// Build every configured tree into a dispatcher.
    pub fn build<R: 'static>(&self, registry: &CallbackRegistry<R>) -> ConfigResult<Dispatcher<R>> {
        let mut dispatcher = Dispatcher::new();
        for handler in &self.handlers {
            dispatcher.add_handler_to(handler.node.build(registry)?, handler.group);
        }
        Ok(dispatcher)
    }
}

impl NodeConfig {
    pub fn build<R: 'static>(
        &self,
        registry: &CallbackRegistry<R>,
    ) -> ConfigResult<CommandNode<R>> {
        let mut builder = CommandNode::builder(self.commands.iter().cloned());
        if let Some(name) = &self.callback {
            builder = builder.shared_callback(lookup(registry, name)?);
        }
        if let Some(children) = &self.children {
            let children = children
                .iter()
                .map(|child| child.build(registry))
                .collect::<ConfigResult<Vec<_>>>()?;
            builder = builder.children(children);
        }
        if let Some(name) = &self.default {
            let callback = lookup(registry, name)?;
            builder = builder.default(move |message, context| callback(message, context));
        }
        if let Some(filter) = self.filter()? {
            builder = builder.filter(filter);
        }
        if self.usage.is_some() || !self.args.is_empty() {
            builder = builder.schema(self.schema()?);
        }
        Ok(builder.build()?)
    }

    fn collect_callback_names(&self, names: &mut BTreeSet<String>) {
        names.extend(self.callback.iter().cloned());
        names.extend(self.default.iter().cloned());
        for child in self.children.iter().flatten() {
            child.collect_callback_names(names);
        }
    }

    fn filter(&self) -> ConfigResult<Option<Filter>> {
        let mut filters = Vec::new();
        if !self.chats.is_empty() {
            filters.push(Filter::chat(self.chats.iter().copied()));
        }
        if !self.users.is_empty() {
            filters.push(Filter::user(self.users.iter().copied()));
        }
        if let Some(pattern) = &self.pattern {
            filters.push(Filter::regex(pattern)?);
        }
        Ok(filters.into_iter().reduce(|acc, filter| acc & filter))
    }

    fn schema(&self) -> ConfigResult<ArgumentSchema> {
        let mut builder = ArgumentSchema::builder();
        if let Some(usage) = &self.usage {
            builder = builder.usage(usage.clone());
        }
        for arg in &self.args {
            builder = match (&arg.default, arg.optional) {
                (None, false) => builder.required(arg.name.clone(), arg.ty.clone()),
                (None, true) => {
                    builder.optional(arg.name.clone(), arg.ty.clone(), DefaultValue::Absent)
                }
                (Some(literal), _) => {
                    let default = default_value(arg, literal)?;
                    builder.optional(arg.name.clone(), arg.ty.clone(), default)
                }
            };
        }
        Ok(builder.build()?)
    }
}

fn lookup<R>(registry: &CallbackRegistry<R>, name: &str) -> ConfigResult<Callback<R>> {
    registry
        .get(name)
        .ok_or_else(|| ConfigError::UnknownCallback(name.to_string()))
}

/// Turn a config literal into a default, cast with the argument's own type.
fn default_value(arg: &ArgConfig, literal: &Value) -> ConfigResult<DefaultValue> {
    if arg.ty == ArgType::DateTime && literal.as_str() == Some("now") {
        return Ok(DefaultValue::lazy(|| ArgValue::DateTime(Utc::now())));
    }
    if literal.is_null() {
        return Ok(DefaultValue::Absent);
    }
    let raw = match literal {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let invalid = |cause| ConfigError::InvalidDefault {
        name: arg.name.clone(),
        cause,
    };
    let cast = Cast::for_type(&arg.ty).ok_or_else(|| {
        invalid(anyhow::anyhow!("type `{}` has no standard cast", arg.ty))
    })?;
    let value = cast.apply(&raw).map_err(invalid)?;
    Ok(DefaultValue::Value(value))
}

/// Find and load the command tree config for `working_dir`.
///
/// Files that fail to parse are logged and skipped.
pub fn load_tree_config(working_dir: &Path) -> Option<(PathBuf, TreeConfig)> {
    let mut dirs = vec![working_dir.join(CONFIG_DIR)];
    if let Some(config_dir) = dirs::config_dir() {
        dirs.push(config_dir.join("chaincmd"));
    }
    for dir in dirs {
        for ext in ["toml", "json"] {
            let path = dir.join(format!("{CONFIG_STEM}.{ext}"));
            if !path.is_file() {
                continue;
            }
            match TreeConfig::from_path(&path) {
                Ok(config) => return Some((path, config)),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to load command config"
                    );
                }
            }
        }
    }
    None
}
