//! Command nodes: recursive matching and handling of chained commands.
//!
//! A node matches when the first token of the text it is given is one of its
//! commands. A router then hands the rest of the text to its children in
//! order, falling back to its default node; a leaf checks its filter and
//! reports the remaining tokens. Matching records which children were taken
//! in a [`DispatchPath`], which `handle` replays to reach the same leaf
//! without matching again.
//!
//! ```
//! use chaincmd::{CallbackContext, CommandNode, Message};
//!
//! let tree = CommandNode::router(
//!     ["/plan"],
//!     vec![
//!         CommandNode::leaf(["add"], |_, ctx: &mut CallbackContext| ctx.args.join(" ")).unwrap(),
//!         CommandNode::leaf(["list", "ls"], |_, _: &mut CallbackContext| {
//!             "listing".to_string()
//!         })
//!         .unwrap(),
//!     ],
//! )
//! .unwrap();
//!
//! let message = Message::text(r#"/plan add "daily report""#);
//! let verdict = tree.match_message(&message).into_match().unwrap();
//! let reply = tree.handle(&verdict, &message, &mut CallbackContext::new()).unwrap();
//! assert_eq!(reply, "daily report");
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::{ConstructionError, HandleError, HandleResult};
use super::verdict::{DispatchPath, Match, MatchVerdict, PathStep};
use crate::internal::args::ArgumentSchema;
use crate::internal::filters::{Filter, FilterResult};
use crate::internal::message::{CallbackContext, Message};
use crate::internal::tokenizer::{first_token, tokenize};

static COMMAND_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/?[0-9a-z_-]{1,32}$").expect("command pattern must compile"));

/// The empty command, matching any text.
pub const CATCH_ALL: &str = "";

/// Leaf callback. Receives the host's message and the filled-in context.
pub type Callback<R> = Arc<dyn Fn(&Message, &mut CallbackContext) -> R + Send + Sync>;

/// What a node does once its command matched.
pub enum NodeKind<R> {
    Leaf {
        callback: Callback<R>,
        schema: Option<ArgumentSchema>,
    },
    Router {
        children: Vec<CommandNode<R>>,
        default: Option<Box<CommandNode<R>>>,
    },
}

/// One node of a command tree. The root node is the dispatch tree itself.
pub struct CommandNode<R> {
    commands: BTreeSet<String>,
    filter: Option<Filter>,
    kind: NodeKind<R>,
}

/// Builder mirroring the full set of node options; validates on [`build`](Self::build).
pub struct CommandBuilder<R> {
    commands: Vec<String>,
    callback: Option<Callback<R>>,
    children: Option<Vec<CommandNode<R>>>,
    default: Option<CommandNode<R>>,
    filter: Option<Filter>,
    schema: Option<ArgumentSchema>,
}

impl<R> CommandBuilder<R> {
    pub fn callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Message, &mut CallbackContext) -> R + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self
    }

    pub fn shared_callback(mut self, callback: Callback<R>) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn children(mut self, children: Vec<CommandNode<R>>) -> Self {
        self.children = Some(children);
        self
    }

    /// Fallback callback for when no sub command matches.
    pub fn default<F>(self, callback: F) -> Self
    where
        F: Fn(&Message, &mut CallbackContext) -> R + Send + Sync + 'static,
    {
        self.default_node(CommandNode::catch_all(callback))
    }

    /// Fallback node for when no sub command matches. It is tried against the
    /// same text this node was given.
    pub fn default_node(mut self, node: CommandNode<R>) -> Self {
        self.default = Some(node);
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Schema used to bind the leaf's tokens before its callback runs.
    pub fn schema(mut self, schema: ArgumentSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn build(self) -> Result<CommandNode<R>, ConstructionError> {
        if self.commands.is_empty() {
            return Err(ConstructionError::NoCommands);
        }
        let mut commands = BTreeSet::new();
        for command in &self.commands {
            let command = command.to_lowercase();
            if command != CATCH_ALL && !COMMAND_PATTERN.is_match(&command) {
                return Err(ConstructionError::InvalidCommand(command));
            }
            commands.insert(command);
        }
        let catch_all = commands.contains(CATCH_ALL);
        if catch_all && self.filter.is_some() {
            return Err(ConstructionError::FilterOnCatchAll);
        }

        let kind = match (self.callback, self.children) {
            (Some(callback), None) => {
                if self.default.is_some() {
                    return Err(ConstructionError::DefaultWithoutChildren);
                }
                NodeKind::Leaf {
                    callback,
                    schema: self.schema,
                }
            }
            (None, Some(children)) => {
                if catch_all {
                    return Err(ConstructionError::ChildrenOnCatchAll);
                }
                if self.schema.is_some() {
                    return Err(ConstructionError::SchemaWithoutCallback);
                }
                NodeKind::Router {
                    children,
                    default: self.default.map(Box::new),
                }
            }
            _ => return Err(ConstructionError::CallbackXorChildren),
        };

        Ok(CommandNode {
            commands,
            filter: self.filter,
            kind,
        })
    }
}

impl<R> CommandNode<R> {
    pub fn builder<I, S>(commands: I) -> CommandBuilder<R>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandBuilder {
            commands: commands.into_iter().map(Into::into).collect(),
            callback: None,
            children: None,
            default: None,
            filter: None,
            schema: None,
        }
    }

    /// Node handled by `callback`.
    pub fn leaf<I, S, F>(commands: I, callback: F) -> Result<Self, ConstructionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&Message, &mut CallbackContext) -> R + Send + Sync + 'static,
    {
        Self::builder(commands).callback(callback).build()
    }

    /// Node delegating to `children`.
    pub fn router<I, S>(
        commands: I,
        children: Vec<CommandNode<R>>,
    ) -> Result<Self, ConstructionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::builder(commands).children(children).build()
    }

    /// Leaf with the empty command: matches any text and passes all of it as args.
    pub fn catch_all<F>(callback: F) -> Self
    where
        F: Fn(&Message, &mut CallbackContext) -> R + Send + Sync + 'static,
    {
        CommandNode {
            commands: BTreeSet::from([CATCH_ALL.to_string()]),
            filter: None,
            kind: NodeKind::Leaf {
                callback: Arc::new(callback),
                schema: None,
            },
        }
    }

    /// Lower-cased commands of this node.
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(String::as_str)
    }

    pub fn kind(&self) -> &NodeKind<R> {
        &self.kind
    }

    /// Sub commands, empty for leaves.
    pub fn children(&self) -> &[CommandNode<R>] {
        match &self.kind {
            NodeKind::Router { children, .. } => children,
            NodeKind::Leaf { .. } => &[],
        }
    }

    pub fn default_node(&self) -> Option<&CommandNode<R>> {
        match &self.kind {
            NodeKind::Router { default, .. } => default.as_deref(),
            NodeKind::Leaf { .. } => None,
        }
    }

    pub fn schema(&self) -> Option<&ArgumentSchema> {
        match &self.kind {
            NodeKind::Leaf { schema, .. } => schema.as_ref(),
            NodeKind::Router { .. } => None,
        }
    }

    pub fn is_catch_all(&self) -> bool {
        self.commands.contains(CATCH_ALL)
    }

    /// Match a message's full text against this tree.
    pub fn match_message(&self, message: &Message) -> MatchVerdict {
        self.match_text(message, message.text_or_empty())
    }

    /// Match `scratch`, the part of `message`'s text not yet consumed by
    /// parent commands.
    pub fn match_text(&self, message: &Message, scratch: &str) -> MatchVerdict {
        if self.is_catch_all() {
            return MatchVerdict::Matched(Match {
                path: DispatchPath::catch_all(),
                args: tokenize(scratch, 0),
                filter_data: None,
            });
        }
        if scratch.is_empty() {
            return MatchVerdict::NoMatch;
        }
        let Some(token) = first_token(scratch) else {
            return MatchVerdict::NoMatch;
        };
        if !self.commands.contains(&token.raw.to_lowercase()) {
            return MatchVerdict::NoMatch;
        }

        match &self.kind {
            NodeKind::Router { children, default } => {
                if let Some(filter) = &self.filter
                    && !filter.check(&message.with_text(scratch)).accepted()
                {
                    tracing::debug!(command = token.raw, "router filter rejected message");
                    return MatchVerdict::Rejected;
                }
                let remainder = scratch[token.end..].trim_start();
                for (index, child) in children.iter().enumerate() {
                    if let MatchVerdict::Matched(found) = child.match_text(message, remainder) {
                        return MatchVerdict::Matched(found.pushed(PathStep::Child(index)));
                    }
                }
                let Some(default) = default else {
                    tracing::debug!(command = token.raw, "no sub command matched");
                    return MatchVerdict::Rejected;
                };
                match default.match_text(message, scratch) {
                    // A catch-all already reports the default marker.
                    MatchVerdict::Matched(found) if default.is_catch_all() => {
                        MatchVerdict::Matched(found)
                    }
                    MatchVerdict::Matched(found) => {
                        MatchVerdict::Matched(found.pushed(PathStep::Default))
                    }
                    other => other,
                }
            }
            NodeKind::Leaf { .. } => {
                let rest = scratch[token.end..].trim_start();
                let result = match &self.filter {
                    Some(filter) => filter.check(&message.with_text(rest)),
                    None => FilterResult::Accept,
                };
                if !result.accepted() {
                    tracing::debug!(command = token.raw, "leaf filter rejected message");
                    return MatchVerdict::Rejected;
                }
                MatchVerdict::Matched(Match {
                    path: DispatchPath::new(),
                    args: tokenize(scratch, token.end),
                    filter_data: result.into_data(),
                })
            }
        }
    }

    /// Run the leaf selected by `verdict`.
    ///
    /// `context.args` is replaced by the verdict's tokens and filter data is
    /// merged into `context.data`. Leaves with a schema bind the tokens into
    /// `context.bound` first.
    pub fn handle(
        &self,
        verdict: &Match,
        message: &Message,
        context: &mut CallbackContext,
    ) -> HandleResult<R> {
        context.args = verdict.args.clone();
        if let Some(data) = &verdict.filter_data {
            context.merge_data(data);
        }
        self.handle_steps(verdict.path.steps(), message, context)
    }

    fn handle_steps(
        &self,
        steps: &[PathStep],
        message: &Message,
        context: &mut CallbackContext,
    ) -> HandleResult<R> {
        match &self.kind {
            // Any leftover step is the marker of a catch-all handling itself.
            NodeKind::Leaf { callback, schema } => {
                if let Some(schema) = schema {
                    let bound = schema.bind(&context.args).map_err(|cause| HandleError::Bind {
                        usage: schema.usage(),
                        cause,
                    })?;
                    context.bound = Some(bound);
                }
                Ok(callback(message, context))
            }
            NodeKind::Router { children, default } => {
                let Some((step, rest)) = steps.split_last() else {
                    return Err(HandleError::ForeignVerdict(format!(
                        "path ended at router {self}"
                    )));
                };
                let next = match step {
                    PathStep::Child(index) => children.get(*index).ok_or_else(|| {
                        HandleError::ForeignVerdict(format!(
                            "router has {} sub commands, path selects {index}",
                            children.len()
                        ))
                    })?,
                    PathStep::Default => default.as_deref().ok_or_else(|| {
                        HandleError::ForeignVerdict("router has no default handler".to_string())
                    })?,
                };
                next.handle_steps(rest, message, context)
            }
        }
    }
}

impl<R> fmt::Display for CommandNode<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let commands: Vec<String> = self.commands.iter().map(|c| format!("'{c}'")).collect();
        write!(f, "ChainCommand([{}]", commands.join(", "))?;
        if let NodeKind::Router { children, default } = &self.kind {
            for child in children {
                write!(f, ", {child}")?;
            }
            if let Some(default) = default {
                write!(f, ", default={default}")?;
            }
        }
        f.write_str(")")
    }
}

impl<R> fmt::Debug for CommandNode<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("CommandNode");
        s.field("commands", &self.commands).field("filter", &self.filter);
        match &self.kind {
            NodeKind::Leaf { schema, .. } => s.field("schema", schema),
            NodeKind::Router { children, default } => {
                s.field("children", children).field("default", default)
            }
        };
        s.finish()
    }
}
