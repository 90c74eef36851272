//! Dry-runs a message through the configured command trees.
//!
//! Every configured callback is replaced by one that reports its own name and
//! arguments, so a config can be checked without the bot that owns it.

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;

use crate::internal::config::{CallbackRegistry, TreeConfig};
use crate::internal::dispatcher::Dispatcher;
use crate::internal::handler::MatchVerdict;
use crate::internal::message::{CallbackContext, Message};

#[derive(Parser, Debug)]
#[command(about = "Match a message against the configured command trees")]
pub struct RouteArgs {
    /// Message text, e.g. '/plan add "daily report" count=3'
    pub text: String,

    /// Config file to use instead of the config hierarchy
    #[clap(long, short)]
    pub config: Option<PathBuf>,

    /// Chat id the message appears to come from
    #[clap(long)]
    pub chat: Option<i64>,

    /// User id the message appears to come from
    #[clap(long)]
    pub user: Option<i64>,
}

/// What happened to one handler tree during a dry run.
#[derive(Debug)]
pub struct RouteEntry {
    pub group: i32,
    pub handler: String,
    pub verdict: MatchVerdict,
    /// Reply of the handling callback, or the handling error's user message.
    pub outcome: Option<Result<String, String>>,
}

/// Registry answering every callback name used in `config` with a report of
/// the call.
pub fn dry_run_registry(config: &TreeConfig) -> CallbackRegistry<String> {
    let mut registry = CallbackRegistry::new();
    for name in config.callback_names() {
        let label = name.clone();
        registry.register(name, move |_: &Message, ctx: &mut CallbackContext| {
            let args = match &ctx.bound {
                Some(bound) => bound
                    .iter()
                    .map(|(name, value)| format!("{name}={value}"))
                    .collect::<Vec<_>>(),
                None => ctx.args.iter().map(|arg| format!("{arg:?}")).collect(),
            };
            format!("{label}({})", args.join(", "))
        });
    }
    registry
}

/// Match `message` against every tree, handling the first match of each group.
pub fn route(dispatcher: &Dispatcher<String>, message: &Message) -> Vec<RouteEntry> {
    dispatcher
        .verdicts(message)
        .into_iter()
        .map(|entry| {
            let outcome = entry.verdict.as_match().map(|found| {
                entry
                    .handler
                    .handle(found, message, &mut CallbackContext::new())
                    .map_err(|e| e.user_message())
            });
            RouteEntry {
                group: entry.group,
                handler: entry.handler.to_string(),
                verdict: entry.verdict,
                outcome,
            }
        })
        .collect()
}

pub fn execute(args: RouteArgs) -> anyhow::Result<()> {
    let (path, config) = super::resolve_config(args.config.as_deref())?;
    tracing::debug!(path = %path.display(), "loaded command config");
    let dispatcher = config.build(&dry_run_registry(&config))?;

    let mut message = Message::text(args.text);
    message.chat_id = args.chat;
    message.from_user = args.user;

    let entries = route(&dispatcher, &message);
    if !entries.iter().any(|entry| entry.outcome.is_some()) {
        println!("{}", "no handler matched".yellow());
    }
    for entry in entries {
        let status = match &entry.verdict {
            MatchVerdict::NoMatch => "no match".dimmed(),
            MatchVerdict::Rejected => "rejected".yellow(),
            MatchVerdict::Matched(found) => format!("matched path={}", found.path).green(),
        };
        println!("[group {}] {} {}", entry.group, entry.handler, status);
        if let Some(found) = entry.verdict.as_match() {
            println!("    args: {:?}", found.args);
            if let Some(data) = &found.filter_data {
                println!("    data: {}", serde_json::Value::Object(data.clone()));
            }
        }
        match entry.outcome {
            Some(Ok(reply)) => println!("    -> {}", reply.cyan()),
            Some(Err(error)) => println!("    -> {}", error.red()),
            None => {}
        }
    }
    Ok(())
}
