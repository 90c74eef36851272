//! Prints the configured command trees.

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;

use super::route::dry_run_registry;
use crate::internal::config::NodeConfig;

#[derive(Parser, Debug)]
#[command(about = "Show the configured command trees")]
pub struct TreeArgs {
    /// Config file to use instead of the config hierarchy
    #[clap(long, short)]
    pub config: Option<PathBuf>,
}

pub fn execute(args: TreeArgs) -> anyhow::Result<()> {
    let (path, config) = super::resolve_config(args.config.as_deref())?;
    let dispatcher = config.build(&dry_run_registry(&config))?;
    println!("{}", format!("# {}", path.display()).dimmed());
    for group in dispatcher.groups() {
        println!("{}", format!("group {group}").bold());
        // Handlers keep config order within their group.
        let nodes = config
            .handlers
            .iter()
            .filter(|handler| handler.group == group)
            .map(|handler| &handler.node);
        for (handler, node) in dispatcher.handlers(group).iter().zip(nodes) {
            println!("  {handler}");
            for (line, description) in outline(node) {
                if description.is_empty() {
                    println!("    {line}");
                } else {
                    println!("    {line}  {}", description.dimmed());
                }
            }
        }
    }
    Ok(())
}

/// One `(command chain, description)` line per configured node, parents first.
pub fn outline(node: &NodeConfig) -> Vec<(String, String)> {
    let mut lines = Vec::new();
    walk(node, "", &mut lines);
    lines
}

fn walk(node: &NodeConfig, prefix: &str, lines: &mut Vec<(String, String)>) {
    let commands = if node.commands.iter().all(String::is_empty) {
        "*".to_string()
    } else {
        node.commands.join("|")
    };
    let chain = if prefix.is_empty() {
        commands
    } else {
        format!("{prefix} {commands}")
    };
    lines.push((chain.clone(), node.description.clone()));
    for child in node.children.iter().flatten() {
        walk(child, &chain, lines);
    }
    if node.default.is_some() {
        lines.push((format!("{chain} *"), String::new()));
    }
}
