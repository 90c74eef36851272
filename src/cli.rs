//! CLI entry for chaincmd, defining clap subcommands and dispatching each command handler.

use clap::{Parser, Subcommand};

use crate::command;

// The Cli struct represents the root of the command line interface.
#[derive(Parser, Debug)]
#[command(
    about = "chaincmd: try chained bot commands without a bot",
    version = "0.1.0"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Split text into argument tokens")]
    Tokenize(command::tokenize::TokenizeArgs),
    #[command(
        name = "match",
        alias = "route",
        about = "Match a message against the configured command trees"
    )]
    Match(command::route::RouteArgs),
    #[command(about = "Show the configured command trees")]
    Tree(command::tree::TreeArgs),
}

/// Parse the command line and run the selected subcommand.
/// - `args`: parse from command line if it's `None`, otherwise parse from the given args
pub fn parse(args: Option<&[&str]>) -> anyhow::Result<()> {
    let args = match args {
        Some(args) => Cli::try_parse_from(args)?,
        None => Cli::parse(),
    };
    match args.command {
        Commands::Tokenize(args) => command::tokenize::execute(args),
        Commands::Match(args) => command::route::execute(args),
        Commands::Tree(args) => command::tree::execute(args),
    }
}

/// this test is to verify that the CLI can be built without panicking
/// according [clap dock](https://docs.rs/clap/latest/clap/_derive/_tutorial/chapter_4/index.html)
#[test]
fn verify_cli() {
    use clap::CommandFactory;

    Cli::command().debug_assert()
}

#[test]
fn parse_tokenize_args() {
    let cli = Cli::try_parse_from(["chaincmd", "tokenize", "--from", "3", "/a b"]).unwrap();
    match cli.command {
        Commands::Tokenize(args) => {
            assert_eq!(args.text, "/a b");
            assert_eq!(args.from, 3);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}
