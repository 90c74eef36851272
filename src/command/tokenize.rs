//! Prints the tokens a message text splits into.

use clap::Parser;

use crate::internal::tokenizer;

#[derive(Parser, Debug)]
#[command(about = "Split text into argument tokens")]
pub struct TokenizeArgs {
    /// Text to split, e.g. '/plan add "daily report"'
    pub text: String,

    /// Byte offset to start from
    #[clap(long, default_value_t = 0)]
    pub from: usize,

    /// Print tokens as a JSON array
    #[clap(long)]
    pub json: bool,
}

pub fn execute(args: TokenizeArgs) -> anyhow::Result<()> {
    let tokens = tokenizer::tokenize(&args.text, args.from);
    if args.json {
        println!("{}", serde_json::to_string(&tokens)?);
    } else {
        for (i, token) in tokens.iter().enumerate() {
            println!("{i}: {token}");
        }
    }
    Ok(())
}
