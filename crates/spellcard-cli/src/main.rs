use anyhow::Result;
use clap::{Parser, Subcommand};

use spellcard_cli::commands::{self, render::RenderArgs};
use spellcard_cli::GlobalOptions;

#[derive(Parser, Debug)]
#[command(author, version, about = "D&D spell card generator")]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a spell card to a JPEG file and print its path.
    Render(RenderArgs),
    /// List the registered card generators.
    Generators {
        /// Print the listing as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Serve the MCP protocol over stdin/stdout.
    Mcp,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    commands::configure_tracing(cli.global.log_level.as_deref())?;

    match cli.command {
        Command::Render(args) => commands::render::run(&cli.global, &args).map(|_| ()),
        Command::Generators { json } => commands::generators::run(&cli.global, json),
        Command::Mcp => commands::mcp::run_mcp_server(&cli.global).await,
    }
}
