//! ---
//! rules_section: "04-command-line"
//! rules_subsection: "binary"
//! rules_type: "source"
//! rules_scope: "code"
//! rules_description: "Control CLI printing emitted build rules."
//! rules_version: "v0.1.0"
//! rules_owner: "tbd"
//! ---
use anyhow::Result;
use clap::{Parser, Subcommand};

mod detect;
mod emit;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Compute targets and compiler invocations for protoc build rules",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Emit targets and commands for the rules of a build file")]
    Emit(emit::EmitCommand),
    #[command(about = "Locate the protoc compiler once and print its path")]
    Detect(detect::DetectCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Emit(cmd) => cmd.execute()?,
        Commands::Detect(cmd) => cmd.execute()?,
    }
    Ok(())
}
