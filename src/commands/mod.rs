//! src/commands/mod.rs

pub mod commit;
pub mod setup;

use clap::{Arg, ArgAction, Parser};

const EXAMPLES: &str = "\
Examples:
  gitai                    # Generate commit message for all changes
  gitai --stage            # Stage all changes and generate commit
  gitai --offline          # Skip AI generation and write manually
  gitai --push             # Automatically push after committing
  gitai --model gpt-4o     # Use a specific OpenAI model";

/// Generate AI-powered Git commit messages and streamline your Git workflow.
#[derive(Parser, Debug)]
#[command(
    name = "gitai",
    author,
    version,
    long_about = None,
    after_help = EXAMPLES,
    disable_version_flag = true,
    arg(
        Arg::new("version")
            .short('v')
            .long("version")
            .action(ArgAction::Version)
            .help("Show version information and exit")
    )
)]
pub struct Cli {
    /// Stage all unstaged files before generating commit
    #[arg(short, long)]
    pub stage: bool,

    /// Push changes after committing
    #[arg(short, long)]
    pub push: bool,

    /// Skip AI generation and craft commit message manually
    #[arg(short, long)]
    pub offline: bool,

    /// Replace the suggested body with a longer AI-written description
    #[arg(short, long)]
    pub describe: bool,

    /// Commit the suggested message without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// OpenAI model to use (default: from config, gpt-4o-mini)
    #[arg(short, long, help_heading = "Advanced options")]
    pub model: Option<String>,

    /// Maximum tokens for AI response (default: from config, 300)
    #[arg(long, help_heading = "Advanced options")]
    pub max_tokens: Option<u32>,

    /// Show detailed debug information
    #[arg(long, help_heading = "Advanced options")]
    pub debug: bool,
}
