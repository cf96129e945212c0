//! src/main.rs

use clap::Parser;
use git_ai_toolkit::commands::{commit::handle_commit, Cli};
use git_ai_toolkit::{init_logger, ui};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logger(cli.debug);

    if let Err(err) = handle_commit(cli).await {
        ui::report_error(&err);
        std::process::exit(1);
    }
}
