//! src/bin/gitai-setup.rs

use clap::Parser;
use git_ai_toolkit::commands::setup::{handle_setup, SetupCli};
use git_ai_toolkit::{init_logger, ui};

fn main() {
    let cli = SetupCli::parse();
    init_logger(cli.debug);

    if let Err(err) = handle_setup(cli) {
        ui::report_error(&err);
        std::process::exit(1);
    }
}
