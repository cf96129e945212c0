//! Drafts git commit messages with the OpenAI API and walks the user through reviewing,
//! committing and pushing them.
//!
//! The `gitai` binary runs [`commands::commit::handle_commit`]; `gitai-setup` runs
//! [`commands::setup::handle_setup`].

pub mod commands;
pub mod config;
pub mod conventions;
pub mod errors;
pub mod git;
pub mod llm;
pub mod message;
pub mod profile;
pub mod prompt;
pub mod review;
pub mod ui;

use log::LevelFilter;

/// Sets up `pretty_env_logger`. `RUST_LOG` is honored; `debug` turns on this crate's debug logs.
pub fn init_logger(debug: bool) {
    let mut builder = pretty_env_logger::formatted_builder();
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    if debug {
        builder.filter_module("git_ai_toolkit", LevelFilter::Debug);
    }
    let _ = builder.try_init();
}
