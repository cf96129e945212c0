//! src/commands/setup.rs

use crate::config::{self, AIConfig};
use crate::errors::ConfigError;
use crate::profile::{self, ShellKind};
use crate::ui::create_box;
use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input, Password};
use std::env;

/// Where the API key is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KeyTarget {
    /// The gitai config file
    Config,
    /// An `export OPENAI_API_KEY=...` line in your shell profile (user environment on Windows)
    Shell,
}

/// Set up the Git AI Toolkit configuration.
#[derive(Parser, Debug)]
#[command(name = "gitai-setup", author, version, long_about = None)]
pub struct SetupCli {
    /// Directly set the OpenAI API key.
    #[arg(long)]
    pub key: Option<String>,

    /// Where to store the API key
    #[arg(long, value_enum, default_value_t = KeyTarget::Config)]
    pub target: KeyTarget,

    /// Model for commit summary
    #[arg(long)]
    pub summary_model: Option<String>,

    /// Max tokens for summary
    #[arg(long)]
    pub summary_max_tokens: Option<u32>,

    /// Model for extended description
    #[arg(long)]
    pub description_model: Option<String>,

    /// Max tokens for description
    #[arg(long)]
    pub description_max_tokens: Option<u32>,

    /// Keep current (or default) model settings instead of prompting
    #[arg(short, long)]
    pub yes: bool,

    /// Show detailed debug information
    #[arg(long)]
    pub debug: bool,
}

pub fn handle_setup(cli: SetupCli) -> Result<()> {
    println!("{}", create_box("Git AI Toolkit Setup").cyan());
    let theme = ColorfulTheme::default();

    let api_key = match cli.key.as_deref() {
        Some(key) => key.trim().to_string(),
        None => prompt_api_key(&theme)?,
    };
    if api_key.is_empty() {
        bail!("API key cannot be empty. Setup aborted.");
    }
    if !looks_like_openai_key(&api_key) {
        println!(
            "{}",
            "⚠ Warning: API key does not look like a standard OpenAI key (should start with 'sk-')."
                .yellow()
        );
    }

    let config_path = config::get_config_path()?;
    let mut stored = config::read_stored_config(&config_path)?;

    if !cli.yes {
        println!("\n{}", "--- AI Model Configuration ---".cyan());
        println!(
            "{}",
            "Enter the model names and max tokens for AI generation.".yellow()
        );
        println!(
            "{}",
            "Press Enter to accept the value shown in brackets.".yellow()
        );
    }
    stored.ai = resolve_ai_settings(&cli, &stored.ai, &theme)?;

    match cli.target {
        KeyTarget::Config => {
            stored.openai.api_key = Some(api_key);
        }
        KeyTarget::Shell => {
            let location = store_key_in_environment(&api_key)?;
            println!("{}", format!("✓ API key written to {location}").green());
            println!(
                "{}",
                "  → Open a new terminal (or source the profile) for it to take effect.".yellow()
            );
        }
    }

    config::save_config(&stored, &config_path)?;
    println!(
        "{}",
        format!(
            "✓ Configuration saved successfully to {}",
            config_path.display()
        )
        .green()
    );
    Ok(())
}

fn looks_like_openai_key(key: &str) -> bool {
    key.starts_with("sk-")
}

fn prompt_api_key(theme: &ColorfulTheme) -> Result<String> {
    println!("\n{}", "--- OpenAI API Key ---".cyan());
    println!("{}", "Please enter your OpenAI API key.".yellow());
    println!(
        "{}",
        "You can find your key at: https://platform.openai.com/api-keys".yellow()
    );
    let key = Password::with_theme(theme)
        .with_prompt("API key")
        .allow_empty_password(true)
        .interact()?;
    Ok(key.trim().to_string())
}

/// Flags win; otherwise the user is asked, with the current value as the default. `--yes` keeps
/// the current values without asking.
fn resolve_ai_settings(cli: &SetupCli, current: &AIConfig, theme: &ColorfulTheme) -> Result<AIConfig> {
    let ask = !cli.yes;

    let summary_model = match &cli.summary_model {
        Some(model) => model.clone(),
        None if ask => prompt_text(theme, "Model for commit summary", &current.summary_model)?,
        None => current.summary_model.clone(),
    };
    let summary_max_tokens = match cli.summary_max_tokens {
        Some(n) => n,
        None if ask => prompt_tokens(theme, "Max tokens for summary", current.summary_max_tokens)?,
        None => current.summary_max_tokens,
    };
    let description_model = match &cli.description_model {
        Some(model) => model.clone(),
        None if ask => prompt_text(
            theme,
            "Model for extended description",
            &current.description_model,
        )?,
        None => current.description_model.clone(),
    };
    let description_max_tokens = match cli.description_max_tokens {
        Some(n) => n,
        None if ask => prompt_tokens(
            theme,
            "Max tokens for description",
            current.description_max_tokens,
        )?,
        None => current.description_max_tokens,
    };

    Ok(AIConfig {
        summary_model,
        summary_max_tokens,
        description_model,
        description_max_tokens,
        max_diff_tokens: current.max_diff_tokens,
    })
}

fn prompt_text(theme: &ColorfulTheme, label: &str, default: &str) -> Result<String> {
    let value: String = Input::with_theme(theme)
        .with_prompt(label)
        .default(default.to_string())
        .interact_text()?;
    Ok(value.trim().to_string())
}

fn prompt_tokens(theme: &ColorfulTheme, label: &str, default: u32) -> Result<u32> {
    let value: u32 = Input::with_theme(theme)
        .with_prompt(label)
        .default(default)
        .validate_with(|n: &u32| -> Result<(), &str> {
            if *n > 0 {
                Ok(())
            } else {
                Err("Please enter a positive integer.")
            }
        })
        .interact_text()?;
    Ok(value)
}

fn store_key_in_environment(api_key: &str) -> Result<String> {
    if cfg!(windows) {
        profile::write_key_to_user_environment(api_key)?;
        return Ok(format!("the user environment ({})", profile::API_KEY_VAR));
    }

    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    let shell = ShellKind::detect(env::var("SHELL").ok().as_deref());
    let path = profile::write_key_to_profile(&home, shell, api_key)?;
    Ok(path.display().to_string())
}
