//! src/ui.rs

use crate::errors::CompletionError;
use crate::message::ParsedCommit;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Draws a rounded box around `title`.
pub fn create_box(title: &str) -> String {
    let width = title.chars().count() + 4;
    let horizontal = "─".repeat(width);
    format!("╭{horizontal}╮\n│  {title}  │\n╰{horizontal}╯")
}

pub fn format_commit_display(commit: &ParsedCommit) -> String {
    let mut out = create_box("Suggested Commit Message").cyan().to_string();
    out.push('\n');

    if commit.commit_type != "unknown" {
        out.push_str(&format!(
            "{} {}\n",
            "Type:".dimmed(),
            commit.prefix.as_str().magenta()
        ));
    }
    out.push('\n');
    out.push_str(&commit.subject_line().bold().to_string());
    out.push('\n');

    if !commit.body.is_empty() {
        out.push('\n');
        out.push_str(&commit.body);
        out.push('\n');
    }
    out
}

/// One-line verdict on the subject length.
pub fn subject_status(len: usize, limit: usize) -> String {
    let line = format!("Subject line: {len}/{limit} characters");
    if len <= limit {
        format!("{} {}", "✓".green(), line)
    } else {
        format!("{} {}", "✗".red(), line)
    }
}

/// Prints a top-level error with any follow-up hints.
pub fn report_error(err: &anyhow::Error) {
    eprintln!("{}", format!("✗ {err:#}").red());
    if let Some(completion) = err
        .chain()
        .find_map(|e| e.downcast_ref::<CompletionError>())
    {
        for hint in completion.hints() {
            eprintln!("{}", format!("  → {hint}").yellow());
        }
    }
}

/// Spinner shown while waiting on the API. It only draws on a terminal.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn start(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}...") {
            bar.set_style(style);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    pub fn success(self, message: &str) {
        self.bar.finish_and_clear();
        println!("{}", format!("✓ {message}").green());
    }

    pub fn fail(self, message: &str) {
        self.bar.finish_and_clear();
        println!("{}", format!("✗ {message}").red());
    }
}
