//! src/review.rs

use crate::message::{compose, parse_commit_message, ParsedCommit};
use crate::ui::{create_box, format_commit_display, subject_status};
use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

/// The answer to "Commit this message?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewChoice {
    Accept,
    Edit,
    Abort,
}

impl ReviewChoice {
    /// An empty answer accepts the draft; unrecognized input gives `None`.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "" | "y" | "yes" => Some(Self::Accept),
            "e" | "edit" => Some(Self::Edit),
            "n" | "no" => Some(Self::Abort),
            _ => None,
        }
    }
}

/// Shows the draft until the user accepts it (`Some`) or aborts (`None`).
pub fn confirm_loop(mut commit: ParsedCommit, subject_limit: usize) -> Result<Option<ParsedCommit>> {
    let theme = ColorfulTheme::default();

    loop {
        println!("\n{}", format_commit_display(&commit));
        println!(
            "{}",
            subject_status(commit.subject_line().chars().count(), subject_limit)
        );

        let answer: String = Input::with_theme(&theme)
            .with_prompt("Commit this message? [Y/e/n] (Yes / Edit / No)")
            .allow_empty(true)
            .interact_text()?;

        match ReviewChoice::parse(&answer) {
            Some(ReviewChoice::Accept) => return Ok(Some(commit)),
            Some(ReviewChoice::Edit) => {
                let edited = create_commit_manual(Some(&commit), subject_limit)?;
                if edited.is_none() {
                    println!("{}", "⚠ Edit cancelled. Keeping previous message.".yellow());
                }
                commit = keep_unless_edited(commit, edited);
            }
            Some(ReviewChoice::Abort) => return Ok(None),
            None => println!("{}", "✗ Invalid choice. Please enter Y, e, or n.".red()),
        }
    }
}

/// A cancelled edit leaves the current draft in place.
fn keep_unless_edited(current: ParsedCommit, edited: Option<ParsedCommit>) -> ParsedCommit {
    edited.unwrap_or(current)
}

/// Lets the user write or rework a message. Returns `None` when no subject is given.
pub fn create_commit_manual(
    initial: Option<&ParsedCommit>,
    subject_limit: usize,
) -> Result<Option<ParsedCommit>> {
    println!("\n{}", create_box("Manual Commit Message Edit").cyan());
    let theme = ColorfulTheme::default();

    let initial_subject = initial
        .map(|c| c.subject_line().to_string())
        .unwrap_or_default();
    let initial_body = initial.map(|c| c.body.clone()).unwrap_or_default();

    let mut subject_input = Input::<String>::with_theme(&theme)
        .with_prompt(format!(
            "Subject line (max {subject_limit} chars recommended)"
        ))
        .allow_empty(true);
    if !initial_subject.is_empty() {
        subject_input = subject_input.with_initial_text(initial_subject.clone());
    }
    let entered = subject_input.interact_text()?;

    let Some(subject) = resolve_subject(&entered, &initial_subject) else {
        println!("{}", "✗ Subject cannot be empty.".red());
        return Ok(None);
    };

    let body = edit_body(&theme, &initial_body)?;
    Ok(Some(parse_commit_message(&compose(&subject, &body))))
}

/// Blank input keeps the initial subject; `None` when both are blank.
fn resolve_subject(entered: &str, initial: &str) -> Option<String> {
    let subject = match entered.trim() {
        "" => initial.trim(),
        s => s,
    };
    (!subject.is_empty()).then(|| subject.to_string())
}

/// What happens to an existing body during a manual edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyAction {
    Keep,
    Edit,
    Clear,
}

impl BodyAction {
    const LABELS: [&'static str; 3] = ["Keep body", "Edit body in $EDITOR", "Clear body"];

    fn from_index(index: usize) -> Self {
        match index {
            1 => Self::Edit,
            2 => Self::Clear,
            _ => Self::Keep,
        }
    }
}

fn apply_body_action<F>(action: BodyAction, initial_body: &str, editor: F) -> Result<String>
where
    F: FnOnce(&str) -> Result<String>,
{
    match action {
        BodyAction::Keep => Ok(initial_body.to_string()),
        BodyAction::Edit => Ok(editor(initial_body)?.trim().to_string()),
        BodyAction::Clear => Ok(String::new()),
    }
}

fn open_editor(text: &str) -> Result<String> {
    edit::edit(text).context("Failed to open the editor")
}

fn edit_body(theme: &ColorfulTheme, initial_body: &str) -> Result<String> {
    if initial_body.trim().is_empty() {
        let add_body = Confirm::with_theme(theme)
            .with_prompt("Add a commit body in your editor?")
            .default(false)
            .interact()?;
        if !add_body {
            return Ok(String::new());
        }
        return apply_body_action(BodyAction::Edit, "", open_editor);
    }

    println!("{}", "Current body:".yellow());
    println!("{initial_body}");

    let selection = Select::with_theme(theme)
        .with_prompt("What should happen to the body?")
        .items(&BodyAction::LABELS[..])
        .default(0)
        .interact()?;

    apply_body_action(BodyAction::from_index(selection), initial_body, open_editor)
}
