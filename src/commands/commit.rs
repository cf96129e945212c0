//! src/commands/commit.rs

use crate::commands::Cli;
use crate::config;
use crate::conventions::load_project_conventions;
use crate::git::{self, PushOutcome};
use crate::llm::{generate_extended_description, summarize_diff, CompletionOptions, OpenClient};
use crate::message::{compose, parse_commit_message, ParsedCommit};
use crate::prompt::create_diff_prompt;
use crate::review::{confirm_loop, create_commit_manual};
use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::Path;

pub async fn handle_commit(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    let repo = git::find_git_root(&cwd).await?;
    log::debug!("Repository root: {}", repo.display());

    let conventions = load_project_conventions(&repo);
    let subject_limit = conventions.subject_limit();

    let mut context = git::get_repository_context(&repo).await?;
    let mut changes = git::get_git_changes(&repo).await?;

    if changes.is_empty() {
        println!("{}", "⚠ No changes detected in the repository.".yellow());
        println!("{}", "  → Make some changes or stage existing ones.".yellow());
        return Ok(());
    }

    if cli.stage {
        if changes.has_unstaged_or_untracked() {
            git::stage_all(&repo)
                .await
                .context("Failed to stage changes. Aborting.")?;
            println!("{}", "✓ Staged all changes".green());
            context = git::get_repository_context(&repo).await?;
            changes = git::get_git_changes(&repo).await?;
        } else {
            println!("{}", "⚠ No unstaged changes to stage.".yellow());
        }
    }

    if !changes.has_staged {
        if cli.offline {
            bail!("No staged changes. In offline mode, you must stage changes manually first.");
        }
        println!("{}", "⚠ No changes staged for commit.".yellow());
        println!(
            "{}",
            "  → Stage changes using 'git add <files>' or use 'gitai --stage'.".yellow()
        );
        return Ok(());
    }

    let draft = if cli.offline {
        match create_commit_manual(None, subject_limit)
            .context("Failed to read the commit message")?
        {
            Some(commit) => commit,
            None => bail!("Commit creation cancelled or failed."),
        }
    } else {
        let config = config::load_config().context("Failed to load configuration")?;
        let client = OpenClient::from_config(&config)?;

        let Some(prompt) =
            create_diff_prompt(&context, &changes, &conventions, config.ai.max_diff_tokens)
        else {
            println!(
                "{}",
                "⚠ No changes found to generate commit message for.".yellow()
            );
            return Ok(());
        };

        let options = CompletionOptions {
            model: cli
                .model
                .clone()
                .unwrap_or_else(|| config.ai.summary_model.clone()),
            max_tokens: cli.max_tokens.unwrap_or(config.ai.summary_max_tokens),
        };
        let summary = summarize_diff(&client, &prompt, &options)
            .await
            .context("Failed to generate commit message summary")?;
        let mut draft = parse_commit_message(&summary);

        if cli.describe {
            let options = CompletionOptions {
                model: config.ai.description_model.clone(),
                max_tokens: config.ai.description_max_tokens,
            };
            match generate_extended_description(
                &client,
                &changes.staged,
                config.ai.max_diff_tokens,
                &options,
            )
            .await
            {
                Ok(description) => {
                    draft = parse_commit_message(&compose(draft.subject_line(), &description));
                }
                Err(e) => {
                    log::debug!("Extended description failed: {e}");
                    println!("{}", "⚠ Keeping the original commit body.".yellow());
                }
            }
        }
        draft
    };

    let commit = if cli.yes {
        draft
    } else {
        match confirm_loop(draft, subject_limit)? {
            Some(commit) => commit,
            None => {
                println!("{}", "✗ Commit aborted by user.".red());
                return Ok(());
            }
        }
    };

    run_commit(&repo, &commit).await?;

    if cli.push {
        push_changes(&repo).await?;
    }

    Ok(())
}

async fn run_commit(repo: &Path, commit: &ParsedCommit) -> Result<()> {
    let output = git::commit(repo, &commit.full_message)
        .await
        .context("Failed to commit changes")?;

    println!("{}", "✓ Commit successful!".green());
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

async fn push_changes(repo: &Path) -> Result<()> {
    println!("{}", "Pushing changes...".cyan());
    let outcome = git::push(repo).await.context("Failed to run git push")?;
    if outcome.success {
        println!("{}", "✓ Changes pushed successfully!".green());
        if !outcome.stdout.is_empty() {
            println!("{}", outcome.stdout);
        }
    } else {
        println!("{}", "✗ Failed to push changes:".red());
        println!("{}", outcome.stderr);
    }

    if let Some(hint) = pull_request_hint(&outcome) {
        println!("{}", hint.yellow());
    }
    Ok(())
}

/// Forges print the PR/MR creation link on stderr for successful and rejected pushes alike.
fn pull_request_hint(outcome: &PushOutcome) -> Option<String> {
    git::extract_pull_request_url(&outcome.stderr)
        .map(|url| format!("  → Create Pull/Merge Request: {url}"))
}
