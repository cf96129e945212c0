//! src/prompt.rs

use crate::conventions::ProjectConventions;
use crate::git::{GitChanges, RepoContext};
use std::borrow::Cow;

const DEFAULT_COMMIT_TYPES: &[(&str, &str)] = &[
    ("feat", "New feature addition"),
    ("fix", "Bug fix"),
    ("docs", "Documentation changes"),
    ("style", "Code style/formatting changes (not affecting logic)"),
    ("refactor", "Code changes that neither fix bugs nor add features"),
    ("perf", "Performance improvements"),
    ("test", "Adding or modifying tests"),
    ("chore", "Maintenance tasks, dependency updates, etc."),
];

const TRUNCATION_MARKER: &str = "[diff truncated]";

/// A system/user prompt pair for one chat completion.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Builds the commit-message prompt. Returns `None` when there is no diff to describe.
pub fn create_diff_prompt(
    context: &RepoContext,
    changes: &GitChanges,
    conventions: &ProjectConventions,
    max_diff_tokens: usize,
) -> Option<Prompt> {
    let mut diff_content = String::new();
    if changes.has_staged {
        diff_content.push_str(&format!("STAGED CHANGES:\n{}\n\n", changes.staged));
    }
    if changes.has_unstaged {
        diff_content.push_str(&format!("UNSTAGED CHANGES:\n{}", changes.unstaged));
    }
    if diff_content.trim().is_empty() {
        return None;
    }
    let diff_content = truncate_diff(&diff_content, max_diff_tokens);

    let limit = conventions.subject_limit();
    let file_types = context
        .file_types
        .iter()
        .map(|(ext, count)| format!("{ext} ({count})"))
        .collect::<Vec<_>>()
        .join(", ");

    let user = format!(
        r#"Generate a clear, informative commit message for these changes:

REPOSITORY CONTEXT:
- Branch: {branch}
- Files changed: {file_count}
- File types modified: {file_types}

FILE CHANGES:
{stats}

DIFF:
{diff_content}

Format your response as:
1. A type prefix (feat/fix/docs/etc)
2. A clear subject line under {limit} chars starting with imperative verb
3. An optional detailed body explaining the WHY of the changes

Example:
feat: Add authentication to API endpoints

Implement JWT-based authentication to secure API endpoints.
This prevents unauthorized access and supports role-based
permissions for different user types.
"#,
        branch = context.branch,
        file_count = context.changed_files.len(),
        stats = context.stats,
    );

    Some(Prompt {
        system: build_system_prompt(conventions),
        user,
    })
}

/// Prompt for the optional second call that writes a longer commit body.
pub fn extended_description_prompt(diff: &str, max_diff_tokens: usize) -> Prompt {
    let system = "Analyze the following code diff and provide a detailed explanation of the \
changes, focusing on the 'why' behind them.
Explain the purpose of the refactoring, the bug being fixed, or the feature being added.
Keep the description concise but informative, suitable for a git commit body.
Do not include a commit subject line or type prefix.
Wrap lines at 72 characters."
        .to_string();
    let user = format!(
        "DIFF:\n{}\n\nDETAILED DESCRIPTION:",
        truncate_diff(diff, max_diff_tokens)
    );
    Prompt { system, user }
}

fn build_system_prompt(conventions: &ProjectConventions) -> String {
    let limit = conventions.subject_limit();
    let types = match conventions.types.as_deref() {
        Some(types) if !types.is_empty() => types
            .iter()
            .map(|t| format!("   - {t}"))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => DEFAULT_COMMIT_TYPES
            .iter()
            .map(|(t, description)| format!("   - {t}: {description}"))
            .collect::<Vec<_>>()
            .join("\n"),
    };

    let mut prompt = format!(
        r#"You are an expert at writing high-quality git commit messages following best practices:

1. Format Requirements:
   - Start with an imperative verb (Add, Fix, Update, Refactor, etc.)
   - First line must be under {limit} characters
   - No period at end of summary line
   - Only capitalize first word and proper nouns
   - Include a more detailed body when relevant, wrapped at 72 characters

2. Commit Classification (use appropriate type):
{types}

Focus on WHY the change was made rather than just describing WHAT changed.
"#
    );

    if let Some(scopes) = conventions.scopes.as_deref().filter(|s| !s.is_empty()) {
        prompt.push_str(&format!(
            "\nUse one of these scopes when it fits, e.g. `feat(scope): ...`: {}\n",
            scopes.join(", ")
        ));
    }
    if let Some(guidelines) = conventions
        .guidelines
        .as_deref()
        .map(str::trim)
        .filter(|g| !g.is_empty())
    {
        prompt.push_str(&format!("\nProject guidelines:\n{guidelines}\n"));
    }

    prompt
}

fn estimate_token_count(text: &str) -> usize {
    // Roughly 3 characters per token, erring on the large side.
    text.len().div_ceil(3)
}

/// Cuts `diff` to about `max_tokens`, on a line boundary, and marks the cut.
fn truncate_diff(diff: &str, max_tokens: usize) -> Cow<'_, str> {
    if max_tokens == 0 || estimate_token_count(diff) <= max_tokens {
        return Cow::Borrowed(diff);
    }

    let mut end = (max_tokens * 3).min(diff.len());
    while !diff.is_char_boundary(end) {
        end -= 1;
    }
    if let Some(newline) = diff[..end].rfind('\n') {
        end = newline + 1;
    }
    log::debug!(
        "Truncating diff from {} to {} bytes",
        diff.len(),
        end
    );

    let mut truncated = diff[..end].to_string();
    if !truncated.ends_with('\n') {
        truncated.push('\n');
    }
    truncated.push_str(TRUNCATION_MARKER);
    truncated.push('\n');
    Cow::Owned(truncated)
}
