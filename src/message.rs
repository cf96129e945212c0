//! src/message.rs

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref CONVENTIONAL_SUBJECT: Regex = Regex::new(r"^(\w+)(?:\(.+?\))?(!?):\s*(.*)").unwrap();
}

/// A commit message split into its conventional-commit parts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedCommit {
    /// Subject text without the `type(scope):` prefix.
    pub title: String,
    pub body: String,
    /// Lowercased type, or `"unknown"` when the subject has no prefix.
    pub commit_type: String,
    /// Type word plus the breaking-change `!`, as written.
    pub prefix: String,
    /// The message that will be committed.
    pub full_message: String,
}

impl ParsedCommit {
    /// The first line of the message, prefix included.
    pub fn subject_line(&self) -> &str {
        self.full_message.lines().next().unwrap_or("").trim()
    }
}

pub fn parse_commit_message(message: &str) -> ParsedCommit {
    let message = strip_code_fence(message.trim());
    let mut lines = message.lines();

    let Some(first_line) = lines.next() else {
        return ParsedCommit {
            commit_type: "unknown".to_string(),
            ..Default::default()
        };
    };

    let subject = first_line.trim();
    let (commit_type, prefix, title) = match CONVENTIONAL_SUBJECT.captures(subject) {
        Some(caps) => (
            caps[1].to_lowercase(),
            format!("{}{}", &caps[1], &caps[2]),
            caps[3].trim().to_string(),
        ),
        None => ("unknown".to_string(), String::new(), subject.to_string()),
    };

    let body = lines.collect::<Vec<_>>().join("\n").trim().to_string();

    ParsedCommit {
        title,
        body,
        commit_type,
        prefix,
        full_message: message.to_string(),
    }
}

/// Joins a subject line and an optional body the way git expects.
pub fn compose(subject_line: &str, body: &str) -> String {
    let subject_line = subject_line.trim();
    let body = body.trim();
    if body.is_empty() {
        subject_line.to_string()
    } else {
        format!("{subject_line}\n\n{body}")
    }
}

/// Models sometimes wrap the whole answer in a markdown fence.
fn strip_code_fence(message: &str) -> &str {
    let Some(rest) = message.strip_prefix("```") else {
        return message;
    };
    let Some(inner) = rest.trim_end().strip_suffix("```") else {
        return message;
    };
    // Drop an info string such as ```text on the opening line.
    match inner.split_once('\n') {
        Some((_, content)) => content.trim(),
        None => inner.trim(),
    }
}
