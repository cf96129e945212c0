//! src/conventions.rs

use colored::Colorize;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const CONVENTIONS_FILE: &str = ".gitai.json";
pub const DEFAULT_SUBJECT_LIMIT: usize = 50;

/// Per-repository overrides read from `.gitai.json`. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ProjectConventions {
    /// Commit types to offer the model instead of the built-in list.
    #[serde(default)]
    pub types: Option<Vec<String>>,
    #[serde(default)]
    pub scopes: Option<Vec<String>>,
    #[serde(default)]
    pub max_subject_length: Option<usize>,
    /// Free-form house rules appended to the system prompt.
    #[serde(default)]
    pub guidelines: Option<String>,
}

impl ProjectConventions {
    pub fn subject_limit(&self) -> usize {
        self.max_subject_length
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_SUBJECT_LIMIT)
    }
}

/// Loads `.gitai.json` from the repository root. Never fails: problems are reported and the
/// defaults are used.
pub fn load_project_conventions(repo: &Path) -> ProjectConventions {
    let path = repo.join(CONVENTIONS_FILE);
    if !path.exists() {
        println!(
            "{}",
            format!("⚠ No {CONVENTIONS_FILE} found. Using default conventions.").yellow()
        );
        return ProjectConventions::default();
    }

    let parsed = fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|content| parse_conventions(&content));

    match parsed {
        Ok(conventions) => {
            println!(
                "{}",
                format!("✓ Loaded conventions from {CONVENTIONS_FILE}").green()
            );
            log::debug!("Conventions: {:?}", conventions);
            conventions
        }
        Err(e) => {
            println!(
                "{}",
                format!("✗ Error loading {CONVENTIONS_FILE}: {e}. Using defaults.").red()
            );
            ProjectConventions::default()
        }
    }
}

fn parse_conventions(content: &str) -> Result<ProjectConventions, String> {
    serde_json::from_str(content).map_err(|e| format!("invalid JSON ({e})"))
}
