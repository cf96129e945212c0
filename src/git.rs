//! src/git.rs

use crate::errors::GitError;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::process::Command;

// --- Data Structures ---

/// What the prompt needs to know about the repository besides the diff itself.
#[derive(Debug, Clone, Default)]
pub struct RepoContext {
    pub branch: String,
    pub changed_files: Vec<String>,
    /// Extension (e.g. `.rs`) to number of changed files.
    pub file_types: BTreeMap<String, usize>,
    /// `git diff --stat` output for staged and unstaged changes.
    pub stats: String,
}

#[derive(Debug, Clone, Default)]
pub struct GitChanges {
    pub staged: String,
    pub unstaged: String,
    pub has_staged: bool,
    pub has_unstaged: bool,
    /// New files git does not track yet. They are not part of either diff.
    pub untracked: Vec<String>,
}

impl GitChanges {
    pub fn new(staged: String, unstaged: String) -> Self {
        let has_staged = !staged.trim().is_empty();
        let has_unstaged = !unstaged.trim().is_empty();
        Self {
            staged,
            unstaged,
            has_staged,
            has_unstaged,
            untracked: Vec::new(),
        }
    }

    pub fn with_untracked(mut self, untracked: Vec<String>) -> Self {
        self.untracked = untracked;
        self
    }

    /// Whether there is anything `git add -A` would pick up.
    pub fn has_unstaged_or_untracked(&self) -> bool {
        self.has_unstaged || !self.untracked.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_staged && !self.has_unstaged_or_untracked()
    }
}

#[derive(Debug, Clone)]
pub struct PushOutcome {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

lazy_static! {
    static ref PULL_REQUEST_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(https://github\.com/[^/\s]+/[^/\s]+/pull/new/\S+)").unwrap(),
        Regex::new(
            r"(https://gitlab\.com/[^/\s]+/[^/\s]+/-/merge_requests/new\?merge_request%5Bsource_branch%5D=\S+)"
        )
        .unwrap(),
    ];
}

// --- Public API ---

async fn git_output(repo: &Path, args: &[&str]) -> Result<Output, GitError> {
    log::debug!("git -C {} {}", repo.display(), args.join(" "));
    Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(GitError::SpawnFailed)
}

/// Runs `git -C <repo> <args>` and returns stdout.
pub async fn run_git_command(repo: &Path, args: &[&str]) -> Result<String, GitError> {
    let output = git_output(repo, args).await?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        log::debug!("git {} failed: {}", args.join(" "), stderr);
        Err(GitError::CommandFailed {
            command: args.join(" "),
            status: output.status.to_string(),
            stderr,
        })
    }
}

/// Locates the top level of the repository containing `cwd`.
pub async fn find_git_root(cwd: &Path) -> Result<PathBuf, GitError> {
    if which::which("git").is_err() {
        return Err(GitError::NotInstalled);
    }

    match run_git_command(cwd, &["rev-parse", "--show-toplevel"]).await {
        Ok(output) => Ok(PathBuf::from(output.trim())),
        Err(GitError::CommandFailed { .. }) => Err(GitError::NotARepository),
        Err(e) => Err(e),
    }
}

pub async fn get_current_branch(repo: &Path) -> String {
    // A repository without commits has no HEAD to resolve, but symbolic-ref still knows the name.
    for args in [
        &["rev-parse", "--abbrev-ref", "HEAD"][..],
        &["symbolic-ref", "--short", "HEAD"][..],
    ] {
        if let Ok(output) = run_git_command(repo, args).await {
            let branch = output.trim();
            if !branch.is_empty() {
                return branch.to_string();
            }
        }
    }
    "unknown".to_string()
}

pub async fn get_repository_context(repo: &Path) -> Result<RepoContext, GitError> {
    let branch = get_current_branch(repo).await;

    let staged_names = run_git_command(repo, &["diff", "--cached", "--name-only"]).await?;
    let unstaged_names = run_git_command(repo, &["diff", "--name-only"]).await?;
    let mut changed_files: Vec<String> = Vec::new();
    for name in staged_names.lines().chain(unstaged_names.lines()) {
        let name = name.trim();
        if !name.is_empty() && !changed_files.iter().any(|f| f == name) {
            changed_files.push(name.to_string());
        }
    }

    let staged_stat = run_git_command(repo, &["diff", "--cached", "--stat"]).await?;
    let unstaged_stat = run_git_command(repo, &["diff", "--stat"]).await?;
    let stats = [staged_stat.trim(), unstaged_stat.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    Ok(RepoContext {
        branch,
        file_types: count_file_types(&changed_files),
        changed_files,
        stats,
    })
}

pub async fn get_git_changes(repo: &Path) -> Result<GitChanges, GitError> {
    let staged = run_git_command(repo, &["diff", "--cached"]).await?;
    let unstaged = run_git_command(repo, &["diff"]).await?;
    let untracked = run_git_command(repo, &["ls-files", "--others", "--exclude-standard"])
        .await?
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect();
    Ok(GitChanges::new(staged, unstaged).with_untracked(untracked))
}

/// Stages every change in the working tree, same as `git add -A`.
pub async fn stage_all(repo: &Path) -> Result<(), GitError> {
    run_git_command(repo, &["add", "-A"]).await.map(|_| ())
}

pub async fn commit(repo: &Path, message: &str) -> Result<String, GitError> {
    let output = run_git_command(repo, &["commit", "-m", message]).await?;
    Ok(output.trim().to_string())
}

/// Pushes the current branch. A rejected push is reported through the outcome, not as an error.
pub async fn push(repo: &Path) -> Result<PushOutcome, GitError> {
    let output = git_output(repo, &["push"]).await?;
    Ok(PushOutcome {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

/// Finds a GitHub pull-request or GitLab merge-request creation link in push output.
pub fn extract_pull_request_url(text: &str) -> Option<String> {
    PULL_REQUEST_PATTERNS
        .iter()
        .find_map(|re| re.captures(text))
        .map(|caps| caps[1].to_string())
}

// --- Helper Functions ---

fn count_file_types(files: &[String]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for file in files {
        let key = Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_else(|| "no extension".to_string());
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}
