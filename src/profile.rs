//! src/profile.rs

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
const MARKER: &str = "# Added by gitai-setup";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellKind {
    Zsh,
    Bash,
    Fish,
    Other,
}

impl ShellKind {
    /// Picks the shell from a `$SHELL` value such as `/usr/bin/zsh`.
    pub fn detect(shell: Option<&str>) -> Self {
        let name = shell
            .map(Path::new)
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("");
        match name {
            "zsh" => ShellKind::Zsh,
            "bash" => ShellKind::Bash,
            "fish" => ShellKind::Fish,
            _ => ShellKind::Other,
        }
    }

    pub fn profile_path(self, home: &Path) -> PathBuf {
        match self {
            ShellKind::Zsh => home.join(".zshrc"),
            // Login shells on macOS read .bash_profile, not .bashrc.
            ShellKind::Bash if cfg!(target_os = "macos") => home.join(".bash_profile"),
            ShellKind::Bash => home.join(".bashrc"),
            ShellKind::Fish => home.join(".config").join("fish").join("config.fish"),
            ShellKind::Other => home.join(".profile"),
        }
    }

    pub fn export_line(self, api_key: &str) -> String {
        let value = escape_double_quoted(api_key);
        match self {
            ShellKind::Fish => format!("set -gx {API_KEY_VAR} \"{value}\""),
            _ => format!("export {API_KEY_VAR}=\"{value}\""),
        }
    }
}

fn escape_double_quoted(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn is_key_assignment(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with(&format!("export {API_KEY_VAR}="))
        || line.starts_with(&format!("{API_KEY_VAR}="))
        || line.starts_with(&format!("set -gx {API_KEY_VAR} "))
        || line.starts_with(&format!("set -x {API_KEY_VAR} "))
}

/// Returns `content` with exactly one assignment of the key: the first existing one is replaced
/// in place and later ones are dropped; otherwise the assignment is appended.
pub fn upsert_key_assignment(content: &str, shell: ShellKind, api_key: &str) -> String {
    let new_line = shell.export_line(api_key);
    let mut replaced = false;
    let mut lines: Vec<String> = Vec::new();

    for line in content.lines() {
        if is_key_assignment(line) {
            if !replaced {
                lines.push(new_line.clone());
                replaced = true;
            }
        } else {
            lines.push(line.to_string());
        }
    }

    if !replaced {
        if lines.last().is_some_and(|l| !l.trim().is_empty()) {
            lines.push(String::new());
        }
        lines.push(MARKER.to_string());
        lines.push(new_line);
    }

    let mut updated = lines.join("\n");
    updated.push('\n');
    updated
}

/// Writes the key into the shell profile under `home` and returns the profile path.
pub fn write_key_to_profile(home: &Path, shell: ShellKind, api_key: &str) -> Result<PathBuf> {
    let path = shell.profile_path(home);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let existing = if path.exists() {
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?
    } else {
        String::new()
    };

    let updated = upsert_key_assignment(&existing, shell, api_key);
    fs::write(&path, updated).with_context(|| format!("Failed to write {}", path.display()))?;
    log::debug!("Updated {}", path.display());
    Ok(path)
}

/// Stores the key in the Windows user environment (the registry) through `setx`.
pub fn write_key_to_user_environment(api_key: &str) -> Result<()> {
    let output = Command::new("setx")
        .args([API_KEY_VAR, api_key])
        .output()
        .context("Failed to run setx")?;
    if output.status.success() {
        Ok(())
    } else {
        Err(anyhow!(
            "setx failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        ))
    }
}
