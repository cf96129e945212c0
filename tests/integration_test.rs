// tests/integration_test.rs

use assert_cmd::prelude::*;
use mockito::Matcher;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::{tempdir, TempDir};

// --- Test Setup Helper ---

struct TestRepo {
    temp_dir: TempDir,
    home: TempDir,
    api_url: Option<String>,
    api_key: Option<String>,
}

impl TestRepo {
    fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("Failed to create temp dir"),
            home: tempdir().expect("Failed to create home dir"),
            api_url: None,
            api_key: None,
        }
    }

    fn with_git(self) -> Self {
        git_init(self.path());
        self
    }

    fn with_api(mut self, url: &str, key: &str) -> Self {
        self.api_url = Some(url.to_string());
        self.api_key = Some(key.to_string());
        self
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    fn config_dir(&self) -> PathBuf {
        self.home.path().join(".config").join("gitai")
    }

    fn command(&self, bin: &str) -> Command {
        let mut cmd = Command::cargo_bin(bin).expect("binary not built");
        cmd.current_dir(self.path());
        cmd.env("HOME", self.home.path());
        cmd.env("USERPROFILE", self.home.path());
        cmd.env("XDG_CONFIG_HOME", self.home.path().join(".config"));
        cmd.env("GITAI_CONFIG_DIR", self.config_dir());
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("OPENAI_API_KEY");
        cmd.env_remove("OPENAI_API_URL");
        cmd.env_remove("RUST_LOG");
        if let Some(url) = &self.api_url {
            cmd.env("OPENAI_API_URL", url);
        }
        if let Some(key) = &self.api_key {
            cmd.env("OPENAI_API_KEY", key);
        }
        cmd.stdin(Stdio::null());
        cmd
    }

    fn gitai(&self) -> Command {
        self.command("gitai")
    }

    fn setup(&self) -> Command {
        self.command("gitai-setup")
    }
}

fn run_git_command(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .unwrap_or_else(|_| panic!("Failed to execute git command: {:?}", args));
    assert!(
        output.status.success(),
        "Git command failed: {:?}, stderr: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn git_init(dir: &Path) {
    run_git_command(dir, &["init"]);
    run_git_command(dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    run_git_command(dir, &["config", "user.name", "Test User"]);
    run_git_command(dir, &["config", "user.email", "test@example.com"]);
    run_git_command(dir, &["config", "commit.gpgsign", "false"]);
}

fn write_file(repo_path: &Path, file_name: &str, content: &str) {
    let file_path = repo_path.join(file_name);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir for file");
    }
    fs::write(&file_path, content).expect("Failed to write file");
}

fn create_and_stage_file(repo_path: &Path, file_name: &str, content: &str) {
    write_file(repo_path, file_name, content);
    run_git_command(repo_path, &["add", file_name]);
}

fn last_commit_message(repo_path: &Path) -> String {
    run_git_command(repo_path, &["log", "-1", "--pretty=%B"])
        .trim()
        .to_string()
}

fn completion_body(content: &str) -> String {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1677652288,
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 9, "completion_tokens": 12, "total_tokens": 21}
    })
    .to_string()
}

fn mock_openai_api(server: &mut mockito::Server, content: &str) -> mockito::Mock {
    server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body(content))
        .create()
}

// --- gitai ---

#[test]
fn test_help_mentions_purpose() {
    let repo = TestRepo::new();
    repo.gitai()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Generate AI-powered Git commit messages",
        ));
}

#[test]
fn test_outside_repository_fails() {
    let repo = TestRepo::new();
    repo.gitai()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not inside a git repository"));
}

#[test]
fn test_clean_repository_reports_no_changes() {
    let repo = TestRepo::new().with_git();
    repo.gitai()
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes detected"));
}

#[test]
fn test_unstaged_changes_without_stage_flag() {
    let repo = TestRepo::new().with_git();
    create_and_stage_file(repo.path(), "file.txt", "one\n");
    run_git_command(repo.path(), &["commit", "-m", "chore: init"]);
    write_file(repo.path(), "file.txt", "two\n");

    repo.gitai()
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes staged for commit"));
}

#[test]
fn test_untracked_files_without_stage_flag() {
    let repo = TestRepo::new().with_git();
    write_file(repo.path(), "new.txt", "untracked\n");

    repo.gitai()
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes staged for commit"))
        .stdout(predicate::str::contains("gitai --stage"))
        .stdout(predicate::str::contains("No changes detected").not());
}

#[test]
fn test_offline_with_only_untracked_files_fails() {
    let repo = TestRepo::new().with_git();
    write_file(repo.path(), "new.txt", "untracked\n");

    repo.gitai()
        .arg("--offline")
        .assert()
        .failure()
        .stderr(predicate::str::contains("In offline mode"));
    assert_eq!(
        run_git_command(repo.path(), &["rev-list", "--all", "--count"]).trim(),
        "0"
    );
}

#[test]
fn test_offline_without_terminal_fails() {
    let repo = TestRepo::new().with_git();
    create_and_stage_file(repo.path(), "file.txt", "content\n");

    repo.gitai()
        .arg("--offline")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Manual Commit Message Edit"))
        .stderr(predicate::str::contains("Failed to read the commit message"));
    assert_eq!(
        run_git_command(repo.path(), &["rev-list", "--all", "--count"]).trim(),
        "0"
    );
}

#[test]
fn test_missing_api_key_fails_with_hint() {
    let repo = TestRepo::new().with_git();
    create_and_stage_file(repo.path(), "file.txt", "content\n");

    repo.gitai()
        .arg("--yes")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No OpenAI API key configured"))
        .stderr(predicate::str::contains("gitai-setup"));
}

#[test]
fn test_commit_with_staged_files() {
    let mut server = mockito::Server::new();
    let mock = mock_openai_api(
        &mut server,
        "feat: Add greeting file\n\nIntroduce a greeting for new users.",
    );

    let repo = TestRepo::new().with_git().with_api(&server.url(), "sk-test");
    create_and_stage_file(repo.path(), "hello.txt", "hello\n");

    repo.gitai()
        .arg("--yes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Commit message generated"))
        .stdout(predicate::str::contains("Commit successful!"));

    assert_eq!(
        last_commit_message(repo.path()),
        "feat: Add greeting file\n\nIntroduce a greeting for new users."
    );
    mock.assert();
}

#[test]
fn test_stage_flag_stages_before_committing() {
    let mut server = mockito::Server::new();
    let mock = mock_openai_api(&mut server, "chore: Add notes");

    let repo = TestRepo::new().with_git().with_api(&server.url(), "sk-test");
    write_file(repo.path(), "notes.md", "- remember\n");

    repo.gitai()
        .args(["--stage", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Staged all changes"));

    assert_eq!(last_commit_message(repo.path()), "chore: Add notes");
    let tracked = run_git_command(repo.path(), &["ls-files"]);
    assert!(tracked.contains("notes.md"));
    mock.assert();
}

#[test]
fn test_model_flags_are_sent_to_api() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::PartialJson(
            json!({"model": "gpt-4o", "max_tokens": 120}),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body("fix: Correct typo"))
        .create();

    let repo = TestRepo::new().with_git().with_api(&server.url(), "sk-test");
    create_and_stage_file(repo.path(), "typo.txt", "teh\n");

    repo.gitai()
        .args(["--yes", "--model", "gpt-4o", "--max-tokens", "120"])
        .assert()
        .success();

    mock.assert();
}

#[test]
fn test_describe_replaces_body() {
    let mut server = mockito::Server::new();
    let summary = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::Regex(
            "Generate a clear, informative commit message".to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body("feat: Add parser\n\nShort body."))
        .create();
    let description = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::Regex("DETAILED DESCRIPTION".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body("The parser replaces ad-hoc string splitting."))
        .create();

    let repo = TestRepo::new().with_git().with_api(&server.url(), "sk-test");
    create_and_stage_file(repo.path(), "parser.rs", "pub fn parse() {}\n");

    repo.gitai()
        .args(["--yes", "--describe"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Extended description generated"));

    assert_eq!(
        last_commit_message(repo.path()),
        "feat: Add parser\n\nThe parser replaces ad-hoc string splitting."
    );
    summary.assert();
    description.assert();
}

#[test]
fn test_authentication_error_suggests_setup() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": {"message": "Incorrect API key provided"}}"#)
        .create();

    let repo = TestRepo::new().with_git().with_api(&server.url(), "sk-wrong");
    create_and_stage_file(repo.path(), "file.txt", "content\n");

    repo.gitai()
        .arg("--yes")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Authentication error"))
        .stderr(predicate::str::contains("Authentication failed with OpenAI"))
        .stderr(predicate::str::contains("Run 'gitai-setup' to update your API key"));

    assert_eq!(
        run_git_command(repo.path(), &["rev-list", "--all", "--count"]).trim(),
        "0"
    );
    mock.assert();
}

#[test]
fn test_failed_push_is_reported_but_commit_stands() {
    let mut server = mockito::Server::new();
    let mock = mock_openai_api(&mut server, "docs: Update readme");

    let repo = TestRepo::new().with_git().with_api(&server.url(), "sk-test");
    create_and_stage_file(repo.path(), "README.md", "# Project\n");

    repo.gitai()
        .args(["--yes", "--push"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Commit successful!"))
        .stdout(predicate::str::contains("Failed to push changes"));

    assert_eq!(last_commit_message(repo.path()), "docs: Update readme");
    mock.assert();
}

#[test]
fn test_push_to_local_remote() {
    let mut server = mockito::Server::new();
    let mock = mock_openai_api(&mut server, "feat: Ship it");

    let remote = tempdir().unwrap();
    run_git_command(remote.path(), &["init", "--bare"]);

    let repo = TestRepo::new().with_git().with_api(&server.url(), "sk-test");
    let remote_path = remote.path().to_string_lossy().into_owned();
    run_git_command(repo.path(), &["remote", "add", "origin", &remote_path]);
    run_git_command(repo.path(), &["config", "branch.main.remote", "origin"]);
    run_git_command(repo.path(), &["config", "branch.main.merge", "refs/heads/main"]);
    create_and_stage_file(repo.path(), "ship.txt", "done\n");

    repo.gitai()
        .args(["--yes", "--push"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Changes pushed successfully"))
        .stdout(predicate::str::contains("Create Pull/Merge Request").not());

    let pushed = run_git_command(remote.path(), &["log", "-1", "--pretty=%B", "main"]);
    assert_eq!(pushed.trim(), "feat: Ship it");
    mock.assert();
}

#[test]
fn test_stored_config_key_is_used() {
    let mut server = mockito::Server::new();
    let mock = mock_openai_api(&mut server, "test: Cover config loading");

    let repo = TestRepo::new().with_git();
    fs::create_dir_all(repo.config_dir()).unwrap();
    fs::write(
        repo.config_dir().join("config.toml"),
        format!(
            "[openai]\napi_key = \"sk-test\"\napi_base = \"{}\"\n",
            server.url()
        ),
    )
    .unwrap();
    create_and_stage_file(repo.path(), "tests.rs", "#[test] fn t() {}\n");

    repo.gitai().arg("--yes").assert().success();

    assert_eq!(last_commit_message(repo.path()), "test: Cover config loading");
    mock.assert();
}

// --- gitai-setup ---

#[test]
fn test_setup_writes_config_file() {
    let repo = TestRepo::new();
    repo.setup()
        .args(["--key", "sk-setup", "--summary-model", "gpt-4o", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration saved successfully"));

    let content = fs::read_to_string(repo.config_dir().join("config.toml")).unwrap();
    assert!(content.contains("api_key = \"sk-setup\""));
    assert!(content.contains("summary_model = \"gpt-4o\""));
    assert!(content.contains("description_max_tokens = 400"));
}

#[test]
fn test_setup_warns_about_unusual_key() {
    let repo = TestRepo::new();
    repo.setup()
        .args(["--key", "not-a-key", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("does not look like a standard OpenAI key"));
}

#[test]
fn test_setup_rejects_empty_key() {
    let repo = TestRepo::new();
    repo.setup()
        .args(["--key", "  ", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key cannot be empty"));
    assert!(!repo.config_dir().join("config.toml").exists());
}

#[cfg(unix)]
#[test]
fn test_setup_shell_target_updates_profile() {
    let repo = TestRepo::new();
    repo.setup()
        .args(["--key", "sk-shell", "--target", "shell", "--yes"])
        .env("SHELL", "/bin/zsh")
        .assert()
        .success()
        .stdout(predicate::str::contains("API key written to"));

    let profile = fs::read_to_string(repo.home.path().join(".zshrc")).unwrap();
    assert!(profile.contains("export OPENAI_API_KEY=\"sk-shell\""));

    let config = fs::read_to_string(repo.config_dir().join("config.toml")).unwrap();
    assert!(!config.contains("sk-shell"));
}
