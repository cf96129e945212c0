//! src/errors.rs

use thiserror::Error;

/// Errors from running git.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("git is not installed or not on PATH")]
    NotInstalled,

    #[error("Not inside a git repository")]
    NotARepository,

    #[error("Failed to spawn git: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("`git {command}` failed with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },
}

/// Errors from the chat-completions API.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("No OpenAI API key configured")]
    MissingApiKey,

    #[error("Unable to connect to the OpenAI API: {0}")]
    Connection(#[source] reqwest::Error),

    #[error("Authentication failed with OpenAI")]
    Authentication,

    #[error("Bad request to OpenAI API: {0}")]
    BadRequest(String),

    #[error("OpenAI API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("OpenAI API returned no message content")]
    EmptyResponse,

    #[error("Unexpected API error: {0}")]
    Transport(#[source] reqwest::Error),
}

impl CompletionError {
    /// Follow-up lines shown below the error.
    pub fn hints(&self) -> Vec<&'static str> {
        match self {
            CompletionError::MissingApiKey => vec![
                "Ensure your OPENAI_API_KEY environment variable is set.",
                "Run 'gitai-setup' or set the key manually.",
            ],
            CompletionError::Connection(_) => vec![
                "Please check your network connection",
                "Try again or run with '--offline' to manually write your commit",
            ],
            CompletionError::Authentication => vec![
                "Your API key appears to be invalid",
                "Run 'gitai-setup' to update your API key",
            ],
            CompletionError::BadRequest(_) => {
                vec!["This might be due to an issue with the request parameters"]
            }
            CompletionError::Api { .. }
            | CompletionError::EmptyResponse
            | CompletionError::Transport(_) => vec![],
        }
    }
}

/// Errors from reading or writing the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine the configuration directory")]
    NoConfigDir,

    #[error("Could not determine the home directory")]
    NoHomeDir,

    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
