use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

// CLI argument structure, every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "bolao-api")]
#[command(about = "Login and guess-saving API for the betting pool")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // Apps Script web app that stores the guesses
    #[arg(long, env = "APPS_SCRIPT_URL")]
    pub apps_script_url: Option<String>,

    // Rate limit max requests per window
    #[arg(long, env = "RATE_LIMIT", default_value_t = 100)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, env = "RATE_WINDOW", default_value_t = 2 * 60 * 60)]
    pub rate_window: u64,

    // Max guesses accepted in one submission
    #[arg(long, env = "MAX_GUESSES", default_value_t = 150)]
    pub max_guesses: usize,

    // Timeout for the call to the Apps Script, in seconds
    #[arg(long, env = "FORWARD_TIMEOUT", default_value_t = 10)]
    pub forward_timeout: u64,

    // JSON file with extra `name -> sha256 hex` credentials
    #[arg(long, env = "CREDENTIALS_FILE")]
    pub credentials_file: Option<PathBuf>,
}

impl Args {
    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window)
    }

    pub fn forward_timeout(&self) -> Duration {
        Duration::from_secs(self.forward_timeout)
    }
}

/// Errors that stop the server from starting.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read credentials file {path}: {source}")]
    CredentialsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("credentials file {path} is not a JSON object of strings: {source}")]
    CredentialsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("credential for {name:?} is not a 64-char lowercase hex sha256 digest")]
    InvalidDigest { name: String },

    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}
