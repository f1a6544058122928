use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexError>;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid glob pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error("Failed to run git in {dir}: {source}")]
    Git {
        dir: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Manifest error in {file} line {line}: {message}")]
    Manifest {
        file: String,
        line: usize,
        message: String,
    },

    #[error("Output error: {0}")]
    Output(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Glob error: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IndexError {
    pub fn exit_code(&self) -> i32 {
        2
    }
}
