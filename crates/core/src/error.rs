use thiserror::Error;

/// Top-level error type used across the entire application.
#[derive(Debug, Error)]
pub enum DevinfoError {
    #[error("config error: {0}")]
    Config(String),

    #[error("battery service error: {0}")]
    Service(String),

    #[error("screen error: {0}")]
    Screen(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

pub type Result<T, E = DevinfoError> = std::result::Result<T, E>;
