use thiserror::Error;

/// Main error type for the league data service
#[derive(Error, Debug)]
pub enum LblError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),

    // Network errors
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Pipeline errors
    #[error("Refresh failed: {0}")]
    Refresh(#[from] RefreshError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for LblError
pub type Result<T> = std::result::Result<T, LblError>;

/// Network-layer failure for a single page. Recoverable on the next tick.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("fetch {url} failed: {cause}")]
pub struct FetchError {
    pub url: String,
    pub cause: FetchCause,
}

impl FetchError {
    pub fn new(url: impl Into<String>, cause: FetchCause) -> Self {
        Self {
            url: url.into(),
            cause,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchCause {
    #[error("timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("connection error: {0}")]
    Connect(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("could not read body: {0}")]
    Body(String),

    #[error("{0}")]
    Other(String),
}

/// Structural failure: the page markup was not recognized at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("document is empty")]
    EmptyDocument,

    #[error("no recognizable regions in {page} page")]
    NoRecognizedRegions { page: &'static str },

    #[error("invalid selector `{0}`")]
    Selector(String),
}

/// Data-layer failure: the parse succeeded but nothing survived normalization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("no usable rows in any category ({skipped} rows skipped)")]
    NoUsableRows { skipped: usize },
}

/// Why a refresh cycle did not install a new snapshot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefreshError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error("a refresh cycle is already in progress")]
    RefreshInProgress,

    #[error("refresh task ended abnormally: {0}")]
    Aborted(String),
}

impl RefreshError {
    /// Stage label used in logs and status output.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "fetch",
            Self::Parse(_) => "parse",
            Self::Normalize(_) => "normalize",
            Self::RefreshInProgress => "contention",
            Self::Aborted(_) => "task",
        }
    }
}

/// Returned by cache reads before the first successful refresh.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("data not yet available")]
pub struct NotYetAvailable;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameLookupError {
    #[error("game not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    NotYetAvailable(#[from] NotYetAvailable),
}
