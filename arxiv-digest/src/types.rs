// Use the interfaces crate for core types
pub use interfaces::defs::{EnrichedPaperRecord, PaperRecord, SummarySource};

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_feed_size_mb: usize,
    pub follow_redirects: bool,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "arXiv-Digest/1.0".to_string(),
            timeout_seconds: 60,
            max_feed_size_mb: 10,
            follow_redirects: true,
            max_redirects: 5,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Feed fetch error: {0}")]
    Fetch(String),

    #[error("Text extraction error: {0}")]
    Extraction(String),

    #[error("Summarization service error: {0}")]
    Service(String),

    #[error("Delivery error: {0}")]
    Delivery(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DigestError {
    /// Short stage name used in log lines.
    pub fn stage(&self) -> &'static str {
        match self {
            DigestError::Configuration(_) => "configuration",
            DigestError::Fetch(_) => "feed",
            DigestError::Extraction(_) => "extraction",
            DigestError::Service(_) => "summarization",
            DigestError::Delivery(_) => "delivery",
            DigestError::InvalidUrl(_) | DigestError::Io(_) | DigestError::Serialization(_) => "internal",
        }
    }
}

pub type Result<T> = std::result::Result<T, DigestError>;
