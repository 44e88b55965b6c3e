use crate::types::{EnrichedPaperRecord, PaperRecord, Result};
use async_trait::async_trait;

/// Source of the papers for one digest run.
#[async_trait]
pub trait PaperFeed: Send + Sync {
    /// Human-readable name for this source
    fn source_name(&self) -> String;

    /// Fetch the newest papers, in the order the source delivers them.
    /// Any failure is fatal: no partial results.
    async fn fetch_latest_papers(&self) -> Result<Vec<PaperRecord>>;
}

/// Turns a paper's landing page link into its full text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_full_text(&self, paper_link: &str) -> Result<String>;
}

/// Produces a bullet summary and keyword tags for a piece of text.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize_and_tag(&self, text: &str) -> Result<(String, Vec<String>)>;
}

/// Delivers the finished digest. Implementations never fail outward; the
/// returned value only says which path was taken.
#[async_trait]
pub trait DigestNotifier: Send + Sync {
    async fn send_digest(&self, papers: &[EnrichedPaperRecord]) -> DeliveryOutcome;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The transport accepted the message.
    Sent,
    /// Delivery was impossible; the digest was printed to the console.
    ConsoleFallback,
}
