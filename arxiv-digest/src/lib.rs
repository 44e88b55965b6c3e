pub mod types;
pub mod config;
pub mod traits;
pub mod fetcher;
pub mod parser;
pub mod sources;
pub mod extractor;
pub mod llm_adapter;
pub mod summarizer;
pub mod processing;
pub mod digest;
pub mod notifier;
pub mod pipeline;

pub use types::*;
pub use config::AppConfig;
pub use fetcher::Fetcher;
pub use parser::FeedParser;
pub use sources::ArxivFeedSource;
pub use extractor::PdfTextExtractor;
pub use llm_adapter::{LlmAdapter, MockLlmAdapter, OpenAiAdapter};
pub use summarizer::{parse_response, LlmSummarizer, ParsedResponse, ResponseShape};
pub use processing::{BatchSummarizer, SummaryFailurePolicy};
pub use digest::{format_digest, format_plain_text};
pub use notifier::EmailNotifier;
pub use pipeline::{DigestPipeline, RunReport};
pub use traits::{DeliveryOutcome, DigestNotifier, PaperFeed, Summarizer, TextExtractor};
