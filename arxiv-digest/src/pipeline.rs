use crate::processing::{BatchSummarizer, SummaryFailurePolicy};
use crate::traits::{DeliveryOutcome, DigestNotifier, PaperFeed, Summarizer, TextExtractor};
use crate::types::{DigestError, EnrichedPaperRecord, Result};
use tracing::{error, info};

/// What one run produced.
#[derive(Debug)]
pub struct RunReport {
    pub papers: Vec<EnrichedPaperRecord>,
    /// Set when the summarization stage as a whole failed and the papers
    /// were sent with their abstracts instead.
    pub summarization_error: Option<DigestError>,
    pub delivery: DeliveryOutcome,
}

/// Feed → extract/summarize → notify, strictly one step after another.
pub struct DigestPipeline {
    feed: Box<dyn PaperFeed>,
    extractor: Box<dyn TextExtractor>,
    summarizer: std::result::Result<Box<dyn Summarizer>, DigestError>,
    notifier: Box<dyn DigestNotifier>,
    policy: SummaryFailurePolicy,
}

impl DigestPipeline {
    /// `summarizer` may carry the configuration error that prevented
    /// building one; only the summarization stage is affected by it.
    pub fn new(
        feed: Box<dyn PaperFeed>,
        extractor: Box<dyn TextExtractor>,
        summarizer: std::result::Result<Box<dyn Summarizer>, DigestError>,
        notifier: Box<dyn DigestNotifier>,
    ) -> Self {
        Self {
            feed,
            extractor,
            summarizer,
            notifier,
            policy: SummaryFailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: SummaryFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Only a feed failure is returned as an error; later stages degrade.
    pub async fn run(self) -> Result<RunReport> {
        let Self {
            feed,
            extractor,
            summarizer,
            notifier,
            policy,
        } = self;

        let papers = feed.fetch_latest_papers().await?;
        info!("Fetched {} papers from {}", papers.len(), feed.source_name());

        let summarized = match summarizer {
            Ok(summarizer) => {
                BatchSummarizer::new(extractor.as_ref(), summarizer.as_ref())
                    .with_policy(policy)
                    .summarize_papers(&papers)
                    .await
            }
            Err(e) => Err(e),
        };

        let (papers, summarization_error) = match summarized {
            Ok(enriched) => {
                info!("Summarized {} papers", enriched.len());
                (enriched, None)
            }
            Err(e) => {
                error!("[ERROR] Failed to summarize papers: {}", e);
                let fallback = papers.iter().map(EnrichedPaperRecord::unsummarized).collect();
                (fallback, Some(e))
            }
        };

        let delivery = notifier.send_digest(&papers).await;
        info!("Email sending process completed ({:?})", delivery);

        Ok(RunReport {
            papers,
            summarization_error,
            delivery,
        })
    }
}
