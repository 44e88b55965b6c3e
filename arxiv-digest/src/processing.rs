use crate::traits::{Summarizer, TextExtractor};
use crate::types::{EnrichedPaperRecord, PaperRecord, Result, SummarySource};
use tracing::{info, warn};

/// What to do when the summarizer itself fails for one paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryFailurePolicy {
    /// Stop the batch and return the error.
    #[default]
    Abort,
    /// Keep going; the paper gets its abstract as summary and its feed tags.
    FallbackToAbstract,
}

/// Runs extraction and summarization over a batch of papers, one at a time.
pub struct BatchSummarizer<'a> {
    extractor: &'a dyn TextExtractor,
    summarizer: &'a dyn Summarizer,
    policy: SummaryFailurePolicy,
}

impl<'a> BatchSummarizer<'a> {
    pub fn new(extractor: &'a dyn TextExtractor, summarizer: &'a dyn Summarizer) -> Self {
        Self {
            extractor,
            summarizer,
            policy: SummaryFailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: SummaryFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// One output record per input paper, same order. Extraction failures
    /// never escape; summarizer failures follow the configured policy.
    pub async fn summarize_papers(&self, papers: &[PaperRecord]) -> Result<Vec<EnrichedPaperRecord>> {
        let mut enriched = Vec::with_capacity(papers.len());

        for (index, paper) in papers.iter().enumerate() {
            info!("Summarizing paper {}/{}: {}", index + 1, papers.len(), paper.title);
            enriched.push(self.summarize_paper(paper).await?);
        }

        Ok(enriched)
    }

    async fn summarize_paper(&self, paper: &PaperRecord) -> Result<EnrichedPaperRecord> {
        let (text, source) = match self.extractor.extract_full_text(&paper.link).await {
            Ok(full_text) => (full_text, SummarySource::Pdf),
            Err(e) => {
                warn!(
                    "Failed to extract full text for {} ({} stage): {}; using abstract",
                    paper.title,
                    e.stage(),
                    e
                );
                (paper.abstract_text.clone(), SummarySource::Abstract)
            }
        };

        match self.summarizer.summarize_and_tag(&text).await {
            Ok((summary, tags)) => {
                info!("Summarized {} from {} ({} tags)", paper.title, source, tags.len());
                Ok(EnrichedPaperRecord::new(paper, summary, tags, source))
            }
            Err(e) => match self.policy {
                SummaryFailurePolicy::Abort => Err(e),
                SummaryFailurePolicy::FallbackToAbstract => {
                    warn!("Failed to summarize {} ({} stage): {}; keeping abstract", paper.title, e.stage(), e);
                    Ok(EnrichedPaperRecord::unsummarized(paper))
                }
            },
        }
    }
}
