use crate::config::FeedConfig;
use crate::traits::PaperFeed;
use crate::types::{DigestError, FetchConfig, PaperRecord, Result};
use crate::{FeedParser, Fetcher};
use async_trait::async_trait;
use tracing::{error, info};

/// arXiv listing feed (cs.AI by default)
pub struct ArxivFeedSource {
    pub url: String,
    pub max_papers: usize,
    fetcher: Fetcher,
}

impl ArxivFeedSource {
    pub fn new(feed: &FeedConfig, fetch_config: FetchConfig) -> Result<Self> {
        Ok(Self {
            url: feed.url.clone(),
            max_papers: feed.max_papers,
            fetcher: Fetcher::new(fetch_config)?,
        })
    }
}

#[async_trait]
impl PaperFeed for ArxivFeedSource {
    fn source_name(&self) -> String {
        match url::Url::parse(&self.url) {
            Ok(parsed) => {
                let category = parsed.path().trim_start_matches("/rss/").trim_matches('/');
                if category.is_empty() {
                    "arXiv".to_string()
                } else {
                    format!("arXiv ({})", category)
                }
            }
            Err(_) => "arXiv".to_string(),
        }
    }

    async fn fetch_latest_papers(&self) -> Result<Vec<PaperRecord>> {
        info!("Pulling arXiv feed: {}", self.url);

        let content = self.fetcher.fetch_text(&self.url).await.map_err(|e| {
            error!("Failed to fetch arXiv feed {}: {}", self.url, e);
            DigestError::Fetch(e)
        })?;

        let papers = FeedParser::parse_papers(&content, self.max_papers)?;

        info!("Successfully pulled {} papers from {}", papers.len(), self.source_name());
        Ok(papers)
    }
}
