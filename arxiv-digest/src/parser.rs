use crate::types::{DigestError, PaperRecord, Result};
use feed_rs::parser;
use tracing::{debug, info};

pub struct FeedParser;

impl FeedParser {
    /// Parse feed content and keep the first `limit` entries in feed order.
    pub fn parse_papers(content: &str, limit: usize) -> Result<Vec<PaperRecord>> {
        debug!("Parsing feed content ({} bytes)", content.len());

        let feed = parser::parse(content.as_bytes())
            .map_err(|e| DigestError::Fetch(format!("Failed to parse feed: {}", e)))?;

        let total = feed.entries.len();
        let papers: Vec<PaperRecord> = feed
            .entries
            .into_iter()
            .take(limit)
            .map(Self::parse_entry)
            .collect();

        info!("Parsed feed with {} entries, keeping {}", total, papers.len());
        Ok(papers)
    }

    fn parse_entry(entry: feed_rs::model::Entry) -> PaperRecord {
        let title = entry
            .title
            .map(|t| t.content.trim().to_string())
            .unwrap_or_default();

        let abstract_text = entry
            .summary
            .map(|s| s.content.trim().to_string())
            .unwrap_or_default();

        let link = entry
            .links
            .into_iter()
            .next()
            .map(|l| l.href)
            .unwrap_or_default();

        let tags = entry
            .categories
            .into_iter()
            .map(|c| c.term)
            .filter(|term| !term.is_empty())
            .collect();

        PaperRecord {
            title,
            abstract_text,
            link,
            tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>cs.AI updates on arXiv.org</title>
    <link>http://arxiv.org/</link>
    <description>Computer Science -- Artificial Intelligence</description>
    <item>
      <title>  First Paper  </title>
      <link>https://arxiv.org/abs/2401.00001</link>
      <description>
        An abstract about agents.
      </description>
      <category>cs.AI</category>
      <category>cs.LG</category>
    </item>
    <item>
      <title>Second Paper</title>
      <link>https://arxiv.org/abs/2401.00002</link>
      <description>Another abstract.</description>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_entries_in_feed_order() {
        let papers = FeedParser::parse_papers(SAMPLE_RSS, 5).unwrap();
        assert_eq!(papers.len(), 2);

        assert_eq!(papers[0].title, "First Paper");
        assert_eq!(papers[0].abstract_text, "An abstract about agents.");
        assert_eq!(papers[0].link, "https://arxiv.org/abs/2401.00001");
        assert_eq!(papers[0].tags, vec!["cs.AI", "cs.LG"]);

        assert_eq!(papers[1].title, "Second Paper");
        assert!(papers[1].tags.is_empty());
    }

    #[test]
    fn respects_entry_limit() {
        let papers = FeedParser::parse_papers(SAMPLE_RSS, 1).unwrap();
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].title, "First Paper");
    }

    #[test]
    fn garbage_is_a_fetch_error() {
        let err = FeedParser::parse_papers("definitely not xml", 5).unwrap_err();
        assert!(matches!(err, DigestError::Fetch(_)));
    }
}
