use serde::{Deserialize, Serialize};

/// One paper announced on the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub title: String,
    pub abstract_text: String,
    pub link: String,
    pub tags: Vec<String>,
}

/// Where a generated summary was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarySource {
    Pdf,
    Abstract,
}

impl SummarySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummarySource::Pdf => "PDF",
            SummarySource::Abstract => "Abstract",
        }
    }
}

impl std::fmt::Display for SummarySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedPaperRecord {
    pub title: String,
    pub abstract_text: String,
    pub link: String,
    pub tags: Vec<String>,
    pub generated_summary: String,
    pub generated_tags: Vec<String>,
    pub summary_source: SummarySource,
}

impl EnrichedPaperRecord {
    pub fn new(
        paper: &PaperRecord,
        generated_summary: String,
        generated_tags: Vec<String>,
        summary_source: SummarySource,
    ) -> Self {
        Self {
            title: paper.title.clone(),
            abstract_text: paper.abstract_text.clone(),
            link: paper.link.clone(),
            tags: paper.tags.clone(),
            generated_summary,
            generated_tags,
            summary_source,
        }
    }

    /// Stand-in used when no summary could be generated at all: the abstract
    /// doubles as the summary and the feed tags as the generated tags.
    pub fn unsummarized(paper: &PaperRecord) -> Self {
        Self::new(
            paper,
            paper.abstract_text.clone(),
            paper.tags.clone(),
            SummarySource::Abstract,
        )
    }
}
