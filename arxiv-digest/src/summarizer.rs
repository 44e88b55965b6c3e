use crate::config::LlmConfig;
use crate::llm_adapter::{CompletionRequest, LlmAdapter};
use crate::traits::Summarizer;
use crate::types::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

/// Longest input (in characters) handed to the service. Anything beyond is
/// dropped from the end without notice.
pub const MAX_INPUT_CHARS: usize = 10_000;

pub const SUMMARY_MARKER: &str = "SUMMARY:";
pub const TAGS_MARKER: &str = "TAGS:";

const SYSTEM_PROMPT: &str = "You are a helpful assistant that summarizes scientific papers.";

/// How the service reply was laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// Both `SUMMARY:` and `TAGS:` markers were present.
    Marked,
    /// No markers; summary and tags were taken from the first two
    /// blank-line separated blocks. Later blocks are dropped.
    BlankLineSplit,
    /// Nothing recognizable; the whole reply is the summary.
    Unstructured,
}

impl ResponseShape {
    pub fn is_malformed(&self) -> bool {
        !matches!(self, ResponseShape::Marked)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    pub summary: String,
    pub tags: Vec<String>,
    pub shape: ResponseShape,
}

/// First `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

pub fn build_prompt(text: &str) -> String {
    format!(
        "Summarize the following scientific paper for a general audience.\n\
         Respond in exactly this format:\n\n\
         {summary}\n\
         - <simple point>\n\
         - <simple point>\n\
         {tags} <keyword>, <keyword>\n\n\
         Write 2-5 short bullet points in plain language, avoiding jargon, \
         focusing on the main contributions and findings. \
         Then give 2-5 comma-separated keywords.\n\n\
         Paper:\n{text}",
        summary = SUMMARY_MARKER,
        tags = TAGS_MARKER,
        text = text,
    )
}

/// Split a reply into summary and tags. Never fails: replies that do not
/// follow the requested layout degrade step by step, and `shape` records
/// which path was taken.
pub fn parse_response(response: &str) -> ParsedResponse {
    if let Some(parsed) = parse_marked(response) {
        return parsed;
    }
    if let Some(parsed) = parse_blank_line_split(response) {
        return parsed;
    }
    ParsedResponse {
        summary: response.trim().to_string(),
        tags: Vec::new(),
        shape: ResponseShape::Unstructured,
    }
}

fn parse_marked(response: &str) -> Option<ParsedResponse> {
    let summary_start = response.find(SUMMARY_MARKER)? + SUMMARY_MARKER.len();
    let tags_offset = response[summary_start..].find(TAGS_MARKER)?;
    let tags_start = summary_start + tags_offset;

    Some(ParsedResponse {
        summary: response[summary_start..tags_start].trim().to_string(),
        tags: split_tags(&response[tags_start + TAGS_MARKER.len()..]),
        shape: ResponseShape::Marked,
    })
}

fn parse_blank_line_split(response: &str) -> Option<ParsedResponse> {
    let blocks = blank_line_blocks(response);
    if blocks.len() < 2 {
        return None;
    }

    let summary = strip_leading_word(&blocks[0], "summary");
    if summary.is_empty() {
        return None;
    }
    let tags = split_tags(&strip_leading_word(&blocks[1], "tags"));

    Some(ParsedResponse {
        summary,
        tags,
        shape: ResponseShape::BlankLineSplit,
    })
}

/// Non-empty blocks of lines separated by whitespace-only lines.
fn blank_line_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current.join("\n"));
    }

    blocks
}

/// Drop a leading `word` / `word:` label, case-insensitively.
fn strip_leading_word(block: &str, word: &str) -> String {
    let trimmed = block.trim();
    let starts_with_word = trimmed
        .get(..word.len())
        .map(|head| head.eq_ignore_ascii_case(word))
        .unwrap_or(false);

    if !starts_with_word {
        return trimmed.to_string();
    }

    let rest = &trimmed[word.len()..];
    match rest.strip_prefix(':') {
        Some(after_colon) => after_colon.trim().to_string(),
        // Only a whole word counts, e.g. not "Summarygate".
        None if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim().to_string(),
        None => trimmed.to_string(),
    }
}

fn split_tags(text: &str) -> Vec<String> {
    text.split(',')
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(|tag| tag.to_string())
        .collect()
}

/// Summarizer/tagger backed by a generative-text adapter: one call per text.
pub struct LlmSummarizer {
    adapter: Box<dyn LlmAdapter>,
    max_tokens: u32,
    temperature: f32,
}

impl LlmSummarizer {
    pub fn new(adapter: Box<dyn LlmAdapter>, config: &LlmConfig) -> Self {
        Self {
            adapter,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    pub fn adapter_name(&self) -> String {
        self.adapter.adapter_name()
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize_and_tag(&self, text: &str) -> Result<(String, Vec<String>)> {
        let submitted = truncate_chars(text, MAX_INPUT_CHARS);
        debug!(
            "Summarizing {} characters with {}",
            submitted.chars().count(),
            self.adapter.adapter_name()
        );

        let request = CompletionRequest {
            system: SYSTEM_PROMPT.to_string(),
            prompt: build_prompt(submitted),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self.adapter.complete(&request).await?;
        let parsed = parse_response(&response);
        if parsed.shape.is_malformed() {
            warn!("Service reply did not follow the requested format ({:?})", parsed.shape);
        }

        Ok((parsed.summary, parsed.tags))
    }
}
