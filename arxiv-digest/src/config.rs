use crate::processing::SummaryFailurePolicy;
use crate::types::{DigestError, FetchConfig, Result};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const DEFAULT_FEED_URL: &str = "http://export.arxiv.org/rss/cs.AI";
/// Also the upper bound: `MAX_PAPERS` can only lower it.
pub const DEFAULT_MAX_PAPERS: usize = 5;
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4";
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 465;

/// Everything the pipeline needs, read once at startup and handed to each
/// component by reference.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub feed: FeedConfig,
    pub fetch: FetchConfig,
    pub llm: LlmConfig,
    pub mail: MailConfig,
    pub summary_failure_policy: SummaryFailurePolicy,
}

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub url: String,
    pub max_papers: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_FEED_URL.to_string(),
            max_papers: DEFAULT_MAX_PAPERS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            max_tokens: 400,
            temperature: 0.5,
        }
    }
}

impl LlmConfig {
    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| DigestError::Configuration("OPENAI_API_KEY not set".to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub sender: Option<String>,
    pub app_password: Option<String>,
    pub recipient: Option<String>,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub subject: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            sender: None,
            app_password: None,
            recipient: None,
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            smtp_port: DEFAULT_SMTP_PORT,
            subject: "Latest AI Papers from arXiv".to_string(),
        }
    }
}

/// Sender, password and recipient, all present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailCredentials<'a> {
    pub sender: &'a str,
    pub app_password: &'a str,
    pub recipient: &'a str,
}

impl MailConfig {
    pub fn credentials(&self) -> Result<MailCredentials<'_>> {
        match (&self.sender, &self.app_password, &self.recipient) {
            (Some(sender), Some(app_password), Some(recipient)) => Ok(MailCredentials {
                sender: sender.as_str(),
                app_password: app_password.as_str(),
                recipient: recipient.as_str(),
            }),
            _ => Err(DigestError::Configuration(
                "GMAIL_ADDRESS, GMAIL_APP_PASSWORD, or RECIPIENT_EMAIL not set".to_string(),
            )),
        }
    }

    /// Recipient for console output, even when the rest is missing.
    pub fn recipient_or_unknown(&self) -> &str {
        self.recipient.as_deref().unwrap_or("<unset>")
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let default = Self::default();

        Self {
            feed: FeedConfig {
                url: get("ARXIV_FEED_URL").unwrap_or(default.feed.url),
                max_papers: get("MAX_PAPERS")
                    .and_then(|v| v.parse::<usize>().ok())
                    .filter(|n| *n > 0)
                    .map(|n| n.min(DEFAULT_MAX_PAPERS))
                    .unwrap_or(default.feed.max_papers),
            },
            fetch: default.fetch,
            llm: LlmConfig {
                api_key: get("OPENAI_API_KEY"),
                base_url: get("OPENAI_BASE_URL").unwrap_or(default.llm.base_url),
                model: get("OPENAI_MODEL").unwrap_or(default.llm.model),
                ..default.llm
            },
            mail: MailConfig {
                sender: get("GMAIL_ADDRESS"),
                app_password: get("GMAIL_APP_PASSWORD"),
                recipient: get("RECIPIENT_EMAIL"),
                smtp_host: get("SMTP_HOST").unwrap_or(default.mail.smtp_host),
                smtp_port: get("SMTP_PORT")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(default.mail.smtp_port),
                ..default.mail
            },
            summary_failure_policy: match get("SUMMARY_FAILURE_POLICY").as_deref() {
                Some("fallback") | Some("fallback-to-abstract") => SummaryFailurePolicy::FallbackToAbstract,
                _ => SummaryFailurePolicy::Abort,
            },
        }
    }
}

/// Load `KEY=value` lines into the process environment, from `path` or from
/// a `.env` found in the working directory or its parents. Variables that are
/// already set are left alone. A missing file is not an error.
pub fn load_env_file(path: Option<&Path>) -> Option<PathBuf> {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path).map(|_| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };

    match loaded {
        Ok(path) => {
            info!("Loaded environment variables from {}", path.display());
            Some(path)
        }
        Err(e) if e.not_found() => {
            debug!("No .env file found, using process environment only");
            None
        }
        Err(e) => {
            warn!("Ignoring unreadable .env file: {}", e);
            None
        }
    }
}
