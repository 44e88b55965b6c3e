use arxiv_digest::config::load_env_file;
use arxiv_digest::{
    AppConfig, ArxivFeedSource, DigestPipeline, EmailNotifier, LlmSummarizer, OpenAiAdapter,
    PdfTextExtractor, Summarizer,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "arxiv-digest", about = "Email a summarized digest of the latest arXiv AI papers")]
struct Cli {
    /// Read environment variables from this file instead of searching for `.env`
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch, summarize and send one digest (default)
    Run,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    load_env_file(cli.env_file.as_deref());

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run().await,
    }
}

async fn run() -> ExitCode {
    info!("Starting arXiv digest");
    let config = AppConfig::from_env();

    let feed = match ArxivFeedSource::new(&config.feed, config.fetch.clone()) {
        Ok(feed) => feed,
        Err(e) => {
            error!("[ERROR] Failed to set up feed reader: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let extractor = match PdfTextExtractor::new(config.fetch.clone()) {
        Ok(extractor) => extractor,
        Err(e) => {
            error!("[ERROR] Failed to set up PDF extractor: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let summarizer = OpenAiAdapter::new(&config.llm).map(|adapter| {
        let summarizer = LlmSummarizer::new(Box::new(adapter), &config.llm);
        info!("Using {}", summarizer.adapter_name());
        Box::new(summarizer) as Box<dyn Summarizer>
    });
    if let Err(e) = &summarizer {
        warn!("Summarization disabled: {}", e);
    }

    let notifier = EmailNotifier::new(&config.mail);

    let pipeline = DigestPipeline::new(Box::new(feed), Box::new(extractor), summarizer, Box::new(notifier))
        .with_policy(config.summary_failure_policy);

    match pipeline.run().await {
        Ok(report) => {
            info!(
                "arXiv digest finished: {} papers, delivery {:?}",
                report.papers.len(),
                report.delivery
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("[ERROR] Failed to fetch latest papers: {}", e);
            ExitCode::FAILURE
        }
    }
}
