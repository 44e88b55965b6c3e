use arxiv_digest::config::{FeedConfig, LlmConfig, MailConfig};
use arxiv_digest::{
    format_digest, ArxivFeedSource, DeliveryOutcome, DigestError, DigestNotifier, DigestPipeline,
    EmailNotifier, EnrichedPaperRecord, FetchConfig, LlmSummarizer, MockLlmAdapter,
    PdfTextExtractor, Summarizer, SummaryFailurePolicy, SummarySource,
};
use async_trait::async_trait;
use lettre::transport::stub::StubTransport;
use std::sync::{Arc, Mutex, Once};
use tracing::info;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .try_init()
            .ok();
    });
}

/// Keeps whatever it was asked to send.
#[derive(Clone, Default)]
struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Vec<EnrichedPaperRecord>>>>,
}

impl RecordingNotifier {
    fn batches(&self) -> Vec<Vec<EnrichedPaperRecord>> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl DigestNotifier for RecordingNotifier {
    async fn send_digest(&self, papers: &[EnrichedPaperRecord]) -> DeliveryOutcome {
        self.sent.lock().unwrap().push(papers.to_vec());
        DeliveryOutcome::Sent
    }
}

fn feed_xml(base: &str, items: &[(&str, &str, &str)]) -> String {
    let items: String = items
        .iter()
        .map(|(title, description, id)| {
            format!(
                "<item><title>{}</title><link>{}/abs/{}</link><description>{}</description></item>",
                title, base, id, description
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>cs.AI updates on arXiv.org</title><link>{}</link><description>cs.AI</description>{}</channel></rss>"#,
        base, items
    )
}

async fn serve_feed(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path("/rss/cs.AI"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn feed_source(server: &MockServer) -> ArxivFeedSource {
    let feed = FeedConfig {
        url: format!("{}/rss/cs.AI", server.uri()),
        max_papers: 5,
    };
    ArxivFeedSource::new(&feed, FetchConfig::default()).unwrap()
}

fn summarizer(adapter: MockLlmAdapter) -> Result<Box<dyn Summarizer>, DigestError> {
    Ok(Box::new(LlmSummarizer::new(Box::new(adapter), &LlmConfig::default())))
}

#[tokio::test]
async fn missing_pdf_falls_back_to_abstract_and_reaches_the_digest() -> anyhow::Result<()> {
    init_tracing();

    let server = MockServer::start().await;
    serve_feed(&server, feed_xml(&server.uri(), &[("Foo", "Bar", "1234")])).await;
    Mock::given(method("GET"))
        .and(path("/pdf/1234.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let adapter = MockLlmAdapter::new("scripted").with_reply("SUMMARY:\n- ok\nTAGS: x");
    let notifier = RecordingNotifier::default();

    let report = DigestPipeline::new(
        Box::new(feed_source(&server)),
        Box::new(PdfTextExtractor::new(FetchConfig::default())?),
        summarizer(adapter),
        Box::new(notifier.clone()),
    )
    .run()
    .await?;

    assert!(report.summarization_error.is_none());
    assert_eq!(report.delivery, DeliveryOutcome::Sent);
    assert_eq!(report.papers.len(), 1);

    let paper = &report.papers[0];
    info!("Enriched record: {:?}", paper);
    assert_eq!(paper.title, "Foo");
    assert_eq!(paper.summary_source, SummarySource::Abstract);
    assert_eq!(paper.generated_summary, "- ok");
    assert_eq!(paper.generated_tags, vec!["x".to_string()]);

    let html = format_digest(&report.papers);
    assert!(html.contains("<strong>Foo</strong>"));
    assert!(html.contains("<li>ok</li>"));
    assert!(html.contains("Tags: x"));

    assert_eq!(notifier.batches(), vec![report.papers.clone()]);
    Ok(())
}

#[tokio::test]
async fn only_the_first_five_papers_are_summarized_in_feed_order() -> anyhow::Result<()> {
    init_tracing();

    let server = MockServer::start().await;
    let ids: Vec<String> = (1..=7).map(|i| format!("000{}", i)).collect();
    let titles: Vec<String> = (1..=7).map(|i| format!("Paper {}", i)).collect();
    let items: Vec<(&str, &str, &str)> = titles
        .iter()
        .zip(ids.iter())
        .map(|(title, id)| (title.as_str(), "An abstract", id.as_str()))
        .collect();
    serve_feed(&server, feed_xml(&server.uri(), &items)).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut adapter = MockLlmAdapter::new("scripted");
    for i in 1..=5 {
        adapter = adapter.with_reply(format!("SUMMARY:\n- point {}\nTAGS: t{}", i, i));
    }

    let report = DigestPipeline::new(
        Box::new(feed_source(&server)),
        Box::new(PdfTextExtractor::new(FetchConfig::default())?),
        summarizer(adapter),
        Box::new(RecordingNotifier::default()),
    )
    .run()
    .await?;

    let titles: Vec<&str> = report.papers.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Paper 1", "Paper 2", "Paper 3", "Paper 4", "Paper 5"]);
    assert_eq!(report.papers[4].generated_summary, "- point 5");
    assert_eq!(report.papers[4].generated_tags, vec!["t5".to_string()]);
    Ok(())
}

#[tokio::test]
async fn feed_failure_stops_the_run_before_anything_is_sent() -> anyhow::Result<()> {
    init_tracing();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let adapter = MockLlmAdapter::new("scripted");
    let notifier = RecordingNotifier::default();

    let result = DigestPipeline::new(
        Box::new(feed_source(&server)),
        Box::new(PdfTextExtractor::new(FetchConfig::default())?),
        summarizer(adapter),
        Box::new(notifier.clone()),
    )
    .run()
    .await;

    assert!(matches!(result, Err(DigestError::Fetch(_))));
    assert!(notifier.batches().is_empty());
    Ok(())
}

#[tokio::test]
async fn service_failure_sends_unsummarized_papers() -> anyhow::Result<()> {
    init_tracing();

    let server = MockServer::start().await;
    serve_feed(
        &server,
        feed_xml(&server.uri(), &[("Foo", "Bar", "1"), ("Baz", "Qux", "2")]),
    )
    .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let adapter = MockLlmAdapter::new("scripted")
        .with_reply("SUMMARY:\n- fine\nTAGS: a")
        .with_failure("rate limited");
    let notifier = RecordingNotifier::default();

    let report = DigestPipeline::new(
        Box::new(feed_source(&server)),
        Box::new(PdfTextExtractor::new(FetchConfig::default())?),
        summarizer(adapter),
        Box::new(notifier.clone()),
    )
    .run()
    .await?;

    assert!(matches!(report.summarization_error, Some(DigestError::Service(_))));
    assert_eq!(report.papers.len(), 2);
    assert_eq!(report.papers[0].generated_summary, "Bar");
    assert_eq!(report.papers[1].generated_summary, "Qux");
    assert_eq!(notifier.batches().len(), 1);
    Ok(())
}

#[tokio::test]
async fn fallback_policy_keeps_successful_summaries() -> anyhow::Result<()> {
    init_tracing();

    let server = MockServer::start().await;
    serve_feed(
        &server,
        feed_xml(&server.uri(), &[("Foo", "Bar", "1"), ("Baz", "Qux", "2")]),
    )
    .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let adapter = MockLlmAdapter::new("scripted")
        .with_reply("SUMMARY:\n- fine\nTAGS: a")
        .with_failure("rate limited");

    let report = DigestPipeline::new(
        Box::new(feed_source(&server)),
        Box::new(PdfTextExtractor::new(FetchConfig::default())?),
        summarizer(adapter),
        Box::new(RecordingNotifier::default()),
    )
    .with_policy(SummaryFailurePolicy::FallbackToAbstract)
    .run()
    .await?;

    assert!(report.summarization_error.is_none());
    assert_eq!(report.papers[0].generated_summary, "- fine");
    assert_eq!(report.papers[1].generated_summary, "Qux");
    Ok(())
}

#[tokio::test]
async fn missing_api_key_still_delivers_abstracts() -> anyhow::Result<()> {
    init_tracing();

    let server = MockServer::start().await;
    serve_feed(&server, feed_xml(&server.uri(), &[("Foo", "Bar", "1234")])).await;

    let notifier = RecordingNotifier::default();
    let report = DigestPipeline::new(
        Box::new(feed_source(&server)),
        Box::new(PdfTextExtractor::new(FetchConfig::default())?),
        Err(DigestError::Configuration("OPENAI_API_KEY not set".to_string())),
        Box::new(notifier.clone()),
    )
    .run()
    .await?;

    assert!(matches!(
        report.summarization_error,
        Some(DigestError::Configuration(_))
    ));
    assert_eq!(report.papers[0].generated_summary, "Bar");
    assert_eq!(notifier.batches().len(), 1);
    Ok(())
}

#[tokio::test]
async fn empty_feed_sends_an_empty_digest() -> anyhow::Result<()> {
    init_tracing();

    let server = MockServer::start().await;
    serve_feed(&server, feed_xml(&server.uri(), &[])).await;

    let report = DigestPipeline::new(
        Box::new(feed_source(&server)),
        Box::new(PdfTextExtractor::new(FetchConfig::default())?),
        summarizer(MockLlmAdapter::new("scripted")),
        Box::new(RecordingNotifier::default()),
    )
    .run()
    .await?;

    assert!(report.papers.is_empty());
    assert!(report.summarization_error.is_none());
    assert_eq!(report.delivery, DeliveryOutcome::Sent);
    Ok(())
}

#[tokio::test]
async fn rejected_email_is_reported_as_console_fallback() -> anyhow::Result<()> {
    init_tracing();

    let server = MockServer::start().await;
    serve_feed(&server, feed_xml(&server.uri(), &[("Foo", "Bar", "1234")])).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mail = MailConfig {
        sender: Some("digest@example.com".to_string()),
        app_password: Some("app-password".to_string()),
        recipient: Some("reader@example.com".to_string()),
        ..MailConfig::default()
    };

    let report = DigestPipeline::new(
        Box::new(feed_source(&server)),
        Box::new(PdfTextExtractor::new(FetchConfig::default())?),
        summarizer(MockLlmAdapter::new("scripted").with_reply("SUMMARY:\n- ok\nTAGS: x")),
        Box::new(EmailNotifier::with_transport(&mail, StubTransport::new_error())),
    )
    .run()
    .await?;

    assert_eq!(report.delivery, DeliveryOutcome::ConsoleFallback);
    assert_eq!(report.papers.len(), 1);
    Ok(())
}
