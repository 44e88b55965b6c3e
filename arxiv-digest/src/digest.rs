use crate::types::EnrichedPaperRecord;
use tracing::debug;

pub const DIGEST_HEADING: &str = "Latest AI Papers from arXiv";

/// HTML digest: one list item per paper with its title, tags, summary
/// bullets and a link back to arXiv.
pub fn format_digest(papers: &[EnrichedPaperRecord]) -> String {
    let mut html = format!("<h2>{}</h2><ul>", DIGEST_HEADING);

    for paper in papers {
        let tags = if paper.generated_tags.is_empty() {
            "No tags".to_string()
        } else {
            escape_html(&paper.generated_tags.join(", "))
        };

        let bullets: String = summary_bullets(&paper.generated_summary)
            .iter()
            .map(|line| format!("<li>{}</li>", escape_html(line)))
            .collect();

        let link = if paper.link.trim().is_empty() {
            "#".to_string()
        } else {
            escape_html(&paper.link)
        };

        html.push_str(&format!(
            "\n<li>\n\
             <strong>{}</strong><br>\n\
             <em>Tags: {}</em><br>\n\
             <ul>{}</ul>\n\
             <a href=\"{}\">Read more</a>\n\
             </li>\n\
             <br>\n",
            escape_html(&paper.title),
            tags,
            bullets,
            link
        ));
    }

    html.push_str("</ul>");
    debug!("Formatted digest for {} papers ({} bytes)", papers.len(), html.len());
    html
}

/// Summary lines as bullet texts: trimmed, leading `-` removed, blanks dropped.
pub fn summary_bullets(summary: &str) -> Vec<String> {
    summary
        .lines()
        .map(|line| {
            let line = line.trim();
            line.strip_prefix('-').map(str::trim).unwrap_or(line)
        })
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
        .collect()
}

/// Console rendering used when the digest cannot be mailed.
pub fn format_plain_text(papers: &[EnrichedPaperRecord]) -> String {
    if papers.is_empty() {
        return "No papers to display.\n".to_string();
    }

    let mut text = String::from("Here are the papers you wanted to send:\n\n");
    for paper in papers {
        text.push_str(&format!("Title: {}\n", paper.title));
        text.push_str(&format!("Summary: {}\n", paper.generated_summary));
        text.push_str(&format!(
            "Link: {}\n",
            if paper.link.trim().is_empty() { "#" } else { paper.link.as_str() }
        ));
        text.push_str(&"-".repeat(40));
        text.push('\n');
    }
    text
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
