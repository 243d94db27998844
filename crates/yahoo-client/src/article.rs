use std::sync::Arc;

use async_trait::async_trait;
use tracker_core::{ArticleFetcher, TrackerError};

use crate::session::SessionHandle;

/// Hard cap on the text handed to the oracle.
pub const MAX_ARTICLE_CHARS: usize = 2000;
pub const TRUNCATION_MARKER: &str = "... (truncated)";

/// Containers whose content is boilerplate, not article text.
const SKIPPED_ELEMENTS: [&str; 5] = ["script", "style", "nav", "footer", "header"];

/// Fetches an article page and reduces it to a bounded plain-text excerpt
/// for the analysis task. This is an input line, not a scraper: layout,
/// links and markup structure are all discarded.
pub struct HttpArticleFetcher {
    session: Arc<SessionHandle>,
}

impl HttpArticleFetcher {
    pub fn new(session: Arc<SessionHandle>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl ArticleFetcher for HttpArticleFetcher {
    async fn fetch_body_text(&self, url: &str) -> Result<String, TrackerError> {
        let html = self
            .session
            .client()
            .get(url)
            .send()
            .await
            .map_err(|e| TrackerError::FetchFailed(e.to_string()))?
            .error_for_status()
            .map_err(|e| TrackerError::FetchFailed(e.to_string()))?
            .text()
            .await
            .map_err(|e| TrackerError::FetchFailed(e.to_string()))?;

        Ok(extract_text(&html))
    }
}

/// Strip markup and boilerplate containers, collapse whitespace, and
/// truncate to `MAX_ARTICLE_CHARS` with an explicit marker.
pub fn extract_text(html: &str) -> String {
    let text = strip_tags(html);

    let mut out = String::with_capacity(text.len().min(MAX_ARTICLE_CHARS + 64));
    for line in text.lines() {
        for chunk in line.split("  ") {
            let chunk = chunk.trim();
            if chunk.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(chunk);
        }
    }

    truncate_marked(&out)
}

fn truncate_marked(text: &str) -> String {
    if text.chars().count() <= MAX_ARTICLE_CHARS {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(MAX_ARTICLE_CHARS).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}

/// Drop tags, plus the entire content of skipped elements. Entity decoding
/// is limited to the handful that matter for prose.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len() / 4);
    let mut rest = html;

    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        rest = &rest[open..];

        let Some(close) = rest.find('>') else {
            break;
        };
        let tag_body = rest[1..close].trim();
        let tag_name: String = tag_body
            .trim_start_matches('/')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        rest = &rest[close + 1..];

        // Skip the whole element body for boilerplate containers.
        if !tag_body.starts_with('/') && SKIPPED_ELEMENTS.contains(&tag_name.as_str()) {
            let closing = format!("</{}", tag_name);
            if let Some(end) = rest.to_ascii_lowercase().find(&closing) {
                rest = &rest[end..];
                if let Some(end_close) = rest.find('>') {
                    rest = &rest[end_close + 1..];
                } else {
                    rest = "";
                }
            } else {
                rest = "";
            }
        } else {
            // Tag boundaries act as whitespace so words don't fuse.
            out.push('\n');
        }
    }
    out.push_str(rest);

    out.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markup_and_boilerplate() {
        let html = "<html><head><style>.x{color:red}</style></head>\
                    <body><script>var x = 1;</script>\
                    <nav>Menu</nav><p>Shares &amp; bonds rallied.</p>\
                    <footer>legal</footer></body></html>";
        let text = extract_text(html);
        assert_eq!(text, "Shares & bonds rallied.");
    }

    #[test]
    fn long_text_gets_truncation_marker() {
        let html = format!("<p>{}</p>", "a".repeat(MAX_ARTICLE_CHARS + 500));
        let text = extract_text(&html);
        assert!(text.ends_with(TRUNCATION_MARKER));
        assert_eq!(
            text.chars().count(),
            MAX_ARTICLE_CHARS + TRUNCATION_MARKER.chars().count()
        );
    }

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(extract_text("<p>brief</p>"), "brief");
    }

    #[test]
    fn whitespace_is_collapsed() {
        let html = "<div>first  second</div>\n\n\n<div>third</div>";
        assert_eq!(extract_text(html), "first\nsecond\nthird");
    }
}
