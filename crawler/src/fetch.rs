use anyhow::Result;
use reqwest::{Client, StatusCode, Url};
use scraper::{Html, Node};
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::sleep;

/// Elements whose text never reaches the index.
const IGNORED_TAGS: &[&str] = &["script", "style", "head", "title", "meta", "noscript"];

#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub text: String,
}

/// Sequential page fetcher with a per-run visited set and a fixed politeness delay.
pub struct Fetcher {
    client: Client,
    delay: Duration,
    visited: HashSet<String>,
}

impl Fetcher {
    pub fn new(user_agent: &str, timeout: Duration, delay: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(timeout)
            .build()?;
        Ok(Self { client, delay, visited: HashSet::new() })
    }

    /// Fetch a page and extract its visible text.
    ///
    /// Returns `None` for URLs already visited in this run, unparseable URLs,
    /// non-200 responses and transport errors; each is logged.
    pub async fn fetch(&mut self, raw: &str) -> Option<FetchedPage> {
        if !self.visited.insert(raw.to_string()) {
            tracing::debug!(url = raw, "already visited");
            return None;
        }
        let url = match Url::parse(raw) {
            Ok(u) => u,
            Err(err) => {
                tracing::warn!(url = raw, %err, "invalid url");
                return None;
            }
        };
        tracing::info!(%url, "crawling");
        sleep(self.delay).await;

        let resp = match self.client.get(url.clone()).send().await {
            Ok(resp) => resp,
            Err(err) => {
                tracing::warn!(%url, %err, "fetch failed");
                return None;
            }
        };
        if resp.status() != StatusCode::OK {
            tracing::warn!(%url, status = %resp.status(), "unexpected status");
            return None;
        }
        // decodes with the response charset, falling back to lossy utf-8
        let html = match resp.text().await {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(%url, %err, "reading body failed");
                return None;
            }
        };
        Some(FetchedPage { url: raw.to_string(), text: extract_text(&html) })
    }
}

/// Visible text of an HTML document: trimmed text nodes outside ignored elements, joined by spaces.
pub fn extract_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut parts: Vec<&str> = Vec::new();
    for node in doc.tree.root().descendants() {
        let Node::Text(text) = node.value() else { continue };
        let hidden = node.ancestors().any(|a| {
            a.value().as_element().map_or(false, |e| IGNORED_TAGS.contains(&e.name()))
        });
        if hidden { continue; }
        let content = text.trim();
        if !content.is_empty() {
            parts.push(content);
        }
    }
    parts.join(" ")
}

/// URLs from a seed file body: one per line, blank lines and `#` comments skipped.
pub fn parse_url_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}
