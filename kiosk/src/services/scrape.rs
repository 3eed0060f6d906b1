use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Serialize;
use url::Url;

use crate::config::ScrapeConfig;
use crate::error::{KioskError, Result};

/// A link found on the scraped page.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct PageLink {
    pub text: String,
    pub href: String,
}

/// Structured summary of a scraped page.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct PageSummary {
    pub url: String,
    pub title: String,
    pub meta_description: String,
    pub h1_tags: Vec<String>,
    pub links: Vec<PageLink>,
    pub fetched_at: DateTime<Utc>,
}

/// Fetches pages and extracts a structured summary.
#[derive(Clone)]
pub struct ScrapeService {
    client: Client,
}

impl ScrapeService {
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| KioskError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    pub async fn scrape(&self, raw_url: &str) -> Result<PageSummary> {
        let url = Url::parse(raw_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(KioskError::Validation(format!(
                "Unsupported URL scheme: {}",
                url.scheme()
            )));
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| KioskError::Upstream(format!("Failed to fetch the site: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(KioskError::Upstream(format!(
                "Site returned {status} for {raw_url}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| KioskError::Upstream(format!("Failed to read the site body: {e}")))?;

        Ok(extract_page(raw_url, &body))
    }
}

/// Pull title, meta description, h1 headings, and links out of a page.
/// Synchronous on purpose: `scraper::Html` is not `Send`, so it must not
/// live across an await point.
fn extract_page(url: &str, body: &str) -> PageSummary {
    let document = Html::parse_document(body);

    let title_sel = Selector::parse("title").expect("hardcoded selector");
    let meta_sel = Selector::parse(r#"meta[name="description"]"#).expect("hardcoded selector");
    let h1_sel = Selector::parse("h1").expect("hardcoded selector");
    let link_sel = Selector::parse("a[href]").expect("hardcoded selector");

    let title = document
        .select(&title_sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let meta_description = document
        .select(&meta_sel)
        .next()
        .and_then(|el| el.value().attr("content"))
        .unwrap_or_default()
        .to_string();

    let h1_tags = document
        .select(&h1_sel)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect();

    let links = document
        .select(&link_sel)
        .filter_map(|el| {
            let href = el.value().attr("href")?;
            Some(PageLink {
                text: el.text().collect::<String>().trim().to_string(),
                href: href.to_string(),
            })
        })
        .collect();

    PageSummary {
        url: url.to_string(),
        title,
        meta_description,
        h1_tags,
        links,
        fetched_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FIXTURE: &str = r#"<!doctype html>
<html>
  <head>
    <title>Example Domain</title>
    <meta name="description" content="An example page.">
  </head>
  <body>
    <h1>Welcome</h1>
    <h1> Second heading </h1>
    <p>Some text with <a href="/about">an about link</a> and
       <a href="https://example.org">an external one</a>.</p>
    <a name="anchor-without-href">not a link</a>
  </body>
</html>"#;

    #[test]
    fn extracts_title_and_meta() {
        let page = extract_page("https://example.com", FIXTURE);
        assert_eq!(page.title, "Example Domain");
        assert_eq!(page.meta_description, "An example page.");
    }

    #[test]
    fn extracts_h1_tags_trimmed() {
        let page = extract_page("https://example.com", FIXTURE);
        assert_eq!(page.h1_tags, vec!["Welcome", "Second heading"]);
    }

    #[test]
    fn extracts_only_anchors_with_href() {
        let page = extract_page("https://example.com", FIXTURE);
        assert_eq!(page.links.len(), 2);
        assert_eq!(page.links[0].href, "/about");
        assert_eq!(page.links[0].text, "an about link");
        assert_eq!(page.links[1].href, "https://example.org");
    }

    #[test]
    fn missing_elements_yield_empty_fields() {
        let page = extract_page("https://example.com", "<html><body></body></html>");
        assert_eq!(page.title, "");
        assert_eq!(page.meta_description, "");
        assert!(page.h1_tags.is_empty());
        assert!(page.links.is_empty());
    }

    #[tokio::test]
    async fn rejects_non_http_schemes() {
        let service = ScrapeService::new(&crate::config::Config::default().scrape).unwrap();
        let err = service.scrape("ftp://example.com").await.unwrap_err();
        assert!(matches!(err, KioskError::Validation(_)));
    }

    #[tokio::test]
    async fn rejects_malformed_urls() {
        let service = ScrapeService::new(&crate::config::Config::default().scrape).unwrap();
        let err = service.scrape("not a url").await.unwrap_err();
        assert!(matches!(err, KioskError::UrlParse(_)));
    }
}
