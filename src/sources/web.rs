//! Posts from news search: search results with their article text.

use super::ContentSource;
use crate::error::NewsError;
use crate::extract::Extractor;
use crate::fanout::extract_all;
use crate::models::{Origin, Post, SearchHit, SearchQuery, SearchResult, Verbosity};
use crate::search::Paginator;
use futures::StreamExt;
use tracing::{info, instrument};

/// Runs one search session and extracts every hit's article.
#[derive(Debug)]
pub struct WebSearchSource<'a> {
    paginator: &'a Paginator,
    extractor: &'a Extractor,
    query: SearchQuery,
}

impl<'a> WebSearchSource<'a> {
    pub fn new(paginator: &'a Paginator, extractor: &'a Extractor, query: SearchQuery) -> Self {
        Self {
            paginator,
            extractor,
            query,
        }
    }

    /// The paginator's results for this query, in search order.
    ///
    /// # Errors
    ///
    /// [`NewsError::InvalidMonth`] for a bad month filter.
    pub async fn search_results(&self) -> Result<Vec<SearchResult>, NewsError> {
        let hits: Vec<SearchHit> = self
            .paginator
            .search(&self.query, Verbosity::Full)?
            .collect()
            .await;
        Ok(hits
            .into_iter()
            .filter_map(|hit| match hit {
                SearchHit::Result(result) => Some(result),
                SearchHit::Url(_) => None,
            })
            .collect())
    }
}

impl ContentSource for WebSearchSource<'_> {
    fn name(&self) -> &'static str {
        "web_search"
    }

    #[instrument(level = "info", skip_all, fields(term = %self.query.term))]
    async fn collect(&self) -> Result<Vec<Post>, NewsError> {
        let results = self.search_results().await?;
        info!(count = results.len(), "Search results collected");

        let urls: Vec<String> = results.into_iter().map(|r| r.url).collect();
        let outcomes = extract_all(self.extractor, &urls).await;

        Ok(urls
            .into_iter()
            .zip(outcomes)
            .map(|(url, outcome)| Post {
                origin: Origin::WebSearch,
                url,
                text: outcome.extracted_text,
                media_links: None,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractSettings;
    use crate::search::SearchSettings;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn result_page(server: &MockServer, paths: &[&str]) -> String {
        let blocks: String = paths
            .iter()
            .map(|p| {
                let url = format!("{}{p}", server.uri());
                format!(
                    r#"<div class="ezO2md"><a href="/url?q={}&amp;sa=U"><span class="CVA68e">Title {p}</span></a><span class="FrIlee">Desc {p}</span></div>"#,
                    urlencoding::encode(&url)
                )
            })
            .collect();
        format!("<html><body>{blocks}</body></html>")
    }

    #[tokio::test]
    async fn test_collect_pairs_each_result_with_its_article() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(result_page(&server, &["/story-1", "/story-2"])),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/story-1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                "<article><p>{}</p></article>",
                "Acme has partnered with Globex to distribute its sensors. ".repeat(2)
            )))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/story-2"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let paginator = Paginator::new(SearchSettings {
            endpoint: format!("{}/search", server.uri()),
            sleep_interval: Duration::ZERO,
            ..SearchSettings::default()
        })
        .unwrap();
        let extractor = Extractor::new(ExtractSettings::default()).unwrap();
        let mut query = SearchQuery::new("acme", 2);
        query.dedupe = true;

        let source = WebSearchSource::new(&paginator, &extractor, query);
        let posts = source.collect().await.unwrap();

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].url, format!("{}/story-1", server.uri()));
        assert!(posts[0].text.starts_with("Acme has partnered with Globex"));
        assert_eq!(posts[1].url, format!("{}/story-2", server.uri()));
        assert!(posts[1].text.starts_with("HTTP error: 503"));
        assert!(posts.iter().all(|p| p.origin == Origin::WebSearch && p.media_links.is_none()));
    }

    #[tokio::test]
    async fn test_collect_rejects_invalid_month() {
        let paginator = Paginator::new(SearchSettings::default()).unwrap();
        let extractor = Extractor::new(ExtractSettings::default()).unwrap();
        let mut query = SearchQuery::new("acme", 2);
        query.month_filter = Some(0);

        let source = WebSearchSource::new(&paginator, &extractor, query);
        assert!(matches!(source.collect().await, Err(NewsError::InvalidMonth(0))));
    }
}
