//! News search result paginator.
//!
//! Drives the search engine's news vertical page by page and turns each
//! results page into [`SearchResult`]s. A page that fails to load or
//! parses to nothing ends the stream; whatever was already yielded stands.
//!
//! # Request Shape
//!
//! Every page is a single `GET` carrying:
//! - `tbm=nws`, `q`, `num` (desired count + 2), `start`, `safe`
//! - `hl` / `gl` / `tbs` only when a language, region or month was given
//! - the consent-bypass cookies, so no interstitial consent page is served
//! - a freshly randomized User-Agent from [`random_user_agent`]
//!
//! # Termination
//!
//! The stream ends when the desired count is reached, when a page adds no
//! new result, or when a request fails. Pages are strictly sequential.

use crate::error::NewsError;
use crate::models::{SearchHit, SearchQuery, SearchResult, Verbosity};
use crate::useragent::random_user_agent;
use chrono::{Datelike, Local};
use futures::Stream;
use once_cell::sync::Lazy;
use reqwest::header::{ACCEPT, COOKIE, USER_AGENT};
use reqwest::{Client, Proxy};
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// Offset increment between two result pages.
pub const PAGE_STRIDE: usize = 10;

/// Cookies that make the search engine skip its interactive consent page.
pub const CONSENT_COOKIES: &str = "CONSENT=PENDING+987; SOCS=CAESHAgBEhIaAB";

pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.google.com/search";

static RESULT_BLOCK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.ezO2md").expect("valid result block selector"));
static RESULT_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("valid result link selector"));
static RESULT_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.CVA68e").expect("valid result title selector"));
static RESULT_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.FrIlee").expect("valid result description selector"));

/// Connection and pacing settings for the search endpoint.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// Full URL of the search page, e.g. `https://www.google.com/search`.
    pub endpoint: String,
    /// Timeout applied to each page request.
    pub timeout: Duration,
    /// Pause between two consecutive page requests.
    pub sleep_interval: Duration,
    /// Value of the `safe` parameter.
    pub safe: String,
    /// Optional `http://` or `https://` proxy for every page request.
    pub proxy: Option<String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            timeout: Duration::from_secs(5),
            sleep_interval: Duration::ZERO,
            safe: "active".to_string(),
            proxy: None,
        }
    }
}

/// Build the `tbs` date-range token restricting results to `month` of `year`.
///
/// Months with 31 days get `cd_max` on the 31st, the others on the 30th.
///
/// # Errors
///
/// [`NewsError::InvalidMonth`] for anything outside `1..=12`.
pub fn tbs_format_for_year(month: Option<u32>, year: i32) -> Result<Option<String>, NewsError> {
    let Some(month) = month else {
        return Ok(None);
    };
    let day = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        2 | 4 | 6 | 9 | 11 => 30,
        other => return Err(NewsError::InvalidMonth(other)),
    };
    Ok(Some(format!(
        "cdr:1,cd_min:{month}/01/{year},cd_max:{month}/{day}/{year},sbd:1"
    )))
}

/// [`tbs_format_for_year`] anchored to the current local year.
pub fn tbs_format(month: Option<u32>) -> Result<Option<String>, NewsError> {
    tbs_format_for_year(month, Local::now().year())
}

/// Turn a result anchor's `href` into the target article URL.
///
/// Result links look like `/url?q=https%3A%2F%2F...&sa=U&ved=...`: the
/// tracking suffix after the first `&` is dropped, the redirect prefix is
/// removed and the remainder is percent-decoded.
pub fn canonicalize_link(href: &str) -> String {
    let head = href.split('&').next().unwrap_or(href);
    let stripped = head.replace("/url?q=", "");
    match urlencoding::decode(&stripped) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => stripped,
    }
}

/// Parse one results page into its complete result blocks.
///
/// Blocks lacking a link, a title or a description are skipped.
pub fn parse_results_page(html: &str) -> Vec<SearchResult> {
    let document = Html::parse_document(html);
    let mut results = Vec::new();

    for block in document.select(&RESULT_BLOCK) {
        let Some(link) = block.select(&RESULT_LINK).next() else {
            continue;
        };
        let Some(title) = link.select(&RESULT_TITLE).next() else {
            continue;
        };
        let Some(description) = block.select(&RESULT_DESCRIPTION).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };

        results.push(SearchResult {
            url: canonicalize_link(href),
            title: title.text().collect::<String>(),
            description: description.text().collect::<String>(),
        });
    }
    results
}

/// Sequential, throttled paginator over the search endpoint.
#[derive(Debug, Clone)]
pub struct Paginator {
    client: Client,
    settings: SearchSettings,
}

impl Paginator {
    /// Build the HTTP client once for the whole process.
    pub fn new(settings: SearchSettings) -> Result<Self, NewsError> {
        let mut builder = Client::builder().timeout(settings.timeout);
        match settings.proxy.as_deref() {
            Some(proxy) if proxy.starts_with("http://") || proxy.starts_with("https://") => {
                builder = builder.proxy(Proxy::all(proxy)?);
            }
            Some(proxy) => warn!(%proxy, "Ignoring proxy without http(s) scheme"),
            None => {}
        }
        Ok(Self {
            client: builder.build()?,
            settings,
        })
    }

    /// Start a search session.
    ///
    /// The month filter is validated up front; after that the returned
    /// stream never fails, it only ends.
    ///
    /// # Errors
    ///
    /// [`NewsError::InvalidMonth`] when `query.month_filter` is not a month.
    pub fn search<'a>(
        &'a self,
        query: &'a SearchQuery,
        verbosity: Verbosity,
    ) -> Result<impl Stream<Item = SearchHit> + 'a, NewsError> {
        let tbs = tbs_format(query.month_filter)?;

        Ok(async_stream::stream! {
            let mut start = query.start_offset;
            let mut fetched = 0usize;
            let mut seen: HashSet<String> = HashSet::new();

            'pages: while fetched < query.desired_count {
                let params = self.page_params(query, start, tbs.as_deref());
                let page = match self.fetch_page(&params).await {
                    Ok(page) => page,
                    Err(e) => {
                        warn!(term = %query.term, start, error = %e, "Search page request failed; stopping");
                        break;
                    }
                };

                let mut new_results = 0usize;
                for result in page {
                    if query.dedupe && seen.contains(&result.url) {
                        continue;
                    }
                    seen.insert(result.url.clone());
                    fetched += 1;
                    new_results += 1;

                    yield match verbosity {
                        Verbosity::Full => SearchHit::Result(result),
                        Verbosity::Urls => SearchHit::Url(result.url),
                    };

                    if fetched >= query.desired_count {
                        break 'pages;
                    }
                }

                debug!(start, new_results, fetched, "Parsed search page");
                if new_results == 0 {
                    break;
                }

                start = start.saturating_add(PAGE_STRIDE);
                sleep(self.settings.sleep_interval).await;
            }

            info!(term = %query.term, fetched, "Search finished");
        })
    }

    fn page_params(
        &self,
        query: &SearchQuery,
        start: usize,
        tbs: Option<&str>,
    ) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("tbm", "nws".to_string()),
            ("q", query.term.clone()),
            ("num", query.desired_count.saturating_add(2).to_string()),
        ];
        if let Some(lang) = &query.language_hint {
            params.push(("hl", lang.clone()));
        }
        params.push(("start", start.to_string()));
        params.push(("safe", self.settings.safe.clone()));
        if let Some(region) = &query.region_hint {
            params.push(("gl", region.clone()));
        }
        if let Some(tbs) = tbs {
            params.push(("tbs", tbs.to_string()));
        }
        params
    }

    #[instrument(level = "debug", skip_all)]
    async fn fetch_page(
        &self,
        params: &[(&'static str, String)],
    ) -> Result<Vec<SearchResult>, reqwest::Error> {
        let body = self
            .client
            .get(&self.settings.endpoint)
            .header(USER_AGENT, random_user_agent())
            .header(ACCEPT, "*/*")
            .header(COOKIE, CONSENT_COOKIES)
            .query(params)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(parse_results_page(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn block(url: &str, title: &str) -> String {
        format!(
            r#"<div class="ezO2md"><a href="/url?q={}&amp;sa=U&amp;ved=2ah"><span class="CVA68e">{title}</span></a><span class="FrIlee">About {title}</span></div>"#,
            urlencoding::encode(url)
        )
    }

    fn page(urls: &[&str]) -> String {
        let blocks: String = urls
            .iter()
            .enumerate()
            .map(|(i, u)| block(u, &format!("Story {i}")))
            .collect();
        format!("<html><body><div id=\"main\">{blocks}</div></body></html>")
    }

    fn paginator(server: &MockServer) -> Paginator {
        paginator_with_sleep(server, Duration::ZERO)
    }

    fn paginator_with_sleep(server: &MockServer, sleep_interval: Duration) -> Paginator {
        Paginator::new(SearchSettings {
            endpoint: format!("{}/search", server.uri()),
            timeout: Duration::from_secs(5),
            sleep_interval,
            ..SearchSettings::default()
        })
        .unwrap()
    }

    async fn run(paginator: &Paginator, query: &SearchQuery) -> Vec<SearchHit> {
        paginator
            .search(query, Verbosity::Full)
            .unwrap()
            .collect()
            .await
    }

    fn urls(hits: &[SearchHit]) -> Vec<&str> {
        hits.iter().map(SearchHit::url).collect()
    }

    #[test]
    fn test_tbs_format_long_months_end_on_31() {
        for month in [1, 3, 5, 7, 8, 10, 12] {
            let tbs = tbs_format_for_year(Some(month), 2025).unwrap().unwrap();
            assert_eq!(
                tbs,
                format!("cdr:1,cd_min:{month}/01/2025,cd_max:{month}/31/2025,sbd:1")
            );
        }
    }

    #[test]
    fn test_tbs_format_other_months_end_on_30() {
        for month in [2, 4, 6, 9, 11] {
            let tbs = tbs_format_for_year(Some(month), 2025).unwrap().unwrap();
            assert!(tbs.contains(&format!("cd_max:{month}/30/2025")), "{tbs}");
        }
    }

    #[test]
    fn test_tbs_format_rejects_non_months() {
        for month in [0, 13, 42] {
            assert!(matches!(
                tbs_format_for_year(Some(month), 2025),
                Err(NewsError::InvalidMonth(m)) if m == month
            ));
        }
        assert_eq!(tbs_format(None).unwrap(), None);
    }

    #[test]
    fn test_canonicalize_link_strips_redirect_and_tracking() {
        assert_eq!(
            canonicalize_link("/url?q=https://news.example.com/a%3Fid%3D7&sa=U&ved=2ah"),
            "https://news.example.com/a?id=7"
        );
        assert_eq!(
            canonicalize_link("https://direct.example.com/story"),
            "https://direct.example.com/story"
        );
    }

    #[test]
    fn test_parse_results_page_skips_incomplete_blocks() {
        let html = format!(
            r#"<html><body>
            {}
            <div class="ezO2md"><a href="/url?q=https://no-title.example.com"><span>x</span></a><span class="FrIlee">d</span></div>
            <div class="ezO2md"><a href="/url?q=https://no-desc.example.com"><span class="CVA68e">t</span></a></div>
            <div class="ezO2md"><span class="CVA68e">t</span><span class="FrIlee">no link</span></div>
            </body></html>"#,
            block("https://news.example.com/acme", "Acme raises")
        );

        let results = parse_results_page(&html);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "https://news.example.com/acme");
        assert_eq!(results[0].title, "Acme raises");
        assert_eq!(results[0].description, "About Acme raises");
    }

    #[test]
    fn test_parse_results_page_on_unrelated_markup() {
        assert!(parse_results_page("<html><body><p>consent</p></body></html>").is_empty());
        assert!(parse_results_page("not even html <<<").is_empty());
    }

    #[tokio::test]
    async fn test_first_page_requests_desired_plus_two_and_stops_when_exhausted() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("tbm", "nws"))
            .and(query_param("q", "AcmeCorp raises Series A"))
            .and(query_param("num", "7"))
            .and(query_param("start", "0"))
            .and(query_param("safe", "active"))
            .and(query_param_is_missing("tbs"))
            .and(query_param_is_missing("hl"))
            .and(query_param_is_missing("gl"))
            .and(header("cookie", CONSENT_COOKIES))
            .respond_with(ResponseTemplate::new(200).set_body_string(page(&[
                "https://a.example.com/1",
                "https://b.example.com/2",
                "https://c.example.com/3",
            ])))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("start", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page(&[])))
            .expect(1)
            .mount(&server)
            .await;

        let mut query = SearchQuery::new("AcmeCorp raises Series A", 5);
        query.dedupe = true;
        let hits = run(&paginator(&server), &query).await;

        assert_eq!(hits.len(), 3);
        assert!(hits.len() <= 5);
        for hit in &hits {
            let SearchHit::Result(result) = hit else {
                panic!("expected full results");
            };
            assert!(!result.url.is_empty());
            assert!(!result.title.is_empty());
            assert!(!result.description.is_empty());
        }
    }

    #[tokio::test]
    async fn test_never_yields_more_than_desired() {
        let server = MockServer::start().await;
        let many: Vec<String> = (0..10).map(|i| format!("https://n.example.com/{i}")).collect();
        let many: Vec<&str> = many.iter().map(String::as_str).collect();

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page(&many)))
            .expect(1)
            .mount(&server)
            .await;

        let hits = run(&paginator(&server), &SearchQuery::new("acme", 4)).await;
        assert_eq!(urls(&hits), many[..4].to_vec());
    }

    #[tokio::test]
    async fn test_dedupe_drops_repeats_across_pages() {
        let server = MockServer::start().await;
        let pages = [
            ("0", vec!["https://a.example.com", "https://b.example.com"]),
            ("10", vec!["https://b.example.com", "https://c.example.com"]),
            ("20", vec!["https://c.example.com"]),
        ];
        for (start, links) in &pages {
            Mock::given(method("GET"))
                .and(path("/search"))
                .and(query_param("start", *start))
                .respond_with(ResponseTemplate::new(200).set_body_string(page(links)))
                .mount(&server)
                .await;
        }

        let mut query = SearchQuery::new("acme", 10);
        query.dedupe = true;
        let hits = run(&paginator(&server), &query).await;
        assert_eq!(
            urls(&hits),
            vec![
                "https://a.example.com",
                "https://b.example.com",
                "https://c.example.com"
            ]
        );

        // Without dedupe the repeats count; the unmocked fourth page 404s and ends the stream.
        let hits = run(&paginator(&server), &SearchQuery::new("acme", 10)).await;
        assert_eq!(hits.len(), 5);
    }

    #[tokio::test]
    async fn test_month_and_hints_become_query_parameters() {
        let server = MockServer::start().await;
        let tbs = tbs_format(Some(2)).unwrap().unwrap();

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("tbs", tbs.as_str()))
            .and(query_param("hl", "zh-TW"))
            .and(query_param("gl", "tw"))
            .and(query_param("start", "20"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(page(&["https://tw.example.com/x"])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut query = SearchQuery::new("acme", 1);
        query.month_filter = Some(2);
        query.language_hint = Some("zh-TW".to_string());
        query.region_hint = Some("tw".to_string());
        query.start_offset = 20;

        let hits = run(&paginator(&server), &query).await;
        assert_eq!(urls(&hits), vec!["https://tw.example.com/x"]);
    }

    #[tokio::test]
    async fn test_invalid_month_fails_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let paginator = paginator(&server);
        let mut query = SearchQuery::new("acme", 5);
        query.month_filter = Some(13);
        assert!(matches!(
            paginator.search(&query, Verbosity::Full),
            Err(NewsError::InvalidMonth(13))
        ));
    }

    #[tokio::test]
    async fn test_zero_desired_count_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let hits = run(&paginator(&server), &SearchQuery::new("acme", 0)).await;
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_ends_stream_quietly() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let hits = run(&paginator(&server), &SearchQuery::new("acme", 5)).await;
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_url_verbosity_yields_bare_urls() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(page(&["https://a.example.com/z"])),
            )
            .mount(&server)
            .await;

        let paginator = paginator(&server);
        let query = SearchQuery::new("acme", 1);
        let hits: Vec<SearchHit> = paginator
            .search(&query, Verbosity::Urls)
            .unwrap()
            .collect()
            .await;
        assert_eq!(hits, vec![SearchHit::Url("https://a.example.com/z".to_string())]);
    }

    #[tokio::test]
    async fn test_huge_desired_count_saturates_num() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("num", usize::MAX.to_string().as_str()))
            .and(query_param("start", "0"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(page(&["https://a.example.com/1"])),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("start", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page(&[])))
            .expect(1)
            .mount(&server)
            .await;

        let hits = run(&paginator(&server), &SearchQuery::new("acme", usize::MAX)).await;
        assert_eq!(urls(&hits), vec!["https://a.example.com/1"]);
    }

    #[tokio::test]
    async fn test_sleeps_between_pages() {
        let server = MockServer::start().await;
        let pages = [
            ("0", vec!["https://a.example.com", "https://b.example.com"]),
            ("10", vec!["https://c.example.com", "https://d.example.com"]),
            ("20", vec![]),
        ];
        for (start, links) in &pages {
            Mock::given(method("GET"))
                .and(path("/search"))
                .and(query_param("start", *start))
                .respond_with(ResponseTemplate::new(200).set_body_string(page(links)))
                .expect(1)
                .mount(&server)
                .await;
        }

        let interval = Duration::from_millis(150);
        let started = std::time::Instant::now();
        let hits = run(&paginator_with_sleep(&server, interval), &SearchQuery::new("acme", 10)).await;

        assert_eq!(hits.len(), 4);
        assert!(started.elapsed() >= interval * 2, "elapsed {:?}", started.elapsed());
    }

    #[tokio::test]
    async fn test_every_page_request_gets_a_text_browser_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("start", "0"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(page(&["https://a.example.com/1"])),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("start", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page(&[])))
            .mount(&server)
            .await;

        run(&paginator(&server), &SearchQuery::new("acme", 5)).await;

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        for request in &requests {
            let user_agent = request.headers.get("user-agent").unwrap().to_str().unwrap();
            assert!(user_agent.starts_with("Lynx/"), "{user_agent}");
            assert!(user_agent.contains(" libwww-FM/"), "{user_agent}");
            assert_eq!(request.headers.get("accept").unwrap().to_str().unwrap(), "*/*");
            assert_eq!(
                request.headers.get("cookie").unwrap().to_str().unwrap(),
                CONSENT_COOKIES
            );
        }
    }
}
