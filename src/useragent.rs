//! Randomized client identities for outbound requests.
//!
//! Two flavours are provided:
//! - [`random_user_agent`]: a text-browser style identity used for search
//!   result pages, which keeps the search engine on its lightweight markup.
//! - [`browser_headers`]: a full desktop-browser header set used when
//!   fetching arbitrary article pages.
//!
//! Nothing is remembered between calls.

use rand::{Rng, rng};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONNECTION, HeaderMap, HeaderValue, USER_AGENT};

/// Build a `Lynx/x.y.z libwww-FM/x.y SSL-MM/x.y OpenSSL/x.y.z` identity
/// with every version component drawn at random from a fixed range.
pub fn random_user_agent() -> String {
    let mut r = rng();
    let lynx = format!(
        "Lynx/{}.{}.{}",
        r.random_range(2..=3),
        r.random_range(8..=9),
        r.random_range(0..=2)
    );
    let libwww = format!(
        "libwww-FM/{}.{}",
        r.random_range(2..=3),
        r.random_range(13..=15)
    );
    let ssl_mm = format!("SSL-MM/{}.{}", r.random_range(1..=2), r.random_range(3..=5));
    let openssl = format!(
        "OpenSSL/{}.{}.{}",
        r.random_range(1..=3),
        r.random_range(0..=4),
        r.random_range(0..=9)
    );
    format!("{lynx} {libwww} {ssl_mm} {openssl}")
}

const PLATFORMS: &[&str] = &[
    "Windows NT 10.0; Win64; x64",
    "Macintosh; Intel Mac OS X 10_15_7",
    "X11; Linux x86_64",
    "X11; Ubuntu; Linux x86_64",
];

/// A desktop Chrome or Firefox User-Agent with randomized versions.
pub fn random_browser_user_agent() -> String {
    let mut r = rng();
    let platform = PLATFORMS[r.random_range(0..PLATFORMS.len())];
    if r.random_bool(0.5) {
        let major = r.random_range(118..=131);
        let build = r.random_range(5000..=6800);
        let patch = r.random_range(0..=200);
        format!(
            "Mozilla/5.0 ({platform}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{major}.0.{build}.{patch} Safari/537.36"
        )
    } else {
        let major = r.random_range(115..=133);
        format!("Mozilla/5.0 ({platform}; rv:{major}.0) Gecko/20100101 Firefox/{major}.0")
    }
}

/// Header set mimicking a real browser navigation request.
pub fn browser_headers() -> HeaderMap {
    let mut r = rng();
    let mut headers = HeaderMap::new();

    if let Ok(ua) = HeaderValue::from_str(&random_browser_user_agent()) {
        headers.insert(USER_AGENT, ua);
    }
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    let quality = r.random_range(5..=9);
    if let Ok(lang) = HeaderValue::from_str(&format!("en-US,en;q=0.{quality}")) {
        headers.insert(ACCEPT_LANGUAGE, lang);
    }
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    if r.random_bool(0.5) {
        headers.insert("DNT", HeaderValue::from_static("1"));
    }
    headers
}
