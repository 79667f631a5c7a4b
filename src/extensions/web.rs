use std::sync::LazyLock;

use regex::Regex;
use rootcause::Report;

use crate::{
    apps::url::Url,
    search::{Icon, Provider, ProviderKind, ResultAction, SearchResult},
};

static DIRECT_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://)?([\w\-]+(\.[\w\-]+)+)(/\S*)?$").expect("valid url regex")
});

const WEB_INDICATORS: [&str; 10] = [
    "search", "how to", "what is", "where", "when", "who", "why", ".com", ".net", ".org",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEngine {
    Google,
    Bing,
    DuckDuckGo,
    Yahoo,
}

impl SearchEngine {
    /// Unknown names fall back to Google.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "bing" => Self::Bing,
            "duckduckgo" | "ddg" => Self::DuckDuckGo,
            "yahoo" => Self::Yahoo,
            "google" => Self::Google,
            other => {
                tracing::warn!(engine = other, "unknown search engine, using google");
                Self::Google
            }
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::Bing => "Bing",
            Self::DuckDuckGo => "DuckDuckGo",
            Self::Yahoo => "Yahoo",
        }
    }

    #[must_use]
    pub fn search_url(self, query: &str) -> String {
        let query = urlencoding::encode(query);
        match self {
            Self::Google => format!("https://www.google.com/search?q={query}"),
            Self::Bing => format!("https://www.bing.com/search?q={query}"),
            Self::DuckDuckGo => format!("https://duckduckgo.com/?q={query}"),
            Self::Yahoo => format!("https://search.yahoo.com/search?p={query}"),
        }
    }
}

/// Opens URL-looking queries directly, otherwise searches the web.
pub struct WebProvider {
    engine: SearchEngine,
    priority: i32,
}

impl WebProvider {
    #[must_use]
    pub fn new(engine: SearchEngine, priority: i32) -> Self {
        Self { engine, priority }
    }

    fn is_direct_url(query: &str) -> bool {
        DIRECT_URL.is_match(query)
    }
}

impl Provider for WebProvider {
    fn name(&self) -> &str {
        "Web"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Web
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn can_handle(&self, query: &str) -> bool {
        let query = query.trim();
        if Self::is_direct_url(query) {
            return true;
        }

        let query = query.to_lowercase();
        WEB_INDICATORS
            .iter()
            .any(|indicator| query.contains(indicator))
    }

    fn search(&self, query: &str) -> Result<Vec<SearchResult>, Report> {
        let query = query.trim();

        let result = if Self::is_direct_url(query) {
            let url = if query.starts_with("http://") || query.starts_with("https://") {
                query.to_string()
            } else {
                format!("https://{query}")
            };

            SearchResult::new(ProviderKind::Web, format!("Open URL: {query}"))
                .description("Open in default browser")
                .path(url.as_str())
                .icon(Icon::Symbol("↗"))
                .action(ResultAction::Open(Url::Web(url)))
        } else {
            let url = self.engine.search_url(query);

            SearchResult::new(ProviderKind::Web, format!("Search: {query}"))
                .description(format!("Search on {}", self.engine.display_name()))
                .path(url.as_str())
                .icon(Icon::Symbol("⌕"))
                .action(ResultAction::Open(Url::Web(url)))
        };

        Ok(vec![result])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn web() -> WebProvider {
        WebProvider::new(SearchEngine::Google, 1000)
    }

    #[test]
    fn handles_urls_and_questions_only() {
        let web = web();
        assert!(web.can_handle("github.com/rust-lang"));
        assert!(web.can_handle("https://example.org"));
        assert!(web.can_handle("how to exit vim"));
        assert!(web.can_handle("Why is the sky blue"));
        assert!(!web.can_handle("firefox"));
        assert!(!web.can_handle("2 + 2"));
    }

    #[test]
    fn bare_domains_get_https() {
        let results = web().search("docs.rs/tokio").expect("search succeeds");
        assert_eq!(results[0].title, "Open URL: docs.rs/tokio");
        assert_eq!(results[0].path, "https://docs.rs/tokio");

        let results = web().search("http://localhost.test").expect("search succeeds");
        assert_eq!(results[0].path, "http://localhost.test");
    }

    #[test]
    fn searches_are_encoded_for_the_engine() {
        let results = web().search("what is rust").expect("search succeeds");
        assert_eq!(results[0].path, "https://www.google.com/search?q=what%20is%20rust");

        let ddg = WebProvider::new(SearchEngine::from_name("DDG"), 1000);
        let results = ddg.search("who am i").expect("search succeeds");
        assert_eq!(results[0].path, "https://duckduckgo.com/?q=who%20am%20i");
        assert_eq!(results[0].description, "Search on DuckDuckGo");
    }

    #[test]
    fn unknown_engine_is_google() {
        assert_eq!(SearchEngine::from_name("altavista"), SearchEngine::Google);
        assert_eq!(SearchEngine::from_name("Bing"), SearchEngine::Bing);
    }
}
