use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::article::Article;
use crate::error::{Error, Result};

pub const DEFAULT_KEY_FILE: &str = "api_key.txt";
pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2";

const HEADLINES_ENDPOINT: &str = "top-headlines";
const EVERYTHING_ENDPOINT: &str = "everything";

/// Parameters for a single query. Nothing here is validated locally; the
/// upstream API decides what a date or domain means.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub date: Option<String>,
    pub domain: Option<String>,
    pub language: Option<String>,
    pub terms: Vec<String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn term(mut self, term: impl Into<String>) -> Self {
        self.terms.push(term.into());
        self
    }

    pub fn terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.terms.extend(terms.into_iter().map(Into::into));
        self
    }

    fn joined_terms(&self) -> Option<String> {
        let joined = self
            .terms
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        (!joined.is_empty()).then_some(joined)
    }
}

/// Query parameters for the top-headlines endpoint. `date` and `domain` are
/// not supported there and are ignored.
pub fn headline_params(query: &Query) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(language) = &query.language {
        params.push(("language", language.clone()));
    }
    if let Some(q) = query.joined_terms() {
        params.push(("q", q));
    }
    params
}

/// Query parameters for the everything endpoint. A date restricts results to
/// that single day, oldest first.
pub fn span_params(query: &Query) -> Vec<(&'static str, String)> {
    let mut params = headline_params(query);
    if let Some(domain) = &query.domain {
        params.push(("domains", domain.clone()));
    }
    if let Some(date) = &query.date {
        params.push(("from", date.clone()));
        params.push(("to", date.clone()));
        params.push(("sortBy", "publishedAt".to_string()));
    }
    params
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Option<Vec<Article>>,
}

/// Turns a response body into articles, or the error the API reported.
pub(crate) fn parse_response(body: &str) -> Result<Vec<Article>> {
    let response: ApiResponse = serde_json::from_str(body)
        .map_err(|e| Error::RequestFailed(format!("could not parse response body: {}", e)))?;

    if response.status.as_deref() != Some("ok") {
        let code = response.code.unwrap_or_else(|| "unknown_error".to_string());
        let message = response.message.unwrap_or_else(|| "Unknown error".to_string());
        warn!(%code, %message, "News API reported an error");
        return Err(Error::Upstream { code, message });
    }

    Ok(response.articles.unwrap_or_default())
}

pub struct Fetcher {
    api_key: String,
    base_url: String,
    client: reqwest::blocking::Client,
}

impl Fetcher {
    /// Reads the API key from `key_file`. The file must exist and contain a
    /// non-blank key.
    pub fn new(key_file: impl AsRef<Path>) -> Result<Self> {
        let path = key_file.as_ref();
        let key = match fs::read_to_string(path) {
            Ok(contents) => contents.trim().to_string(),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::ResourceNotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(source) => {
                return Err(Error::CredentialUnreadable {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        if key.is_empty() {
            return Err(Error::Configuration(format!(
                "API key file '{}' is empty",
                path.display()
            )));
        }

        Ok(Self {
            api_key: key,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: crate::http::http_client()?,
        })
    }

    pub fn from_default_key_file() -> Result<Self> {
        Self::new(DEFAULT_KEY_FILE)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current top headlines, in the order the API returns them.
    pub fn headlines(&self, query: &Query) -> Result<Vec<Article>> {
        self.get(HEADLINES_ENDPOINT, &headline_params(query))
    }

    /// Searches the full archive. Results keep the upstream order.
    pub fn span(&self, query: &Query) -> Result<Vec<Article>> {
        self.get(EVERYTHING_ENDPOINT, &span_params(query))
    }

    fn endpoint(&self, name: &str, params: &[(&str, String)]) -> Result<Url> {
        let base = self.base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{}/{}", base, name))
            .map_err(|e| Error::RequestFailed(format!("invalid base URL '{}': {}", base, e)))?;
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    fn get(&self, name: &str, params: &[(&str, String)]) -> Result<Vec<Article>> {
        let url = self.endpoint(name, params)?;
        debug!(endpoint = name, ?params, "sending request");

        let body = self
            .client
            .get(url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(|e| Error::RequestFailed(e.to_string()))?;

        let articles = parse_response(&body)?;
        info!(endpoint = name, count = articles.len(), "fetched articles");
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn key_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn fetcher(server: &MockServer, key: &str) -> (NamedTempFile, Fetcher) {
        let file = key_file(key);
        let fetcher = Fetcher::new(file.path())
            .unwrap()
            .with_base_url(server.base_url());
        (file, fetcher)
    }

    fn param<'a>(params: &'a [(&str, String)], name: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_missing_key_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = Fetcher::new(dir.path().join("does_not_exist.txt"))
            .err()
            .unwrap();
        assert!(matches!(err, Error::ResourceNotFound { .. }), "{err}");
    }

    #[test]
    fn test_blank_key_file() {
        let file = key_file("  \n\t");
        let err = Fetcher::new(file.path()).err().unwrap();
        assert!(matches!(err, Error::Configuration(_)), "{err}");
    }

    #[test]
    fn test_key_is_read_and_trimmed() {
        let file = key_file("FAKEKEY123\n");
        let fetcher = Fetcher::new(file.path()).unwrap();
        assert_eq!(fetcher.api_key(), "FAKEKEY123");
        assert_eq!(fetcher.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_headline_params_ignore_date_and_domain() {
        let query = Query::new()
            .date("2025-10-20")
            .domain("bbc.co.uk")
            .language("en")
            .terms(["technology", "AI"]);
        let params = headline_params(&query);
        assert_eq!(
            params,
            vec![
                ("language", "en".to_string()),
                ("q", "technology AI".to_string())
            ]
        );
    }

    #[test]
    fn test_blank_terms_are_dropped() {
        let query = Query::new().terms(["", "  "]);
        assert!(headline_params(&query).is_empty());

        let query = Query::new().terms(["climate", " ", "change"]);
        assert_eq!(param(&headline_params(&query), "q"), Some("climate change"));
    }

    #[test]
    fn test_span_params_restrict_to_one_day() {
        let query = Query::new()
            .date("2025-10-20")
            .domain("bbc.co.uk")
            .language("en")
            .term("climate");
        let params = span_params(&query);
        assert_eq!(param(&params, "from"), Some("2025-10-20"));
        assert_eq!(param(&params, "to"), Some("2025-10-20"));
        assert_eq!(param(&params, "domains"), Some("bbc.co.uk"));
        assert_eq!(param(&params, "language"), Some("en"));
        assert_eq!(param(&params, "sortBy"), Some("publishedAt"));
        assert!(param(&params, "q").unwrap().contains("climate"));
    }

    #[test]
    fn test_span_params_without_date() {
        let params = span_params(&Query::new().term("climate"));
        assert_eq!(param(&params, "from"), None);
        assert_eq!(param(&params, "to"), None);
        assert_eq!(param(&params, "sortBy"), None);
        assert_eq!(param(&params, "domains"), None);
    }

    #[test]
    fn test_headlines_success() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/top-headlines")
                .header("X-Api-Key", "KEY123")
                .query_param("language", "en")
                .query_param("q", "technology AI");
            then.status(200).json_body(json!({
                "status": "ok",
                "articles": [
                    {
                        "url": "u1",
                        "source": {"name": "S1"},
                        "author": "A1",
                        "title": "Tech today",
                        "description": "d1",
                        "publishedAt": "2023-10-01T00:00:00Z",
                        "content": "c1"
                    },
                    {
                        "url": "u2",
                        "source": {"name": "S2"},
                        "author": null,
                        "title": "More tech",
                        "description": "d2",
                        "publishedAt": "2023-10-02T00:00:00Z",
                        "content": "c2"
                    }
                ]
            }));
        });

        let (_file, fetcher) = fetcher(&server, "KEY123");
        let query = Query::new().language("en").terms(["technology", "AI"]);
        let articles = fetcher.headlines(&query).unwrap();

        mock.assert();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].url(), Some("u1"));
        assert_eq!(articles[0].source(), Some("S1"));
        assert_eq!(articles[0].published_at(), Some("2023-10-01T00:00:00Z"));
        assert_eq!(articles[1].title(), Some("More tech"));
        assert_eq!(articles[1].author(), None);
    }

    #[test]
    fn test_span_success() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/everything")
                .header("X-Api-Key", "KEY999")
                .query_param("from", "2025-10-20")
                .query_param("to", "2025-10-20")
                .query_param("domains", "bbc.co.uk")
                .query_param("language", "en")
                .query_param("sortBy", "publishedAt")
                .query_param("q", "climate change");
            then.status(200).json_body(json!({
                "status": "ok",
                "articles": [{
                    "url": "u",
                    "source": {"id": "bbc-news", "name": "BBC"},
                    "author": "Ann",
                    "title": "Climate change now",
                    "description": "d",
                    "publishedAt": "2025-10-20T05:00:00Z",
                    "content": "c"
                }]
            }));
        });

        let (_file, fetcher) = fetcher(&server, "KEY999");
        let query = Query::new()
            .date("2025-10-20")
            .domain("bbc.co.uk")
            .language("en")
            .terms(["climate", "change"]);
        let articles = fetcher.span(&query).unwrap();

        mock.assert();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].source(), Some("BBC"));
        assert_eq!(articles[0].published_at(), Some("2025-10-20T05:00:00Z"));
    }

    #[test]
    fn test_missing_articles_is_empty() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/top-headlines");
            then.status(200)
                .json_body(json!({"status": "ok", "articles": null}));
        });

        let (_file, fetcher) = fetcher(&server, "K");
        assert!(fetcher.headlines(&Query::new()).unwrap().is_empty());
    }

    #[test]
    fn test_upstream_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/top-headlines");
            then.status(200).json_body(json!({
                "status": "error",
                "code": "apiKeyInvalid",
                "message": "Invalid key"
            }));
        });

        let (_file, fetcher) = fetcher(&server, "BAD");
        match fetcher.headlines(&Query::new().term("x")) {
            Err(Error::Upstream { code, message }) => {
                assert_eq!(code, "apiKeyInvalid");
                assert_eq!(message, "Invalid key");
            }
            other => panic!("expected upstream error, got {:?}", other),
        }
    }

    #[test]
    fn test_upstream_error_defaults() {
        match parse_response(r#"{"status": "error"}"#) {
            Err(Error::Upstream { code, message }) => {
                assert_eq!(code, "unknown_error");
                assert_eq!(message, "Unknown error");
            }
            other => panic!("expected upstream error, got {:?}", other),
        }
    }

    #[test]
    fn test_unparsable_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/everything");
            then.status(200).body("<html>not json</html>");
        });

        let (_file, fetcher) = fetcher(&server, "K");
        let err = fetcher.span(&Query::new().term("q")).err().unwrap();
        assert!(matches!(err, Error::RequestFailed(ref m) if m.contains("parse")), "{err}");
    }

    #[test]
    fn test_http_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/everything");
            then.status(500).body("boom");
        });

        let (_file, fetcher) = fetcher(&server, "K");
        let err = fetcher.span(&Query::new().term("q")).err().unwrap();
        assert!(matches!(err, Error::RequestFailed(_)), "{err}");
    }

    #[test]
    fn test_transport_failure() {
        let file = key_file("K");
        let fetcher = Fetcher::new(file.path())
            .unwrap()
            .with_base_url("http://127.0.0.1:1");
        let err = fetcher
            .span(&Query::new().date("2023-10-01").term("q"))
            .err()
            .unwrap();
        assert!(matches!(err, Error::RequestFailed(_)), "{err}");
    }

    #[test]
    fn test_invalid_base_url() {
        let file = key_file("K");
        let fetcher = Fetcher::new(file.path())
            .unwrap()
            .with_base_url("not a url");
        let err = fetcher.headlines(&Query::new()).err().unwrap();
        assert!(matches!(err, Error::RequestFailed(_)), "{err}");
    }
}
