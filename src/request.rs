//! Outbound request construction.
//!
//! Builds the two request shapes Crossref understands (DOI lookup and
//! free-text search) as plain [`RequestSpec`] values. Nothing here does I/O;
//! a [`RequestExecutor`](crate::executor::RequestExecutor) sends them.

use reqwest::Method;
use url::Url;

/// Fixed page size for searches.
pub const SEARCH_ROWS: u32 = 10;

/// Sort order requested for searches.
pub const SEARCH_SORT: &str = "relevance";

/// A fully described HTTP request, ready for an executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub method: Method,
    /// Endpoint URL without the query string.
    pub url: Url,
    /// Query parameters, in order.
    pub params: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl RequestSpec {
    /// The endpoint with its parameters form-urlencoded onto it.
    pub fn full_url(&self) -> Url {
        let mut url = self.url.clone();
        if !self.params.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.params);
        }
        url
    }

    /// Value of the first query parameter called `name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Value of the first header called `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Composes lookup and search requests for one client identity.
///
/// The identification header is computed once, so every request built by
/// the same builder carries the same `User-Agent`.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: Url,
    mailto: String,
    user_agent: String,
}

impl RequestBuilder {
    pub fn new(base_url: Url, app_name: &str, mailto: &str) -> Self {
        Self {
            base_url,
            mailto: mailto.to_string(),
            user_agent: user_agent(app_name, mailto),
        }
    }

    /// The `User-Agent` value sent with every request.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// `GET {base}/works/{identifier}`, optionally restricted to the
    /// comma-separated fields in `field_selector`.
    pub fn build_lookup(&self, identifier: &str, field_selector: Option<&str>) -> RequestSpec {
        let mut params = Vec::with_capacity(2);
        if let Some(fields) = field_selector.filter(|f| !f.is_empty()) {
            params.push(("select".to_string(), fields.to_string()));
        }
        params.push(("mailto".to_string(), self.mailto.clone()));

        RequestSpec {
            method: Method::GET,
            url: self.endpoint(&format!("works/{}", identifier)),
            params,
            headers: self.headers(),
        }
    }

    /// `GET {base}/works?query=...&rows=10&sort=relevance`.
    pub fn build_search(&self, query_text: &str) -> RequestSpec {
        let params = vec![
            ("query".to_string(), normalize_query(query_text)),
            ("rows".to_string(), SEARCH_ROWS.to_string()),
            ("sort".to_string(), SEARCH_SORT.to_string()),
            ("mailto".to_string(), self.mailto.clone()),
        ];

        RequestSpec {
            method: Method::GET,
            url: self.endpoint("works"),
            params,
            headers: self.headers(),
        }
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let base_path = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{}/{}", base_path, path));
        url
    }

    fn headers(&self) -> Vec<(String, String)> {
        vec![("User-Agent".to_string(), self.user_agent.clone())]
    }
}

/// `{app_name} (mailto:{mailto})`, the identification Crossref asks polite
/// clients to send.
pub fn user_agent(app_name: &str, mailto: &str) -> String {
    format!("{} (mailto:{})", app_name, mailto)
}

/// Drop everything but letters, digits and whitespace, then collapse
/// whitespace runs to single spaces.
///
/// Form encoding turns each remaining space into `+`, which is the term
/// separator Crossref expects.
pub fn normalize_query(text: &str) -> String {
    let kept: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> RequestBuilder {
        RequestBuilder::new(
            Url::parse("https://api.crossref.org").unwrap(),
            "Crossref Rust",
            "mail@example.com",
        )
    }

    #[test]
    fn test_lookup_without_selector() {
        let req = builder().build_lookup("10.1145/3290605.3300843", None);
        assert_eq!(req.method, Method::GET);
        assert_eq!(
            req.full_url().as_str(),
            "https://api.crossref.org/works/10.1145/3290605.3300843?mailto=mail%40example.com"
        );
        assert_eq!(req.param("select"), None);
    }

    #[test]
    fn test_lookup_with_selector() {
        let req = builder().build_lookup("10.1/x", Some("DOI,title"));
        assert_eq!(req.param("select"), Some("DOI,title"));
        assert_eq!(req.param("mailto"), Some("mail@example.com"));

        let empty = builder().build_lookup("10.1/x", Some(""));
        assert_eq!(empty.param("select"), None);
    }

    #[test]
    fn test_lookup_escapes_reserved_characters() {
        let req = builder().build_lookup("10.1002/(SICI)1097?x#y", None);
        let url = req.full_url();
        assert!(url.path().starts_with("/works/10.1002/"));
        assert_eq!(url.fragment(), None);
        assert_eq!(url.query(), Some("mailto=mail%40example.com"));
    }

    #[test]
    fn test_search_parameters() {
        let req = builder().build_search("Slow Robots for Unobtrusive Posture Correction");
        assert_eq!(
            req.full_url().as_str(),
            "https://api.crossref.org/works?query=Slow+Robots+for+Unobtrusive+Posture+Correction&rows=10&sort=relevance&mailto=mail%40example.com"
        );
    }

    #[test]
    fn test_search_carries_normalized_text() {
        let req = builder().build_search("  Slow Robots, (for) Posture!  ");
        assert_eq!(req.param("query"), Some("Slow Robots for Posture"));

        let req = builder().build_search(" ?! ");
        assert_eq!(req.param("query"), Some(""));
    }

    #[test]
    fn test_base_url_with_path() {
        let b = RequestBuilder::new(Url::parse("http://localhost:8080/v1/").unwrap(), "app", "m@x.org");
        assert_eq!(b.build_search("a").url.as_str(), "http://localhost:8080/v1/works");
        assert_eq!(
            b.build_lookup("10.1/a", None).url.as_str(),
            "http://localhost:8080/v1/works/10.1/a"
        );
    }

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query("Hello, World!"), "Hello World");
        assert_eq!(normalize_query("  a   b\t c  "), "a b c");
        assert_eq!(normalize_query("C++ & Rust: a (re)view"), "C Rust a review");
        assert_eq!(normalize_query("Ünïcödé title"), "Ünïcödé title");
        assert_eq!(normalize_query("?!."), "");
    }

    #[test]
    fn test_identification_header_is_stable() {
        let b = builder();
        let a = b.build_lookup("10.1/a", None);
        let s = b.build_search("x");
        assert_eq!(a.header("user-agent"), Some("Crossref Rust (mailto:mail@example.com)"));
        assert_eq!(a.header("User-Agent"), s.header("User-Agent"));
        assert_eq!(b.user_agent(), "Crossref Rust (mailto:mail@example.com)");
    }
}
