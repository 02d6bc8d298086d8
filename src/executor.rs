//! The transport seam.
//!
//! The client never talks to the network directly; it hands a
//! [`RequestSpec`] to a [`RequestExecutor`] and gets the status and body
//! back. `reqwest::Client` is the production executor. Executors must be
//! safe to share between concurrent calls.

use crate::error::Result;
use crate::request::RequestSpec;
use std::future::Future;

/// Status code and raw body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, lossily decoded.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends one request and returns its response.
///
/// Network failures are errors; HTTP error statuses are not, they come back
/// as an [`HttpResponse`] for the caller to classify.
pub trait RequestExecutor: Send + Sync {
    fn execute(&self, request: &RequestSpec) -> impl Future<Output = Result<HttpResponse>> + Send;
}

impl RequestExecutor for reqwest::Client {
    async fn execute(&self, request: &RequestSpec) -> Result<HttpResponse> {
        let mut builder = self.request(request.method.clone(), request.full_url());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    pub(crate) const KNOWN_DOI: &str = "10.1145/3290605.3300843";
    pub(crate) const KNOWN_TITLE: &str = "Slow Robots for Unobtrusive Posture Correction";
    pub(crate) const NONSENSE: &str = "jtfiejfrlsadaksljablkjoifajebwoijffal";

    pub(crate) const KNOWN_WORK: &str = r#"{
        "status": "ok",
        "message-type": "work",
        "message-version": "1.0.0",
        "message": {
            "DOI": "10.1145/3290605.3300843",
            "type": "proceedings-article",
            "title": ["Slow Robots for Unobtrusive Posture Correction"],
            "container-title": ["Proceedings of the 2019 CHI Conference on Human Factors in Computing Systems"],
            "author": [{"given": "Joon-Gi", "family": "Shin"}, {"given": "Eiji", "family": "Onchi"}],
            "issued": {"date-parts": [[2019, 5, 2]]},
            "publisher": "ACM"
        }
    }"#;

    pub(crate) const KNOWN_LIST: &str = r#"{
        "status": "ok",
        "message-type": "work-list",
        "message-version": "1.0.0",
        "message": {
            "facets": {},
            "total-results": 118204,
            "items": [
                {
                    "DOI": "10.1145/3290605.3300843",
                    "title": ["Slow Robots for Unobtrusive Posture Correction"],
                    "issued": {"date-parts": [[2019, 5, 2]]}
                },
                {
                    "DOI": "10.1109/example.2020.1",
                    "title": ["Posture Correction Revisited"],
                    "issued": {"date-parts": [[2020]]}
                }
            ],
            "items-per-page": 10
        }
    }"#;

    pub(crate) const EMPTY_LIST: &str = r#"{
        "status": "ok",
        "message-type": "work-list",
        "message-version": "1.0.0",
        "message": {"facets": {}, "total-results": 0, "items": [], "items-per-page": 10}
    }"#;

    type Responder = dyn Fn(&RequestSpec) -> Result<HttpResponse> + Send + Sync;

    /// Executor answering from a closure and recording every request.
    #[derive(Clone)]
    pub(crate) struct MockExecutor {
        responder: Arc<Responder>,
        calls: Arc<AtomicUsize>,
        seen: Arc<Mutex<Vec<RequestSpec>>>,
    }

    impl MockExecutor {
        pub(crate) fn new<F>(responder: F) -> Self
        where
            F: Fn(&RequestSpec) -> Result<HttpResponse> + Send + Sync + 'static,
        {
            Self {
                responder: Arc::new(responder),
                calls: Arc::new(AtomicUsize::new(0)),
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Always answer 200 with `body`.
        pub(crate) fn ok(body: &'static str) -> Self {
            Self::new(move |_| Ok(HttpResponse::new(200, body)))
        }

        /// Behaves like Crossref for the fixtures above: the known DOI and
        /// title resolve, anything else is a 404 or an empty result page.
        pub(crate) fn crossref() -> Self {
            Self::new(|request| {
                let body = if request.url.path().starts_with("/works/") {
                    if request.url.path() == format!("/works/{}", KNOWN_DOI) {
                        KNOWN_WORK
                    } else {
                        return Ok(HttpResponse::new(404, "Resource not found."));
                    }
                } else if request.param("query") == Some(KNOWN_TITLE) {
                    KNOWN_LIST
                } else {
                    EMPTY_LIST
                };
                Ok(HttpResponse::new(200, body))
            })
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub(crate) fn requests(&self) -> Vec<RequestSpec> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl std::fmt::Debug for MockExecutor {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("MockExecutor")
                .field("calls", &self.calls())
                .finish_non_exhaustive()
        }
    }

    impl RequestExecutor for MockExecutor {
        async fn execute(&self, request: &RequestSpec) -> Result<HttpResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(request.clone());
            (self.responder)(request)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_response_helpers() {
        let ok = HttpResponse::new(200, "{}");
        assert!(ok.is_success());
        assert_eq!(ok.text(), "{}");

        let missing = HttpResponse::new(404, "Resource not found.");
        assert!(!missing.is_success());
        assert_eq!(missing.text(), "Resource not found.");
    }
}
