//! The Crossref API client.

use crate::config::ClientConfig;
use crate::error::{CrossrefError, Result};
use crate::executor::{HttpResponse, RequestExecutor};
use crate::request::{RequestBuilder, RequestSpec};
use std::future::Future;
use std::time::Duration;
use tracing::instrument::WithSubscriber;
use tracing::{debug, Dispatch};

/// Async client for the Crossref REST API.
///
/// Every request carries the configured application name and contact
/// address, which puts it in Crossref's "polite" pool. The client is cheap
/// to clone and safe to share between tasks; calls do not depend on each
/// other.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> crossref_client::error::Result<()> {
/// let client = crossref_client::CrossrefClient::new("My App", "me@example.com")?;
/// let work = client.works("10.1145/3290605.3300843").await?;
/// println!("{} ({})", work.title(), work.date());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CrossrefClient<E = reqwest::Client> {
    pub(crate) executor: E,
    pub(crate) requests: RequestBuilder,
    pub(crate) config: ClientConfig,
    pub(crate) diagnostics: Option<Dispatch>,
}

impl CrossrefClient {
    /// Create a client for `app_name`, using `mailto` as the contact address.
    pub fn new(app_name: impl Into<String>, mailto: impl Into<String>) -> Result<Self> {
        Self::builder(app_name, mailto).build()
    }

    /// Create a client from `CROSSREF_MAILTO`, `CROSSREF_APP_NAME` and
    /// `CROSSREF_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        ClientBuilder::from_config(ClientConfig::from_env()?).build()
    }

    pub fn builder(app_name: impl Into<String>, mailto: impl Into<String>) -> ClientBuilder {
        ClientBuilder::from_config(ClientConfig::new(app_name, mailto))
    }
}

impl<E: RequestExecutor> CrossrefClient<E> {
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The `User-Agent` sent with every request.
    pub fn user_agent(&self) -> &str {
        self.requests.user_agent()
    }

    /// Send a request through the executor.
    pub(crate) async fn send(&self, request: RequestSpec) -> Result<HttpResponse> {
        debug!(url = %request.full_url(), "Requesting information");
        let response = self.executor.execute(&request).await?;
        debug!(status = response.status, bytes = response.body.len(), "Response received");
        Ok(response)
    }

    /// Run `fut` under the injected diagnostics dispatcher, if any.
    pub(crate) async fn traced<F: Future>(&self, fut: F) -> F::Output {
        match &self.diagnostics {
            Some(dispatch) => fut.with_subscriber(dispatch.clone()).await,
            None => fut.await,
        }
    }
}

impl<E> std::fmt::Display for CrossrefClient<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "App: {}, MailTo: {}", self.config.app_name, self.config.mailto)
    }
}

/// Map HTTP statuses onto the error taxonomy.
///
/// A 404 means Crossref has no such record, which is an answer rather than
/// a failure, so it becomes [`CrossrefError::ZeroWorks`].
pub(crate) fn check_status(response: HttpResponse) -> Result<HttpResponse> {
    match response.status {
        200..=299 => Ok(response),
        404 => Err(CrossrefError::ZeroWorks),
        status => Err(CrossrefError::Api {
            status,
            message: response.text(),
        }),
    }
}

/// Builder for [`CrossrefClient`].
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    config: ClientConfig,
    diagnostics: Option<Dispatch>,
}

impl ClientBuilder {
    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            config,
            diagnostics: None,
        }
    }

    /// Override the base URL (useful for testing).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Override the per-request timeout of the default executor.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Send the client's trace events to `dispatch` instead of the
    /// globally installed subscriber.
    pub fn diagnostics(mut self, dispatch: Dispatch) -> Self {
        self.diagnostics = Some(dispatch);
        self
    }

    /// Build a client backed by a pooled `reqwest::Client`.
    pub fn build(self) -> Result<CrossrefClient> {
        let http = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .build()?;
        self.build_with(http)
    }

    /// Build a client backed by a custom executor.
    pub fn build_with<E: RequestExecutor>(self, executor: E) -> Result<CrossrefClient<E>> {
        let base_url = self.config.parsed_base_url()?;
        let requests = RequestBuilder::new(base_url, &self.config.app_name, &self.config.mailto);

        let client = CrossrefClient {
            executor,
            requests,
            config: self.config,
            diagnostics: self.diagnostics,
        };

        let announce = || debug!(client = %client, "New client created");
        match &client.diagnostics {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, announce),
            None => announce(),
        }
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::mock::MockExecutor;

    #[test]
    fn test_display() {
        let client = CrossrefClient::builder("Crossref Rust", "mail@example.com")
            .build_with(MockExecutor::ok("{}"))
            .unwrap();
        assert_eq!(client.to_string(), "App: Crossref Rust, MailTo: mail@example.com");
        assert_eq!(client.user_agent(), "Crossref Rust (mailto:mail@example.com)");
    }

    #[test]
    fn test_new_uses_defaults() {
        let client = CrossrefClient::new("Crossref Rust", "mail@example.com").unwrap();
        assert_eq!(client.config().base_url, crate::config::DEFAULT_BASE_URL);
        assert_eq!(client.config().timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_builder_overrides() {
        let client = CrossrefClient::builder("app", "m@example.com")
            .base_url("http://localhost:1234")
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        assert_eq!(client.config().base_url, "http://localhost:1234");
        assert_eq!(client.config().timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let err = CrossrefClient::builder("app", "m@example.com")
            .base_url("::nope::")
            .build_with(MockExecutor::ok("{}"))
            .unwrap_err();
        assert!(matches!(err, CrossrefError::Config(_)));
    }

    #[test]
    fn test_check_status() {
        assert!(check_status(HttpResponse::new(200, "{}")).is_ok());
        assert!(matches!(
            check_status(HttpResponse::new(404, "Resource not found.")),
            Err(CrossrefError::ZeroWorks)
        ));
        match check_status(HttpResponse::new(500, "boom")) {
            Err(CrossrefError::Api { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected: {:?}", other.map(|r| r.status)),
        }
    }
}
