//! DOI lookup: `GET /works/{doi}`.

use crate::client::{check_status, CrossrefClient};
use crate::error::{CrossrefError, Result};
use crate::executor::RequestExecutor;
use crate::parse::decode_single;
use crate::types::Work;
use tracing::{debug, instrument};

impl<E: RequestExecutor> CrossrefClient<E> {
    /// Fetch the metadata registered for a DOI.
    ///
    /// Fails with [`CrossrefError::EmptyQuery`] for an empty DOI (nothing is
    /// sent) and with [`CrossrefError::ZeroWorks`] when Crossref does not
    /// know the DOI.
    pub async fn works(&self, doi: &str) -> Result<Work> {
        self.traced(self.lookup(doi)).await
    }

    /// Raw JSON of a DOI lookup, optionally restricted to the
    /// comma-separated `select` fields.
    ///
    /// Use this to post-process the record yourself; the body is returned
    /// as sent.
    pub async fn works_json(&self, doi: &str, select: Option<&str>) -> Result<Vec<u8>> {
        self.traced(self.fetch_work(doi, select)).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn lookup(&self, doi: &str) -> Result<Work> {
        let body = self.fetch_work(doi, None).await?;
        let (status, work) = decode_single(&body)?;
        debug!(%status, "Work decoded");

        if status != "ok" {
            return Err(CrossrefError::ZeroWorks);
        }
        Ok(work)
    }

    async fn fetch_work(&self, doi: &str, select: Option<&str>) -> Result<Vec<u8>> {
        let doi = doi.trim();
        if doi.is_empty() {
            return Err(CrossrefError::EmptyQuery);
        }

        let request = self.requests.build_lookup(doi, select);
        let response = check_status(self.send(request).await?)?;
        Ok(response.body)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::CrossrefError;
    use crate::executor::mock::{MockExecutor, KNOWN_DOI, KNOWN_TITLE};
    use crate::executor::HttpResponse;
    use crate::CrossrefClient;

    fn client(executor: MockExecutor) -> CrossrefClient<MockExecutor> {
        CrossrefClient::builder("Crossref Rust", "mail@example.com")
            .build_with(executor)
            .unwrap()
    }

    #[tokio::test]
    async fn test_existing_entry() {
        let mock = MockExecutor::crossref();
        let work = client(mock.clone()).works(KNOWN_DOI).await.unwrap();

        assert_eq!(work.title(), KNOWN_TITLE);
        assert_eq!(work.doi(), KNOWN_DOI);
        assert_eq!(work.date(), "2019-5-2");
        assert_eq!(work.authors()[0].family, "Shin");
        assert_eq!(mock.calls(), 1);

        let sent = &mock.requests()[0];
        assert_eq!(sent.param("mailto"), Some("mail@example.com"));
        assert_eq!(sent.param("select"), None);
        assert_eq!(
            sent.header("User-Agent"),
            Some("Crossref Rust (mailto:mail@example.com)")
        );
    }

    #[tokio::test]
    async fn test_non_existing_entry() {
        let mock = MockExecutor::crossref();
        // last digit dropped
        let err = client(mock).works("10.1145/3290605.330084").await.unwrap_err();
        assert!(err.is_zero_works(), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_status_not_ok() {
        let mock = MockExecutor::ok(r#"{"status": "failed", "message": [{"message": "bad"}]}"#);
        let err = client(mock).works("10.1/x").await.unwrap_err();
        assert!(err.is_zero_works());
    }

    #[tokio::test]
    async fn test_empty_query_sends_nothing() {
        let mock = MockExecutor::crossref();
        let c = client(mock.clone());

        assert!(c.works("").await.unwrap_err().is_empty_query());
        assert!(c.works("   ").await.unwrap_err().is_empty_query());
        assert!(c.works_json("", None).await.unwrap_err().is_empty_query());
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_body_is_not_zero_works() {
        let mock = MockExecutor::ok("<html>gateway</html>");
        let err = client(mock).works(KNOWN_DOI).await.unwrap_err();
        assert!(matches!(err, CrossrefError::Parse(_)));
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let mock = MockExecutor::new(|_| Ok(HttpResponse::new(503, "maintenance")));
        let err = client(mock).works(KNOWN_DOI).await.unwrap_err();
        assert!(matches!(err, CrossrefError::Api { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let mock = MockExecutor::new(|_| Err(CrossrefError::Parse("connection reset".into())));
        let err = client(mock).works(KNOWN_DOI).await.unwrap_err();
        assert!(!err.is_zero_works());
        assert!(!err.is_empty_query());
    }

    #[tokio::test]
    async fn test_works_json() {
        let mock = MockExecutor::crossref();
        let raw = client(mock.clone())
            .works_json(KNOWN_DOI, Some("DOI,title"))
            .await
            .unwrap();

        let value: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(value["message"]["title"][0], KNOWN_TITLE);
        assert_eq!(mock.requests()[0].param("select"), Some("DOI,title"));
    }

    #[tokio::test]
    #[ignore = "requires network access to api.crossref.org"]
    async fn test_live_lookup() {
        let c = CrossrefClient::new("Crossref Rust", "mail@example.com").unwrap();
        let work = c.works(KNOWN_DOI).await.unwrap();
        assert_eq!(work.title(), KNOWN_TITLE);

        let err = c.works("10.1145/3290605.330084").await.unwrap_err();
        assert!(err.is_zero_works());
    }
}
