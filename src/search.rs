//! Free-text search: `GET /works?query=...`.

use crate::client::{check_status, CrossrefClient};
use crate::error::{CrossrefError, Result};
use crate::executor::RequestExecutor;
use crate::parse::decode_list;
use crate::types::{SearchResults, Work};
use tracing::{debug, instrument, warn};

impl<E: RequestExecutor> CrossrefClient<E> {
    /// Search Crossref and return the first page (10) of matching works,
    /// most relevant first.
    ///
    /// Fails with [`CrossrefError::EmptyQuery`] for an empty phrase and with
    /// [`CrossrefError::ZeroWorks`] when nothing matches.
    pub async fn query(&self, search: &str) -> Result<Vec<Work>> {
        Ok(self.search(search).await?.works)
    }

    /// Like [`query`](Self::query), but also returns the total number of
    /// matches Crossref reported.
    ///
    /// Only one page is ever fetched, so `total_results` may exceed
    /// `works.len()`.
    pub async fn search(&self, search: &str) -> Result<SearchResults> {
        self.traced(self.run_search(search)).await
    }

    /// Raw JSON of a search. Use this to post-process the result page
    /// yourself.
    pub async fn query_json(&self, search: &str) -> Result<Vec<u8>> {
        self.traced(self.fetch_search(search)).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn run_search(&self, search: &str) -> Result<SearchResults> {
        let body = self.fetch_search(search).await?;
        let (total_results, works) = decode_list(&body)?;
        debug!(total_results, items = works.len(), "Search decoded");

        if total_results == 0 {
            return Err(CrossrefError::ZeroWorks);
        }
        if works.is_empty() {
            warn!(total_results, "Crossref reported matches but returned no items");
        }
        Ok(SearchResults {
            total_results,
            works,
        })
    }

    async fn fetch_search(&self, search: &str) -> Result<Vec<u8>> {
        let request = self.requests.build_search(search);
        if request.param("query").map_or(true, str::is_empty) {
            return Err(CrossrefError::EmptyQuery);
        }

        let response = check_status(self.send(request).await?)?;
        Ok(response.body)
    }
}
