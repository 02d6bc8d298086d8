//! # crossref-client
//!
//! A Rust client for the [Crossref](https://www.crossref.org) REST API.
//!
//! Provides:
//! - **Library**: async lookup of a work by DOI and free-text search, with
//!   Crossref's loosely-typed records normalized into [`Work`]
//! - **CLI**: `crossref` binary for terminal use (feature `cli`)
//!
//! ## Quick Start
//!
//! ```no_run
//! # async fn example() -> crossref_client::error::Result<()> {
//! use crossref_client::{CrossrefClient, CrossrefError};
//!
//! // The contact address puts requests in Crossref's polite pool.
//! let client = CrossrefClient::new("My App", "me@example.com")?;
//!
//! let work = client.works("10.1145/3290605.3300843").await?;
//! println!("{} ({})", work.title(), work.date());
//!
//! match client.query("Slow Robots for Unobtrusive Posture Correction").await {
//!     Ok(works) => println!("{}", works[0].doi()),
//!     Err(CrossrefError::ZeroWorks) => println!("No works found"),
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod parse;
pub mod request;
pub mod search;
pub mod types;
pub mod works;

// Re-export key types at the crate root.
pub use client::{ClientBuilder, CrossrefClient};
pub use config::ClientConfig;
pub use error::CrossrefError;
pub use executor::{HttpResponse, RequestExecutor};
pub use request::{RequestBuilder, RequestSpec};
pub use types::*;
