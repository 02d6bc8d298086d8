//! Public types for the Crossref client.
//!
//! A [`Work`] is only ever produced by [`crate::parse::normalize`], so its
//! single-valued projections (`title`, `book_title`, `issn`, `isbn`, `date`)
//! always agree with the lists and date parts they are derived from. Fields
//! are read through accessors for that reason.

use serde::Serialize;

/// A person credited on a work (author or editor).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Contributor {
    /// Family (last) name, empty when Crossref omits it.
    pub family: String,
    /// Given (first) name, empty when Crossref omits it.
    pub given: String,
}

impl Contributor {
    pub fn new(family: impl Into<String>, given: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            given: given.into(),
        }
    }

    /// Format as "First Last" for display.
    pub fn display_name(&self) -> String {
        match (self.given.is_empty(), self.family.is_empty()) {
            (true, _) => self.family.clone(),
            (false, true) => self.given.clone(),
            (false, false) => format!("{} {}", self.given, self.family),
        }
    }
}

impl std::fmt::Display for Contributor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.family, self.given)
    }
}

/// Crossref `date-parts`: a list of part-groups, each `[year, month, day]`
/// with trailing parts optional.
///
/// Parts are `None` where Crossref sent something other than an integer
/// (it uses `[[null]]` for works with an unknown date).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DateParts {
    #[serde(rename = "date-parts")]
    pub parts: Vec<Vec<Option<i64>>>,
}

impl DateParts {
    pub fn new(parts: Vec<Vec<Option<i64>>>) -> Self {
        Self { parts }
    }

    /// Hyphen-join the first part-group, e.g. `2019`, `2019-3`, `2019-3-15`.
    ///
    /// Stops at the first non-integer part. Empty when there is no first
    /// group or it starts with a non-integer.
    pub fn render(&self) -> String {
        let Some(first) = self.parts.first() else {
            return String::new();
        };

        first
            .iter()
            .map_while(|part| part.map(|n| n.to_string()))
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Year of the first part-group, if present.
    pub fn year(&self) -> Option<i64> {
        self.parts.first().and_then(|g| g.first().copied().flatten())
    }
}

/// A normalized Crossref work.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Work {
    #[serde(rename = "type")]
    pub(crate) work_type: String,
    pub(crate) doi: String,

    pub(crate) titles: Vec<String>,
    pub(crate) title: String,

    pub(crate) book_titles: Vec<String>,
    pub(crate) book_title: String,

    pub(crate) authors: Vec<Contributor>,
    pub(crate) editors: Vec<Contributor>,

    pub(crate) issued: DateParts,
    pub(crate) date: String,

    pub(crate) publisher: String,
    pub(crate) issue: String,
    pub(crate) volume: String,
    pub(crate) pages: String,

    pub(crate) issns: Vec<String>,
    pub(crate) issn: String,
    pub(crate) isbns: Vec<String>,
    pub(crate) isbn: String,

    #[serde(rename = "abstract")]
    pub(crate) abstract_text: String,
}

impl Work {
    /// Work category, e.g. `journal-article`.
    pub fn work_type(&self) -> &str {
        &self.work_type
    }

    pub fn doi(&self) -> &str {
        &self.doi
    }

    /// All titles, in upstream order.
    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    /// First title, or empty.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Container (journal, proceedings, book) titles.
    pub fn book_titles(&self) -> &[String] {
        &self.book_titles
    }

    /// First container title, or empty.
    pub fn book_title(&self) -> &str {
        &self.book_title
    }

    pub fn authors(&self) -> &[Contributor] {
        &self.authors
    }

    pub fn editors(&self) -> &[Contributor] {
        &self.editors
    }

    /// Raw issued date parts.
    pub fn issued(&self) -> &DateParts {
        &self.issued
    }

    /// Issued date rendered by [`DateParts::render`].
    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn publisher(&self) -> &str {
        &self.publisher
    }

    pub fn issue(&self) -> &str {
        &self.issue
    }

    pub fn volume(&self) -> &str {
        &self.volume
    }

    pub fn pages(&self) -> &str {
        &self.pages
    }

    pub fn issns(&self) -> &[String] {
        &self.issns
    }

    /// First ISSN, or empty.
    pub fn issn(&self) -> &str {
        &self.issn
    }

    pub fn isbns(&self) -> &[String] {
        &self.isbns
    }

    /// First ISBN, or empty.
    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    /// Abstract as sent by Crossref (usually JATS XML).
    pub fn abstract_text(&self) -> &str {
        &self.abstract_text
    }

    /// Resolver URL for this work, or `None` when the DOI is missing.
    pub fn url(&self) -> Option<String> {
        if self.doi.is_empty() {
            None
        } else {
            Some(format!("https://doi.org/{}", self.doi))
        }
    }
}

/// Works returned by a search, together with the upstream hit count.
///
/// `total_results` is usually larger than `works.len()`: Crossref reports
/// every match but only one page of items is requested.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResults {
    pub total_results: u64,
    pub works: Vec<Work>,
}
