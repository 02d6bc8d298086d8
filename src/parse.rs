//! Crossref API response parsing.
//!
//! Two envelope shapes share one record schema: a DOI lookup wraps a single
//! work, a search wraps a page of them. The raw record is deliberately
//! forgiving. Crossref adds and drops fields over time, so anything missing,
//! `null` or of an unexpected type decodes to an empty value instead of an
//! error. [`normalize`] then turns a [`RawWork`] into a [`Work`].

use crate::error::{CrossrefError, Result};
use crate::types::{Contributor, DateParts, Work};
use serde::de::{self, DeserializeOwned, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Field selection used by the CLI when a compact lookup is requested.
pub const DEFAULT_SELECT_FIELDS: &str =
    "DOI,type,title,container-title,author,editor,issued,publisher,issue,volume,page,ISSN,ISBN";

/// Envelope of `GET /works/{doi}`.
#[derive(Debug, Deserialize)]
pub struct SingleRecordEnvelope {
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(rename = "message-type", default, deserialize_with = "lenient_string")]
    pub message_type: String,
    #[serde(rename = "message-version", default, deserialize_with = "lenient_string")]
    pub message_version: String,
    #[serde(default, deserialize_with = "object_or_none")]
    pub message: Option<RawWork>,
}

/// Envelope of `GET /works?query=...`.
#[derive(Debug, Deserialize)]
pub struct MultiRecordEnvelope {
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(rename = "message-type", default, deserialize_with = "lenient_string")]
    pub message_type: String,
    #[serde(rename = "message-version", default, deserialize_with = "lenient_string")]
    pub message_version: String,
    #[serde(default, deserialize_with = "object_or_none")]
    pub message: Option<ListMessage>,
}

/// Body of a search envelope.
#[derive(Debug, Default, Deserialize)]
pub struct ListMessage {
    #[serde(rename = "total-results", default, deserialize_with = "nullable")]
    pub total_results: u64,
    #[serde(default, deserialize_with = "objects_only")]
    pub items: Vec<RawWork>,
    #[serde(rename = "items-per-page", default)]
    pub items_per_page: Option<u64>,
    #[serde(default)]
    pub query: Option<Value>,
    #[serde(default)]
    pub facets: Option<Value>,
}

/// A work record as Crossref sends it, before normalization.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawWork {
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub work_type: String,
    #[serde(rename = "DOI", deserialize_with = "lenient_string")]
    pub doi: String,
    #[serde(deserialize_with = "lenient_strings")]
    pub title: Vec<String>,
    #[serde(rename = "container-title", deserialize_with = "lenient_strings")]
    pub container_title: Vec<String>,
    #[serde(deserialize_with = "lenient_contributors")]
    pub author: Vec<RawContributor>,
    #[serde(deserialize_with = "lenient_contributors")]
    pub editor: Vec<RawContributor>,
    #[serde(deserialize_with = "lenient_date")]
    pub issued: RawDate,
    #[serde(deserialize_with = "lenient_string")]
    pub publisher: String,
    #[serde(deserialize_with = "lenient_string")]
    pub issue: String,
    #[serde(deserialize_with = "lenient_string")]
    pub volume: String,
    #[serde(deserialize_with = "lenient_string")]
    pub page: String,
    #[serde(rename = "ISSN", deserialize_with = "lenient_strings")]
    pub issn: Vec<String>,
    #[serde(rename = "ISBN", deserialize_with = "lenient_strings")]
    pub isbn: Vec<String>,
    #[serde(rename = "abstract", deserialize_with = "lenient_string")]
    pub abstract_text: String,
}

/// An `author` or `editor` entry.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawContributor {
    #[serde(deserialize_with = "lenient_string")]
    pub given: String,
    #[serde(deserialize_with = "lenient_string")]
    pub family: String,
}

/// The `issued` object.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawDate {
    #[serde(rename = "date-parts", deserialize_with = "lenient_date_parts")]
    pub date_parts: Vec<Vec<DatePart>>,
}

/// One element of a date part-group; `None` for anything but an integer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DatePart(pub Option<i64>);

impl<'de> Deserialize<'de> for DatePart {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DatePartVisitor;

        impl<'de> Visitor<'de> for DatePartVisitor {
            type Value = DatePart;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an integer date part")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
                Ok(DatePart(Some(v)))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
                Ok(DatePart(i64::try_from(v).ok()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Self::Value, E> {
                if v.fract() == 0.0 && v.is_finite() {
                    Ok(DatePart(Some(v as i64)))
                } else {
                    Ok(DatePart(None))
                }
            }

            fn visit_str<E: de::Error>(self, _v: &str) -> std::result::Result<Self::Value, E> {
                Ok(DatePart(None))
            }

            fn visit_bool<E: de::Error>(self, _v: bool) -> std::result::Result<Self::Value, E> {
                Ok(DatePart(None))
            }

            fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
                Ok(DatePart(None))
            }

            fn visit_none<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
                Ok(DatePart(None))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error> {
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(DatePart(None))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
                while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
                Ok(DatePart(None))
            }
        }

        deserializer.deserialize_any(DatePartVisitor)
    }
}

/// A string that tolerates any JSON value; non-strings become empty.
struct LenientString(String);

impl<'de> Deserialize<'de> for LenientString {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct LenientStringVisitor;

        impl<'de> Visitor<'de> for LenientStringVisitor {
            type Value = LenientString;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or any other JSON value")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
                Ok(LenientString(v.trim().to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Self::Value, E> {
                Ok(LenientString(v.trim().to_string()))
            }

            fn visit_i64<E: de::Error>(self, _v: i64) -> std::result::Result<Self::Value, E> {
                Ok(LenientString(String::new()))
            }

            fn visit_u64<E: de::Error>(self, _v: u64) -> std::result::Result<Self::Value, E> {
                Ok(LenientString(String::new()))
            }

            fn visit_f64<E: de::Error>(self, _v: f64) -> std::result::Result<Self::Value, E> {
                Ok(LenientString(String::new()))
            }

            fn visit_bool<E: de::Error>(self, _v: bool) -> std::result::Result<Self::Value, E> {
                Ok(LenientString(String::new()))
            }

            fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
                Ok(LenientString(String::new()))
            }

            fn visit_none<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
                Ok(LenientString(String::new()))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error> {
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(LenientString(String::new()))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
                while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
                Ok(LenientString(String::new()))
            }
        }

        deserializer.deserialize_any(LenientStringVisitor)
    }
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    LenientString::deserialize(deserializer).map(|s| s.0)
}

/// A list of strings. Non-string entries become empty strings, a bare
/// string becomes a one-element list, anything else an empty list.
fn lenient_strings<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ListVisitor;

    impl<'de> Visitor<'de> for ListVisitor {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a list of strings")
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error> {
            let mut out = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(LenientString(s)) = seq.next_element()? {
                out.push(s);
            }
            Ok(out)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
            Ok(vec![v.trim().to_string()])
        }

        fn visit_i64<E: de::Error>(self, _v: i64) -> std::result::Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_u64<E: de::Error>(self, _v: u64) -> std::result::Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_f64<E: de::Error>(self, _v: f64) -> std::result::Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_bool<E: de::Error>(self, _v: bool) -> std::result::Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_none<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(ListVisitor)
}

/// Treat an explicit `null` like a missing field.
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode `message` only when it is an object. Error envelopes carry a list
/// of validation messages there instead of a record.
fn object_or_none<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(value @ Value::Object(_)) => {
            T::deserialize(value).map(Some).map_err(de::Error::custom)
        }
        _ => Ok(None),
    }
}

/// Decode an object into `T`; any other value, or an object that does not
/// fit, yields `T::default()`.
fn object_or_default<T>(value: Value) -> T
where
    T: DeserializeOwned + Default,
{
    match value {
        Value::Object(_) => T::deserialize(value).unwrap_or_default(),
        _ => T::default(),
    }
}

/// `author` / `editor`: anything but a list is empty, and entries that are
/// not objects become nameless contributors.
fn lenient_contributors<'de, D>(deserializer: D) -> std::result::Result<Vec<RawContributor>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(entries)) => entries.into_iter().map(object_or_default).collect(),
        _ => Vec::new(),
    })
}

/// `issued` must be an object; a bare year string or a list is no date.
fn lenient_date<'de, D>(deserializer: D) -> std::result::Result<RawDate, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .map(object_or_default)
        .unwrap_or_default())
}

/// `date-parts` must be a list of lists. A flat `[2019, 5]` or any other
/// shape is treated as no date at all.
fn lenient_date_parts<'de, D>(deserializer: D) -> std::result::Result<Vec<Vec<DatePart>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(Value::Array(groups)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };

    let mut out = Vec::with_capacity(groups.len());
    for group in groups {
        let Value::Array(parts) = group else {
            return Ok(Vec::new());
        };
        out.push(
            parts
                .into_iter()
                .map(|part| DatePart::deserialize(part).unwrap_or_default())
                .collect(),
        );
    }
    Ok(out)
}

/// Search items: entries that are not objects are not works and are dropped,
/// so one broken item never costs the rest of the page.
fn objects_only<'de, D>(deserializer: D) -> std::result::Result<Vec<RawWork>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter(Value::is_object)
            .map(object_or_default)
            .collect(),
        _ => Vec::new(),
    })
}

/// First element of a list, or empty. Never indexes an empty list.
fn first_or_empty(values: &[String]) -> String {
    values.first().cloned().unwrap_or_default()
}

/// Turn a raw record into a [`Work`] with its single-valued projections
/// filled in. Sparse input only yields empty fields, never an error.
pub fn normalize(raw: RawWork) -> Work {
    let issued = DateParts::new(
        raw.issued
            .date_parts
            .into_iter()
            .map(|group| group.into_iter().map(|p| p.0).collect())
            .collect(),
    );
    let to_contributor = |c: RawContributor| Contributor {
        family: c.family,
        given: c.given,
    };

    Work {
        title: first_or_empty(&raw.title),
        book_title: first_or_empty(&raw.container_title),
        issn: first_or_empty(&raw.issn),
        isbn: first_or_empty(&raw.isbn),
        date: issued.render(),

        work_type: raw.work_type,
        doi: raw.doi,
        titles: raw.title,
        book_titles: raw.container_title,
        authors: raw.author.into_iter().map(to_contributor).collect(),
        editors: raw.editor.into_iter().map(to_contributor).collect(),
        issued,
        publisher: raw.publisher,
        issue: raw.issue,
        volume: raw.volume,
        pages: raw.page,
        issns: raw.issn,
        isbns: raw.isbn,
        abstract_text: raw.abstract_text,
    }
}

/// Decode a DOI-lookup body into its status and normalized work.
///
/// A missing `message` yields `Work::default()`; deciding what a non-`ok`
/// status means is left to the caller.
pub fn decode_single(body: &[u8]) -> Result<(String, Work)> {
    let envelope: SingleRecordEnvelope = serde_json::from_slice(body)
        .map_err(|e| CrossrefError::Parse(format!("Invalid Crossref work JSON: {}", e)))?;

    let work = envelope.message.map(normalize).unwrap_or_default();
    Ok((envelope.status, work))
}

/// Decode a search body into the reported total and the normalized items.
///
/// `total-results` is passed through as-is; it is independent of how many
/// items the page holds.
pub fn decode_list(body: &[u8]) -> Result<(u64, Vec<Work>)> {
    let envelope: MultiRecordEnvelope = serde_json::from_slice(body)
        .map_err(|e| CrossrefError::Parse(format!("Invalid Crossref search JSON: {}", e)))?;

    let message = envelope.message.unwrap_or_default();
    let works = message.items.into_iter().map(normalize).collect();
    Ok((message.total_results, works))
}
