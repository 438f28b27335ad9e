//! Query parameter normalization
//!
//! Callers hand parameters over in several shapes: ready-made pairs, a
//! parsed URL, an HTTP request (or just its URI), or a flat string map.
//! [`QueryInput`] names those shapes explicitly and [`QueryInput::normalize`]
//! turns any of them into one [`QueryPairs`], the ordered multimap the
//! translator consumes.

use axum::http::{Request, Uri, request::Parts};
use std::collections::{BTreeMap, HashMap};
use url::Url;

/// Ordered key/value pairs from a query string
///
/// Repeated keys are kept, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPairs {
    pairs: Vec<(String, String)>,
}

impl QueryPairs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an `application/x-www-form-urlencoded` query string.
    ///
    /// A leading `?` is ignored. Decoding is lossy rather than fallible:
    /// invalid percent-escapes and UTF-8 are replaced, never rejected.
    pub fn from_query_str(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Single-valued lookup: the last occurrence of `key` wins
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value supplied for `key`, in input order
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryPairs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for QueryPairs {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}

/// The accepted shapes of raw query parameters
#[derive(Debug, Clone)]
pub enum QueryInput {
    /// Ordered pairs, possibly with repeated keys
    Pairs(QueryPairs),
    /// A parsed URL; its query component is used
    Url(Url),
    /// The target URI of an HTTP request
    Request(Uri),
    /// Single-valued map. Iterated in key order so results are deterministic.
    Map(BTreeMap<String, String>),
}

impl QueryInput {
    pub fn normalize(self) -> QueryPairs {
        match self {
            QueryInput::Pairs(pairs) => pairs,
            QueryInput::Url(url) => url.query_pairs().into_owned().collect(),
            QueryInput::Request(uri) => uri
                .query()
                .map(QueryPairs::from_query_str)
                .unwrap_or_default(),
            QueryInput::Map(map) => map.into_iter().collect(),
        }
    }
}

impl From<QueryInput> for QueryPairs {
    fn from(input: QueryInput) -> Self {
        input.normalize()
    }
}

impl From<QueryPairs> for QueryInput {
    fn from(pairs: QueryPairs) -> Self {
        QueryInput::Pairs(pairs)
    }
}

impl<K: Into<String>, V: Into<String>> From<Vec<(K, V)>> for QueryInput {
    fn from(pairs: Vec<(K, V)>) -> Self {
        QueryInput::Pairs(pairs.into_iter().collect())
    }
}

impl From<Url> for QueryInput {
    fn from(url: Url) -> Self {
        QueryInput::Url(url)
    }
}

impl From<&Url> for QueryInput {
    fn from(url: &Url) -> Self {
        QueryInput::Url(url.clone())
    }
}

impl From<Uri> for QueryInput {
    fn from(uri: Uri) -> Self {
        QueryInput::Request(uri)
    }
}

impl From<&Parts> for QueryInput {
    fn from(parts: &Parts) -> Self {
        QueryInput::Request(parts.uri.clone())
    }
}

impl<B> From<&Request<B>> for QueryInput {
    fn from(request: &Request<B>) -> Self {
        QueryInput::Request(request.uri().clone())
    }
}

impl From<BTreeMap<String, String>> for QueryInput {
    fn from(map: BTreeMap<String, String>) -> Self {
        QueryInput::Map(map)
    }
}

impl From<HashMap<String, String>> for QueryInput {
    fn from(map: HashMap<String, String>) -> Self {
        QueryInput::Map(map.into_iter().collect())
    }
}
