//! Query-string encoding for list-style endpoints.
//!
//! Parameters are encoded as `application/x-www-form-urlencoded` in the
//! order they were added. Nothing is sorted.

use url::form_urlencoded;

/// Ordered query parameters for list and restart operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pairs: Vec<(String, String)>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter. Repeated keys are kept and sent twice.
    pub fn add(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.pairs.push((key.into(), value.to_string()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn encode(&self) -> String {
        encode_query_string(&self.pairs)
    }
}

impl<K: Into<String>, V: ToString> From<Vec<(K, V)>> for QueryOptions {
    fn from(pairs: Vec<(K, V)>) -> Self {
        pairs
            .into_iter()
            .fold(QueryOptions::new(), |opts, (k, v)| opts.add(k, v))
    }
}

impl<K: Into<String>, V: ToString, const N: usize> From<[(K, V); N]> for QueryOptions {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs
            .into_iter()
            .fold(QueryOptions::new(), |opts, (k, v)| opts.add(k, v))
    }
}

/// Encode `key=value` pairs joined by `&`. An empty input yields `""`.
pub fn encode_query_string<K, V>(pairs: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if pairs.is_empty() {
        return String::new();
    }
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter().map(|(k, v)| (k.as_ref(), v.as_ref())))
        .finish()
}
