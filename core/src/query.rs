//! Percent-encoding for path segments and the query string.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::params::QueryValue;

/// Everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )` is escaped.
pub const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Query parameters in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryString {
    pairs: Vec<(&'static str, QueryValue)>,
}

impl QueryString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &'static str, value: QueryValue) {
        self.pairs.push((key, value));
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// `?k=v&...`, or an empty string when there are no pairs.
    pub fn to_query(&self) -> String {
        if self.pairs.is_empty() {
            return String::new();
        }
        let joined = self
            .pairs
            .iter()
            .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(&v.render())))
            .collect::<Vec<_>>()
            .join("&");
        format!("?{joined}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_encoding_matches_uri_component_rules() {
        assert_eq!(encode_component("my index"), "my%20index");
        assert_eq!(encode_component("a/b?c"), "a%2Fb%3Fc");
        assert_eq!(encode_component("keep-_.!~*'()"), "keep-_.!~*'()");
        assert_eq!(encode_component("é"), "%C3%A9");
    }

    #[test]
    fn empty_query_renders_nothing() {
        assert_eq!(QueryString::new().to_query(), "");
    }

    #[test]
    fn pairs_keep_insertion_order() {
        let mut q = QueryString::new();
        q.push("fields", QueryValue::Str("a,b".to_string()));
        q.push("realtime", QueryValue::Flag(false));
        assert_eq!(q.to_query(), "?fields=a%2Cb&realtime=false");
        assert_eq!(q.get("realtime"), Some(&QueryValue::Flag(false)));
    }
}
