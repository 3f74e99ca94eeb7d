//! Typed request payloads for the mget endpoint.
//!
//! The builder treats `body` as opaque. These types are a convenience for
//! callers who would rather not assemble the JSON by hand; they serialize to
//! the shapes the endpoint accepts.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of a `docs` list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MgetDoc {
    #[serde(rename = "_index", skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    #[serde(rename = "_type", skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_source", skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing: Option<String>,
}

impl MgetDoc {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            index: None,
            doc_type: None,
            id: id.into(),
            source: None,
            fields: None,
            routing: None,
        }
    }

    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    pub fn doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }
}

/// Request payload: either fully described docs, or bare ids resolved
/// against the index/type in the path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum MgetBody {
    Docs(Vec<MgetDoc>),
    Ids(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn docs_body_uses_underscore_keys() {
        let body = MgetBody::Docs(vec![MgetDoc::new("1").index("twitter").doc_type("tweet")]);
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            json!({"docs": [{"_index": "twitter", "_type": "tweet", "_id": "1"}]})
        );
    }

    #[test]
    fn ids_body() {
        let body = MgetBody::Ids(vec!["1".to_string(), "2".to_string()]);
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({"ids": ["1", "2"]}));
    }
}
