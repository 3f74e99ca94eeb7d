//! Request builder for the multi-get endpoint.
//!
//! `build_mget` reads a `Params` mapping and produces the `HttpRequest` to
//! send. It stops at the first invalid option, checking them in this order:
//! `body`, `ignore`, `method`, `index`, `type`, then the query options in the
//! order they appear in the query string.

use log::debug;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::params::{
    is_truthy, list_or_flag, status_codes, switch, truthy_scalar, Params, QueryValue,
};
use crate::query::{encode_component, QueryString};

const SWITCH_OPTIONS: &[&str] = &["realtime", "refresh"];
const SOURCE_OPTIONS: &[&str] = &["_source", "_source_exclude", "_source_include"];

/// Every option name the builder understands.
pub const KNOWN_PARAMS: &[&str] = &[
    "method",
    "body",
    "ignore",
    "index",
    "type",
    "fields",
    "preference",
    "realtime",
    "refresh",
    "_source",
    "_source_exclude",
    "_source_include",
];

pub fn build_mget(params: &Params) -> Result<HttpRequest, ApiError> {
    for key in params.keys().filter(|k| !KNOWN_PARAMS.contains(k)) {
        debug!("mget: ignoring unrecognized parameter {key:?}");
    }

    let body = build_body(params.get("body"))?;
    let ignore = match params.get("ignore") {
        Some(v) => status_codes(v)?,
        None => Vec::new(),
    };
    let method = select_method(params.get("method"), body.is_some())?;
    let path = build_path(params)?;
    let query = build_query(params)?;

    let headers = if body.is_some() {
        vec![("content-type".to_string(), "application/json".to_string())]
    } else {
        Vec::new()
    };

    let request = HttpRequest {
        method,
        path: format!("{path}{}", query.to_query()),
        headers,
        body,
        ignore,
    };
    debug!("mget: built {} {}", request.method, request.path);
    Ok(request)
}

/// Falsy bodies are dropped. Strings pass through untouched.
fn build_body(value: Option<&Value>) -> Result<Option<String>, ApiError> {
    match value {
        Some(v) if is_truthy(v) => match v {
            Value::String(s) => Ok(Some(s.clone())),
            other => serde_json::to_string(other)
                .map(Some)
                .map_err(|e| ApiError::SerializationError(e.to_string())),
        },
        _ => Ok(None),
    }
}

fn select_method(value: Option<&Value>, has_body: bool) -> Result<HttpMethod, ApiError> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => s.parse(),
        None | Some(Value::Null) | Some(Value::String(_)) => Ok(if has_body {
            HttpMethod::Post
        } else {
            HttpMethod::Get
        }),
        Some(other) => Err(ApiError::invalid(
            "method",
            format!("{other} should be one of GET, POST"),
        )),
    }
}

fn build_path(params: &Params) -> Result<String, ApiError> {
    let index = params
        .get("index")
        .map(|v| truthy_scalar("index", v))
        .transpose()?;
    let doc_type = params
        .get("type")
        .map(|v| truthy_scalar("type", v))
        .transpose()?;

    Ok(match (index, doc_type) {
        (Some(index), Some(doc_type)) => format!(
            "/{}/{}/_mget",
            encode_component(&index),
            encode_component(&doc_type)
        ),
        (Some(index), None) => format!("/{}/_mget", encode_component(&index)),
        (None, _) => "/_mget".to_string(),
    })
}

fn build_query(params: &Params) -> Result<QueryString, ApiError> {
    let mut query = QueryString::new();

    if let Some(v) = params.get("fields") {
        query.push("fields", list_or_flag("fields", v)?);
    }
    if let Some(v) = params.get("preference") {
        query.push("preference", QueryValue::Str(truthy_scalar("preference", v)?));
    }
    for &key in SWITCH_OPTIONS {
        if let Some(v) = params.get(key) {
            query.push(key, switch(key, v)?);
        }
    }
    for &key in SOURCE_OPTIONS {
        if let Some(v) = params.get(key) {
            query.push(key, list_or_flag(key, v)?);
        }
    }

    Ok(query)
}
