use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// index -> type -> id -> source
pub type Store = BTreeMap<String, BTreeMap<String, BTreeMap<String, Value>>>;
pub type Db = Arc<RwLock<Store>>;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DocResult {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_type")]
    pub doc_type: String,
    #[serde(rename = "_id")]
    pub id: String,
    pub found: bool,
    #[serde(rename = "_source", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Map<String, Value>>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MgetResponse {
    pub docs: Vec<DocResult>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct IndexResponse {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_type")]
    pub doc_type: String,
    #[serde(rename = "_id")]
    pub id: String,
    pub created: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub status: u16,
}

#[derive(Deserialize)]
struct MgetBody {
    docs: Option<Vec<DocSpec>>,
    ids: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct DocSpec {
    #[serde(rename = "_index")]
    index: Option<String>,
    #[serde(rename = "_type")]
    doc_type: Option<String>,
    #[serde(rename = "_id")]
    id: String,
}

/// Options that shape returned documents. `realtime`, `refresh` and
/// `preference` are accepted by the real endpoint but change nothing here.
#[derive(Deserialize, Default)]
pub struct MgetQuery {
    pub fields: Option<String>,
    #[serde(rename = "_source")]
    pub source: Option<String>,
    #[serde(rename = "_source_include")]
    pub source_include: Option<String>,
    #[serde(rename = "_source_exclude")]
    pub source_exclude: Option<String>,
}

type ApiResult<T> = Result<T, (StatusCode, Json<ErrorBody>)>;

fn bad_request(message: impl Into<String>) -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.into(),
            status: StatusCode::BAD_REQUEST.as_u16(),
        }),
    )
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::new()));
    Router::new()
        .route("/_mget", get(mget_root).post(mget_root))
        .route("/{index}/_mget", get(mget_index).post(mget_index))
        .route("/{index}/{type}/_mget", get(mget_type).post(mget_type))
        .route("/{index}/{type}", post(create_doc))
        .route("/{index}/{type}/{id}", get(get_doc).put(put_doc))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn mget_root(
    State(db): State<Db>,
    Query(query): Query<MgetQuery>,
    body: String,
) -> ApiResult<Json<MgetResponse>> {
    mget(&db, None, None, &query, &body).await
}

async fn mget_index(
    State(db): State<Db>,
    Path(index): Path<String>,
    Query(query): Query<MgetQuery>,
    body: String,
) -> ApiResult<Json<MgetResponse>> {
    mget(&db, Some(index), None, &query, &body).await
}

async fn mget_type(
    State(db): State<Db>,
    Path((index, doc_type)): Path<(String, String)>,
    Query(query): Query<MgetQuery>,
    body: String,
) -> ApiResult<Json<MgetResponse>> {
    mget(&db, Some(index), Some(doc_type), &query, &body).await
}

async fn mget(
    db: &Db,
    index: Option<String>,
    doc_type: Option<String>,
    query: &MgetQuery,
    body: &str,
) -> ApiResult<Json<MgetResponse>> {
    if body.trim().is_empty() {
        return Err(bad_request("request body is required"));
    }
    let parsed: MgetBody =
        serde_json::from_str(body).map_err(|e| bad_request(format!("failed to parse body: {e}")))?;

    let specs = match (parsed.docs, parsed.ids) {
        (Some(docs), _) => docs,
        (None, Some(ids)) => {
            if index.is_none() {
                return Err(bad_request("ids require an index in the path"));
            }
            ids.into_iter()
                .map(|id| DocSpec {
                    index: None,
                    doc_type: None,
                    id,
                })
                .collect()
        }
        (None, None) => return Err(bad_request("expected docs or ids")),
    };

    let store = db.read().await;
    let mut docs = Vec::with_capacity(specs.len());
    for (position, spec) in specs.into_iter().enumerate() {
        let Some(doc_index) = spec.index.or_else(|| index.clone()) else {
            return Err(bad_request(format!("index is missing for doc {position}")));
        };
        let wanted_type = spec.doc_type.or_else(|| doc_type.clone());
        docs.push(lookup(&store, doc_index, wanted_type, spec.id, query));
    }
    debug!("mget: resolved {} docs", docs.len());
    Ok(Json(MgetResponse { docs }))
}

/// Without a type, the first type in the index holding `id` wins.
fn lookup(
    store: &Store,
    index: String,
    doc_type: Option<String>,
    id: String,
    query: &MgetQuery,
) -> DocResult {
    let types = store.get(&index);
    let hit = types.and_then(|types| match &doc_type {
        Some(t) => types.get(t).and_then(|docs| docs.get(&id)).map(|src| (t.clone(), src)),
        None => types
            .iter()
            .find_map(|(t, docs)| docs.get(&id).map(|src| (t.clone(), src))),
    });

    match hit {
        Some((found_type, source)) => {
            let (source, fields) = shape(source, query);
            DocResult {
                index,
                doc_type: found_type,
                id,
                found: true,
                source,
                fields,
            }
        }
        None => DocResult {
            index,
            doc_type: doc_type.unwrap_or_else(|| "_all".to_string()),
            id,
            found: false,
            source: None,
            fields: None,
        },
    }
}

fn split_list(raw: &str) -> Vec<&str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).collect()
}

fn is_flag(raw: &str) -> bool {
    raw == "true" || raw == "false"
}

/// Apply `fields` and the `_source*` options to a stored document.
pub fn shape(source: &Value, query: &MgetQuery) -> (Option<Value>, Option<Map<String, Value>>) {
    let field_list = query
        .fields
        .as_deref()
        .filter(|f| !is_flag(f))
        .map(split_list);

    let fields = field_list.as_ref().map(|names| {
        names
            .iter()
            .filter_map(|name| {
                source
                    .get(*name)
                    .map(|v| (name.to_string(), Value::Array(vec![v.clone()])))
            })
            .collect::<Map<String, Value>>()
    });

    let include_source = match query.source.as_deref() {
        Some("false") => false,
        Some(_) => true,
        None => field_list.is_none() || query.source_include.is_some(),
    };
    if !include_source {
        return (None, fields);
    }

    let Value::Object(map) = source else {
        return (Some(source.clone()), fields);
    };
    let mut kept = map.clone();

    let includes = query
        .source
        .as_deref()
        .filter(|s| !is_flag(s))
        .or(query.source_include.as_deref())
        .map(split_list);
    if let Some(includes) = includes {
        kept.retain(|k, _| includes.contains(&k.as_str()));
    }
    if let Some(excludes) = query.source_exclude.as_deref().map(split_list) {
        kept.retain(|k, _| !excludes.contains(&k.as_str()));
    }
    (Some(Value::Object(kept)), fields)
}

async fn put_doc(
    State(db): State<Db>,
    Path((index, doc_type, id)): Path<(String, String, String)>,
    Json(source): Json<Value>,
) -> (StatusCode, Json<IndexResponse>) {
    let created = store_doc(&db, &index, &doc_type, &id, source).await;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    (
        status,
        Json(IndexResponse {
            index,
            doc_type,
            id,
            created,
        }),
    )
}

async fn create_doc(
    State(db): State<Db>,
    Path((index, doc_type)): Path<(String, String)>,
    Json(source): Json<Value>,
) -> (StatusCode, Json<IndexResponse>) {
    let id = Uuid::new_v4().to_string();
    store_doc(&db, &index, &doc_type, &id, source).await;
    (
        StatusCode::CREATED,
        Json(IndexResponse {
            index,
            doc_type,
            id,
            created: true,
        }),
    )
}

async fn store_doc(db: &Db, index: &str, doc_type: &str, id: &str, source: Value) -> bool {
    let mut store = db.write().await;
    let previous = store
        .entry(index.to_string())
        .or_default()
        .entry(doc_type.to_string())
        .or_default()
        .insert(id.to_string(), source);
    info!("indexed {index}/{doc_type}/{id}");
    previous.is_none()
}

async fn get_doc(
    State(db): State<Db>,
    Path((index, doc_type, id)): Path<(String, String, String)>,
) -> (StatusCode, Json<DocResult>) {
    let store = db.read().await;
    let doc = lookup(&store, index, Some(doc_type), id, &MgetQuery::default());
    let status = if doc.found {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    (status, Json(doc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query(pairs: &[(&str, &str)]) -> MgetQuery {
        let mut q = MgetQuery::default();
        for (k, v) in pairs {
            let v = Some(v.to_string());
            match *k {
                "fields" => q.fields = v,
                "_source" => q.source = v,
                "_source_include" => q.source_include = v,
                "_source_exclude" => q.source_exclude = v,
                other => panic!("unknown query key {other}"),
            }
        }
        q
    }

    fn doc() -> Value {
        json!({"title": "hello", "user": "kimchy", "likes": 3})
    }

    #[test]
    fn full_source_by_default() {
        let (source, fields) = shape(&doc(), &MgetQuery::default());
        assert_eq!(source, Some(doc()));
        assert!(fields.is_none());
    }

    #[test]
    fn source_false_drops_source() {
        let (source, _) = shape(&doc(), &query(&[("_source", "false")]));
        assert!(source.is_none());
    }

    #[test]
    fn source_list_filters_keys() {
        let (source, _) = shape(&doc(), &query(&[("_source", "title,likes")]));
        assert_eq!(source, Some(json!({"title": "hello", "likes": 3})));
    }

    #[test]
    fn include_and_exclude() {
        let (source, _) = shape(
            &doc(),
            &query(&[("_source_include", "title,user"), ("_source_exclude", "user")]),
        );
        assert_eq!(source, Some(json!({"title": "hello"})));
    }

    #[test]
    fn fields_replace_source() {
        let (source, fields) = shape(&doc(), &query(&[("fields", "user,missing")]));
        assert!(source.is_none());
        assert_eq!(fields.unwrap().get("user"), Some(&json!(["kimchy"])));
    }

    #[test]
    fn doc_result_omits_absent_source() {
        let result = DocResult {
            index: "i".to_string(),
            doc_type: "t".to_string(),
            id: "1".to_string(),
            found: false,
            source: None,
            fields: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json, json!({"_index": "i", "_type": "t", "_id": "1", "found": false}));
    }
}
