//! Firestore REST backend.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::{Document, DocumentStore, FieldValue, Fields, Query, StoreError};
use crate::config::FirestoreSettings;

/// HTTP client for a Firestore database's REST surface.
#[derive(Debug, Clone)]
pub struct FirestoreStore {
    settings: FirestoreSettings,
    http: Client,
}

impl FirestoreStore {
    pub fn new(settings: FirestoreSettings) -> Self {
        Self {
            settings,
            http: Client::new(),
        }
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.project_id
        )
    }

    /// Documents URL extended by `segments`, each percent-encoded as a single path segment.
    fn document_url(&self, segments: &[&str]) -> Result<Url, StoreError> {
        if let Some(segment) = segments.iter().find(|segment| !is_plain_segment(segment)) {
            return Err(StoreError::InvalidPath(format!(
                "'{segment}' is not a single document path segment"
            )));
        }

        let mut url = Url::parse(&self.documents_url())
            .map_err(|err| StoreError::InvalidPath(format!("invalid firestore base url: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidPath("firestore base url cannot hold a path".to_string()))?
            .extend(segments);
        Ok(url)
    }

    fn with_key(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.settings.api_key {
            Some(key) => request.query(&[("key", key.as_str())]),
            None => request,
        }
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn run_query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        let url = format!("{}:runQuery", self.documents_url());
        let body = json!({ "structuredQuery": structured_query(query) });

        debug!(collection = %query.collection, "firestore runQuery");
        let response = self
            .with_key(self.http.post(&url))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(StoreError::UnexpectedResponse(format!(
                "runQuery on '{}' failed with status {status}: {text}",
                query.collection
            )));
        }

        let rows: Vec<RunQueryRow> = response.json().await?;
        rows.into_iter()
            .filter_map(|row| row.document)
            .map(WireDocument::into_document)
            .collect()
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let url = match self.document_url(&[collection, id]) {
            Ok(url) => url,
            Err(StoreError::InvalidPath(reason)) if is_plain_segment(collection) => {
                debug!(%collection, %reason, "rejecting document id");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        let response = self.with_key(self.http.get(url)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(StoreError::UnexpectedResponse(format!(
                "get {collection}/{id} failed with status {status}: {text}"
            )));
        }

        let document: WireDocument = response.json().await?;
        document.into_document().map(Some)
    }

    async fn create(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let url = self.document_url(&[collection])?;
        let body = WireDocumentBody {
            fields: fields
                .iter()
                .map(|(key, value)| (key.clone(), WireValue::from(value)))
                .collect(),
        };

        let response = self
            .with_key(self.http.post(url))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(StoreError::UnexpectedResponse(format!(
                "create in '{collection}' failed with status {status}: {text}"
            )));
        }

        let created: WireDocument = response.json().await?;
        Ok(created.id().to_string())
    }
}

/// Ids and collection names must stay within one path segment.
fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty() && segment != "." && segment != ".." && !segment.contains('/')
}

fn structured_query(query: &Query) -> serde_json::Value {
    let mut structured = json!({
        "from": [{ "collectionId": query.collection }],
    });

    let filters: Vec<serde_json::Value> = query
        .filters
        .iter()
        .map(|filter| {
            json!({
                "fieldFilter": {
                    "field": { "fieldPath": filter.field },
                    "op": "EQUAL",
                    "value": WireValue::from(&filter.value),
                }
            })
        })
        .collect();

    match filters.len() {
        0 => {}
        1 => {
            structured["where"] = filters.into_iter().next().unwrap_or_default();
        }
        _ => {
            structured["where"] = json!({
                "compositeFilter": { "op": "AND", "filters": filters }
            });
        }
    }

    if let Some(field) = &query.order_by {
        structured["orderBy"] = json!([{
            "field": { "fieldPath": field },
            "direction": "ASCENDING",
        }]);
    }

    if let Some(limit) = query.limit {
        structured["limit"] = json!(limit);
    }

    structured
}

#[derive(Debug, Deserialize)]
struct RunQueryRow {
    #[serde(default)]
    document: Option<WireDocument>,
}

#[derive(Debug, Deserialize)]
struct WireDocument {
    name: String,
    #[serde(default)]
    fields: BTreeMap<String, WireValue>,
}

impl WireDocument {
    /// Last path segment of `projects/../documents/{collection}/{id}`.
    fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    fn into_document(self) -> Result<Document, StoreError> {
        let id = self.id().to_string();
        let fields = self
            .fields
            .into_iter()
            .map(|(key, value)| value.into_field_value().map(|value| (key, value)))
            .collect::<Result<Fields, String>>()
            .map_err(|reason| {
                StoreError::UnexpectedResponse(format!("document '{id}' has {reason}"))
            })?;
        Ok(Document::new(id, fields))
    }
}

#[derive(Debug, Serialize)]
struct WireDocumentBody {
    fields: BTreeMap<String, WireValue>,
}

/// Firestore's tagged JSON value encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum WireValue {
    NullValue(Option<String>),
    BooleanValue(bool),
    IntegerValue(String),
    DoubleValue(f64),
    StringValue(String),
    TimestampValue(String),
    ArrayValue(WireArray),
    MapValue(WireMap),
    ReferenceValue(String),
    BytesValue(String),
    GeoPointValue(WireGeoPoint),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
struct WireArray {
    #[serde(default)]
    values: Vec<WireValue>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
struct WireMap {
    #[serde(default)]
    fields: BTreeMap<String, WireValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct WireGeoPoint {
    #[serde(default)]
    latitude: f64,
    #[serde(default)]
    longitude: f64,
}

impl From<&FieldValue> for WireValue {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Null => WireValue::NullValue(None),
            FieldValue::Boolean(value) => WireValue::BooleanValue(*value),
            FieldValue::Integer(value) => WireValue::IntegerValue(value.to_string()),
            FieldValue::Double(value) => WireValue::DoubleValue(*value),
            FieldValue::String(value) => WireValue::StringValue(value.clone()),
            FieldValue::Timestamp(value) => {
                WireValue::TimestampValue(value.to_rfc3339_opts(SecondsFormat::Micros, true))
            }
            FieldValue::Array(values) => WireValue::ArrayValue(WireArray {
                values: values.iter().map(WireValue::from).collect(),
            }),
            FieldValue::Map(fields) => WireValue::MapValue(WireMap {
                fields: fields
                    .iter()
                    .map(|(key, value)| (key.clone(), WireValue::from(value)))
                    .collect(),
            }),
        }
    }
}

impl WireValue {
    fn into_field_value(self) -> Result<FieldValue, String> {
        Ok(match self {
            WireValue::NullValue(_) => FieldValue::Null,
            WireValue::BooleanValue(value) => FieldValue::Boolean(value),
            WireValue::IntegerValue(raw) => FieldValue::Integer(
                raw.parse()
                    .map_err(|_| format!("an unparseable integerValue '{raw}'"))?,
            ),
            WireValue::DoubleValue(value) => FieldValue::Double(value),
            WireValue::StringValue(value)
            | WireValue::ReferenceValue(value)
            | WireValue::BytesValue(value) => FieldValue::String(value),
            WireValue::TimestampValue(raw) => FieldValue::Timestamp(
                DateTime::parse_from_rfc3339(&raw)
                    .map_err(|_| format!("an unparseable timestampValue '{raw}'"))?
                    .with_timezone(&Utc),
            ),
            WireValue::ArrayValue(array) => FieldValue::Array(
                array
                    .values
                    .into_iter()
                    .map(WireValue::into_field_value)
                    .collect::<Result<_, _>>()?,
            ),
            WireValue::MapValue(map) => FieldValue::Map(
                map.fields
                    .into_iter()
                    .map(|(key, value)| value.into_field_value().map(|value| (key, value)))
                    .collect::<Result<_, _>>()?,
            ),
            WireValue::GeoPointValue(point) => {
                let mut fields = Fields::new();
                fields.insert("latitude".to_string(), FieldValue::Double(point.latitude));
                fields.insert("longitude".to_string(), FieldValue::Double(point.longitude));
                FieldValue::Map(fields)
            }
        })
    }
}
