use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};

use super::StoreError;

/// Field map of a stored document.
pub type Fields = BTreeMap<String, FieldValue>;

/// Typed field value as understood by the hosted store.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Timestamp(DateTime<Utc>),
    Array(Vec<FieldValue>),
    Map(Fields),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(value) => Some(value),
            _ => None,
        }
    }

    /// Plain JSON view; timestamps become RFC 3339 strings.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Boolean(value) => Value::Bool(*value),
            FieldValue::Integer(value) => Value::from(*value),
            FieldValue::Double(value) => Number::from_f64(*value)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::String(value) => Value::String(value.clone()),
            FieldValue::Timestamp(value) => {
                Value::String(value.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            FieldValue::Array(values) => {
                Value::Array(values.iter().map(FieldValue::to_json).collect())
            }
            FieldValue::Map(fields) => Value::Object(fields_to_json(fields)),
        }
    }

    /// Ordering used by `orderBy`: values of the same kind compare naturally, mixed kinds
    /// fall back to a fixed kind rank.
    pub fn compare(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Boolean(a), FieldValue::Boolean(b)) => a.cmp(b),
            (FieldValue::Integer(a), FieldValue::Integer(b)) => a.cmp(b),
            (FieldValue::Integer(a), FieldValue::Double(b)) => total_cmp(*a as f64, *b),
            (FieldValue::Double(a), FieldValue::Integer(b)) => total_cmp(*a, *b as f64),
            (FieldValue::Double(a), FieldValue::Double(b)) => total_cmp(*a, *b),
            (FieldValue::String(a), FieldValue::String(b)) => a.cmp(b),
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => a.cmp(b),
            _ => self.kind_rank().cmp(&other.kind_rank()),
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Boolean(_) => 1,
            FieldValue::Integer(_) | FieldValue::Double(_) => 2,
            FieldValue::Timestamp(_) => 3,
            FieldValue::String(_) => 4,
            FieldValue::Array(_) => 5,
            FieldValue::Map(_) => 6,
        }
    }
}

fn total_cmp(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

pub(crate) fn fields_to_json(fields: &Fields) -> Map<String, Value> {
    fields
        .iter()
        .map(|(key, value)| (key.clone(), value.to_json()))
        .collect()
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(value) => FieldValue::Boolean(value),
            Value::Number(number) => match number.as_i64() {
                Some(value) => FieldValue::Integer(value),
                None => FieldValue::Double(number.as_f64().unwrap_or_default()),
            },
            Value::String(value) => FieldValue::String(value),
            Value::Array(values) => {
                FieldValue::Array(values.into_iter().map(FieldValue::from).collect())
            }
            Value::Object(map) => FieldValue::Map(
                map.into_iter()
                    .map(|(key, value)| (key, FieldValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        FieldValue::String(value.clone())
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        FieldValue::Array(values.into_iter().map(FieldValue::String).collect())
    }
}

impl From<Fields> for FieldValue {
    fn from(fields: Fields) -> Self {
        FieldValue::Map(fields)
    }
}

impl<T> From<Option<T>> for FieldValue
where
    T: Into<FieldValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// A stored document: its id plus the field map.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Decode into a typed model. The document id is exposed to the model as `id`.
    pub fn decode<T>(&self) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        let mut object = fields_to_json(&self.fields);
        object.insert("id".to_string(), Value::String(self.id.clone()));

        serde_json::from_value(Value::Object(object)).map_err(|source| StoreError::Decode {
            id: self.id.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Sample {
        id: String,
        business_name: String,
        created_at: DateTime<Utc>,
    }

    #[test]
    fn decode_exposes_id_and_timestamps() {
        let created = Utc.with_ymd_and_hms(2025, 6, 1, 14, 30, 0).unwrap();
        let mut fields = Fields::new();
        fields.insert("businessName".to_string(), "Jane's Jams".into());
        fields.insert("createdAt".to_string(), created.into());

        let sample: Sample = Document::new("v-1", fields).decode().expect("decodes");
        assert_eq!(sample.id, "v-1");
        assert_eq!(sample.business_name, "Jane's Jams");
        assert_eq!(sample.created_at, created);
    }

    #[test]
    fn decode_reports_document_id_on_mismatch() {
        let mut fields = Fields::new();
        fields.insert("businessName".to_string(), FieldValue::Integer(3));

        match Document::new("broken", fields).decode::<Sample>() {
            Err(StoreError::Decode { id, .. }) => assert_eq!(id, "broken"),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn json_conversion_keeps_nested_shapes() {
        let value = FieldValue::from(json!({
            "operatingDays": ["Saturday", "Sunday"],
            "operatingHours": { "Saturday": "8am - 1pm" },
            "rank": 2,
            "ratio": 0.5,
        }));

        let FieldValue::Map(fields) = &value else {
            panic!("expected map, got {value:?}");
        };
        assert_eq!(fields["rank"], FieldValue::Integer(2));
        assert_eq!(fields["ratio"], FieldValue::Double(0.5));
        assert!(matches!(&fields["operatingDays"], FieldValue::Array(days) if days.len() == 2));
        assert_eq!(value.to_json()["operatingHours"]["Saturday"], "8am - 1pm");
    }

    #[test]
    fn optional_values_become_null() {
        assert_eq!(FieldValue::from(None::<String>), FieldValue::Null);
        assert_eq!(
            FieldValue::from(Some("555-0100".to_string())),
            FieldValue::String("555-0100".to_string())
        );
    }

    #[test]
    fn compare_orders_strings_and_mixed_numbers() {
        let a = FieldValue::from("Alpharetta Farmers Market");
        let b = FieldValue::from("Brookhaven Market");
        assert_eq!(a.compare(&b), Ordering::Less);
        assert_eq!(
            FieldValue::Integer(2).compare(&FieldValue::Double(1.5)),
            Ordering::Greater
        );
        assert_eq!(FieldValue::Null.compare(&a), Ordering::Less);
    }
}
