use crate::error::{EntryError, Result};
use kvmon_common::Observation;
use serde::Deserialize;
use serde_json::Value;

/// A KV record as listed by `/v1/kv/...?recurse`, before validation.
///
/// Both fields stay loosely typed so that one bad record can be rejected on
/// its own instead of failing the whole array. Other fields (`Value`,
/// `Flags`, `CreateIndex`, ...) are ignored.
#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(rename = "Key", default)]
    key: Option<Value>,
    #[serde(rename = "ModifyIndex", default)]
    modify_index: Option<Value>,
}

/// A validated `(key, modify index)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct KvEntry {
    pub key: String,
    pub modify_index: f64,
}

impl KvEntry {
    pub fn into_observation(self, dc: &str) -> Observation {
        Observation {
            dc: dc.to_string(),
            key: self.key,
            version: self.modify_index,
        }
    }
}

/// A record that failed validation, with its position in the payload array.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEntry {
    pub index: usize,
    pub error: EntryError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedEntries {
    pub entries: Vec<KvEntry>,
    pub skipped: Vec<SkippedEntry>,
}

/// Decodes a recursive KV listing.
///
/// The payload must be a JSON array of objects (or `null`, read as an empty
/// listing); anything else fails the whole batch with
/// [`crate::CollectError::Decode`]. A `null` element is skipped like a record
/// without a `Key`. Records whose `Key` is not a string or
/// whose `ModifyIndex` is not a number are reported in
/// [`ParsedEntries::skipped`] and the rest of the batch is kept.
///
/// # Examples
///
/// ```
/// use kvmon_collector::parse_entries;
///
/// let body = br#"[{"Key":"a/b","ModifyIndex":42},{"Key":"a/c","ModifyIndex":"bad"}]"#;
/// let parsed = parse_entries(body).unwrap();
/// assert_eq!(parsed.entries.len(), 1);
/// assert_eq!(parsed.entries[0].modify_index, 42.0);
/// assert_eq!(parsed.skipped.len(), 1);
/// ```
pub fn parse_entries(body: &[u8]) -> Result<ParsedEntries> {
    let records: Option<Vec<Option<RawEntry>>> = serde_json::from_slice(body)?;

    let mut parsed = ParsedEntries::default();
    for (index, record) in records.unwrap_or_default().into_iter().enumerate() {
        let validated = match record {
            Some(record) => validate(record),
            None => Err(EntryError::MissingKey),
        };
        match validated {
            Ok(entry) => parsed.entries.push(entry),
            Err(error) => parsed.skipped.push(SkippedEntry { index, error }),
        }
    }
    Ok(parsed)
}

fn validate(record: RawEntry) -> std::result::Result<KvEntry, EntryError> {
    let key = match record.key {
        Some(Value::String(key)) => key,
        Some(other) => return Err(EntryError::InvalidKey(json_type(&other))),
        None => return Err(EntryError::MissingKey),
    };

    let modify_index = match record.modify_index {
        Some(Value::Number(n)) => n.as_f64().ok_or(EntryError::InvalidModifyIndex {
            key: key.clone(),
            found: "number",
        })?,
        Some(other) => {
            return Err(EntryError::InvalidModifyIndex {
                key,
                found: json_type(&other),
            })
        }
        None => return Err(EntryError::MissingModifyIndex { key }),
    };

    Ok(KvEntry { key, modify_index })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
