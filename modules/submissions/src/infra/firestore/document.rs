//! Record → Firestore REST `Document` body.

use serde_json::{json, Map, Value};

use crate::contract::SubmissionRecord;

/// `{"fields": {name: {"stringValue": v}, "id": .., "timestamp": {"timestampValue": ..}}}`
pub fn encode_document(record: &SubmissionRecord) -> Value {
    let mut fields = Map::with_capacity(record.fields.len() + 2);
    for (name, value) in &record.fields {
        fields.insert(name.clone(), json!({ "stringValue": value }));
    }
    fields.insert("id".into(), json!({ "stringValue": record.id.to_string() }));
    fields.insert(
        "timestamp".into(),
        json!({ "timestampValue": record.timestamp_string() }),
    );
    json!({ "fields": fields })
}

/// Best-effort extraction of `error.message` from a Firestore error body.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_owned))
        .unwrap_or_else(|| body.trim().to_string())
}
