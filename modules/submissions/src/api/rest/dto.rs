use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::contract::SubmissionRecord;
use crate::domain::error::DomainError;

pub const SUCCESS_MESSAGE: &str = "Data submitted successfully";

/// A stored record as a flat JSON object: schema fields, then `id` and `timestamp`.
#[derive(Debug, Clone)]
pub struct RecordDto(SubmissionRecord);

impl From<SubmissionRecord> for RecordDto {
    fn from(record: SubmissionRecord) -> Self {
        Self(record)
    }
}

impl Serialize for RecordDto {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let record = &self.0;
        let mut map = serializer.serialize_map(Some(record.fields.len() + 2))?;
        for (name, value) in &record.fields {
            map.serialize_entry(name, value)?;
        }
        map.serialize_entry("id", &record.id)?;
        map.serialize_entry("timestamp", &record.timestamp_string())?;
        map.end()
    }
}

/// `{"status":"success","message":..,"data":{..}}`
#[derive(Debug, Clone, serde::Serialize)]
pub struct SubmissionAccepted {
    pub status: &'static str,
    pub message: &'static str,
    pub data: RecordDto,
}

impl From<SubmissionRecord> for SubmissionAccepted {
    fn from(record: SubmissionRecord) -> Self {
        Self {
            status: "success",
            message: SUCCESS_MESSAGE,
            data: record.into(),
        }
    }
}

/// `{"status":"error","message":..}`, plus `fields` when required fields were missing.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SubmissionRejected {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

impl From<&DomainError> for SubmissionRejected {
    fn from(err: &DomainError) -> Self {
        let fields = match err {
            DomainError::MissingFields { fields } => Some(fields.clone()),
            _ => None,
        };
        Self {
            status: "error",
            message: err.to_string(),
            fields,
        }
    }
}
