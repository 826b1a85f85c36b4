use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

/// One value of a decoded request body, before schema validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    /// JSON `null`; treated like an absent field.
    Null,
    /// Any other JSON value (number, bool, array, object).
    NonText,
}

/// Decoded request body: field name → raw value. Undeclared keys are kept
/// here and dropped by the schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionForm {
    values: HashMap<String, FormValue>,
}

impl SubmissionForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from key/value pairs; the first occurrence of a key wins.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::from_entries(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), FormValue::Text(v.into()))),
        )
    }

    /// Build from decoded entries; the first occurrence of a key wins.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, FormValue)>,
    {
        let mut form = Self::new();
        for (k, v) in entries {
            form.values.entry(k).or_insert(v);
        }
        form
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FormValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The document appended to the collection. Never read back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Trimmed values in schema order.
    pub fields: Vec<(String, String)>,
}

impl SubmissionRecord {
    /// Attach server-side metadata to validated fields.
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            fields,
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// ISO-8601 UTC with millisecond precision, e.g. `2024-05-01T12:00:00.123Z`.
    pub fn timestamp_string(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}
