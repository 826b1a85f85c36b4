use std::fmt;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::Value;

use crate::contract::{FormValue, SubmissionForm};
use crate::domain::error::DomainError;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Decode a request body into a [`SubmissionForm`].
///
/// `application/x-www-form-urlencoded` bodies are decoded as a form,
/// everything else as JSON. Bodies that carry nothing usable (empty,
/// undecodable, not a JSON object) are `MissingData`.
pub fn parse_body(content_type: Option<&str>, bytes: &[u8]) -> Result<SubmissionForm, DomainError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(DomainError::missing_data());
    }

    if is_form(content_type) {
        return Ok(SubmissionForm::from_pairs(url::form_urlencoded::parse(
            bytes,
        )));
    }

    let Ok(JsonObject(entries)) = serde_json::from_slice::<JsonObject>(bytes) else {
        return Err(DomainError::missing_data());
    };
    Ok(SubmissionForm::from_entries(entries))
}

/// Top-level JSON object read entry by entry, so repeated keys survive
/// decoding and the form can keep the first one.
struct JsonObject(Vec<(String, FormValue)>);

impl<'de> Deserialize<'de> for JsonObject {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ObjectVisitor;

        impl<'de> Visitor<'de> for ObjectVisitor {
            type Value = JsonObject;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<JsonObject, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, Value>()? {
                    let value = match value {
                        Value::String(s) => FormValue::Text(s),
                        Value::Null => FormValue::Null,
                        _ => FormValue::NonText,
                    };
                    entries.push((key, value));
                }
                Ok(JsonObject(entries))
            }
        }

        deserializer.deserialize_map(ObjectVisitor)
    }
}

fn is_form(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_URLENCODED))
}
