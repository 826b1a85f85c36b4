use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::contract::{FormValue, SubmissionForm};
use crate::domain::error::DomainError;

/// Names the server assigns itself; a schema may not declare them.
pub const RESERVED_FIELDS: [&str; 2] = ["id", "timestamp"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default)]
    pub required: bool,
}

impl FieldSpec {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("field schema must declare at least one field")]
    Empty,
    #[error("field name must not be blank")]
    BlankName,
    #[error("field '{0}' is declared twice")]
    Duplicate(String),
    #[error("field '{0}' is assigned by the server and cannot be submitted")]
    Reserved(String),
}

/// Ordered `{name, required}` declarations for one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldSpec>", into = "Vec<FieldSpec>")]
pub struct FieldSchema(Vec<FieldSpec>);

impl FieldSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self, SchemaError> {
        if fields.is_empty() {
            return Err(SchemaError::Empty);
        }
        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(fields.len());
        for f in fields {
            let name = f.name.trim().to_string();
            if name.is_empty() {
                return Err(SchemaError::BlankName);
            }
            if RESERVED_FIELDS.contains(&name.as_str()) {
                return Err(SchemaError::Reserved(name));
            }
            if !seen.insert(name.clone()) {
                return Err(SchemaError::Duplicate(name));
            }
            normalized.push(FieldSpec { name, ..f });
        }
        Ok(Self(normalized))
    }

    /// `username` + `password`, both required.
    pub fn login_default() -> Self {
        Self(vec![
            FieldSpec::required("username"),
            FieldSpec::required("password"),
        ])
    }

    /// `email` required, `name` optional.
    pub fn submit_default() -> Self {
        Self(vec![FieldSpec::required("email"), FieldSpec::optional("name")])
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.0
    }

    /// The field echoed back on confirmation pages: the first declared one.
    pub fn identifying_field(&self) -> &str {
        self.0.first().map(|f| f.name.as_str()).unwrap_or_default()
    }

    /// Check `form` against the schema and return trimmed values in schema order.
    ///
    /// Every missing required field is reported, not only the first one.
    /// Absent optional fields are left out of the result.
    pub fn validate(&self, form: &SubmissionForm) -> Result<Vec<(String, String)>, DomainError> {
        let mut values = Vec::with_capacity(self.0.len());
        let mut missing = Vec::new();

        for spec in &self.0 {
            let value = match form.get(&spec.name) {
                Some(FormValue::Text(s)) => Some(s.trim()),
                Some(FormValue::Null) | None => None,
                Some(FormValue::NonText) => return Err(DomainError::invalid_field(&spec.name)),
            };

            match value {
                Some(v) if !v.is_empty() || !spec.required => {
                    values.push((spec.name.clone(), v.to_string()));
                }
                _ if spec.required => missing.push(spec.name.clone()),
                _ => {}
            }
        }

        if !missing.is_empty() {
            return Err(DomainError::missing_fields(missing));
        }
        Ok(values)
    }
}

impl TryFrom<Vec<FieldSpec>> for FieldSchema {
    type Error = SchemaError;

    fn try_from(fields: Vec<FieldSpec>) -> Result<Self, Self::Error> {
        Self::new(fields)
    }
}

impl From<FieldSchema> for Vec<FieldSpec> {
    fn from(schema: FieldSchema) -> Self {
        schema.0
    }
}
