use std::fmt;
use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::contract::{SubmissionForm, SubmissionRecord};
use crate::domain::error::DomainError;
use crate::domain::ports::RecordSink;
use crate::domain::schema::FieldSchema;

/// Which intake endpoint a submission came through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Login,
    Submit,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Login => f.write_str("login"),
            Endpoint::Submit => f.write_str("submit"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub collection: String,
    pub login_fields: FieldSchema,
    pub submit_fields: FieldSchema,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            collection: "users".to_string(),
            login_fields: FieldSchema::login_default(),
            submit_fields: FieldSchema::submit_default(),
        }
    }
}

/// Validates a form, stamps it and appends it to the configured collection.
pub struct SubmissionService {
    sink: Arc<dyn RecordSink>,
    config: ServiceConfig,
}

impl SubmissionService {
    pub fn new(sink: Arc<dyn RecordSink>, config: ServiceConfig) -> Self {
        Self { sink, config }
    }

    pub fn collection(&self) -> &str {
        &self.config.collection
    }

    pub fn schema(&self, endpoint: Endpoint) -> &FieldSchema {
        match endpoint {
            Endpoint::Login => &self.config.login_fields,
            Endpoint::Submit => &self.config.submit_fields,
        }
    }

    /// Validate and persist one submission.
    ///
    /// The sink is called at most once, and only after validation passed.
    #[instrument(skip(self, form), fields(endpoint = %endpoint, collection = %self.config.collection))]
    pub async fn submit(
        &self,
        endpoint: Endpoint,
        form: &SubmissionForm,
    ) -> Result<SubmissionRecord, DomainError> {
        if form.is_empty() {
            warn!("rejected submission: empty body");
            return Err(DomainError::missing_data());
        }

        let fields = self.schema(endpoint).validate(form).map_err(|e| {
            warn!(error = %e, "rejected submission");
            e
        })?;

        let record = SubmissionRecord::new(fields);

        if let Err(e) = self
            .sink
            .append_record(&self.config.collection, &record)
            .await
        {
            error!(record_id = %record.id, error = %e, "failed to persist submission");
            return Err(e.into());
        }

        info!(record_id = %record.id, "submission stored");
        Ok(record)
    }
}
