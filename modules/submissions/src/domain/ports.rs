use async_trait::async_trait;

use crate::contract::{SinkError, SubmissionRecord};

/// Persistence collaborator: appends one document to a named collection.
/// Implementations must not retry; the caller treats every error as final.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn append_record(
        &self,
        collection: &str,
        record: &SubmissionRecord,
    ) -> Result<(), SinkError>;
}
