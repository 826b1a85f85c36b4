use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::contract::{SinkError, SubmissionRecord};
use crate::domain::ports::RecordSink;

/// Process-local sink used by `--mock` and tests. Can be armed to fail.
#[derive(Debug, Default)]
pub struct InMemorySink {
    records: Mutex<Vec<(String, SubmissionRecord)>>,
    calls: AtomicUsize,
    failure: Option<String>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every append fails with `SinkError::Unavailable(message)`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Snapshot of `(collection, record)` pairs in append order.
    pub fn records(&self) -> Vec<(String, SubmissionRecord)> {
        self.records.lock().clone()
    }

    /// Number of append attempts, successful or not.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordSink for InMemorySink {
    async fn append_record(
        &self,
        collection: &str,
        record: &SubmissionRecord,
    ) -> Result<(), SinkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(msg) = &self.failure {
            return Err(SinkError::unavailable(msg.clone()));
        }
        self.records
            .lock()
            .push((collection.to_string(), record.clone()));
        Ok(())
    }
}
