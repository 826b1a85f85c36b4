//! Firestore REST adapter for [`RecordSink`].
//!
//! Each record becomes one `createDocument` call with a server-assigned
//! document name. Against the emulator no token is sent.

pub mod credentials;
pub mod document;
pub mod token;

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::FirestoreConfig;
use crate::contract::{SinkError, SubmissionRecord};
use crate::domain::ports::RecordSink;
use credentials::ServiceAccount;
use token::TokenSource;

pub const EMULATOR_HOST_ENV: &str = "FIRESTORE_EMULATOR_HOST";

pub struct FirestoreSink {
    http: reqwest::Client,
    /// `{base}/v1/projects/{p}/databases/{db}/documents`
    documents_url: String,
    project_id: String,
    auth: Option<TokenSource>,
}

impl FirestoreSink {
    /// Build from configuration using the process environment.
    pub fn from_config(cfg: &FirestoreConfig) -> Result<Self> {
        Self::from_config_with_env(cfg, |name| std::env::var(name).ok())
    }

    /// Emulator when `emulator_host` or `FIRESTORE_EMULATOR_HOST` is set,
    /// otherwise the production API with service-account credentials.
    pub fn from_config_with_env<F>(cfg: &FirestoreConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let emulator = cfg
            .emulator_host
            .clone()
            .or_else(|| env(EMULATOR_HOST_ENV))
            .filter(|h| !h.trim().is_empty());

        if let Some(host) = emulator {
            let project_id = match cfg.project_id.clone() {
                Some(p) => p,
                None => credentials::resolve_with(cfg, &env)
                    .ok()
                    .and_then(|sa| sa.project_id)
                    .context("emulator mode needs firestore.project_id or credentials carrying one")?,
            };
            return Self::emulator(&host, &project_id, &cfg.database);
        }

        let account = credentials::resolve_with(cfg, &env)
            .context("failed to load Firestore service-account credentials")?;
        Self::with_service_account(cfg, account)
    }

    /// Production API at `cfg.base_url`, authorised by `account`.
    pub fn with_service_account(cfg: &FirestoreConfig, account: ServiceAccount) -> Result<Self> {
        let Some(project_id) = cfg.project_id.clone().or_else(|| account.project_id.clone()) else {
            bail!("firestore.project_id is not set and the credentials carry none");
        };

        info!(
            project_id = %project_id,
            client_email = %account.client_email,
            "Firestore client initialised"
        );
        Ok(Self {
            http: http_client()?,
            documents_url: documents_url(&cfg.base_url, &project_id, &cfg.database),
            project_id,
            auth: Some(TokenSource::new(account)),
        })
    }

    /// Plain-HTTP emulator at `host` (`host:port`), no authorisation.
    pub fn emulator(host: &str, project_id: &str, database: &str) -> Result<Self> {
        let base = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("http://{host}")
        };
        info!(emulator = %base, project_id, "Firestore client initialised (emulator)");
        Ok(Self {
            http: http_client()?,
            documents_url: documents_url(&base, project_id, database),
            project_id: project_id.to_string(),
            auth: None,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn uses_emulator(&self) -> bool {
        self.auth.is_none()
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.documents_url, collection)
    }
}

fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(15))
        .build()
        .context("failed to build HTTP client")
}

fn documents_url(base: &str, project_id: &str, database: &str) -> String {
    format!(
        "{}/v1/projects/{}/databases/{}/documents",
        base.trim_end_matches('/'),
        project_id,
        database
    )
}

#[async_trait]
impl RecordSink for FirestoreSink {
    async fn append_record(
        &self,
        collection: &str,
        record: &SubmissionRecord,
    ) -> Result<(), SinkError> {
        let mut request = self
            .http
            .post(self.collection_url(collection))
            .json(&document::encode_document(record));

        if let Some(auth) = &self.auth {
            request = request.bearer_auth(auth.access_token(&self.http).await?);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SinkError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".to_string());
            return Err(SinkError::rejected(
                status.as_u16(),
                document::error_message(&body),
            ));
        }

        debug!(collection, record_id = %record.id, "document created");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn emulator_from_config() {
        let cfg = FirestoreConfig {
            project_id: Some("demo".into()),
            emulator_host: Some("localhost:8080".into()),
            ..Default::default()
        };
        let sink = FirestoreSink::from_config_with_env(&cfg, no_env).unwrap();
        assert!(sink.uses_emulator());
        assert_eq!(
            sink.collection_url("users"),
            "http://localhost:8080/v1/projects/demo/databases/(default)/documents/users"
        );
    }

    #[test]
    fn emulator_from_env_variable() {
        let cfg = FirestoreConfig {
            project_id: Some("demo".into()),
            ..Default::default()
        };
        let sink = FirestoreSink::from_config_with_env(&cfg, |name| {
            (name == EMULATOR_HOST_ENV).then(|| "127.0.0.1:9090".to_string())
        })
        .unwrap();
        assert!(sink.uses_emulator());
        assert_eq!(sink.project_id(), "demo");
    }

    #[test]
    fn emulator_without_project_fails() {
        let cfg = FirestoreConfig {
            emulator_host: Some("localhost:8080".into()),
            ..Default::default()
        };
        assert!(FirestoreSink::from_config_with_env(&cfg, no_env).is_err());
    }

    #[test]
    fn production_without_credentials_fails() {
        let err = FirestoreSink::from_config_with_env(&FirestoreConfig::default(), no_env)
            .err()
            .unwrap();
        assert!(format!("{err:#}").contains("FIREBASE_CREDENTIALS"));
    }

    #[test]
    fn production_url_uses_project_from_credentials() {
        let json = serde_json::json!({
            "type": "service_account",
            "project_id": "from-key",
            "client_email": "w@from-key.iam",
            "private_key": "k",
        });
        let account = ServiceAccount::from_json(&json.to_string(), "test").unwrap();
        let sink = FirestoreSink::with_service_account(&FirestoreConfig::default(), account).unwrap();

        assert!(!sink.uses_emulator());
        assert_eq!(
            sink.collection_url("users"),
            "https://firestore.googleapis.com/v1/projects/from-key/databases/(default)/documents/users"
        );
    }
}
