use serde::{Deserialize, Serialize};

use crate::domain::schema::FieldSchema;
use crate::domain::service::ServiceConfig;

/// How `/login` answers a stored submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// 303 to `/success`.
    #[default]
    Redirect,
    /// Confirmation page echoing the identifying field.
    Page,
    /// Same JSON envelope as `/submit`.
    Json,
}

/// Submissions module configuration (`modules.submissions` in the app config).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SubmissionsConfig {
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default)]
    pub login: LoginConfig,
    #[serde(default)]
    pub submit: SubmitConfig,
    #[serde(default)]
    pub firestore: FirestoreConfig,
}

impl Default for SubmissionsConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            login: LoginConfig::default(),
            submit: SubmitConfig::default(),
            firestore: FirestoreConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoginConfig {
    #[serde(default)]
    pub response: ResponseMode,
    #[serde(default = "FieldSchema::login_default")]
    pub fields: FieldSchema,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            response: ResponseMode::default(),
            fields: FieldSchema::login_default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SubmitConfig {
    #[serde(default = "FieldSchema::submit_default")]
    pub fields: FieldSchema,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            fields: FieldSchema::submit_default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FirestoreConfig {
    /// Falls back to the service account's `project_id`.
    #[serde(default)]
    pub project_id: Option<String>,
    /// Environment variable holding the service-account JSON.
    #[serde(default = "default_credentials_env")]
    pub credentials_env: String,
    /// Mounted service-account file, read when the variable is unset.
    #[serde(default)]
    pub credentials_file: Option<String>,
    /// `host:port` of a local emulator. `FIRESTORE_EMULATOR_HOST` also enables it.
    #[serde(default)]
    pub emulator_host: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_database")]
    pub database: String,
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            credentials_env: default_credentials_env(),
            credentials_file: None,
            emulator_host: None,
            base_url: default_base_url(),
            database: default_database(),
        }
    }
}

fn default_collection() -> String {
    "users".to_string()
}

fn default_credentials_env() -> String {
    "FIREBASE_CREDENTIALS".to_string()
}

fn default_base_url() -> String {
    "https://firestore.googleapis.com".to_string()
}

fn default_database() -> String {
    "(default)".to_string()
}

impl SubmissionsConfig {
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            collection: self.collection.clone(),
            login_fields: self.login.fields.clone(),
            submit_fields: self.submit.fields.clone(),
        }
    }
}
