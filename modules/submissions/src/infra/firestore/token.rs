use std::time::{Duration, Instant};

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use parking_lot::Mutex;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use super::credentials::ServiceAccount;
use crate::contract::SinkError;

pub const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Tokens are refreshed this long before the server says they expire.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// OAuth2 access tokens minted with the service-account JWT-bearer grant.
pub struct TokenSource {
    account: ServiceAccount,
    cache: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    pub fn new(account: ServiceAccount) -> Self {
        Self {
            account,
            cache: Mutex::new(None),
        }
    }

    /// Current bearer token, exchanging a fresh assertion when the cached one is stale.
    pub async fn access_token(&self, http: &reqwest::Client) -> Result<String, SinkError> {
        if let Some(token) = self.cached() {
            return Ok(token);
        }

        let assertion = self.sign_assertion(Utc::now().timestamp())?;
        let response = http
            .post(&self.account.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| SinkError::auth(format!("token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read token response body".to_string());
            return Err(SinkError::auth(format!(
                "token endpoint answered {}: {}",
                status.as_u16(),
                body
            )));
        }

        let payload: TokenResponse = response
            .json()
            .await
            .map_err(|e| SinkError::auth(format!("malformed token response: {e}")))?;

        let lifetime = Duration::from_secs(payload.expires_in).saturating_sub(REFRESH_MARGIN);
        *self.cache.lock() = Some(CachedToken {
            value: payload.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        tracing::debug!(expires_in = payload.expires_in, "obtained access token");

        Ok(payload.access_token)
    }

    fn cached(&self) -> Option<String> {
        let guard = self.cache.lock();
        guard
            .as_ref()
            .filter(|t| t.refresh_at > Instant::now())
            .map(|t| t.value.clone())
    }

    fn sign_assertion(&self, now: i64) -> Result<String, SinkError> {
        let claims = Claims {
            iss: &self.account.client_email,
            scope: DATASTORE_SCOPE,
            aud: &self.account.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let key = EncodingKey::from_rsa_pem(self.account.private_key.expose_secret().as_bytes())
            .map_err(|e| SinkError::auth(format!("invalid private key: {e}")))?;

        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| SinkError::auth(format!("cannot sign assertion: {e}")))
    }
}
