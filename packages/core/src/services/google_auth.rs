//! Google OAuth2 for service accounts.
//!
//! Signs an RS256 JWT assertion with the service-account key and trades it
//! at the key's `token_uri` for a bearer token. The token is reused until
//! shortly before it expires.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::cache::ExpiringValue;
use crate::credentials::ServiceAccountKey;
use crate::monitor::error::{ServiceError, ServiceResult};

pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
pub const AD_MANAGER_SCOPE: &str = "https://www.googleapis.com/auth/dfp";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh this long before Google's stated expiry.
const EXPIRY_MARGIN_SECS: u64 = 60;

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
    ASSERTION_LIFETIME_SECS as u64
}

pub struct GoogleAuth {
    key: Arc<ServiceAccountKey>,
    scope: String,
    http: Client,
    token: Mutex<ExpiringValue<String>>,
}

impl GoogleAuth {
    pub fn new(key: Arc<ServiceAccountKey>, scope: impl Into<String>, http: Client) -> Self {
        Self {
            key,
            scope: scope.into(),
            http,
            token: Mutex::new(ExpiringValue::new()),
        }
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// A bearer token for this scope, fetching a new one when the cached
    /// token is missing or about to expire.
    pub async fn access_token(&self) -> ServiceResult<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.get() {
            return Ok(token);
        }

        let fresh = self.request_token().await?;
        let ttl = Duration::from_secs(fresh.expires_in.saturating_sub(EXPIRY_MARGIN_SECS));
        cached.set(fresh.access_token.clone(), ttl);

        tracing::debug!(
            "Obtained access token for {} ({}s)",
            self.key.client_email,
            fresh.expires_in
        );
        Ok(fresh.access_token)
    }

    fn signed_assertion(&self) -> ServiceResult<String> {
        let iat = Utc::now().timestamp();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: &self.scope,
            aud: &self.key.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        let signing_key = EncodingKey::from_rsa_pem(self.key.private_key.expose_secret().as_bytes())
            .map_err(|e| ServiceError::auth(format!("Invalid service-account private key: {}", e)))?;

        encode(&Header::new(Algorithm::RS256), &claims, &signing_key)
            .map_err(|e| ServiceError::auth(format!("Failed to sign JWT assertion: {}", e)))
    }

    async fn request_token(&self) -> ServiceResult<TokenResponse> {
        let assertion = self.signed_assertion()?;

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| ServiceError::network(format!("Token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::auth(format!(
                "Token endpoint returned HTTP {}: {}",
                status, body
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| ServiceError::auth(format!("Malformed token response: {}", e)))
    }
}
