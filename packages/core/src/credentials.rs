//! Credential loading.
//!
//! Both Google credentials arrive through the environment. The Sheets
//! service-account key may be a path to the JSON key file or the
//! base64-encoded file itself; the Ad Manager settings are a base64-encoded
//! `googleads.yaml`. Everything is decoded in memory, nothing is written
//! to disk.

use std::env;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use secrecy::SecretString;
use serde::Deserialize;

use crate::config::required;
use crate::error::AppError;

pub const SHEETS_CREDENTIALS_VAR: &str = "GOOGLE_APPLICATION_CREDENTIALS";
pub const AD_MANAGER_CREDENTIALS_VAR: &str = "GOOGLE_APPLICATION_GOOGLEADS";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// A Google service-account key, as downloaded from the Cloud console.
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: SecretString,
    pub token_uri: String,
}

#[derive(Deserialize)]
struct RawServiceAccountKey {
    client_email: String,
    private_key: String,
    token_uri: Option<String>,
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let raw: RawServiceAccountKey = serde_json::from_str(json)
            .map_err(|e| AppError::Config(format!("Invalid service-account key: {}", e)))?;

        if raw.private_key.trim().is_empty() {
            return Err(AppError::Config(
                "Service-account key has an empty private_key".to_string(),
            ));
        }

        Ok(Self {
            client_email: raw.client_email,
            private_key: SecretString::from(raw.private_key),
            token_uri: raw
                .token_uri
                .filter(|uri| !uri.is_empty())
                .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
        })
    }
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"[REDACTED]")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

/// Ad Manager request headers plus the key used to authorise calls.
#[derive(Debug, Clone)]
pub struct AdManagerCredentials {
    pub application_name: String,
    pub network_code: String,
    pub key: Arc<ServiceAccountKey>,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub sheets_key: Arc<ServiceAccountKey>,
    pub ad_manager: AdManagerCredentials,
}

#[derive(Debug, Deserialize)]
struct GoogleAdsYaml {
    ad_manager: AdManagerSection,
}

#[derive(Debug, Deserialize)]
struct AdManagerSection {
    application_name: String,
    network_code: YamlScalar,
    path_to_private_key_file: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum YamlScalar {
    Number(u64),
    Text(String),
}

impl YamlScalar {
    fn into_string(self) -> String {
        match self {
            YamlScalar::Number(n) => n.to_string(),
            YamlScalar::Text(s) => s.trim().to_string(),
        }
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let sheets_source = required(&lookup, SHEETS_CREDENTIALS_VAR).map_err(AppError::Config)?;
        let sheets_key = Arc::new(ServiceAccountKey::from_json(&read_key_source(
            &sheets_source,
            SHEETS_CREDENTIALS_VAR,
        )?)?);

        let ads_source = required(&lookup, AD_MANAGER_CREDENTIALS_VAR).map_err(AppError::Config)?;
        let yaml = decode_base64_text(&ads_source, AD_MANAGER_CREDENTIALS_VAR)?;
        let ad_manager = parse_googleads_yaml(&yaml, &sheets_key)?;

        Ok(Self {
            sheets_key,
            ad_manager,
        })
    }
}

/// A value naming an existing file is read as a key file; anything else is
/// treated as the base64-encoded key.
fn read_key_source(value: &str, var: &str) -> Result<String, AppError> {
    let path = Path::new(value);
    if path.is_file() {
        return std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("{}: cannot read {}: {}", var, value, e)));
    }

    decode_base64_text(value, var)
}

fn decode_base64_text(value: &str, var: &str) -> Result<String, AppError> {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();

    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| AppError::Config(format!("{} is not valid base64: {}", var, e)))?;

    String::from_utf8(bytes)
        .map_err(|_| AppError::Config(format!("{} does not decode to UTF-8 text", var)))
}

fn parse_googleads_yaml(
    yaml: &str,
    fallback_key: &Arc<ServiceAccountKey>,
) -> Result<AdManagerCredentials, AppError> {
    let parsed: GoogleAdsYaml = serde_yaml::from_str(yaml).map_err(|e| {
        AppError::Config(format!("{} is not a valid googleads.yaml: {}", AD_MANAGER_CREDENTIALS_VAR, e))
    })?;
    let section = parsed.ad_manager;

    let network_code = section.network_code.into_string();
    if network_code.is_empty() || !network_code.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::Config(format!(
            "ad_manager.network_code must be numeric, got '{}'",
            network_code
        )));
    }
    if section.application_name.trim().is_empty() {
        return Err(AppError::Config(
            "ad_manager.application_name must not be empty".to_string(),
        ));
    }

    let key = match section.path_to_private_key_file.as_deref().map(str::trim) {
        Some(path) if !path.is_empty() && Path::new(path).is_file() => {
            let json = std::fs::read_to_string(path).map_err(|e| {
                AppError::Config(format!("cannot read Ad Manager key file {}: {}", path, e))
            })?;
            Arc::new(ServiceAccountKey::from_json(&json)?)
        }
        Some(path) if !path.is_empty() => {
            tracing::warn!(
                "Ad Manager key file {} not found, reusing the Sheets service-account key",
                path
            );
            Arc::clone(fallback_key)
        }
        _ => Arc::clone(fallback_key),
    };

    Ok(AdManagerCredentials {
        application_name: section.application_name.trim().to_string(),
        network_code,
        key,
    })
}
