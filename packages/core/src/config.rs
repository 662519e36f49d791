use std::env;

use secrecy::SecretString;

pub const DEFAULT_WORKSHEET_NAME: &str = "LineItemAndThreshold";
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_AD_MANAGER_API_VERSION: &str = "v202408";
pub const DEFAULT_AD_MANAGER_ENDPOINT: &str = "https://ads.google.com/apis/ads/publisher";
pub const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";

#[derive(Debug)]
pub struct Config {
    pub sheet: SheetConfig,
    pub ad_manager: AdManagerConfig,
    pub email: EmailConfig,
}

/// Where the tracked line items live.
#[derive(Debug, Clone)]
pub struct SheetConfig {
    pub spreadsheet_id: String,
    pub worksheet_name: String,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct AdManagerConfig {
    pub endpoint: String,
    pub api_version: String,
}

/// SMTP relay and addressing for status emails.
#[derive(Debug)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// From address, also used as the SMTP username.
    pub sender: String,
    pub recipients: Vec<String>,
    pub subject_prefix: String,
    pub password: SecretString,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key/value source. Every required value is
    /// checked here so a run never starts half-configured.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let sheet_url = required(&lookup, "SHEET_URL")?;
        let spreadsheet_id = spreadsheet_id_from_url(&sheet_url)
            .ok_or_else(|| format!("SHEET_URL is not a spreadsheet URL or ID: {}", sheet_url))?;

        let sheet = SheetConfig {
            spreadsheet_id,
            worksheet_name: optional(&lookup, "SHEET_NAME")
                .unwrap_or_else(|| DEFAULT_WORKSHEET_NAME.to_string()),
            api_base: optional(&lookup, "SHEETS_API_BASE")
                .unwrap_or_else(|| DEFAULT_SHEETS_API_BASE.to_string()),
        };

        let ad_manager = AdManagerConfig {
            endpoint: optional(&lookup, "AD_MANAGER_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_AD_MANAGER_ENDPOINT.to_string()),
            api_version: optional(&lookup, "AD_MANAGER_API_VERSION")
                .unwrap_or_else(|| DEFAULT_AD_MANAGER_API_VERSION.to_string()),
        };

        let smtp_port = match optional(&lookup, "SMTP_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| format!("SMTP_PORT must be a valid port number: {}", raw))?,
            None => DEFAULT_SMTP_PORT,
        };

        let recipients: Vec<String> = required(&lookup, "EMAIL_RECIPIENTS")?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if recipients.is_empty() {
            return Err("EMAIL_RECIPIENTS must list at least one address".to_string());
        }

        let email = EmailConfig {
            smtp_host: optional(&lookup, "SMTP_HOST")
                .unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            smtp_port,
            sender: required(&lookup, "EMAIL_SENDER")?,
            recipients,
            subject_prefix: lookup("EMAIL_SUBJECT_PREFIX").unwrap_or_default(),
            password: SecretString::from(required(&lookup, "EMAIL_PASSWORD")?),
        };

        Ok(Self {
            sheet,
            ad_manager,
            email,
        })
    }
}

/// Reads a variable that must be present and non-blank.
pub(crate) fn required<F>(lookup: &F, key: &str) -> Result<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        Some(_) => Err(format!("{} must not be empty", key)),
        None => Err(format!("{} is required", key)),
    }
}

fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Accepts either a full Sheets URL (`.../spreadsheets/d/<id>/edit...`) or
/// a bare spreadsheet ID.
pub fn spreadsheet_id_from_url(value: &str) -> Option<String> {
    let value = value.trim();

    if let Some((_, rest)) = value.split_once("/spreadsheets/d/") {
        let id: String = rest
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect();
        return (!id.is_empty()).then_some(id);
    }

    let is_bare_id = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    is_bare_id.then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            (
                "SHEET_URL",
                "https://docs.google.com/spreadsheets/d/1m4fIYSVMn4rZw4at-_Q/edit?gid=0#gid=0",
            ),
            ("EMAIL_SENDER", "ops@example.com"),
            ("EMAIL_RECIPIENTS", "a@example.com, b@example.com,"),
            ("EMAIL_PASSWORD", "hunter2"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<Config, String> {
        Config::from_lookup(|key| env.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn defaults_fill_optional_settings() {
        let config = tokio_test::assert_ok!(load(&base_env()));

        assert_eq!(config.sheet.spreadsheet_id, "1m4fIYSVMn4rZw4at-_Q");
        assert_eq!(config.sheet.worksheet_name, DEFAULT_WORKSHEET_NAME);
        assert_eq!(config.sheet.api_base, DEFAULT_SHEETS_API_BASE);
        assert_eq!(config.ad_manager.api_version, "v202408");
        assert_eq!(config.email.smtp_host, "smtp.gmail.com");
        assert_eq!(config.email.smtp_port, 587);
        assert_eq!(config.email.recipients, vec!["a@example.com", "b@example.com"]);
        assert_eq!(config.email.subject_prefix, "");
        assert_eq!(config.email.password.expose_secret(), "hunter2");
    }

    #[test]
    fn overrides_are_honoured() {
        let mut env = base_env();
        env.insert("SHEET_NAME", "Tracking");
        env.insert("SMTP_PORT", "2525");
        env.insert("EMAIL_SUBJECT_PREFIX", "TESTING| ");
        env.insert("AD_MANAGER_API_VERSION", "v202502");

        let config = load(&env).unwrap();

        assert_eq!(config.sheet.worksheet_name, "Tracking");
        assert_eq!(config.email.smtp_port, 2525);
        assert_eq!(config.email.subject_prefix, "TESTING| ");
        assert_eq!(config.ad_manager.api_version, "v202502");
    }

    #[test]
    fn missing_password_is_rejected_up_front() {
        let mut env = base_env();
        env.remove("EMAIL_PASSWORD");

        let err = tokio_test::assert_err!(load(&env));
        assert!(err.contains("EMAIL_PASSWORD"));
    }

    #[test]
    fn blank_required_value_is_rejected() {
        let mut env = base_env();
        env.insert("EMAIL_SENDER", "   ");

        let err = load(&env).unwrap_err();
        assert_eq!(err, "EMAIL_SENDER must not be empty");
    }

    #[test]
    fn recipients_list_must_not_be_only_separators() {
        let mut env = base_env();
        env.insert("EMAIL_RECIPIENTS", " , ,");

        assert!(load(&env).is_err());
    }

    #[test]
    fn invalid_smtp_port_is_rejected() {
        let mut env = base_env();
        env.insert("SMTP_PORT", "smtp");

        assert!(load(&env).unwrap_err().contains("SMTP_PORT"));
    }

    #[test]
    fn password_is_redacted_in_debug_output() {
        let config = load(&base_env()).unwrap();
        assert!(!format!("{:?}", config).contains("hunter2"));
    }

    #[test]
    fn spreadsheet_id_accepts_bare_ids() {
        assert_eq!(spreadsheet_id_from_url("abc_DEF-123").as_deref(), Some("abc_DEF-123"));
        assert_eq!(spreadsheet_id_from_url("https://example.com/other"), None);
        assert_eq!(spreadsheet_id_from_url(""), None);
    }
}
