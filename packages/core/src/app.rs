//! Wiring: builds the Google clients and the SMTP notifier from the
//! loaded configuration and runs the monitor once.

use std::sync::Arc;

use reqwest::Client;

use crate::config::Config;
use crate::credentials::Credentials;
use crate::error::AppError;
use crate::monitor::provider::Notifier;
use crate::monitor::{LineItemMonitor, RunReport};
use crate::notify::SmtpNotifier;
use crate::services::google_auth::{AD_MANAGER_SCOPE, SHEETS_SCOPE};
use crate::services::{AdManagerClient, GoogleAuth, SheetsClient};

/// The two Google-backed services, sharing one HTTP connection pool.
pub struct GoogleServices {
    pub sheets: Arc<SheetsClient>,
    pub line_items: Arc<AdManagerClient>,
}

impl GoogleServices {
    pub fn connect(config: &Config, credentials: &Credentials) -> Self {
        let http = Client::new();

        let sheets_auth = Arc::new(GoogleAuth::new(
            Arc::clone(&credentials.sheets_key),
            SHEETS_SCOPE,
            http.clone(),
        ));
        let ads_auth = Arc::new(GoogleAuth::new(
            Arc::clone(&credentials.ad_manager.key),
            AD_MANAGER_SCOPE,
            http.clone(),
        ));

        tracing::info!(
            "Sheets as {}, Ad Manager network {} as {}",
            sheets_auth.client_email(),
            credentials.ad_manager.network_code,
            ads_auth.client_email()
        );

        Self {
            sheets: Arc::new(SheetsClient::new(&config.sheet, http.clone(), sheets_auth)),
            line_items: Arc::new(AdManagerClient::new(
                &config.ad_manager,
                &credentials.ad_manager,
                http,
                ads_auth,
            )),
        }
    }

    pub fn monitor(&self, notifier: Arc<dyn Notifier>) -> LineItemMonitor {
        LineItemMonitor::new(self.sheets.clone(), self.line_items.clone(), notifier)
    }
}

/// One full run with the production services.
pub async fn run(config: &Config, credentials: &Credentials) -> Result<RunReport, AppError> {
    let notifier = SmtpNotifier::new(&config.email).map_err(|e| AppError::Config(e.to_string()))?;
    let monitor = GoogleServices::connect(config, credentials).monitor(Arc::new(notifier));

    Ok(monitor.run_once().await?)
}
