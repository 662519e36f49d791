use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use crate::config::AdManagerConfig;
use crate::credentials::AdManagerCredentials;
use crate::monitor::error::{ServiceError, ServiceResult};
use crate::monitor::provider::LineItemService;
use crate::monitor::types::{LineItemId, LineItemSnapshot, LineItemStatus, PauseOutcome};
use crate::services::google_auth::GoogleAuth;
use crate::services::soap::{self, RequestHeader};

/// Ad Manager `LineItemService` over SOAP.
pub struct AdManagerClient {
    service_url: String,
    api_version: String,
    network_code: String,
    application_name: String,
    http: Client,
    auth: Arc<GoogleAuth>,
}

impl AdManagerClient {
    pub fn new(
        config: &AdManagerConfig,
        credentials: &AdManagerCredentials,
        http: Client,
        auth: Arc<GoogleAuth>,
    ) -> Self {
        Self {
            service_url: format!(
                "{}/{}/LineItemService",
                config.endpoint.trim_end_matches('/'),
                config.api_version
            ),
            api_version: config.api_version.clone(),
            network_code: credentials.network_code.clone(),
            application_name: credentials.application_name.clone(),
            http,
            auth,
        }
    }

    pub fn service_url(&self) -> &str {
        &self.service_url
    }

    fn header(&self) -> RequestHeader<'_> {
        RequestHeader {
            api_version: &self.api_version,
            network_code: &self.network_code,
            application_name: &self.application_name,
        }
    }

    /// POST one envelope, returning the response body. SOAP faults come
    /// back as HTTP 500, so the body is checked for a fault first.
    async fn call(&self, envelope: String) -> ServiceResult<String> {
        let token = self.auth.access_token().await?;

        let response = self
            .http
            .post(&self.service_url)
            .bearer_auth(token)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", "\"\"")
            .body(envelope)
            .send()
            .await
            .map_err(|e| ServiceError::network(format!("Ad Manager request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::network(format!("Ad Manager response unreadable: {}", e)))?;

        if let Some(message) = soap::fault_message(&body) {
            return Err(ServiceError::Fault { message });
        }
        if !status.is_success() {
            return Err(ServiceError::Http {
                service: "Ad Manager",
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl LineItemService for AdManagerClient {
    async fn fetch_line_item(&self, id: &LineItemId) -> ServiceResult<Option<LineItemSnapshot>> {
        let body = self
            .call(soap::get_line_item_request(&self.header(), id))
            .await?;
        let snapshot = soap::parse_line_item_page(&body)?;

        if let Some(snapshot) = &snapshot {
            tracing::debug!(
                "Line item {}: {} impressions, status {}",
                id,
                snapshot.impressions_delivered,
                snapshot.status_label()
            );
        }
        Ok(snapshot)
    }

    async fn pause_line_item(&self, id: &LineItemId) -> ServiceResult<PauseOutcome> {
        let Some(current) = self.fetch_line_item(id).await? else {
            tracing::warn!("Line item {} not found.", id);
            return Ok(PauseOutcome::NotFound);
        };

        match current.status {
            Some(LineItemStatus::Active) => {}
            Some(status) => {
                tracing::info!("Line item {} is in status '{}', cannot be paused.", id, status);
                return Ok(PauseOutcome::NotPausable { status });
            }
            None => {
                tracing::warn!("Line item {} has no status, cannot be paused.", id);
                return Ok(PauseOutcome::NotFound);
            }
        }

        let body = self
            .call(soap::pause_line_item_request(&self.header(), id))
            .await?;
        let changes = soap::parse_update_result(&body)?;

        if changes == 0 {
            tracing::warn!("Pause action for line item {} reported no changes", id);
        } else {
            tracing::info!("Line item {} has been paused.", id);
        }
        Ok(PauseOutcome::Paused { changes })
    }
}
