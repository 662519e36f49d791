//! Shared wiremock setup for the Google service integration tests.
//!
//! One `MockServer` plays all three Google endpoints:
//! - `POST /token`: OAuth token exchange
//! - `/v4/spreadsheets/...`: Sheets values API
//! - `POST /apis/ads/publisher/v202408/LineItemService`: Ad Manager SOAP

#![allow(dead_code)]

use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use wiremock::{
    matchers::{body_string_contains, method, path},
    Mock, MockServer, ResponseTemplate,
};

use line_item_monitor::config::Config;
use line_item_monitor::credentials::Credentials;

pub const TEST_KEY_PEM: &str = include_str!("../fixtures/test_rsa_key.pem");
pub const ACCESS_TOKEN: &str = "test-access-token";
pub const SPREADSHEET_ID: &str = "sheet-123";
pub const LINE_ITEM_SERVICE_PATH: &str = "/apis/ads/publisher/v202408/LineItemService";

pub fn service_account_json(token_uri: &str) -> String {
    json!({
        "type": "service_account",
        "project_id": "monitor-test",
        "client_email": "monitor@monitor-test.iam.gserviceaccount.com",
        "private_key": TEST_KEY_PEM,
        "token_uri": token_uri,
    })
    .to_string()
}

pub fn env_for(server: &MockServer) -> HashMap<String, String> {
    let yaml = "ad_manager:\n  application_name: Line Item Monitor\n  network_code: 21812345\n";

    HashMap::from([
        (
            "SHEET_URL".to_string(),
            format!("https://docs.google.com/spreadsheets/d/{}/edit#gid=0", SPREADSHEET_ID),
        ),
        ("SHEETS_API_BASE".to_string(), format!("{}/v4", server.uri())),
        (
            "AD_MANAGER_ENDPOINT".to_string(),
            format!("{}/apis/ads/publisher", server.uri()),
        ),
        ("EMAIL_SENDER".to_string(), "ops@example.com".to_string()),
        ("EMAIL_RECIPIENTS".to_string(), "team@example.com".to_string()),
        ("EMAIL_PASSWORD".to_string(), "app-password".to_string()),
        (
            "GOOGLE_APPLICATION_CREDENTIALS".to_string(),
            STANDARD.encode(service_account_json(&format!("{}/token", server.uri()))),
        ),
        ("GOOGLE_APPLICATION_GOOGLEADS".to_string(), STANDARD.encode(yaml)),
    ])
}

pub fn load(env: &HashMap<String, String>) -> (Config, Credentials) {
    let config = Config::from_lookup(|key| env.get(key).cloned()).expect("config");
    let credentials = Credentials::from_lookup(|key| env.get(key).cloned()).expect("credentials");
    (config, credentials)
}

pub async fn mount_token_endpoint(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant-type%3Ajwt-bearer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": ACCESS_TOKEN,
            "expires_in": 3599,
            "token_type": "Bearer",
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

pub fn sheet_values(rows: Value) -> Value {
    json!({
        "range": "LineItemAndThreshold!A1:C10",
        "majorDimension": "ROWS",
        "values": rows,
    })
}

pub fn line_item_page(id: u64, status: &str, impressions: u64) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Header><ResponseHeader xmlns="https://www.google.com/apis/ads/publisher/v202408"><requestId>r-{id}</requestId></ResponseHeader></soap:Header>
  <soap:Body>
    <getLineItemsByStatementResponse xmlns="https://www.google.com/apis/ads/publisher/v202408">
      <rval>
        <totalResultSetSize>1</totalResultSetSize>
        <startIndex>0</startIndex>
        <results>
          <id>{id}</id>
          <status>{status}</status>
          <stats><impressionsDelivered>{impressions}</impressionsDelivered></stats>
        </results>
      </rval>
    </getLineItemsByStatementResponse>
  </soap:Body>
</soap:Envelope>"#
    )
}

pub const EMPTY_PAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body>
<getLineItemsByStatementResponse xmlns="https://www.google.com/apis/ads/publisher/v202408">
<rval><totalResultSetSize>0</totalResultSetSize><startIndex>0</startIndex></rval>
</getLineItemsByStatementResponse></soap:Body></soap:Envelope>"#;

pub const PAUSE_RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body>
<performLineItemActionResponse xmlns="https://www.google.com/apis/ads/publisher/v202408">
<rval><numChanges>1</numChanges></rval>
</performLineItemActionResponse></soap:Body></soap:Envelope>"#;

pub const FAULT_RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body>
<soap:Fault><faultcode>soap:Server</faultcode>
<faultstring>[PermissionError.PERMISSION_DENIED @ ]</faultstring>
</soap:Fault></soap:Body></soap:Envelope>"#;

/// Stub `getLineItemsByStatement` for one ID.
pub async fn mount_line_item(server: &MockServer, id: u64, status: &str, impressions: u64) {
    Mock::given(method("POST"))
        .and(path(LINE_ITEM_SERVICE_PATH))
        .and(body_string_contains("getLineItemsByStatement"))
        .and(body_string_contains(format!("<ns:value>{}</ns:value>", id)))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/xml; charset=utf-8")
                .set_body_string(line_item_page(id, status, impressions)),
        )
        .mount(server)
        .await;
}
