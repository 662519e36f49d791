//! Ad Manager SOAP envelopes.
//!
//! Only the two `LineItemService` calls the monitor needs are covered:
//! `getLineItemsByStatement` and `performLineItemAction` with
//! `PauseLineItems`. Responses are scanned for the handful of fields we read
//! rather than mapped onto the full WSDL types.

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::monitor::error::{ServiceError, ServiceResult};
use crate::monitor::types::{LineItemId, LineItemSnapshot, LineItemStatus};

const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Values for the `RequestHeader` sent with every call.
#[derive(Debug, Clone)]
pub struct RequestHeader<'a> {
    pub api_version: &'a str,
    pub network_code: &'a str,
    pub application_name: &'a str,
}

impl RequestHeader<'_> {
    fn namespace(&self) -> String {
        format!("https://www.google.com/apis/ads/publisher/{}", self.api_version)
    }
}

fn envelope(header: &RequestHeader<'_>, body: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<soapenv:Envelope xmlns:soapenv="{env}" xmlns:xsi="{xsi}" xmlns:ns="{ns}">"#,
            r#"<soapenv:Header><ns:RequestHeader>"#,
            r#"<ns:networkCode>{network}</ns:networkCode>"#,
            r#"<ns:applicationName>{app}</ns:applicationName>"#,
            r#"</ns:RequestHeader></soapenv:Header>"#,
            r#"<soapenv:Body>{body}</soapenv:Body>"#,
            r#"</soapenv:Envelope>"#,
        ),
        env = SOAP_ENV_NS,
        xsi = XSI_NS,
        ns = header.namespace(),
        network = escape(header.network_code),
        app = escape(header.application_name),
        body = body,
    )
}

/// PQL statement selecting one line item by bound ID.
fn filter_statement(id: &LineItemId, limit: Option<u32>) -> String {
    let query = match limit {
        Some(limit) => format!("WHERE id = :id LIMIT {}", limit),
        None => "WHERE id = :id".to_string(),
    };

    format!(
        concat!(
            "<ns:filterStatement>",
            "<ns:query>{query}</ns:query>",
            "<ns:values><ns:key>id</ns:key>",
            r#"<ns:value xsi:type="ns:NumberValue"><ns:value>{id}</ns:value></ns:value>"#,
            "</ns:values>",
            "</ns:filterStatement>",
        ),
        query = query,
        id = escape(id.as_str()),
    )
}

pub fn get_line_item_request(header: &RequestHeader<'_>, id: &LineItemId) -> String {
    let body = format!(
        "<ns:getLineItemsByStatement>{}</ns:getLineItemsByStatement>",
        filter_statement(id, Some(1))
    );
    envelope(header, &body)
}

pub fn pause_line_item_request(header: &RequestHeader<'_>, id: &LineItemId) -> String {
    let body = format!(
        concat!(
            "<ns:performLineItemAction>",
            r#"<ns:lineItemAction xsi:type="ns:PauseLineItems"/>"#,
            "{statement}",
            "</ns:performLineItemAction>",
        ),
        statement = filter_statement(id, None)
    );
    envelope(header, &body)
}

#[derive(Debug, Default)]
struct ResponseFields {
    results: usize,
    status: Option<String>,
    impressions: Option<String>,
    num_changes: Option<String>,
    fault: Option<String>,
}

fn ends_with(path: &[String], suffix: &[&str]) -> bool {
    path.len() >= suffix.len()
        && path[path.len() - suffix.len()..]
            .iter()
            .zip(suffix)
            .all(|(a, b)| a == b)
}

fn scan(xml: &str) -> ServiceResult<ResponseFields> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut fields = ResponseFields::default();
    let mut path: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if name == "results" && ends_with(&path, &["rval"]) {
                    fields.results += 1;
                }
                path.push(name);
            }
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"results" && ends_with(&path, &["rval"]) {
                    fields.results += 1;
                }
            }
            Ok(Event::End(_)) => {
                path.pop();
            }
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| ServiceError::format(format!("Bad text in SOAP response: {}", e)))?
                    .into_owned();

                if ends_with(&path, &["Fault", "faultstring"]) {
                    fields.fault = Some(text);
                } else if fields.results == 1 && ends_with(&path, &["rval", "results", "status"]) {
                    fields.status = Some(text);
                } else if fields.results == 1
                    && ends_with(&path, &["rval", "results", "stats", "impressionsDelivered"])
                {
                    fields.impressions = Some(text);
                } else if ends_with(&path, &["rval", "numChanges"]) {
                    fields.num_changes = Some(text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ServiceError::format(format!(
                    "Malformed SOAP response at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    Ok(fields)
}

/// The `faultstring` of a SOAP fault, if the response is one.
pub fn fault_message(xml: &str) -> Option<String> {
    scan(xml).ok().and_then(|fields| fields.fault)
}

/// First line item in a `getLineItemsByStatement` response, `None` when
/// the page is empty.
pub fn parse_line_item_page(xml: &str) -> ServiceResult<Option<LineItemSnapshot>> {
    let fields = scan(xml)?;

    if let Some(message) = fields.fault {
        return Err(ServiceError::Fault { message });
    }
    if fields.results == 0 {
        return Ok(None);
    }

    let impressions_delivered = match fields.impressions {
        Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
            ServiceError::format(format!("impressionsDelivered is not a count: '{}'", raw))
        })?,
        None => 0,
    };

    Ok(Some(LineItemSnapshot {
        impressions_delivered,
        status: fields.status.as_deref().map(LineItemStatus::from_api),
    }))
}

/// `numChanges` from a `performLineItemAction` response.
pub fn parse_update_result(xml: &str) -> ServiceResult<u64> {
    let fields = scan(xml)?;

    if let Some(message) = fields.fault {
        return Err(ServiceError::Fault { message });
    }

    match fields.num_changes {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ServiceError::format(format!("numChanges is not a count: '{}'", raw))),
        None => Ok(0),
    }
}
