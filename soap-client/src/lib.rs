//! Private SOAP client for UPnP renderer communication
//!
//! This crate provides a minimal SOAP client for UPnP AV media renderers.
//! Control actions are discrete HTTP POSTs; the underlying `ureq::Agent`
//! keeps connections alive between them and reconnects transparently when a
//! pooled connection was dropped by the device. It also implements the GENA
//! SUBSCRIBE/UNSUBSCRIBE verbs and plain description document fetches.
//!
//! The client never retries. A failed request is reported to the caller,
//! which decides whether to skip, retry later or surface the error.

mod args;
mod error;

pub use args::ArgList;
pub use error::SoapError;

use std::time::Duration;
use tracing::{debug, trace};
use xmltree::Element;

/// Response from a UPnP subscription request
#[derive(Debug, Clone)]
pub struct SubscriptionResponse {
    /// Subscription ID returned by the device
    pub sid: String,
    /// Actual timeout granted by the device (in seconds)
    pub timeout_seconds: u32,
}

/// A minimal SOAP client for UPnP device communication
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct SoapClient {
    agent: ureq::Agent,
}

impl SoapClient {
    /// Create a new SOAP client with default timeouts (5s connect, 10s read)
    pub fn new() -> Self {
        Self::with_timeouts(Duration::from_secs(5), Duration::from_secs(10))
    }

    /// Create a SOAP client with explicit connect and read timeouts
    pub fn with_timeouts(connect: Duration, read: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(connect)
                .timeout_read(read)
                .build(),
        }
    }

    /// Send a SOAP request and return the out-arguments of the response
    ///
    /// # Arguments
    /// * `control_url` - Absolute control URL of the service
    /// * `service_urn` - Versioned service type, e.g. `urn:schemas-upnp-org:service:AVTransport:1`
    /// * `action` - Action name, e.g. `Play`
    /// * `args` - In-arguments in declaration order
    pub fn call(
        &self,
        control_url: &str,
        service_urn: &str,
        action: &str,
        args: &ArgList,
    ) -> Result<ArgList, SoapError> {
        let body = build_envelope(service_urn, action, args);
        let soap_action = format!("\"{}#{}\"", service_urn, action);

        trace!(action, url = control_url, "sending SOAP request");

        let xml_text = match self
            .agent
            .post(control_url)
            .set("Content-Type", "text/xml; charset=\"utf-8\"")
            .set("SOAPACTION", &soap_action)
            .send_string(&body)
        {
            Ok(response) => response
                .into_string()
                .map_err(|e| SoapError::Network(e.to_string()))?,
            // Faults arrive with HTTP 500, the body still carries the details
            Err(ureq::Error::Status(code, response)) => {
                let text = response.into_string().unwrap_or_default();
                if text.contains("Fault") {
                    text
                } else {
                    return Err(SoapError::Network(format!("HTTP {} for {}", code, action)));
                }
            }
            Err(e) => return Err(SoapError::Network(e.to_string())),
        };

        let xml = Element::parse(xml_text.as_bytes())
            .map_err(|e| SoapError::Parse(e.to_string()))?;

        let response = extract_response(&xml, action)?;
        Ok(collect_out_args(&response))
    }

    /// Fetch a document (device or service description) with a plain GET
    pub fn get_document(&self, url: &str) -> Result<String, SoapError> {
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| SoapError::Network(e.to_string()))?;

        response
            .into_string()
            .map_err(|e| SoapError::Network(e.to_string()))
    }

    /// Subscribe to GENA events for a service
    ///
    /// # Arguments
    /// * `event_url` - Absolute `eventSubURL` of the service
    /// * `callback_url` - URL where NOTIFY requests should be sent
    /// * `timeout_seconds` - Requested subscription timeout in seconds
    pub fn subscribe(
        &self,
        event_url: &str,
        callback_url: &str,
        timeout_seconds: u32,
    ) -> Result<SubscriptionResponse, SoapError> {
        let response = self
            .agent
            .request("SUBSCRIBE", event_url)
            .set("CALLBACK", &format!("<{}>", callback_url))
            .set("NT", "upnp:event")
            .set("TIMEOUT", &format!("Second-{}", timeout_seconds))
            .call()
            .map_err(|e| SoapError::Network(e.to_string()))?;

        if response.status() != 200 {
            return Err(SoapError::Network(format!(
                "SUBSCRIBE failed: HTTP {}",
                response.status()
            )));
        }

        let sid = response
            .header("SID")
            .ok_or_else(|| SoapError::Parse("Missing SID header in SUBSCRIBE response".to_string()))?
            .to_string();

        let timeout_seconds = response
            .header("TIMEOUT")
            .and_then(parse_timeout_header)
            .unwrap_or(timeout_seconds);

        debug!(%sid, timeout_seconds, url = event_url, "subscribed");

        Ok(SubscriptionResponse {
            sid,
            timeout_seconds,
        })
    }

    /// Renew an existing subscription, returning the granted timeout
    pub fn renew_subscription(
        &self,
        event_url: &str,
        sid: &str,
        timeout_seconds: u32,
    ) -> Result<u32, SoapError> {
        let response = self
            .agent
            .request("SUBSCRIBE", event_url)
            .set("SID", sid)
            .set("TIMEOUT", &format!("Second-{}", timeout_seconds))
            .call()
            .map_err(|e| SoapError::Network(e.to_string()))?;

        if response.status() != 200 {
            return Err(SoapError::Network(format!(
                "SUBSCRIBE renewal failed: HTTP {}",
                response.status()
            )));
        }

        Ok(response
            .header("TIMEOUT")
            .and_then(parse_timeout_header)
            .unwrap_or(timeout_seconds))
    }

    /// Cancel a subscription
    pub fn unsubscribe(&self, event_url: &str, sid: &str) -> Result<(), SoapError> {
        let response = self
            .agent
            .request("UNSUBSCRIBE", event_url)
            .set("SID", sid)
            .call()
            .map_err(|e| SoapError::Network(e.to_string()))?;

        if response.status() != 200 {
            return Err(SoapError::Network(format!(
                "UNSUBSCRIBE failed: HTTP {}",
                response.status()
            )));
        }

        Ok(())
    }
}

impl Default for SoapClient {
    fn default() -> Self {
        Self::new()
    }
}

fn build_envelope(service_urn: &str, action: &str, args: &ArgList) -> String {
    let mut payload = String::new();
    for (name, value) in args.iter() {
        payload.push_str(&format!(
            "<{name}>{value}</{name}>",
            name = name,
            value = quick_xml::escape::escape(value)
        ));
    }

    format!(
        r#"<?xml version="1.0" encoding="utf-8"?><s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/"><s:Body><u:{action} xmlns:u="{service_urn}">{payload}</u:{action}></s:Body></s:Envelope>"#,
        action = action,
        service_urn = service_urn,
        payload = payload
    )
}

fn extract_response(xml: &Element, action: &str) -> Result<Element, SoapError> {
    let body = xml
        .get_child("Body")
        .ok_or_else(|| SoapError::Parse("Missing SOAP Body".to_string()))?;

    if let Some(fault) = body.get_child("Fault") {
        let upnp_error = fault
            .get_child("detail")
            .and_then(|d| d.get_child("UPnPError").or_else(|| d.get_child("UpnPError")));

        let code = upnp_error
            .and_then(|e| e.get_child("errorCode"))
            .and_then(|c| c.get_text())
            .and_then(|t| t.trim().parse::<u16>().ok())
            .unwrap_or(500);

        let description = upnp_error
            .and_then(|e| e.get_child("errorDescription"))
            .or_else(|| fault.get_child("faultstring"))
            .and_then(|d| d.get_text())
            .map(|t| t.trim().to_string())
            .unwrap_or_default();

        return Err(SoapError::Fault { code, description });
    }

    let response_name = format!("{}Response", action);
    body.get_child(response_name.as_str())
        .cloned()
        .ok_or_else(|| SoapError::Parse(format!("Missing {} element", response_name)))
}

fn collect_out_args(response: &Element) -> ArgList {
    response
        .children
        .iter()
        .filter_map(|node| node.as_element())
        .map(|e| {
            let value = e.get_text().map(|t| t.into_owned()).unwrap_or_default();
            (e.name.clone(), value)
        })
        .collect()
}

/// Parse a GENA `TIMEOUT` header (`Second-1800`); `infinite` maps to one day
fn parse_timeout_header(value: &str) -> Option<u32> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("Second-infinite") {
        return Some(86_400);
    }
    value.strip_prefix("Second-")?.parse::<u32>().ok()
}
