//! Device and service description parsing.
//!
//! Device descriptions are searched for the renderer device node and its
//! services; service descriptions (SCPD) are used for capability probing
//! only: does an action exist, what range or allowed values does a state
//! variable declare.

use crate::error::{ParseError, ParseResult};
use crate::xml;
use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize)]
struct RawRoot {
    #[serde(rename = "URLBase", default)]
    url_base: Option<String>,
    device: DeviceNode,
}

/// A device node, possibly with embedded devices.
///
/// Service URLs are absolute once the node was obtained through
/// [`DeviceDescription::parse`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceNode {
    pub device_type: String,
    #[serde(default)]
    pub friendly_name: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub model_name: String,
    #[serde(rename = "UDN", default)]
    pub udn: String,
    #[serde(default)]
    service_list: ServiceList,
    #[serde(default)]
    device_list: DeviceList,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ServiceList {
    #[serde(rename = "service", default)]
    services: Vec<ServiceNode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DeviceList {
    #[serde(rename = "device", default)]
    devices: Vec<DeviceNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceNode {
    service_type: String,
    #[serde(rename = "controlURL", default)]
    control_url: String,
    #[serde(rename = "eventSubURL", default)]
    event_sub_url: String,
    #[serde(rename = "SCPDURL", default)]
    scpd_url: String,
}

/// Resolved endpoints of one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    /// Full service type, e.g. `urn:schemas-upnp-org:service:AVTransport:1`
    pub service_type: String,
    pub version: u32,
    pub control_url: String,
    pub event_sub_url: String,
    pub scpd_url: String,
}

/// A parsed device description.
#[derive(Debug, Clone)]
pub struct DeviceDescription {
    pub base_url: Url,
    pub root: DeviceNode,
}

impl DeviceDescription {
    /// Parse a device description fetched from `location`.
    ///
    /// Relative URLs resolve against `URLBase` when present, else against
    /// the location.
    pub fn parse(xml: &str, location: &str) -> ParseResult<Self> {
        let raw: RawRoot = xml::deserialize(xml)?;

        let location = Url::parse(location)
            .map_err(|e| ParseError::InvalidXmlStructure(format!("bad location {}: {}", location, e)))?;
        let base_url = raw
            .url_base
            .as_deref()
            .map(str::trim)
            .filter(|base| !base.is_empty())
            .and_then(|base| Url::parse(base).ok())
            .unwrap_or(location);

        let mut root = raw.device;
        root.resolve_urls(&base_url)?;

        Ok(Self { base_url, root })
    }

    /// First device (depth first, root included) whose type contains `device_type`.
    pub fn find_device(&self, device_type: &str) -> Option<&DeviceNode> {
        self.root.find_device(device_type)
    }
}

impl DeviceNode {
    fn find_device(&self, device_type: &str) -> Option<&DeviceNode> {
        if self.device_type.contains(device_type) {
            return Some(self);
        }
        self.device_list
            .devices
            .iter()
            .find_map(|d| d.find_device(device_type))
    }

    /// Locate a service by type fragment, e.g. `"AVTransport"`.
    ///
    /// Returns `None` if the service is absent or lacks a control URL.
    pub fn find_service(&self, service_type: &str) -> Option<ServiceEndpoint> {
        let fragment = format!(":{}:", service_type);
        self.service_list
            .services
            .iter()
            .find(|s| s.service_type.contains(&fragment) && !s.control_url.is_empty())
            .map(|s| ServiceEndpoint {
                service_type: s.service_type.clone(),
                version: s
                    .service_type
                    .rsplit(':')
                    .next()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(1),
                control_url: s.control_url.clone(),
                event_sub_url: s.event_sub_url.clone(),
                scpd_url: s.scpd_url.clone(),
            })
    }

    pub fn embedded_devices(&self) -> &[DeviceNode] {
        &self.device_list.devices
    }

    fn resolve_urls(&mut self, base: &Url) -> ParseResult<()> {
        for service in &mut self.service_list.services {
            for url in [
                &mut service.control_url,
                &mut service.event_sub_url,
                &mut service.scpd_url,
            ] {
                let trimmed = url.trim().to_string();
                if trimmed.is_empty() {
                    continue;
                }
                *url = base
                    .join(&trimmed)
                    .map_err(|e| ParseError::InvalidXmlStructure(format!("bad URL {}: {}", trimmed, e)))?
                    .to_string();
            }
        }
        for device in &mut self.device_list.devices {
            device.resolve_urls(base)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScpd {
    #[serde(default)]
    action_list: ActionList,
    #[serde(default)]
    service_state_table: StateTable,
}

#[derive(Debug, Default, Deserialize)]
struct ActionList {
    #[serde(rename = "action", default)]
    actions: Vec<RawAction>,
}

#[derive(Debug, Deserialize)]
struct RawAction {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct StateTable {
    #[serde(rename = "stateVariable", default)]
    variables: Vec<StateVariable>,
}

/// A state variable declared in an SCPD.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateVariable {
    pub name: String,
    #[serde(default)]
    pub data_type: String,
    #[serde(default)]
    allowed_value_list: Option<AllowedValueList>,
    #[serde(default)]
    allowed_value_range: Option<AllowedValueRange>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AllowedValueList {
    #[serde(rename = "allowedValue", default)]
    values: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AllowedValueRange {
    #[serde(default)]
    minimum: Option<String>,
    #[serde(default)]
    maximum: Option<String>,
    #[serde(default)]
    step: Option<String>,
}

/// `{minimum, maximum, step}` of an integer state variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntRange {
    pub min: i32,
    pub max: i32,
    pub step: i32,
}

impl StateVariable {
    /// Integer range from `allowedValueRange`; step defaults to 1.
    pub fn get_int_range(&self) -> Option<IntRange> {
        let range = self.allowed_value_range.as_ref()?;
        let min = range.minimum.as_deref()?.trim().parse().ok()?;
        let max = range.maximum.as_deref()?.trim().parse().ok()?;
        let step = range
            .step
            .as_deref()
            .and_then(|s| s.trim().parse().ok())
            .filter(|s: &i32| *s > 0)
            .unwrap_or(1);
        (min <= max).then_some(IntRange { min, max, step })
    }

    /// Membership in `allowedValueList`; a variable without a list allows nothing.
    pub fn var_allows_value(&self, value: &str) -> bool {
        self.allowed_value_list
            .as_ref()
            .map_or(false, |list| list.values.iter().any(|v| v.trim() == value))
    }

    pub fn allowed_values(&self) -> impl Iterator<Item = &str> {
        self.allowed_value_list
            .iter()
            .flat_map(|list| list.values.iter().map(|v| v.trim()))
    }
}

/// A parsed service description (SCPD).
#[derive(Debug, Clone, Default)]
pub struct ServiceDescription {
    actions: Vec<String>,
    variables: Vec<StateVariable>,
}

impl ServiceDescription {
    pub fn parse(xml: &str) -> ParseResult<Self> {
        let raw: RawScpd = xml::deserialize(xml)?;
        Ok(Self {
            actions: raw
                .action_list
                .actions
                .into_iter()
                .map(|a| a.name.trim().to_string())
                .collect(),
            variables: raw.service_state_table.variables,
        })
    }

    pub fn service_get_action(&self, name: &str) -> bool {
        self.actions.iter().any(|a| a == name)
    }

    /// Alias of [`service_get_action`](Self::service_get_action)
    pub fn has_action(&self, name: &str) -> bool {
        self.service_get_action(name)
    }

    pub fn service_get_state_var(&self, name: &str) -> Option<&StateVariable> {
        self.variables.iter().find(|v| v.name.trim() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEVICE_XML: &str = r#"<?xml version="1.0"?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <specVersion><major>1</major><minor>0</minor></specVersion>
  <device>
    <deviceType>urn:schemas-upnp-org:device:Basic:1</deviceType>
    <friendlyName>Box</friendlyName>
    <UDN>uuid:root</UDN>
    <deviceList>
      <device>
        <deviceType>urn:schemas-upnp-org:device:MediaRenderer:1</deviceType>
        <friendlyName>Living Room</friendlyName>
        <manufacturer>Acme</manufacturer>
        <modelName>Streamer</modelName>
        <UDN>uuid:renderer</UDN>
        <serviceList>
          <service>
            <serviceType>urn:schemas-upnp-org:service:AVTransport:1</serviceType>
            <serviceId>urn:upnp-org:serviceId:AVTransport</serviceId>
            <SCPDURL>/avt.xml</SCPDURL>
            <controlURL>/AVTransport/control</controlURL>
            <eventSubURL>/AVTransport/event</eventSubURL>
          </service>
          <service>
            <serviceType>urn:schemas-upnp-org:service:RenderingControl:2</serviceType>
            <serviceId>urn:upnp-org:serviceId:RenderingControl</serviceId>
            <SCPDURL>rc.xml</SCPDURL>
            <controlURL>http://10.0.0.9:8080/rc/control</controlURL>
            <eventSubURL>/rc/event</eventSubURL>
          </service>
        </serviceList>
      </device>
    </deviceList>
  </device>
</root>"#;

    #[test]
    fn test_find_renderer_services() {
        let desc = DeviceDescription::parse(DEVICE_XML, "http://10.0.0.9:49152/desc/root.xml").unwrap();
        let renderer = desc.find_device("MediaRenderer").unwrap();

        assert_eq!(renderer.friendly_name, "Living Room");
        assert_eq!(renderer.udn, "uuid:renderer");

        let avt = renderer.find_service("AVTransport").unwrap();
        assert_eq!(avt.version, 1);
        assert_eq!(avt.control_url, "http://10.0.0.9:49152/AVTransport/control");
        assert_eq!(avt.event_sub_url, "http://10.0.0.9:49152/AVTransport/event");

        let rc = renderer.find_service("RenderingControl").unwrap();
        assert_eq!(rc.version, 2);
        assert_eq!(rc.control_url, "http://10.0.0.9:8080/rc/control");
        assert_eq!(rc.scpd_url, "http://10.0.0.9:49152/desc/rc.xml");

        assert!(renderer.find_service("ConnectionManager").is_none());
    }

    #[test]
    fn test_url_base_takes_precedence() {
        let xml = r#"<root><URLBase>http://192.168.1.5:1400/</URLBase><device><deviceType>urn:schemas-upnp-org:device:MediaRenderer:1</deviceType><serviceList><service><serviceType>urn:schemas-upnp-org:service:ConnectionManager:1</serviceType><controlURL>cm/control</controlURL><eventSubURL>cm/event</eventSubURL><SCPDURL>cm.xml</SCPDURL></service></serviceList></device></root>"#;

        let desc = DeviceDescription::parse(xml, "http://other:1/x.xml").unwrap();
        let cm = desc.find_device("MediaRenderer").unwrap().find_service("ConnectionManager").unwrap();
        assert_eq!(cm.control_url, "http://192.168.1.5:1400/cm/control");
    }

    #[test]
    fn test_missing_device_type() {
        let desc = DeviceDescription::parse(DEVICE_XML, "http://10.0.0.9/").unwrap();
        assert!(desc.find_device("MediaServer").is_none());
    }

    const SCPD_XML: &str = r#"<?xml version="1.0"?>
<scpd xmlns="urn:schemas-upnp-org:service-1-0">
  <actionList>
    <action><name>SetVolume</name></action>
    <action><name>GetVolume</name></action>
  </actionList>
  <serviceStateTable>
    <stateVariable sendEvents="no">
      <name>Volume</name>
      <dataType>ui2</dataType>
      <allowedValueRange><minimum>0</minimum><maximum>100</maximum><step>5</step></allowedValueRange>
    </stateVariable>
    <stateVariable sendEvents="no">
      <name>CurrentPlayMode</name>
      <dataType>string</dataType>
      <allowedValueList><allowedValue>NORMAL</allowedValue><allowedValue>REPEAT_ALL</allowedValue></allowedValueList>
    </stateVariable>
    <stateVariable sendEvents="no">
      <name>Loudness</name>
      <dataType>boolean</dataType>
    </stateVariable>
  </serviceStateTable>
</scpd>"#;

    #[test]
    fn test_service_description_probing() {
        let scpd = ServiceDescription::parse(SCPD_XML).unwrap();

        assert!(scpd.service_get_action("SetVolume"));
        assert!(!scpd.has_action("SetMute"));

        let volume = scpd.service_get_state_var("Volume").unwrap();
        assert_eq!(volume.get_int_range(), Some(IntRange { min: 0, max: 100, step: 5 }));

        let mode = scpd.service_get_state_var("CurrentPlayMode").unwrap();
        assert!(mode.var_allows_value("REPEAT_ALL"));
        assert!(!mode.var_allows_value("SHUFFLE"));
        assert_eq!(mode.get_int_range(), None);

        let loudness = scpd.service_get_state_var("Loudness").unwrap();
        assert!(!loudness.var_allows_value("1"));
        assert!(scpd.service_get_state_var("Mute").is_none());
    }
}
