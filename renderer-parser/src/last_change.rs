//! GENA property-set decoding.
//!
//! UPnP events are wrapped in a property set. AVTransport and
//! RenderingControl put their state into an escaped `LastChange` document:
//!
//! ```xml
//! <e:propertyset xmlns:e="urn:schemas-upnp-org:event-1-0">
//!   <e:property>
//!     <LastChange>&lt;Event xmlns="urn:schemas-upnp-org:metadata-1-0/AVT/"&gt;
//!       &lt;InstanceID val="0"&gt;&lt;TransportState val="PLAYING"/&gt;&lt;/InstanceID&gt;
//!     &lt;/Event&gt;</LastChange>
//!   </e:property>
//! </e:propertyset>
//! ```

use crate::error::{ParseError, ParseResult};
use crate::xml;
use serde::{Deserialize, Serialize};
use xmltree::Element;

/// One state variable reported by an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyValue {
    pub name: String,
    pub val: String,
    /// `channel` attribute of RenderingControl variables (e.g. `Master`)
    pub channel: Option<String>,
}

impl PropertyValue {
    pub fn new(name: impl Into<String>, val: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            val: val.into(),
            channel: None,
        }
    }

    /// Whether this value applies to the master channel (or has no channel).
    pub fn is_master(&self) -> bool {
        is_master_channel(self.channel.as_deref())
    }
}

/// Whether a `channel` attribute names the master channel; no channel counts.
pub fn is_master_channel(channel: Option<&str>) -> bool {
    channel.map_or(true, |c| c.eq_ignore_ascii_case("Master"))
}

/// Decode every property of a NOTIFY body, expanding `LastChange`.
pub fn parse_property_set(body: &str) -> ParseResult<Vec<PropertyValue>> {
    let root = xml::parse_element(body)?;
    if root.name != "propertyset" {
        return Err(ParseError::InvalidXmlStructure(format!(
            "expected propertyset, found {}",
            root.name
        )));
    }

    let mut values = Vec::new();
    for property in xml::children_named(&root, "property") {
        for variable in property.children.iter().filter_map(|n| n.as_element()) {
            let text = xml::element_text(variable);
            if variable.name == "LastChange" {
                if !text.is_empty() {
                    values.extend(parse_last_change(&text)?);
                }
            } else {
                values.push(PropertyValue::new(variable.name.clone(), text));
            }
        }
    }

    Ok(values)
}

/// Decode an unescaped `<Event>` document for instance 0.
pub fn parse_last_change(event: &str) -> ParseResult<Vec<PropertyValue>> {
    let root = xml::parse_element(event)?;
    let instance = xml::find_descendant(&root, &|e: &Element| {
        e.name == "InstanceID" && xml::attribute(e, "val").map_or(true, |v| v.trim() == "0")
    })
    .ok_or_else(|| ParseError::MissingRequiredElement("InstanceID".to_string()))?;

    Ok(instance
        .children
        .iter()
        .filter_map(|n| n.as_element())
        .map(|e| PropertyValue {
            name: e.name.clone(),
            val: xml::attribute(e, "val").unwrap_or_default().to_string(),
            channel: xml::attribute(e, "channel").map(str::to_string),
        })
        .collect())
}
