//! # renderer-parser
//!
//! XML parsing for UPnP media renderers: device and service descriptions,
//! DIDL-Lite metadata, GENA property sets and UPnP time strings, plus the
//! internal [`Track`] model these formats map onto.
//!
//! ```rust,ignore
//! use renderer_parser::{didl_to_track, parse_property_set};
//!
//! for value in parse_property_set(&notify_body)? {
//!     if value.name == "CurrentTrackMetaData" {
//!         let track = didl_to_track(&value.val);
//!     }
//! }
//! ```

pub mod description;
pub mod didl;
pub mod error;
pub mod last_change;
pub mod time;
pub mod track;
pub mod xml;

pub use description::{DeviceDescription, DeviceNode, IntRange, ServiceDescription, ServiceEndpoint, StateVariable};
pub use didl::{didl_to_track, parse_didl, track_to_didl};
pub use error::{ParseError, ParseResult};
pub use last_change::{is_master_channel, parse_last_change, parse_property_set, PropertyValue};
pub use time::{format_upnp_time, format_upnp_time_millis, parse_upnp_time};
pub use track::{Source, Track, TrackMetadata};
