//! Session data types

mod capabilities;
mod flags;
mod upnp_state;

pub use capabilities::DeviceCapabilities;
pub use flags::SessionFlags;
pub use upnp_state::UpnpState;
