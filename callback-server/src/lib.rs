//! Generic UPnP callback server for receiving event notifications.
//!
//! This crate provides a lightweight HTTP server for handling GENA NOTIFY
//! requests. It has no knowledge of the services it receives events for.
//!
//! # Overview
//!
//! - [`CallbackServer`]: HTTP server bound to a local port that accepts
//!   `NOTIFY` requests on any path.
//! - [`EventRouter`]: the set of callback paths that belong to live
//!   subscriptions; matching requests are forwarded to a channel.
//! - [`NotificationPayload`]: path, SID, sequence number and raw XML body of
//!   one request.
//!
//! Each subscription registers its own callback path, so a notification is
//! attributed to its subscription even when it arrives before the device's
//! SUBSCRIBE response (and thus the SID) was processed.
//!
//! The server runs on a tokio runtime; the router is usable from plain
//! synchronous code, and the consumer drains the channel with `try_recv`.

mod error;
pub mod router;
mod server;

pub use error::CallbackError;
pub use router::{EventRouter, NotificationPayload};
pub use server::CallbackServer;
