//! Typed control API for UPnP AV media renderers
//!
//! This crate provides type-safe SOAP actions for the AVTransport,
//! RenderingControl and ConnectionManager services. It uses the private
//! `soap-client` crate for low-level communication.
//!
//! Actions are executed through a [`RendererClient`], which talks to the
//! device through a [`ControlTransport`]. [`HttpTransport`] is the real
//! implementation; tests substitute their own.
//!
//! ```rust,ignore
//! use renderer_api::services::av_transport::{GetPositionInfo, GetPositionInfoRequest};
//! use renderer_api::{HttpTransport, RendererClient, ServiceEndpoints};
//!
//! let endpoints = ServiceEndpoints::from_device(renderer)?;
//! let client = RendererClient::new(Box::new(HttpTransport::new(SoapClient::new(), endpoints)));
//! let position = client.execute::<GetPositionInfo>(&GetPositionInfoRequest {})?;
//! ```
//!
//! Event subscriptions are handled by [`ManagedSubscription`], which tracks
//! expiry and renews on request.

pub mod action;
pub mod client;
pub mod error;
pub mod service;
pub mod services;
pub mod subscription;
pub mod transport;
pub mod transport_actions;
pub mod volume;

pub use action::{FromArg, ToArg, UpnpAction};
pub use client::RendererClient;
pub use error::{ApiError, Result};
pub use service::Service;
pub use soap_client::{ArgList, SoapClient};
pub use subscription::ManagedSubscription;
pub use transport::{ControlTransport, HttpTransport, ServiceEndpoints};
pub use transport_actions::TransportActions;
pub use volume::VolumeRange;

#[doc(hidden)]
pub use paste::paste as __paste;
