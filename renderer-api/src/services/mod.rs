//! Action definitions, one module per service

pub mod av_transport;
pub mod connection_manager;
pub mod rendering_control;
