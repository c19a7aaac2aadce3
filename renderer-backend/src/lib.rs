//! UPnP AV renderer backend
//!
//! Drives a remote UPnP MediaRenderer as if it were a local player. The
//! application owns the tracklist and sees a player state (status, track,
//! time, volume, mute, mode); the backend keeps the device in step with it
//! and reflects what the device actually does, including playback started
//! by other controllers.
//!
//! # Architecture
//!
//! ```text
//! CallbackServer ──NOTIFY──▶ Scheduler ──on_http──▶ RendererSession
//!                                        on_tick      │  EventListener (GENA)
//!                                                     │  Reconciler ◀── Command
//!                                                     ▼
//!                                        PlayerState ──▶ StateSink
//! ```
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use renderer_backend::{BackendConfig, Command, Scheduler};
//! use player_state::ChannelSink;
//!
//! let config = BackendConfig::default();
//! let mut scheduler = Scheduler::new(&config)?;
//!
//! let (sink, changes) = ChannelSink::new();
//! let commands = scheduler.connect("http://192.168.1.20:49152/description.xml", config, Box::new(sink))?;
//! commands.send(Command::Splice { idx: 0, delete_count: 0, items: tracks, source_client_id: None });
//! commands.send(Command::Play);
//!
//! loop {
//!     scheduler.run_once(std::time::Instant::now());
//!     for change in changes.try_iter() {
//!         println!("{} = {:?}", change.variable.key(), change.value);
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod listener;
pub mod logging;
pub mod message;
pub mod model;
mod reconciler;
pub mod scheduler;
pub mod session;
pub mod tracklist;

pub use config::BackendConfig;
pub use error::{BackendError, Result};
pub use listener::{EventListener, ListenerTiming};
pub use logging::{init_logging, init_logging_from_env, is_initialized, LoggingError, LoggingMode};
pub use message::{Command, CommandSender, SessionMessage};
pub use model::{DeviceCapabilities, SessionFlags, UpnpState};
pub use scheduler::{Backend, CallbackEndpoint, Scheduler};
pub use session::RendererSession;
pub use tracklist::{TrackTimes, Tracklist, TracklistChange};
