//! Player state for UPnP renderer sessions
//!
//! The player-state schema is the only view of a renderer the rest of the
//! application observes. It never carries raw UPnP variable names; the
//! renderer backend translates device state into these types.
//!
//! # Features
//!
//! - **Change Detection**: setters only publish when a value actually changes
//! - **Pluggable Sink**: changes go to any [`StateSink`]
//! - **Channel Delivery**: [`ChannelSink`] pairs with a [`ChangeReceiver`]
//!
//! # Quick Start
//!
//! ```rust
//! use player_state::{ChannelSink, PlayMode, PlayerState, PlayerVariable};
//!
//! let (sink, changes) = ChannelSink::new();
//! let mut state = PlayerState::new(Box::new(sink));
//!
//! state.set_mode(PlayMode::Shuffle);
//!
//! let change = changes.try_recv().unwrap();
//! assert_eq!(change.context, "player");
//! assert_eq!(change.variable, PlayerVariable::Mode);
//! ```

pub mod error;
pub mod event;
pub mod iter;
pub mod sink;
pub mod state;
pub mod status;

pub use error::{Result, StateError};
pub use event::{CurrentTime, PlayerVariable, StateChange, StateValue, PLAYER_CONTEXT};
pub use iter::ChangeReceiver;
pub use sink::{ChannelSink, NullSink, StateSink};
pub use state::PlayerState;
pub use status::{PlayMode, PlayerStatus};
