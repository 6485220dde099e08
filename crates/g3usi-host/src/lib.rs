//! Host side of a G3-PLC USI modem link.
//!
//! A [`UsiHost`] owns one link. Frames read from it are demultiplexed by
//! sub-protocol, decoded, and either complete a pending synchronous call or
//! go to the callback registered for their message kind.

pub mod callbacks;
pub mod config;
pub mod connector;
pub mod correlation;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod host;
pub mod layer;

pub use callbacks::{Callback, CallbackTable, CallbackTableBuilder, SnifferSink};
pub use config::HostConfig;
pub use connector::{open, open_with_config};
pub use correlation::{Correlator, PendingCall, SyncChannel};
pub use dispatch::{Dispatcher, ProtocolHandler};
pub use error::{HostError, Result};
pub use event::{ConfirmKey, Event};
pub use host::UsiHost;
pub use layer::Layer;
