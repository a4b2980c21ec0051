//! tactus-skin: actuation delivery to the haptic vest
//!
//! Keeps a persistent WebSocket channel to the vest and dispatches
//! actuation vectors over it, falling back to the device's HTTP
//! endpoint when the channel is down. Delivery is best-effort per
//! frame; the reflex loop never blocks on a dead vest.

pub mod channel;
pub mod config;
pub mod dispatch;
pub mod error;

pub use channel::{ChannelState, ConnectionManager, ControlChannel};
pub use config::SkinConfig;
pub use dispatch::{ActuationSink, Dispatcher};
pub use error::SkinError;
