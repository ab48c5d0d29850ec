//! Status poller for a single CFX (FiveM) game server.
//!
//! Fetches the public server-list entry on a fixed interval, keeps an
//! online/offline view with player counts, and notifies one listener after
//! each refresh. Every failure mode (transport, HTTP status, payload) folds
//! into the offline state; nothing is surfaced to the caller.

pub mod error;
pub mod listener;
pub mod payload;
pub mod poller;
pub mod source;

pub use error::PollerError;
pub use listener::StatusListener;
pub use payload::ServerData;
pub use poller::{PollerSettings, RefreshReport, StatusHandle, StatusPoller, Transition};
pub use source::{CfxClient, StatusSource};
