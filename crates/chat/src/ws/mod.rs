//! Live topic subscriptions over WebSocket.
//!
//! The [`Hub`] keeps one bounded queue per connection; [`connection::serve`]
//! drives a single socket; [`handler::subscribe`] is the HTTP upgrade entry
//! point.

pub mod connection;
pub mod handler;
pub mod hub;

pub use hub::{ConnectionKey, Hub, Subscription};

use std::time::Duration;

/// Per-frame write deadline.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default capacity of a connection's delivery queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;
