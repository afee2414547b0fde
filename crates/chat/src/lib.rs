//! Chat service.
//!
//! Categories, topics, and message history over REST, plus live delivery of
//! message events to WebSocket subscribers through the fan-out [`ws::Hub`].
//! Callers are identified by the auth service.

pub mod background;
pub mod config;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod services;
pub mod state;
pub mod verifier;
pub mod ws;
