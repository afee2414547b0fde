//! HTTP plumbing shared by the Agora services.
//!
//! Both binaries (`agora-auth` and `agora-chat`) map domain errors, wrap
//! payloads, parse bearer tokens, and boot their routers the same way; that
//! common ground lives here.

pub mod auth;
pub mod config;
pub mod error;
pub mod response;
pub mod server;
pub mod telemetry;
