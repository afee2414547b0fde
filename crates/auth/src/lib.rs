//! Identity and session service.
//!
//! Issues access/refresh token pairs, rotates and revokes sessions, manages
//! users, and answers identity-verification calls from the chat service.

pub mod auth;
pub mod background;
pub mod config;
pub mod cookie;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod sessions;
pub mod state;
pub mod users;
pub mod verify;

mod blocking;
