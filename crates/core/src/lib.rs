//! Agora core: shared types, error taxonomy, domain entities, and the
//! persistence and identity boundaries both services are written against.

pub mod chat;
pub mod cleanup;
pub mod error;
pub mod identity;
pub mod memory;
pub mod roles;
pub mod session;
pub mod store;
pub mod types;
pub mod user;
