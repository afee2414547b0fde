//! Row structs as read from PostgreSQL.
//!
//! Each row derives `FromRow` and converts into the matching
//! `agora_core` entity.

pub mod chat;
pub mod session;
pub mod user;
