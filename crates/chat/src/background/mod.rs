//! Background jobs run by the cleanup scheduler.

pub mod message_purge;
