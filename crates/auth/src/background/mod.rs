//! Background jobs run by the cleanup scheduler.

pub mod session_sweep;
