//! Utilities shared by the madang binaries.

pub mod logger;
pub mod time;
