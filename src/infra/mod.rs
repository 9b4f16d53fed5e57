//! Runtime bootstrap helpers for host applications.

pub mod error;
pub mod telemetry;
