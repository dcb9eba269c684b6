//! Structured logging facility for the agent
//!
//! This module provides a canonical logging facility with:
//! - Single initialization point via `init(profile)`
//! - Request logging macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//!   and `log_mbean_error!` for per-MBean errors recorded in list results
//! - Test capture mode for deterministic assertions
//!
//! # Usage
//!
//! ```rust
//! use jolokia_core::logging_facility::{init, Profile};
//!
//! // Initialize once at application startup
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
