//! Reload Module
//!
//! Pushes fresh builds of the watched file to connected browsers.
//!
//! # Architecture
//!
//! ```text
//! session writer --tick--> ChangePoller --changed--> Compiler
//!       ^                        |
//!       +------ Poll ------------+
//!       |
//!       +--> WebSocket Text --> Browser
//! ```
//!
//! # Modules
//!
//! - `poller` - mtime check and rebuild on change
//! - `session` - one WebSocket connection: heartbeats, liveness, pushes

pub mod poller;
pub mod session;
