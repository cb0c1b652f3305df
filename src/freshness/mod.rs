//! Freshness detection: mtime stamps for the watched source.

pub mod mtime;

pub use mtime::ModTime;
