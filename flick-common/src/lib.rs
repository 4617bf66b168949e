//! Common utilities shared across the FlickFinder crates.
//!
//! Kept deliberately small so that every crate (and every test binary) can
//! depend on it for logging setup without pulling in the HTTP or search stack.
//!
//! # Overview
//!
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`LogFormat`]: text or JSON log encoding, parsed from the config string
//!
//! ```rust
//! use flick_common::observability::LogConfig;
//! use flick_common::LogFormat;
//!
//! let cfg = LogConfig {
//!     format: "json".parse().unwrap(),
//!     ..LogConfig::default()
//! };
//! assert_eq!(cfg.format, LogFormat::Json);
//! assert_eq!(cfg.app_name, "flickfinder");
//! ```
pub mod observability;

pub use observability::LogFormat;
