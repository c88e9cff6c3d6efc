//! # grblstream Core
//!
//! Shared error taxonomy and result alias for all grblstream crates.

pub mod error;

pub use error::{ConnectionError, Error, Result, SettingsError, StreamError};
