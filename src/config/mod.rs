//! Configuration and constants
//!
//! - [`defaults`] - Built-in default values
//! - [`urls`] - Upstream repository locations and branches

pub mod defaults;
pub mod urls;
