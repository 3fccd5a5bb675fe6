//! Stackbuild - check out and build the GIMP dependency stack
//!
//! Keeps one checkout per project (mypaint-brushes, libmypaint, babl, gegl,
//! gimp) under a per-version source root, and rebuilds into a per-version
//! private prefix whatever changed upstream, strictly in dependency order.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Environment resolution, build planning and orchestration
//! - [`infra`] - Infrastructure layer (git, subprocesses, filesystem)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
