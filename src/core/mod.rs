//! Core business logic module
//!
//! Subprocesses and file writes go through [`crate::infra`].
//!
//! # Submodules
//!
//! - [`build_env`] - Prefix/source resolution and search-path environment
//! - [`builder`] - Autotools and meson build procedures
//! - [`global_config`] - Global configuration management
//! - [`pipeline`] - Sequential sync-and-build orchestration
//! - [`project`] - The projects of the stack, in dependency order

pub mod build_env;
pub mod builder;
pub mod global_config;
pub mod pipeline;
pub mod project;
