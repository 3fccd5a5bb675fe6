//! Infrastructure layer
//!
//! Handles all I/O operations: external processes, git and the filesystem.

pub mod dirs;
pub mod filesystem;
pub mod git;
pub mod process;
pub mod toolchain;
