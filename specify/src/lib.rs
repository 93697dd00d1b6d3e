//! Specify - Spec-Driven Development project bootstrapper
//!
//! This library provides the core functionality for bootstrapping a project
//! directory from the latest published template release: resolving the
//! release asset for an agent variant, streaming it to disk, and deploying
//! the archive into a fresh or existing directory.
//!
//! # Module Structure
//!
//! - `progress` - Step tracker that reports pipeline state to an observer
//! - `selector` - Single-key menu state machine used to pick a variant
//! - `template` - Release resolution, download, extraction and deployment
//! - `config` - INI configuration file
//! - `logging` - File-based tracing setup
//! - `variant` - Supported agent variants
//! - `tools` - PATH probes for external tools
//! - `vcs` - Git repository initialization

pub mod config;
pub mod logging;
pub mod progress;
pub mod selector;
pub mod template;
pub mod tools;
pub mod variant;
pub mod vcs;
