//! Process id synchronization library.
//!
//! Reads the process ids recorded in a markdown document (`docs/PIDs.md`) and
//! patches the assignments that reference them in a fixed set of scripts, so
//! the scripts never drift from the document.
//!
//! # Pipeline
//!
//! - [`parse`] locates the section for an [`parse::Environment`] and collects
//!   its `Label: pid` lines.
//! - [`normalize`] maps document labels onto the canonical identifiers.
//! - [`patch`] rewrites `NAME = "..."` assignments in each target file.
//! - [`sync`] drives the whole run against a repository root.
//!
//! # Example
//!
//! ```rust,no_run
//! use pid_sync::parse::Environment;
//! use pid_sync::sync::{PidSync, PidSyncOptions};
//!
//! let options = PidSyncOptions {
//!     root: None, // defaults to the current directory
//!     env: Environment::Test,
//! };
//!
//! let report = PidSync::sync_with_options(options).unwrap();
//! for outcome in &report.updated {
//!     println!("Updated: {}", outcome.path.display());
//! }
//! ```

pub mod normalize;
pub mod parse;
pub mod patch;
pub mod sync;
