//! Process id synchronization functionality.
//!
//! # Sync Logic
//!
//! The sync process:
//! 1. Reads `docs/PIDs.md` under the repository root
//! 2. Extracts the section for the selected environment and normalizes its labels
//! 3. Patches each target file in turn (configure, e2e, verify), writing it back
//!    even when nothing matched
//!
//! The document is fully parsed before any target is touched, so a missing
//! section leaves every file as it was.
//!
//! # Examples
//!
//! ```rust,no_run
//! use pid_sync::parse::Environment;
//! use pid_sync::sync::{PidSync, PidSyncOptions};
//! use std::path::PathBuf;
//!
//! let options = PidSyncOptions {
//!     root: Some(PathBuf::from("/path/to/repo")),
//!     env: Environment::Prod,
//! };
//!
//! PidSync::sync_with_options(options).unwrap();
//! ```

use std::path::{Path, PathBuf};

#[cfg(feature = "tracing")]
use tracing::{debug, info};

use crate::normalize::{CanonicalKey, CanonicalPidMap};
use crate::parse::{Environment, ParseError, PidDocument};
use crate::patch::{TARGETS, TargetFile};

/// Location of the source document relative to the repository root.
pub const DOCUMENT_PATH: &str = "docs/PIDs.md";

/// Main synchronization service.
pub struct PidSync;

impl PidSync {
  /// Synchronizes every target file with the document section for `options.env`.
  pub fn sync_with_options(options: PidSyncOptions) -> Result<SyncReport, PidSyncError> {
    Self::sync_with_progress(options, |_| {})
  }

  /// Like [`PidSync::sync_with_options`], reporting each step to `on_event` as
  /// it happens.
  ///
  /// Targets written before a failure have already been reported when the
  /// error is returned.
  pub fn sync_with_progress<F>(options: PidSyncOptions, mut on_event: F) -> Result<SyncReport, PidSyncError>
  where
    F: FnMut(SyncEvent<'_>),
  {
    #[cfg(feature = "tracing")]
    info!(env = %options.env, "Starting pid sync");

    let PidSyncOptions { root, env } = options;

    let root = root.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    #[cfg(feature = "tracing")]
    debug!(?root, "Resolved repository root");

    let pids = Self::load(&root, env)?;
    let missing = pids.missing();
    on_event(SyncEvent::Loaded { missing: &missing });

    let mut updated = Vec::with_capacity(TARGETS.len());
    for target in &TARGETS {
      let outcome = Self::update_target(&root, target, &pids)?;
      on_event(SyncEvent::Updated(&outcome));
      updated.push(outcome);
    }

    #[cfg(feature = "tracing")]
    info!("Sync completed successfully");

    Ok(SyncReport {
      env,
      missing,
      updated,
    })
  }

  /// Reads the document under `root` and resolves the canonical pids for `env`.
  pub fn load(root: &Path, env: Environment) -> Result<CanonicalPidMap, PidSyncError> {
    let path = root.join(DOCUMENT_PATH);

    let text = std::fs::read_to_string(&path).map_err(|source| PidSyncError::DocumentIo {
      path: path.clone(),
      source,
    })?;

    let raw = PidDocument::from(text.as_str())
      .section(env)
      .map_err(|err| match err {
        ParseError::SectionNotFound { heading } => PidSyncError::SectionNotFound {
          heading,
          path: path.clone(),
        },
      })?;

    let pids = CanonicalPidMap::from(&raw);

    #[cfg(feature = "tracing")]
    debug!(missing = ?pids.missing(), "Loaded pids");

    Ok(pids)
  }

  /// Patches one target file in place.
  ///
  /// The file is always written back, even when no assignment matched.
  pub fn update_target(
    root: &Path,
    target: &TargetFile,
    pids: &CanonicalPidMap,
  ) -> Result<TargetOutcome, PidSyncError> {
    let path = root.join(target.path);

    #[cfg(feature = "tracing")]
    debug!(target_file = target.name, ?path, "Patching target");

    let text = std::fs::read_to_string(&path).map_err(|source| PidSyncError::TargetIo {
      path: path.clone(),
      source,
    })?;

    let patched = target.patch(&text, pids);

    std::fs::write(&path, patched.text).map_err(|source| PidSyncError::Write {
      path: path.clone(),
      source,
    })?;

    #[cfg(feature = "tracing")]
    debug!(target_file = target.name, replaced = patched.replaced, "Wrote target");

    Ok(TargetOutcome {
      path: PathBuf::from(target.path),
      replaced: patched.replaced,
    })
  }
}

/// Errors that can occur during pid synchronization.
#[derive(Debug, thiserror::Error)]
pub enum PidSyncError {
  /// Error reading the source document
  #[error("Failed to read {}: {source}", path.display())]
  DocumentIo {
    path: PathBuf,
    source: std::io::Error,
  },
  /// The selected environment has no section in the document
  #[error("Could not find section header '{heading}' in {}", path.display())]
  SectionNotFound { heading: String, path: PathBuf },
  /// Error reading a target file
  #[error("Failed to read target {}: {source}", path.display())]
  TargetIo {
    path: PathBuf,
    source: std::io::Error,
  },
  /// Error writing a patched target file
  #[error("Failed to write {}: {source}", path.display())]
  Write {
    path: PathBuf,
    source: std::io::Error,
  },
}

/// Configuration options for pid synchronization.
pub struct PidSyncOptions {
  /// Repository root. If None, defaults to the current directory.
  pub root: Option<PathBuf>,
  /// Environment whose section is read.
  pub env: Environment,
}

/// Progress reported by [`PidSync::sync_with_progress`].
#[derive(Debug, Clone, Copy)]
pub enum SyncEvent<'a> {
  /// The document section was read. Lists keys without a pid.
  Loaded { missing: &'a [CanonicalKey] },
  /// A target file was written back.
  Updated(&'a TargetOutcome),
}

/// What a completed run did.
#[derive(Debug)]
pub struct SyncReport {
  pub env: Environment,
  /// Canonical keys the document had no pid for.
  pub missing: Vec<CanonicalKey>,
  /// Target files written, in processing order.
  pub updated: Vec<TargetOutcome>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetOutcome {
  /// Path relative to the repository root.
  pub path: PathBuf,
  pub replaced: usize,
}
