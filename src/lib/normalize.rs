//! Maps the labels people write in the document onto the canonical
//! identifiers used by the scripts.

use std::{collections::BTreeMap, fmt};

#[cfg(feature = "tracing")]
use tracing::trace;

use crate::parse::RawPidMap;

/// The fixed vocabulary shared by every target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CanonicalKey {
  Coordinator,
  LockManager,
  TokenManager,
  StateManager,
  MockUsda,
}

impl CanonicalKey {
  pub const ALL: [CanonicalKey; 5] = [
    CanonicalKey::Coordinator,
    CanonicalKey::LockManager,
    CanonicalKey::TokenManager,
    CanonicalKey::StateManager,
    CanonicalKey::MockUsda,
  ];

  /// Upper snake case name, e.g. `LOCK_MANAGER`.
  pub fn as_str(self) -> &'static str {
    match self {
      CanonicalKey::Coordinator => "COORDINATOR",
      CanonicalKey::LockManager => "LOCK_MANAGER",
      CanonicalKey::TokenManager => "TOKEN_MANAGER",
      CanonicalKey::StateManager => "STATE_MANAGER",
      CanonicalKey::MockUsda => "MOCK_USDA",
    }
  }

  /// Document labels for this key, in lookup order.
  pub fn labels(self) -> &'static [&'static str] {
    match self {
      CanonicalKey::Coordinator => &["Coordinator"],
      CanonicalKey::LockManager => &["Lock Manager"],
      CanonicalKey::TokenManager => &["Token Manager"],
      CanonicalKey::StateManager => &["State Manager"],
      CanonicalKey::MockUsda => &["Mock USDA", "USDA (real)"],
    }
  }
}

impl fmt::Display for CanonicalKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Pids keyed by canonical identifier. Keys without a pid are absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CanonicalPidMap {
  pids: BTreeMap<CanonicalKey, String>,
}

impl From<&RawPidMap<'_>> for CanonicalPidMap {
  fn from(raw: &RawPidMap<'_>) -> Self {
    let pids = CanonicalKey::ALL
      .into_iter()
      .filter_map(|key| {
        let pid = key.labels().iter().find_map(|label| raw.get(label))?;

        #[cfg(feature = "tracing")]
        trace!(%key, pid, "Resolved pid");

        Some((key, pid.to_string()))
      })
      .collect();

    Self { pids }
  }
}

impl CanonicalPidMap {
  pub fn get(&self, key: CanonicalKey) -> Option<&str> {
    self.pids.get(&key).map(String::as_str)
  }

  #[cfg(test)]
  pub(crate) fn insert(&mut self, key: CanonicalKey, pid: impl Into<String>) {
    let pid = pid.into();
    if pid.is_empty() {
      self.pids.remove(&key);
    } else {
      self.pids.insert(key, pid);
    }
  }

  /// Canonical keys with no pid, in canonical order.
  pub fn missing(&self) -> Vec<CanonicalKey> {
    CanonicalKey::ALL
      .into_iter()
      .filter(|key| !self.pids.contains_key(key))
      .collect()
  }
}
