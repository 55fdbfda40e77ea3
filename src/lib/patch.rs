//! In-place patching of `NAME = "value"` assignments.
//!
//! Each [`TargetFile`] knows which canonical keys it references, the order
//! to apply them in and how it spells them. Assignments are found by shape
//! (identifier, `=`, quoted value) so unrelated edits to the target files
//! never break the patch.

use std::{borrow::Cow, collections::HashMap, sync::LazyLock};

use regex::{Captures, Regex};

#[cfg(feature = "tracing")]
use tracing::trace;

use crate::normalize::{CanonicalKey, CanonicalPidMap};

/// How a target file spells the canonical identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameStyle {
  /// `LOCK_MANAGER`
  UpperSnake,
  /// `lockManager`
  LowerCamel,
}

impl NameStyle {
  pub const ALL: [NameStyle; 2] = [NameStyle::UpperSnake, NameStyle::LowerCamel];

  pub fn render(self, key: CanonicalKey) -> Cow<'static, str> {
    match self {
      NameStyle::UpperSnake => Cow::Borrowed(key.as_str()),
      NameStyle::LowerCamel => {
        let mut name = String::new();
        for (i, word) in key.as_str().split('_').enumerate() {
          let word = word.to_ascii_lowercase();
          let mut chars = word.chars();
          if i == 0 {
            name.push_str(&word);
          } else if let Some(first) = chars.next() {
            name.push(first.to_ascii_uppercase());
            name.push_str(chars.as_str());
          }
        }
        Cow::Owned(name)
      }
    }
  }
}

/// A script whose assignments mirror the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetFile {
  /// Short name used in logs.
  pub name: &'static str,
  /// Path relative to the repository root.
  pub path: &'static str,
  pub style: NameStyle,
  /// Keys this file references, in patch order.
  pub keys: &'static [CanonicalKey],
}

pub const CONFIGURE: TargetFile = TargetFile {
  name: "configure",
  path: "contracts/scripts/configure-integration.lua",
  style: NameStyle::UpperSnake,
  keys: &[
    CanonicalKey::MockUsda,
    CanonicalKey::Coordinator,
    CanonicalKey::StateManager,
    CanonicalKey::LockManager,
    CanonicalKey::TokenManager,
  ],
};

pub const E2E: TargetFile = TargetFile {
  name: "e2e",
  path: "contracts/scripts/verify-e2e.lua",
  style: NameStyle::UpperSnake,
  keys: &[
    CanonicalKey::Coordinator,
    CanonicalKey::LockManager,
    CanonicalKey::TokenManager,
    CanonicalKey::StateManager,
    CanonicalKey::MockUsda,
  ],
};

pub const VERIFY: TargetFile = TargetFile {
  name: "verify",
  path: "contracts/verify/verify-test-processes.lua",
  style: NameStyle::LowerCamel,
  keys: &[
    CanonicalKey::Coordinator,
    CanonicalKey::LockManager,
    CanonicalKey::TokenManager,
    CanonicalKey::StateManager,
  ],
};

/// Built-in targets in the order they are patched.
pub const TARGETS: [TargetFile; 3] = [CONFIGURE, E2E, VERIFY];

/// Result of patching one file's text.
#[derive(Debug, Clone, PartialEq)]
pub struct Patched {
  pub text: String,
  /// Number of assignments rewritten.
  pub replaced: usize,
}

impl TargetFile {
  /// Rewrites every assignment of a known key that has a pid.
  ///
  /// Keys without a pid, and keys the text never assigns, are left alone.
  pub fn patch(&self, text: &str, pids: &CanonicalPidMap) -> Patched {
    let mut text = text.to_string();
    let mut replaced = 0;

    for &key in self.keys {
      let Some(pid) = pids.get(key) else {
        continue;
      };

      let pattern = assignment_pattern(self.style, key);

      let count = pattern.find_iter(&text).count();
      if count == 0 {
        continue;
      }

      #[cfg(feature = "tracing")]
      trace!(target_file = self.name, name = %self.style.render(key), pid, count, "Replacing assignments");

      text = pattern
        .replace_all(&text, |caps: &Captures| format!("{}{}{}", &caps[1], pid, &caps[3]))
        .into_owned();
      replaced += count;
    }

    Patched { text, replaced }
  }
}

// One pattern per spelling of every canonical key.
static ASSIGNMENT_PATTERNS: LazyLock<HashMap<(NameStyle, CanonicalKey), Regex>> = LazyLock::new(|| {
  NameStyle::ALL
    .into_iter()
    .flat_map(|style| CanonicalKey::ALL.into_iter().map(move |key| (style, key)))
    .map(|(style, key)| {
      let name = regex::escape(&style.render(key));
      let pattern = Regex::new(&format!(r#"(\b{name}\s*=\s*")(.*?)(")"#))
        .expect("assignment pattern must compile");
      ((style, key), pattern)
    })
    .collect()
});

fn assignment_pattern(style: NameStyle, key: CanonicalKey) -> &'static Regex {
  &ASSIGNMENT_PATTERNS[&(style, key)]
}

#[cfg(test)]
mod tests {
  use super::*;

  fn pids(entries: &[(CanonicalKey, &str)]) -> CanonicalPidMap {
    let mut pids = CanonicalPidMap::default();
    for (key, pid) in entries {
      pids.insert(*key, *pid);
    }
    pids
  }

  #[test]
  fn test_pattern_for_every_spelling() {
    for style in NameStyle::ALL {
      for key in CanonicalKey::ALL {
        let assignment = format!("{} = \"old\"", style.render(key));
        assert!(assignment_pattern(style, key).is_match(&assignment), "{assignment}");
      }
    }
  }

  #[test]
  fn test_pid_with_quote_written_verbatim() {
    let text = "COORDINATOR = \"x\"\n";
    let patched = E2E.patch(text, &pids(&[(CanonicalKey::Coordinator, "a\"b")]));

    assert_eq!(patched.text, "COORDINATOR = \"a\"b\"\n");
  }

  #[test]
  fn test_render_styles() {
    assert_eq!(NameStyle::UpperSnake.render(CanonicalKey::LockManager), "LOCK_MANAGER");
    assert_eq!(NameStyle::LowerCamel.render(CanonicalKey::LockManager), "lockManager");
    assert_eq!(NameStyle::LowerCamel.render(CanonicalKey::Coordinator), "coordinator");
    assert_eq!(NameStyle::LowerCamel.render(CanonicalKey::MockUsda), "mockUsda");
  }

  #[test]
  fn test_patch_replaces_quoted_value_only() {
    let text = "local PROCESS_IDS = {\n  COORDINATOR = \"old\", -- main\n  LOCK_MANAGER=\"x\"\n}\n";
    let patched = CONFIGURE.patch(
      text,
      &pids(&[(CanonicalKey::Coordinator, "100"), (CanonicalKey::LockManager, "200")]),
    );

    assert_eq!(
      patched.text,
      "local PROCESS_IDS = {\n  COORDINATOR = \"100\", -- main\n  LOCK_MANAGER=\"200\"\n}\n"
    );
    assert_eq!(patched.replaced, 2);
  }

  #[test]
  fn test_patch_every_occurrence() {
    let text = "COORDINATOR = \"a\"\nprint(1)\nCOORDINATOR = \"b\"\n";
    let patched = E2E.patch(text, &pids(&[(CanonicalKey::Coordinator, "100")]));

    assert_eq!(patched.text, "COORDINATOR = \"100\"\nprint(1)\nCOORDINATOR = \"100\"\n");
    assert_eq!(patched.replaced, 2);
  }

  #[test]
  fn test_patch_is_idempotent() {
    let text = "coordinator = \"old\"\nlockManager = \"old\"\n";
    let values = pids(&[(CanonicalKey::Coordinator, "1"), (CanonicalKey::LockManager, "2")]);

    let first = VERIFY.patch(text, &values);
    let second = VERIFY.patch(&first.text, &values);
    assert_eq!(first.text, second.text);
  }

  #[test]
  fn test_missing_pid_skipped() {
    let text = "COORDINATOR = \"keep\"\nLOCK_MANAGER = \"keep\"\n";
    let patched = CONFIGURE.patch(text, &pids(&[(CanonicalKey::TokenManager, "9")]));

    assert_eq!(patched.text, text);
    assert_eq!(patched.replaced, 0);
  }

  #[test]
  fn test_verify_ignores_usda_and_upper_names() {
    let text = "MOCK_USDA = \"u\"\nCOORDINATOR = \"c\"\ncoordinator = \"c\"\n";
    let patched = VERIFY.patch(
      text,
      &pids(&[(CanonicalKey::MockUsda, "9"), (CanonicalKey::Coordinator, "1")]),
    );

    assert_eq!(patched.text, "MOCK_USDA = \"u\"\nCOORDINATOR = \"c\"\ncoordinator = \"1\"\n");
  }

  #[test]
  fn test_word_boundary() {
    let text = "MY_COORDINATOR = \"x\"\nCOORDINATOR = \"x\"\n";
    let patched = E2E.patch(text, &pids(&[(CanonicalKey::Coordinator, "1")]));

    // `_` is a word character, so the prefixed name is not an assignment of COORDINATOR.
    assert_eq!(patched.text, "MY_COORDINATOR = \"x\"\nCOORDINATOR = \"1\"\n");
  }

  #[test]
  fn test_pid_inserted_literally() {
    let text = "COORDINATOR = \"x\"\n";
    let patched = E2E.patch(text, &pids(&[(CanonicalKey::Coordinator, "$1-${2}")]));

    assert_eq!(patched.text, "COORDINATOR = \"$1-${2}\"\n");
  }

  #[test]
  fn test_value_does_not_span_lines() {
    let text = "COORDINATOR = \"\nTOKEN = \"y\"\n";
    let patched = E2E.patch(text, &pids(&[(CanonicalKey::Coordinator, "1")]));

    assert_eq!(patched.text, text);
  }
}
