use std::{collections::HashMap, fmt};

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

const HEADING_PREFIX: &str = "#";
const SECTION_PREFIX: &str = "## ";
const LABEL_SEPARATOR: &str = ":";

/// Which section of the document to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Environment {
  #[default]
  #[value(name = "TEST")]
  Test,
  #[value(name = "PROD")]
  Prod,
}

impl Environment {
  /// Heading text introducing this environment's section.
  pub fn heading(self) -> &'static str {
    match self {
      Environment::Test => "## TEST (development)",
      Environment::Prod => "## PROD",
    }
  }
}

impl fmt::Display for Environment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Environment::Test => write!(f, "TEST"),
      Environment::Prod => write!(f, "PROD"),
    }
  }
}

/// The markdown source of truth, borrowed for the length of a run.
#[derive(Debug, Clone, Copy)]
pub struct PidDocument<'a> {
  text: &'a str,
}

impl<'a> From<&'a str> for PidDocument<'a> {
  fn from(text: &'a str) -> Self {
    Self { text }
  }
}

impl<'a> PidDocument<'a> {
  /// Extracts the label/pid pairs of the section belonging to `env`.
  ///
  /// The section runs from its heading to the next `## ` heading or the end
  /// of the document.
  pub fn section(&self, env: Environment) -> Result<RawPidMap<'a>, ParseError> {
    let heading = env.heading();

    #[cfg(feature = "tracing")]
    debug!(%env, heading, "Looking up section");

    let mut lines = self.text.lines();
    if !lines.by_ref().any(|line| is_heading(line, heading)) {
      return Err(ParseError::SectionNotFound {
        heading: heading.to_string(),
      });
    }

    let body = lines.take_while(|line| !line.starts_with(SECTION_PREFIX));
    Ok(RawPidMap::from_lines(body))
  }
}

fn is_heading(line: &str, heading: &str) -> bool {
  line
    .trim()
    .strip_prefix(heading)
    .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}

/// Document labels mapped to the pid recorded next to them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawPidMap<'a> {
  entries: HashMap<&'a str, &'a str>,
}

impl<'a> From<&'a str> for RawPidMap<'a> {
  fn from(section: &'a str) -> Self {
    Self::from_lines(section.lines())
  }
}

impl<'a> RawPidMap<'a> {
  fn from_lines(lines: impl Iterator<Item = &'a str>) -> Self {
    let mut entries = HashMap::new();

    for line in lines {
      let line = line.trim();
      if line.is_empty() || line.starts_with(HEADING_PREFIX) {
        continue;
      }

      let Some((label, rest)) = line.split_once(LABEL_SEPARATOR) else {
        #[cfg(feature = "tracing")]
        trace!("Skipping line without label: {:?}", line);
        continue;
      };

      // Anything after the pid is commentary.
      let Some(pid) = rest.split_whitespace().next() else {
        continue;
      };

      #[cfg(feature = "tracing")]
      trace!(label = label.trim(), pid, "Found entry");

      entries.insert(label.trim(), pid);
    }

    #[cfg(feature = "tracing")]
    debug!("Parsed {} entries", entries.len());

    Self { entries }
  }

  pub fn get(&self, label: &str) -> Option<&'a str> {
    self.entries.get(label).copied()
  }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
  #[error("Could not find section header '{heading}'")]
  SectionNotFound { heading: String },
}
