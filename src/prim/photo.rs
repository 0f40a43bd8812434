// Copyright 2025-6 Seth Pendergrass. See LICENSE.

//! Photos and their classification.

use core::fmt;
use std::{
  fmt::{Display, Formatter},
  path::{Path, PathBuf},
  str::FromStr,
};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::Coordinates;
use crate::config::constants;

/// Year a photo is filed under. Serialized as an optional integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Option<i32>", into = "Option<i32>")]
pub enum Year {
  Known(i32),
  Unknown,
}

impl From<Option<i32>> for Year {
  fn from(value: Option<i32>) -> Self {
    value.map_or(Year::Unknown, Year::Known)
  }
}

impl From<Year> for Option<i32> {
  fn from(value: Year) -> Self {
    match value {
      Year::Known(year) => Some(year),
      Year::Unknown => None,
    }
  }
}

impl Display for Year {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      Year::Known(year) => write!(f, "{year}"),
      Year::Unknown => write!(f, "{}", constants::UNKNOWN_YEAR),
    }
  }
}

/// Parses a year directory name, as produced by `Display`.
impl FromStr for Year {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if s == constants::UNKNOWN_YEAR {
      return Ok(Year::Unknown);
    }

    s.parse::<i32>()
      .map(Year::Known)
      .map_err(|_| format!("\"{s}\": Not a year."))
  }
}

/// Why an image was judged to be noise rather than a memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RejectionReason {
  Blurry,
  Screenshot,
  Document,
}

impl Display for RejectionReason {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      RejectionReason::Blurry => write!(f, "blurry"),
      RejectionReason::Screenshot => write!(f, "screenshot"),
      RejectionReason::Document => write!(f, "document"),
    }
  }
}

/// Classification outcome. A reason exists exactly when the image was
/// rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
  Essential,
  Rejected(RejectionReason),
}

impl Verdict {
  pub fn is_essential(self) -> bool {
    self == Verdict::Essential
  }

  pub fn rejection_reason(self) -> Option<RejectionReason> {
    match self {
      Verdict::Essential => None,
      Verdict::Rejected(reason) => Some(reason),
    }
  }
}

impl Display for Verdict {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      Verdict::Essential => write!(f, "essential"),
      Verdict::Rejected(reason) => write!(f, "rejected ({reason})"),
    }
  }
}

/// A single image handled by the organizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
  source_path: PathBuf,
  stored_path: PathBuf,
  year:        Year,
  captured:    Option<NaiveDateTime>,
  coordinates: Option<Coordinates>,
  verdict:     Verdict,
}

impl Photo {
  /// Creates a photo that has not been moved yet.
  pub fn new(
    source_path: impl AsRef<Path>,
    year: Year,
    captured: Option<NaiveDateTime>,
    coordinates: Option<Coordinates>,
    verdict: Verdict,
  ) -> Self {
    Self {
      source_path: source_path.as_ref().to_path_buf(),
      stored_path: source_path.as_ref().to_path_buf(),
      year,
      captured,
      coordinates,
      verdict,
    }
  }

  pub fn source_path(&self) -> &Path {
    &self.source_path
  }

  pub fn stored_path(&self) -> &Path {
    &self.stored_path
  }

  pub fn year(&self) -> Year {
    self.year
  }

  pub fn captured(&self) -> Option<NaiveDateTime> {
    self.captured
  }

  pub fn coordinates(&self) -> Option<Coordinates> {
    self.coordinates
  }

  pub fn verdict(&self) -> Verdict {
    self.verdict
  }

  pub fn is_essential(&self) -> bool {
    self.verdict.is_essential()
  }

  pub fn rejection_reason(&self) -> Option<RejectionReason> {
    self.verdict.rejection_reason()
  }

  pub fn file_name(&self) -> Option<&std::ffi::OsStr> {
    self.stored_path.file_name()
  }

  /// Records where the organizer put the file.
  pub(crate) fn set_stored_path(&mut self, path: impl AsRef<Path>) {
    self.stored_path = path.as_ref().to_path_buf();
  }
}

impl Display for Photo {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.stored_path.display())
  }
}
