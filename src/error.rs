// Copyright 2025-6 Seth Pendergrass. See LICENSE.

//! Error types for each pipeline component.
//!
//! Per-file errors (`ExtractionError`, `ClassificationError`,
//! `OrganizationError`) are collected into a `BatchResult` as `FileError`s.
//! Only `PipelineError` aborts a run, and `GeocodeError` never leaves the
//! geocoder.

use std::{
  io,
  path::{Path, PathBuf},
};

use thiserror::Error;

use crate::prim::Year;

/// Metadata could not be read because the file itself is unusable.
#[derive(Debug, Error)]
pub enum ExtractionError {
  #[error("{}: Could not read file ({source}).", path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("{}: Not a supported image.", path.display())]
  NotAnImage { path: PathBuf },
}

/// The classifier could not evaluate the image.
#[derive(Debug, Error)]
pub enum ClassificationError {
  #[error("{}: Could not decode image ({source}).", path.display())]
  Decode {
    path:   PathBuf,
    #[source]
    source: image::ImageError,
  },

  #[error("{}: Image is empty ({width}x{height}).", path.display())]
  Empty {
    path:   PathBuf,
    width:  u32,
    height: u32,
  },
}

/// Reverse geocoding failed. Resolved to the unknown location by the
/// geocoder, so this is only visible to `PlaceLookup` implementations.
#[derive(Debug, Error)]
pub enum GeocodeError {
  #[error("Geocoding request failed ({0}).")]
  Network(#[from] reqwest::Error),

  #[error("Geocoding service error ({0}).")]
  Service(String),

  #[error("Geocoding unavailable (offline).")]
  Unavailable,
}

/// A file system change to the organized tree failed.
#[derive(Debug, Error)]
pub enum OrganizationError {
  #[error("{}: File operation failed ({source}).", path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("{}: Photo is not in the location index.", path.display())]
  NotIndexed { path: PathBuf },

  #[error("{year}/{name}: Location not found.")]
  UnknownLocation { year: Year, name: String },

  #[error("{year}/{name}: Location already exists.")]
  LocationExists { year: Year, name: String },

  #[error("\"{name}\": Invalid location name.")]
  InvalidName { name: String },
}

impl OrganizationError {
  pub(crate) fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
    Self::Io {
      path: path.as_ref().to_path_buf(),
      source,
    }
  }
}

/// Reading or writing the persisted manifest failed.
#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("{}: Manifest I/O failed ({source}).", path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("{}: Manifest is invalid ({source}).", path.display())]
  Format {
    path:   PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

/// Faults that abort a whole run before any file is touched.
#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("{}: Library root does not exist or is not a directory.", path.display())]
  RootMissing { path: PathBuf },

  #[error("{}: Library root is not writable ({source}).", path.display())]
  RootNotWritable {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("No input files.")]
  NoInput,

  #[error(transparent)]
  Manifest(#[from] ManifestError),

  #[error("{}: Could not scan library ({source}).", path.display())]
  Scan {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Pipeline already started.")]
  AlreadyStarted,

  #[error("Could not start pipeline worker ({source}).")]
  WorkerSpawn {
    #[source]
    source: io::Error,
  },

  #[error("Pipeline worker panicked.")]
  WorkerPanicked,
}

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("{}: Could not read config ({source}).", path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("{}: Invalid config ({source}).", path.display())]
  Format {
    path:   PathBuf,
    #[source]
    source: toml::de::Error,
  },

  #[error("{}: Named place \"{name}\" is not a valid directory name.", path.display())]
  PlaceName { path: PathBuf, name: String },
}

/// What went wrong with a single file of a batch.
#[derive(Debug, Error)]
pub enum FileErrorKind {
  #[error(transparent)]
  Extraction(#[from] ExtractionError),

  #[error(transparent)]
  Classification(#[from] ClassificationError),

  #[error(transparent)]
  Organization(#[from] OrganizationError),
}

/// A per-file failure recorded in a batch result.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct FileError {
  pub path: PathBuf,
  #[source]
  pub kind: FileErrorKind,
}

impl FileError {
  pub fn new(path: impl AsRef<Path>, kind: impl Into<FileErrorKind>) -> Self {
    Self {
      path: path.as_ref().to_path_buf(),
      kind: kind.into(),
    }
  }
}
