// Copyright 2025-6 Seth Pendergrass. See LICENSE.

//! Core library management type.

use std::path::{Path, PathBuf};

use crate::{
  classify::Classifier,
  config::Extensions,
  error::PipelineError,
  geocode::Geocoder,
  io,
  prim::{LocationGroup, LocationIndex},
};

/// Manager for an organized photo library rooted at `root`.
///
/// Owns the classifier, the geocoder (and therefore its cache) and the
/// location index. All operations touching files under `root` go through
/// here, so the index always matches the tree.
pub struct Organizer {
  pub(super) root:       PathBuf,
  pub(super) classifier: Classifier,
  pub(super) geocoder:   Geocoder,
  pub(super) extensions: Extensions,
  pub(super) index:      LocationIndex,
}

impl Organizer {
  //
  // Constructors.
  //

  /// Creates an organizer for `root` with an empty index.
  pub fn new(
    root: impl AsRef<Path>,
    classifier: Classifier,
    geocoder: Geocoder,
  ) -> Result<Self, PipelineError> {
    Ok(Self {
      root: canonical_root(root)?,
      classifier,
      geocoder,
      extensions: Extensions::new(),
      index: LocationIndex::new(),
    })
  }

  /// Reopens an organized library, loading its manifest if present and
  /// otherwise rebuilding the index from the directory tree.
  pub fn load_library(
    root: impl AsRef<Path>,
    classifier: Classifier,
    geocoder: Geocoder,
  ) -> Result<Self, PipelineError> {
    let mut organizer = Self::new(root, classifier, geocoder)?;

    match organizer.load_manifest() {
      Some(index) => organizer.index = index,
      None => organizer.rescan()?,
    }

    log::info!(
      "{}: Loaded {} photos in {} locations.",
      organizer.root.display(),
      organizer.index.photo_count(),
      organizer.index.len()
    );

    Ok(organizer)
  }

  //
  // Accessors.
  //

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn index(&self) -> &LocationIndex {
    &self.index
  }

  /// Owned copy of all location groups, in (year, name) order.
  pub fn snapshot(&self) -> Vec<LocationGroup> {
    self.index.snapshot()
  }

  pub fn geocoder(&self) -> &Geocoder {
    &self.geocoder
  }

  pub fn classifier(&self) -> &Classifier {
    &self.classifier
  }

  pub fn extensions(&self) -> &Extensions {
    &self.extensions
  }
}

fn canonical_root(root: impl AsRef<Path>) -> Result<PathBuf, PipelineError> {
  let root = root.as_ref();
  let missing = || PipelineError::RootMissing {
    path: root.to_path_buf(),
  };

  let root = io::make_canonical(root).map_err(|_| missing())?;
  if !root.is_dir() {
    return Err(missing());
  }

  Ok(root)
}
