// Copyright 2025-6 Seth Pendergrass. See LICENSE.

//! Batch processing: classification, geolocation and filing of new photos.

use std::path::{Path, PathBuf};

use super::Organizer;
use crate::{
  config::constants,
  error::{FileError, PipelineError},
  io,
  prim::{Metadata, Photo, Year},
};

/// Outcome of a batch. Every input file that was reached appears in exactly
/// one of `organized`, `rejected` or `errors`.
#[derive(Debug, Default)]
pub struct BatchResult {
  /// Essential photos, filed under `<Year>/<Location>/`.
  pub organized:   Vec<Photo>,
  /// Photos moved to the non-essential area.
  pub rejected:    Vec<Photo>,
  pub errors:      Vec<FileError>,
  /// Whether the batch stopped early on request.
  pub interrupted: bool,
}

impl BatchResult {
  /// Number of files handled, successfully or not.
  pub fn processed(&self) -> usize {
    self.organized.len() + self.rejected.len() + self.errors.len()
  }
}

/// Progress after each file of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
  pub completed: usize,
  pub total:     usize,
  /// File just handled.
  pub path:      PathBuf,
}

/// Hooks into a running batch. Checked and notified between files.
pub trait BatchObserver {
  /// Returning `false` stops the batch before the next file.
  fn should_continue(&mut self) -> bool {
    true
  }

  fn file_done(&mut self, _progress: &Progress) {}
}

impl BatchObserver for () {}

enum Outcome {
  Organized(Photo),
  Rejected(Photo),
}

impl Organizer {
  /// Organizes `files` into the library, in the order given. `year_override`
  /// is used for photos with neither capture date nor modification time.
  /// Per-file failures are collected in the result; only a missing or
  /// unwritable root or empty input fail the batch, before anything moves.
  pub fn process_batch(
    &mut self,
    files: &[PathBuf],
    year_override: Option<i32>,
  ) -> Result<BatchResult, PipelineError> {
    self.process_batch_with(files, year_override, &mut ())
  }

  /// As `process_batch`, reporting to `observer` between files.
  pub fn process_batch_with(
    &mut self,
    files: &[PathBuf],
    year_override: Option<i32>,
    observer: &mut impl BatchObserver,
  ) -> Result<BatchResult, PipelineError> {
    if files.is_empty() {
      return Err(PipelineError::NoInput);
    }
    if !self.root.is_dir() {
      return Err(PipelineError::RootMissing {
        path: self.root.clone(),
      });
    }
    io::ensure_writable(&self.root).map_err(|source| PipelineError::RootNotWritable {
      path: self.root.clone(),
      source,
    })?;

    log::info!(
      "Organizing {} files into {}.",
      files.len(),
      self.root.display()
    );

    let mut result = BatchResult::default();

    for (i, path) in files.iter().enumerate() {
      if !observer.should_continue() {
        log::warn!("Stopping after {i} of {} files.", files.len());
        result.interrupted = true;
        break;
      }

      match self.process_file(path, year_override) {
        Ok(Outcome::Organized(photo)) => result.organized.push(photo),
        Ok(Outcome::Rejected(photo)) => result.rejected.push(photo),
        Err(e) => {
          log::error!("{e}");
          result.errors.push(e);
        }
      }

      observer.file_done(&Progress {
        completed: i + 1,
        total:     files.len(),
        path:      path.clone(),
      });
    }

    log::info!(
      "Organized {}, rejected {}, failed {}.",
      result.organized.len(),
      result.rejected.len(),
      result.errors.len()
    );

    Ok(result)
  }

  fn process_file(&mut self, path: &Path, year_override: Option<i32>) -> Result<Outcome, FileError> {
    let metadata = Metadata::extract(path).map_err(|e| FileError::new(path, e))?;
    let (verdict, _) = self
      .classifier
      .classify_file(path)
      .map_err(|e| FileError::new(path, e))?;

    let year = pick_year(&metadata, io::modified_year(path), year_override);
    let mut photo = Photo::new(path, year, metadata.captured, metadata.coordinates, verdict);

    if let Some(reason) = verdict.rejection_reason() {
      log::warn!("{}: Rejected ({reason}).", path.display());

      let stored = io::move_file(path, self.root.join(constants::NONESSENTIAL_DIR))
        .map_err(|e| FileError::new(path, e))?;
      self.forget(path, &stored);
      photo.set_stored_path(stored);

      return Ok(Outcome::Rejected(photo));
    }

    let location = match metadata.coordinates {
      Some(coordinates) => self.geocoder.resolve(coordinates),
      None => constants::UNKNOWN_LOCATION.to_string(),
    };
    log::debug!("{}: {year}, {location}.", path.display());

    let dir = self.root.join(year.to_string()).join(&location);
    let stored = io::move_file(path, &dir).map_err(|e| FileError::new(path, e))?;
    self.forget(path, &stored);
    photo.set_stored_path(stored);

    self.index.insert(&location, photo.clone());
    Ok(Outcome::Organized(photo))
  }

  /// Drops the index entry of a library photo that was moved away from `old`.
  fn forget(&mut self, old: &Path, new: &Path) {
    let Ok(old) = io::make_canonical(old.parent().unwrap_or(old)).map(|dir| match old.file_name() {
      Some(name) => dir.join(name),
      None => dir,
    }) else {
      return;
    };

    if old == new {
      return;
    }

    if let Some((photo, emptied)) = self.index.remove(&old) {
      log::debug!("{photo}: Moved, removing old index entry.");
      if emptied && let Some(dir) = old.parent() {
        io::remove_dir_if_empty(dir);
      }
    }
  }
}

/// Capture date, then modification time, then the override.
fn pick_year(metadata: &Metadata, modified: Option<i32>, year_override: Option<i32>) -> Year {
  use chrono::Datelike;

  metadata
    .captured
    .map(|c| c.year())
    .or(modified)
    .or(year_override)
    .into()
}
