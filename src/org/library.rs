// Copyright 2025-6 Seth Pendergrass. See LICENSE.

//! Persistence of the location index: the manifest file and rebuilding the
//! index from the directory tree.

use std::{
  fs,
  io::ErrorKind,
  path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Organizer;
use crate::{
  config::constants,
  error::{ManifestError, PipelineError},
  io,
  prim::{LocationGroup, LocationIndex, Metadata, Photo, Verdict, Year},
};

/// On-disk form of the location index.
#[derive(Debug, Serialize, Deserialize)]
struct Manifest {
  version:         String,
  saved_at:        DateTime<Utc>,
  root:            PathBuf,
  total_locations: usize,
  total_photos:    usize,
  groups:          Vec<LocationGroup>,
}

impl Organizer {
  pub fn manifest_path(&self) -> PathBuf {
    self.root.join(constants::MANIFEST_FILE)
  }

  /// Writes the index to the manifest, keeping the previous manifest as a
  /// backup. Returns the manifest path.
  pub fn save_manifest(&self) -> Result<PathBuf, ManifestError> {
    let path = self.manifest_path();
    let manifest = Manifest {
      version:         constants::MANIFEST_VERSION.to_string(),
      saved_at:        Utc::now(),
      root:            self.root.clone(),
      total_locations: self.index.len(),
      total_photos:    self.index.photo_count(),
      groups:          self.index.snapshot(),
    };

    let json = serde_json::to_vec_pretty(&manifest).map_err(|source| ManifestError::Format {
      path: path.clone(),
      source,
    })?;

    let io_error = |path: &Path| {
      let path = path.to_path_buf();
      move |source| ManifestError::Io { path, source }
    };

    if path.exists() {
      fs::copy(&path, backup_path(&path)).map_err(io_error(&path))?;
    }

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(io_error(&tmp))?;
    fs::rename(&tmp, &path).map_err(io_error(&path))?;

    log::info!(
      "{}: Saved {} photos in {} locations.",
      path.display(),
      manifest.total_photos,
      manifest.total_locations
    );
    Ok(path)
  }

  /// Rebuilds the index by scanning `<root>/<Year>/<Location>/`. Existing
  /// entries are discarded. Unreadable images are skipped.
  pub fn rescan(&mut self) -> Result<(), PipelineError> {
    log::info!("{}: Scanning library.", self.root.display());

    let scan_error = |path: &Path| {
      let path = path.to_path_buf();
      move |source| PipelineError::Scan { path, source }
    };

    let mut index = LocationIndex::new();

    for year_dir in io::list_dirs(&self.root).map_err(scan_error(&self.root))? {
      let Some(year) = dir_name(&year_dir).and_then(|n| n.parse::<Year>().ok()) else {
        log::debug!("{}: Not a year, skipping.", year_dir.display());
        continue;
      };

      for location_dir in io::list_dirs(&year_dir).map_err(scan_error(&year_dir))? {
        let Some(name) = dir_name(&location_dir) else {
          log::warn!("{}: Invalid location name, skipping.", location_dir.display());
          continue;
        };

        for file in
          io::list_images(&location_dir, &self.extensions).map_err(scan_error(&location_dir))?
        {
          match Metadata::extract(&file) {
            Ok(metadata) => {
              let photo = Photo::new(
                &file,
                year,
                metadata.captured,
                metadata.coordinates,
                Verdict::Essential,
              );
              index.insert(name, photo);
            }
            Err(e) => log::warn!("{e} Skipping."),
          }
        }
      }
    }

    log::info!(
      "{}: Found {} photos in {} locations.",
      self.root.display(),
      index.photo_count(),
      index.len()
    );

    self.index = index;
    Ok(())
  }

  /// Reads the manifest, falling back to its backup. Returns `None` if
  /// neither is usable for this root.
  pub(super) fn load_manifest(&self) -> Option<LocationIndex> {
    let path = self.manifest_path();

    for candidate in [path.clone(), backup_path(&path)] {
      match read_manifest(&candidate) {
        Ok(Some(manifest)) => {
          if manifest.root != self.root {
            log::warn!(
              "{}: Manifest is for {}, ignoring.",
              candidate.display(),
              manifest.root.display()
            );
            continue;
          }
          if manifest.version != constants::MANIFEST_VERSION {
            log::warn!(
              "{}: Unexpected manifest version {}.",
              candidate.display(),
              manifest.version
            );
          }
          log::debug!(
            "{}: Loaded manifest saved at {}.",
            candidate.display(),
            manifest.saved_at
          );
          return Some(LocationIndex::from_groups(manifest.groups));
        }
        Ok(None) => log::debug!("{}: No manifest.", candidate.display()),
        Err(e) => log::warn!("{e}"),
      }
    }

    None
  }
}

fn read_manifest(path: &Path) -> Result<Option<Manifest>, ManifestError> {
  let bytes = match fs::read(path) {
    Ok(bytes) => bytes,
    Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
    Err(source) => {
      return Err(ManifestError::Io {
        path: path.to_path_buf(),
        source,
      });
    }
  };

  serde_json::from_slice(&bytes)
    .map(Some)
    .map_err(|source| ManifestError::Format {
      path: path.to_path_buf(),
      source,
    })
}

fn backup_path(path: &Path) -> PathBuf {
  path.with_extension("json.backup")
}

fn dir_name(path: &Path) -> Option<&str> {
  path.file_name().and_then(|n| n.to_str())
}


#[cfg(test)]
mod test_rescan {
  use super::*;
  use crate::testing::*;

  #[test]
  fn rebuilds_index_from_tree() {
    let d = test_dir!();
    let library = d.add_dir("library");
    d.add_photo(
      "library/2023/Tokyo/a.jpg",
      1,
      &ExifSpec::new().gps(35.6895, 139.6917),
    );
    d.add_photo("library/2023/Tokyo/b.jpg", 2, &ExifSpec::new());
    d.add_photo("library/Unknown Year/Unknown Location/c.jpg", 3, &ExifSpec::new());
    d.add_blurry("library/NONESSENTIAL/d.png");
    d.add_photo("library/Trips/Paris/e.jpg", 4, &ExifSpec::new());
    d.add_bytes("library/2023/Tokyo/notes.txt", b"1");

    let organizer = make_library(&library, FakeLookup::new());
    let index = organizer.index();

    assert_eq!(index.len(), 2);
    assert_eq!(index.photo_count(), 3);

    let tokyo = index.get(Year::Known(2023), "Tokyo").unwrap();
    assert_eq!(tokyo.len(), 2);
    assert!(tokyo.coordinates().is_some());
    assert!(index.get(Year::Unknown, "Unknown Location").is_some());
  }

  #[test]
  fn skips_unreadable_images() {
    let d = test_dir!();
    let library = d.add_dir("library");
    d.add_photo("library/2023/Tokyo/a.jpg", 1, &ExifSpec::new());
    d.add_bytes("library/2023/Tokyo/broken.jpg", b"nope");

    let organizer = make_library(&library, FakeLookup::new());

    assert_eq!(organizer.index().photo_count(), 1);
  }

  #[test]
  fn prefers_manifest_over_tree() {
    let d = test_dir!();
    let library = d.add_dir("library");
    let organizer = make_library(&library, FakeLookup::new());
    organizer.save_manifest().unwrap();
    d.add_photo("library/2023/Tokyo/a.jpg", 1, &ExifSpec::new());

    let mut reloaded = make_library(&library, FakeLookup::new());
    assert!(reloaded.index().is_empty());

    reloaded.rescan().unwrap();
    assert_eq!(reloaded.index().photo_count(), 1);
  }
}
