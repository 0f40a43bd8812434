// Copyright 2025-6 Seth Pendergrass. See LICENSE.

//! User edits to an organized library: deleting photos and renaming
//! locations.

use std::{
  fs,
  io::ErrorKind,
  path::{Path, PathBuf},
};

use super::Organizer;
use crate::{
  config::constants,
  error::OrganizationError,
  geocode,
  io,
  prim::{Photo, Year},
};

impl Organizer {
  /// Deletes the organized photo at `path` and drops it from the index. If
  /// its location group becomes empty, the group and its directory are
  /// removed too. Returns the deleted photo.
  pub fn delete_photo(&mut self, path: impl AsRef<Path>) -> Result<Photo, OrganizationError> {
    let path = self.indexed_path(path.as_ref())?;

    match io::remove_file(&path) {
      Ok(()) => {}
      Err(OrganizationError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
        log::warn!("{}: Already gone, removing from index.", path.display());
      }
      Err(e) => return Err(e),
    }

    let (photo, emptied) = self
      .index
      .remove(&path)
      .ok_or_else(|| OrganizationError::NotIndexed { path: path.clone() })?;

    if emptied && let Some(dir) = path.parent() {
      log::info!("{}: Location is empty, removing.", dir.display());
      io::remove_dir_if_empty(dir);
    }

    Ok(photo)
  }

  /// Renames location `old_name` of `year` to `new_name`, both on disk and in
  /// the index. The directory is renamed first; the index only changes if
  /// that succeeds.
  pub fn rename_location(
    &mut self,
    year: Year,
    old_name: &str,
    new_name: &str,
  ) -> Result<(), OrganizationError> {
    if geocode::sanitize_name(new_name).as_deref() != Some(new_name)
      || new_name == constants::NONESSENTIAL_DIR
    {
      return Err(OrganizationError::InvalidName {
        name: new_name.to_string(),
      });
    }

    if !self.index.contains_key(year, old_name) {
      return Err(OrganizationError::UnknownLocation {
        year,
        name: old_name.to_string(),
      });
    }

    if old_name == new_name {
      return Ok(());
    }

    let year_dir = self.root.join(year.to_string());
    let old_dir = year_dir.join(old_name);
    let new_dir = year_dir.join(new_name);

    if self.index.contains_key(year, new_name) || new_dir.exists() {
      return Err(OrganizationError::LocationExists {
        year,
        name: new_name.to_string(),
      });
    }

    fs::rename(&old_dir, &new_dir).map_err(|e| OrganizationError::io(&old_dir, e))?;

    if !self
      .index
      .rename(year, old_name, new_name, &old_dir, &new_dir)
    {
      // Unreachable given the checks above, but keep disk and index in step.
      if let Err(e) = fs::rename(&new_dir, &old_dir) {
        log::error!("{}: Could not undo rename ({e}).", new_dir.display());
      }
      return Err(OrganizationError::LocationExists {
        year,
        name: new_name.to_string(),
      });
    }

    log::info!("{year}: Renamed \"{old_name}\" to \"{new_name}\".");
    Ok(())
  }

  /// Finds the index entry for `path`, as given or canonicalized.
  fn indexed_path(&self, path: &Path) -> Result<PathBuf, OrganizationError> {
    if self.index.find(path).is_some() {
      return Ok(path.to_path_buf());
    }

    if let Ok(canonical) = io::make_canonical(path)
      && self.index.find(&canonical).is_some()
    {
      return Ok(canonical);
    }

    Err(OrganizationError::NotIndexed {
      path: path.to_path_buf(),
    })
  }
}
