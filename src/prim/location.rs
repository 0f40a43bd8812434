// Copyright 2025-6 Seth Pendergrass. See LICENSE.

//! Location groups and the index over them.

use std::{
  collections::BTreeMap,
  path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use super::{Coordinates, Photo, Year};

/// Key of a location group. Ordered by year, then name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
  pub year: Year,
  pub name: String,
}

impl GroupKey {
  pub fn new(year: Year, name: impl Into<String>) -> Self {
    Self {
      year,
      name: name.into(),
    }
  }
}

/// Essential photos sharing a year and resolved place name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationGroup {
  name:        String,
  year:        Year,
  /// Pin position: coordinates of the first photo added that had any.
  coordinates: Option<Coordinates>,
  photos:      Vec<Photo>,
}

impl LocationGroup {
  fn new(year: Year, name: &str) -> Self {
    Self {
      name: name.to_string(),
      year,
      coordinates: None,
      photos: Vec::new(),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn year(&self) -> Year {
    self.year
  }

  pub fn key(&self) -> GroupKey {
    GroupKey::new(self.year, &self.name)
  }

  pub fn coordinates(&self) -> Option<Coordinates> {
    self.coordinates
  }

  /// Photos in processing order.
  pub fn photos(&self) -> &[Photo] {
    &self.photos
  }

  pub fn len(&self) -> usize {
    self.photos.len()
  }

  pub fn is_empty(&self) -> bool {
    self.photos.is_empty()
  }

  pub fn contains(&self, stored_path: impl AsRef<Path>) -> bool {
    self
      .photos
      .iter()
      .any(|p| p.stored_path() == stored_path.as_ref())
  }

  fn push(&mut self, photo: Photo) {
    if self.coordinates.is_none() {
      self.coordinates = photo.coordinates();
    }
    self.photos.push(photo);
  }
}

/// All location groups of a library, keyed by (year, name).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationIndex {
  groups: BTreeMap<GroupKey, LocationGroup>,
}

impl LocationIndex {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds an essential photo to the group for `name` in the photo's year,
  /// creating the group if needed. A photo already indexed at the same stored
  /// path is replaced in place rather than duplicated. Returns `false` and
  /// leaves the index unchanged for rejected photos.
  pub fn insert(&mut self, name: &str, photo: Photo) -> bool {
    if !photo.is_essential() {
      log::error!("{photo}: Refusing to index a non-essential photo.");
      return false;
    }

    let key = GroupKey::new(photo.year(), name);
    let group = self
      .groups
      .entry(key)
      .or_insert_with(|| LocationGroup::new(photo.year(), name));

    if let Some(existing) = group
      .photos
      .iter_mut()
      .find(|p| p.stored_path() == photo.stored_path())
    {
      *existing = photo;
    } else {
      group.push(photo);
    }

    true
  }

  /// Removes the photo stored at `stored_path`, dropping its group if it
  /// becomes empty. Returns the photo and whether its group was dropped.
  pub fn remove(&mut self, stored_path: impl AsRef<Path>) -> Option<(Photo, bool)> {
    let key = self.find(&stored_path)?.0.key();
    let group = self.groups.get_mut(&key)?;

    let position = group
      .photos
      .iter()
      .position(|p| p.stored_path() == stored_path.as_ref())?;
    let photo = group.photos.remove(position);

    let emptied = group.is_empty();
    if emptied {
      self.groups.remove(&key);
    }

    Some((photo, emptied))
  }

  /// Re-keys a group, rewriting the stored paths of its photos from
  /// `old_dir` to `new_dir`. Fails (leaving the index untouched) if the old
  /// key is missing or the new key taken.
  pub(crate) fn rename(
    &mut self,
    year: Year,
    old_name: &str,
    new_name: &str,
    old_dir: impl AsRef<Path>,
    new_dir: impl AsRef<Path>,
  ) -> bool {
    let old_key = GroupKey::new(year, old_name);
    let new_key = GroupKey::new(year, new_name);

    if self.groups.contains_key(&new_key) {
      return false;
    }

    let Some(mut group) = self.groups.remove(&old_key) else {
      return false;
    };

    group.name = new_name.to_string();
    for photo in &mut group.photos {
      let rebased = rebase(photo.stored_path(), old_dir.as_ref(), new_dir.as_ref());
      photo.set_stored_path(rebased);
    }

    self.groups.insert(new_key, group);
    true
  }

  pub fn get(&self, year: Year, name: &str) -> Option<&LocationGroup> {
    self.groups.get(&GroupKey::new(year, name))
  }

  pub fn contains_key(&self, year: Year, name: &str) -> bool {
    self.groups.contains_key(&GroupKey::new(year, name))
  }

  /// Finds the group and photo stored at `stored_path`.
  pub fn find(&self, stored_path: impl AsRef<Path>) -> Option<(&LocationGroup, &Photo)> {
    self.groups.values().find_map(|g| {
      g.photos
        .iter()
        .find(|p| p.stored_path() == stored_path.as_ref())
        .map(|p| (g, p))
    })
  }

  /// Groups in (year, name) order.
  pub fn groups(&self) -> impl Iterator<Item = &LocationGroup> {
    self.groups.values()
  }

  /// Owned copy of all groups, for handing to readers.
  pub fn snapshot(&self) -> Vec<LocationGroup> {
    self.groups.values().cloned().collect()
  }

  pub fn len(&self) -> usize {
    self.groups.len()
  }

  pub fn is_empty(&self) -> bool {
    self.groups.is_empty()
  }

  pub fn photo_count(&self) -> usize {
    self.groups.values().map(LocationGroup::len).sum()
  }

  /// Rebuilds an index from groups, e.g. when loading a manifest. Groups with
  /// duplicate keys are merged in order.
  pub fn from_groups(groups: impl IntoIterator<Item = LocationGroup>) -> Self {
    let mut index = Self::new();
    for group in groups {
      match index.groups.get_mut(&group.key()) {
        Some(existing) => {
          for photo in group.photos {
            existing.push(photo);
          }
        }
        None => {
          index.groups.insert(group.key(), group);
        }
      }
    }
    index
  }
}

fn rebase(path: &Path, old_dir: &Path, new_dir: &Path) -> PathBuf {
  path
    .strip_prefix(old_dir)
    .map_or_else(|_| path.to_path_buf(), |rest| new_dir.join(rest))
}
