// Copyright 2025-6 Seth Pendergrass. See LICENSE.

//! Functions for manipulating files.

use std::{
  ffi::OsString,
  fs,
  io,
  path::{Path, PathBuf},
};

use chrono::{DateTime, Datelike, Local};

use crate::{config::Extensions, error::OrganizationError};

/// Name of the file written to probe whether a directory is writable.
const WRITE_PROBE: &str = ".atlas_write_probe";

/// Converts a path to an absolute, canonical form. Fails if `path` does not
/// point to a real file or directory.
pub fn make_canonical(path: impl AsRef<Path>) -> io::Result<PathBuf> {
  path.as_ref().canonicalize()
}

/// Checks that files can be created in `dir` by writing and removing a probe
/// file.
pub fn ensure_writable(dir: impl AsRef<Path>) -> io::Result<()> {
  let probe = dir.as_ref().join(WRITE_PROBE);
  fs::write(&probe, b"")?;
  fs::remove_file(&probe)
}

/// Returns a path in `dir` named `file_name` that does not exist yet, adding
/// `_1`, `_2`, ... before the extension as needed.
pub fn unique_destination(dir: impl AsRef<Path>, file_name: impl AsRef<Path>) -> PathBuf {
  let dir = dir.as_ref();
  let file_name = file_name.as_ref();

  let candidate = dir.join(file_name);
  if !candidate.exists() {
    return candidate;
  }

  let stem = file_name.file_stem().unwrap_or(file_name.as_os_str());
  let extension = file_name.extension();

  (1_u32..)
    .map(|n| {
      let mut name = OsString::from(stem);
      name.push(format!("_{n}"));
      if let Some(extension) = extension {
        name.push(".");
        name.push(extension);
      }
      dir.join(name)
    })
    .find(|p| !p.exists())
    .unwrap_or(candidate)
}

/// Moves `file` into `dir_dst` (created if needed) without overwriting
/// anything, and returns its new path. If `file` is already directly inside
/// `dir_dst` it is left alone.
pub fn move_file(
  file: impl AsRef<Path>,
  dir_dst: impl AsRef<Path>,
) -> Result<PathBuf, OrganizationError> {
  let file = file.as_ref();
  let dir_dst = dir_dst.as_ref();

  let Some(file_name) = file.file_name() else {
    return Err(OrganizationError::io(
      file,
      io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
    ));
  };

  fs::create_dir_all(dir_dst).map_err(|e| OrganizationError::io(dir_dst, e))?;

  if let Some(parent) = file.parent()
    && let (Ok(parent), Ok(dir)) = (make_canonical(parent), make_canonical(dir_dst))
    && parent == dir
  {
    log::debug!("{}: Already organized.", file.display());
    return Ok(dir.join(file_name));
  }

  let destination = unique_destination(dir_dst, file_name);

  if let Err(e) = fs::rename(file, &destination) {
    // Fall back to copy & remove (e.g. moving across file systems).
    log::debug!(
      "{}: Rename failed ({e}), copying instead.",
      file.display()
    );
    if let Err(e) = fs::copy(file, &destination) {
      let _ = fs::remove_file(&destination);
      return Err(OrganizationError::io(file, e));
    }
    if let Err(e) = fs::remove_file(file) {
      let _ = fs::remove_file(&destination);
      return Err(OrganizationError::io(file, e));
    }
  }

  log::info!("{} -> {}.", file.display(), destination.display());
  Ok(destination)
}

/// Deletes `file`.
pub fn remove_file(file: impl AsRef<Path>) -> Result<(), OrganizationError> {
  let file = file.as_ref();
  fs::remove_file(file).map_err(|e| OrganizationError::io(file, e))?;
  log::warn!("{}: Deleted.", file.display());
  Ok(())
}

/// Removes `dir` if it exists and is empty. Returns whether it was removed.
pub fn remove_dir_if_empty(dir: impl AsRef<Path>) -> bool {
  let dir = dir.as_ref();
  let is_empty = fs::read_dir(dir).is_ok_and(|mut entries| entries.next().is_none());

  is_empty && fs::remove_dir(dir).is_ok()
}

/// Year of the file's modification time, in local time.
pub fn modified_year(file: impl AsRef<Path>) -> Option<i32> {
  let modified = fs::metadata(file).and_then(|m| m.modified()).ok()?;
  Some(DateTime::<Local>::from(modified).year())
}

/// Lists supported image files directly inside `dir`, sorted by path.
pub fn list_images(dir: impl AsRef<Path>, extensions: &Extensions) -> io::Result<Vec<PathBuf>> {
  let mut files = Vec::new();

  for entry in fs::read_dir(dir)? {
    let entry = entry?;
    if entry.file_type()?.is_file() && extensions.path_is_image(&entry.path()) {
      files.push(entry.path());
    }
  }

  files.sort();
  Ok(files)
}

/// Lists subdirectories of `dir`, sorted by path.
pub fn list_dirs(dir: impl AsRef<Path>) -> io::Result<Vec<PathBuf>> {
  let mut dirs = Vec::new();

  for entry in fs::read_dir(dir)? {
    let entry = entry?;
    if entry.file_type()?.is_dir() {
      dirs.push(entry.path());
    }
  }

  dirs.sort();
  Ok(dirs)
}


#[cfg(test)]
mod test_move_file {
  use super::*;
  use crate::testing::*;

  #[test]
  fn moves_into_new_directory() {
    let d = test_dir!();
    let src = d.add_bytes("import/a.jpg", b"photo");

    let dst = move_file(&src, d.get_path("2023/Tokyo")).unwrap();

    assert_eq!(dst, d.get_path("2023/Tokyo/a.jpg"));
    assert_dir!(d, ["2023/Tokyo/a.jpg"]);
  }

  #[test]
  fn never_overwrites() {
    let d = test_dir!();
    let first = d.add_bytes("import_1/a.jpg", b"first");
    let second = d.add_bytes("import_2/a.jpg", b"second");

    let first = move_file(&first, d.get_path("out")).unwrap();
    let second = move_file(&second, d.get_path("out")).unwrap();

    assert_ne!(first, second);
    assert_eq!(fs::read(&first).unwrap(), b"first");
    assert_eq!(fs::read(&second).unwrap(), b"second");
    assert_dir!(d, ["out/a.jpg", "out/a_1.jpg"]);
  }

  #[test]
  fn leaves_file_already_in_place() {
    let d = test_dir!();
    let src = d.add_bytes("out/a.jpg", b"photo");

    let dst = move_file(&src, d.get_path("out")).unwrap();

    assert_eq!(dst, src);
    assert_dir!(d, ["out/a.jpg"]);
  }

  #[test]
  fn errors_if_source_missing() {
    let d = test_dir!();

    assert_err!(move_file(d.get_path("a.jpg"), d.get_path("out")), "a.jpg");
  }

  // Opens as a regular file on another file system but fails on read, so the
  // copy fallback creates the destination before erroring.
  #[cfg(target_os = "linux")]
  #[test]
  fn removes_partial_copy() {
    let d = test_dir!();

    assert_err!(move_file("/proc/self/mem", d.get_path("out")), "mem");
    assert!(!d.get_path("out/mem").exists());
    assert!(Path::new("/proc/self/mem").exists());
  }
}

#[cfg(test)]
mod test_remove_dir_if_empty {
  use super::*;
  use crate::testing::*;

  #[test]
  fn removes_only_empty_directories() {
    let d = test_dir!();
    d.add_bytes("full/a.jpg", b"photo");
    fs::create_dir(d.get_path("empty")).unwrap();

    assert!(remove_dir_if_empty(d.get_path("empty")));
    assert!(!remove_dir_if_empty(d.get_path("full")));
    assert!(!remove_dir_if_empty(d.get_path("missing")));
    assert!(d.get_path("full").is_dir());
    assert!(!d.get_path("empty").exists());
  }
}
