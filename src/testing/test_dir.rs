// Copyright 2025-6 Seth Pendergrass. See LICENSE.

//! Helper for setting up test directories with synthetic photos.

use std::{
  collections::{HashSet, VecDeque},
  env,
  fs,
  path::{Path, PathBuf},
  sync::LazyLock,
};

use super::images::{
  ExifSpec,
  blurry_image,
  document_image,
  jpeg_bytes,
  natural_image,
  png_bytes,
  screenshot_image,
};

static TEST_ROOT: LazyLock<PathBuf> =
  LazyLock::new(|| env::temp_dir().join(format!("{}_tests", env!("CARGO_PKG_NAME"))));

/// Helper for creating directories for tests needing actual files. The
/// directory is removed when dropped.
pub struct TestDir {
  root: PathBuf,
}

impl TestDir {
  /// Creates a new, empty directory under `TEST_ROOT`. Note: Prefer using
  /// `test_dir!()` macro.
  pub fn new(test_path: PathBuf) -> Self {
    let root_rel = TEST_ROOT.join(test_path);
    if root_rel.exists() {
      fs::remove_dir_all(&root_rel).unwrap();
    }
    fs::create_dir_all(&root_rel).unwrap();

    Self {
      root: root_rel.canonicalize().unwrap(),
    }
  }

  /// All files below the root, recursively.
  pub fn files(&self) -> HashSet<PathBuf> {
    traverse_dir(&self.root)
  }

  pub fn get_path(&self, file: impl AsRef<Path>) -> PathBuf {
    self.root.join(file)
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Creates directory `dir` (and parents), returning its path.
  pub fn add_dir(&self, dir: impl AsRef<Path>) -> PathBuf {
    let path = self.get_path(dir);
    fs::create_dir_all(&path).unwrap();
    path
  }

  /// Writes `bytes` to `file` (creating parents), returning its path.
  pub fn add_bytes(&self, file: impl AsRef<Path>, bytes: &[u8]) -> PathBuf {
    let path = self.get_path(file);
    assert!(!path.exists(), "File already exists: {path:?}");

    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, bytes).unwrap();
    path
  }

  /// Sharp JPEG photo with the given EXIF tags. `seed` varies the pixels.
  pub fn add_photo(&self, file: impl AsRef<Path>, seed: u64, exif: &ExifSpec) -> PathBuf {
    self.add_bytes(file, &jpeg_bytes(&natural_image(seed), exif))
  }

  /// Blurry PNG without EXIF.
  pub fn add_blurry(&self, file: impl AsRef<Path>) -> PathBuf {
    self.add_bytes(file, &png_bytes(&blurry_image()))
  }

  /// Screenshot-like PNG without EXIF.
  pub fn add_screenshot(&self, file: impl AsRef<Path>) -> PathBuf {
    self.add_bytes(file, &png_bytes(&screenshot_image()))
  }

  /// Document-like PNG without EXIF.
  pub fn add_document(&self, file: impl AsRef<Path>, seed: u64) -> PathBuf {
    self.add_bytes(file, &png_bytes(&document_image(seed)))
  }
}

impl Drop for TestDir {
  fn drop(&mut self) {
    let _ = fs::remove_dir_all(&self.root);
  }
}

fn traverse_dir(root: impl AsRef<Path>) -> HashSet<PathBuf> {
  let mut dirs = VecDeque::from([root.as_ref().to_owned()]);
  let mut files = HashSet::new();

  while let Some(dir) = dirs.pop_front() {
    for entry in fs::read_dir(dir).unwrap().map(Result::unwrap) {
      let file_type = entry.file_type().unwrap();
      if file_type.is_dir() {
        dirs.push_back(entry.path());
      } else if file_type.is_file() {
        files.insert(entry.path());
      } else {
        panic!("Unexpected file type: {file_type:?}");
      }
    }
  }

  files
}

#[macro_export]
macro_rules! test_path {
  () => {{
    // HACK: Get module hierarchy for caller.
    let mut function = $crate::testing::type_of(|| ()).rsplit("::");
    // 0th element is `{closure}`.
    let case = function.nth(1).unwrap();
    let suite = function.next().unwrap();
    let module = function.next().unwrap();

    std::path::PathBuf::from(format!("{module}/{suite}/{case}"))
  }};
}

#[macro_export]
macro_rules! test_dir {
  () => {{ $crate::testing::TestDir::new($crate::test_path!()) }};
}
