// Copyright 2025-6 Seth Pendergrass. See LICENSE.

//! Test-only utilities.

mod asserts;
mod dates;
mod images;
mod lookup;
mod test_dir;

use std::path::Path;

pub use dates::*;
pub use images::*;
pub use lookup::*;
pub use test_dir::*;

pub use crate::{assert_dir, assert_err, test_dir, test_path};
use crate::{
  classify::Classifier,
  config::{ClassifierConfig, GeocoderConfig},
  geocode::Geocoder,
  org::Organizer,
};

pub fn type_of<T>(_: T) -> &'static str {
  std::any::type_name::<T>()
}

pub fn make_classifier() -> Classifier {
  Classifier::new(ClassifierConfig::default())
}

/// Geocoder over `lookup` without rate limiting.
pub fn make_geocoder(lookup: FakeLookup) -> Geocoder {
  let config = GeocoderConfig {
    min_interval_ms: 0,
    ..GeocoderConfig::default()
  };
  Geocoder::new(&config, Vec::new(), lookup)
}

/// Organizer for `root` with an empty index.
pub fn make_organizer(root: impl AsRef<Path>, lookup: FakeLookup) -> Organizer {
  Organizer::new(root, make_classifier(), make_geocoder(lookup)).unwrap()
}

/// Organizer for an existing library at `root`.
pub fn make_library(root: impl AsRef<Path>, lookup: FakeLookup) -> Organizer {
  Organizer::load_library(root, make_classifier(), make_geocoder(lookup)).unwrap()
}
