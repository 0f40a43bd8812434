// Copyright 2025-6 Seth Pendergrass. See LICENSE.

//! GPS positions and degrees/minutes/seconds conversion.

use core::fmt;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// A position in signed decimal degrees. South and West are negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
  pub latitude:  f64,
  pub longitude: f64,
}

impl Coordinates {
  pub fn new(latitude: f64, longitude: f64) -> Self {
    Self {
      latitude,
      longitude,
    }
  }

  /// Rounds to `precision` decimal places and returns an integer key, so that
  /// nearby positions share a cache entry.
  #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
  pub fn quantize(&self, precision: u32) -> (i64, i64) {
    let scale = 10_f64.powi(precision.min(9) as i32);
    (
      (self.latitude * scale).round() as i64,
      (self.longitude * scale).round() as i64,
    )
  }

  /// Geodesic distance in kilometres.
  pub fn distance_km(&self, other: &Coordinates) -> f64 {
    use geo::{Distance, Geodesic, Point};

    let start = Point::new(self.longitude, self.latitude);
    let end = Point::new(other.longitude, other.latitude);
    Geodesic.distance(start, end) / 1000.0
  }

  pub fn is_valid(&self) -> bool {
    self.latitude.is_finite()
      && self.longitude.is_finite()
      && (-90.0..=90.0).contains(&self.latitude)
      && (-180.0..=180.0).contains(&self.longitude)
  }
}

impl Display for Coordinates {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
  }
}

/// EXIF `GPSLatitudeRef` / `GPSLongitudeRef` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
  North,
  South,
  East,
  West,
}

impl Hemisphere {
  /// Parses an EXIF reference tag (`N`, `S`, `E` or `W`).
  pub fn from_ref(value: &str) -> Option<Self> {
    match value.trim().trim_matches('"').to_ascii_uppercase().as_str() {
      "N" => Some(Hemisphere::North),
      "S" => Some(Hemisphere::South),
      "E" => Some(Hemisphere::East),
      "W" => Some(Hemisphere::West),
      _ => None,
    }
  }

  fn sign(self) -> f64 {
    match self {
      Hemisphere::North | Hemisphere::East => 1.0,
      Hemisphere::South | Hemisphere::West => -1.0,
    }
  }
}

/// Which axis a coordinate lies on, to pick the hemisphere when converting
/// back from decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
  Latitude,
  Longitude,
}

/// Unsigned degrees, minutes and seconds, as stored in EXIF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dms {
  pub degrees: f64,
  pub minutes: f64,
  pub seconds: f64,
}

impl Dms {
  pub fn new(degrees: f64, minutes: f64, seconds: f64) -> Self {
    Self {
      degrees,
      minutes,
      seconds,
    }
  }

  /// Signed decimal degrees, negated for South and West.
  pub fn to_decimal(&self, hemisphere: Hemisphere) -> f64 {
    hemisphere.sign() * (self.degrees + self.minutes / 60.0 + self.seconds / 3600.0)
  }

  /// Splits signed decimal degrees back into DMS and a hemisphere.
  pub fn from_decimal(value: f64, axis: Axis) -> (Dms, Hemisphere) {
    let hemisphere = match (axis, value < 0.0) {
      (Axis::Latitude, false) => Hemisphere::North,
      (Axis::Latitude, true) => Hemisphere::South,
      (Axis::Longitude, false) => Hemisphere::East,
      (Axis::Longitude, true) => Hemisphere::West,
    };

    let value = value.abs();
    let degrees = value.trunc();
    let minutes_full = (value - degrees) * 60.0;
    let minutes = minutes_full.trunc();
    let seconds = (minutes_full - minutes) * 60.0;

    (Dms::new(degrees, minutes, seconds), hemisphere)
  }
}
