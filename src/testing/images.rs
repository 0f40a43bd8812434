// Copyright 2025-6 Seth Pendergrass. See LICENSE.

//! Synthetic images that trigger (or avoid) each classifier heuristic, and
//! JPEG encoding with EXIF.

use std::io::Cursor;

use exif::{Field, In, Rational, Tag, Value, experimental::Writer};
use image::{ImageFormat, Rgb, RgbImage, codecs::jpeg::JpegEncoder};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::prim::{Axis, Dms, Hemisphere};

const SIZE: u32 = 256;

/// Sharp, colourful and noisy, like a real photo.
pub fn natural_image(seed: u64) -> RgbImage {
  let mut rng = StdRng::seed_from_u64(seed);
  let blocks = (SIZE / 16) as usize;

  let palette = (0..blocks * blocks)
    .map(|_| {
      let mut colour = [0_u8; 3];
      let high = rng.random_range(0..3);
      let low = (high + rng.random_range(1..3)) % 3;
      for (c, value) in colour.iter_mut().enumerate() {
        *value = if c == high {
          rng.random_range(150..=255)
        } else if c == low {
          rng.random_range(0..=90)
        } else {
          rng.random_range(0..=255)
        };
      }
      colour
    })
    .collect::<Vec<_>>();

  RgbImage::from_fn(SIZE, SIZE, |x, y| {
    let base = palette[(y / 16) as usize * blocks + (x / 16) as usize];
    Rgb(base.map(|c| (i32::from(c) + rng.random_range(-24..=24)).clamp(0, 255) as u8))
  })
}

/// Smooth gradient with no detail.
pub fn blurry_image() -> RgbImage {
  RgbImage::from_fn(SIZE, SIZE, |x, y| {
    Rgb([(x * 255 / SIZE) as u8, (y * 255 / SIZE) as u8, 128])
  })
}

/// Sharp edges but only a few flat colours.
pub fn screenshot_image() -> RgbImage {
  const COLOURS: [[u8; 3]; 4] = [[255, 255, 255], [30, 40, 120], [240, 140, 20], [20, 20, 20]];

  RgbImage::from_fn(SIZE, SIZE, |x, y| {
    Rgb(COLOURS[((x / 8 + 3 * (y / 8)) % 4) as usize])
  })
}

/// Nearly grey with dense fine detail, like a scanned page.
pub fn document_image(seed: u64) -> RgbImage {
  let mut rng = StdRng::seed_from_u64(seed);

  RgbImage::from_fn(SIZE, SIZE, |_, _| {
    let v: u8 = rng.random_range(64..=250);
    Rgb([
      v,
      v + rng.random_range(0..=5),
      v + rng.random_range(0..=5),
    ])
  })
}

pub fn png_bytes(image: &RgbImage) -> Vec<u8> {
  let mut bytes = Cursor::new(Vec::new());
  image.write_to(&mut bytes, ImageFormat::Png).unwrap();
  bytes.into_inner()
}

/// Encodes `image` as JPEG, with an EXIF APP1 segment if `exif` has fields.
pub fn jpeg_bytes(image: &RgbImage, exif: &ExifSpec) -> Vec<u8> {
  let mut bytes = Cursor::new(Vec::new());
  JpegEncoder::new_with_quality(&mut bytes, 95)
    .encode_image(image)
    .unwrap();
  let jpeg = bytes.into_inner();

  let Some(tiff) = exif.to_tiff() else {
    return jpeg;
  };

  // APP1: marker, big-endian length (including itself), "Exif\0\0", TIFF.
  let mut payload = b"Exif\0\0".to_vec();
  payload.extend(tiff);
  let length = u16::try_from(payload.len() + 2).unwrap();

  let mut out = jpeg[..2].to_vec();
  out.extend([0xFF, 0xE1]);
  out.extend(length.to_be_bytes());
  out.extend(payload);
  out.extend(&jpeg[2..]);
  out
}

/// Builder for the EXIF tags of a test photo.
#[derive(Debug, Clone, Default)]
pub struct ExifSpec {
  fields: Vec<Field>,
}

impl ExifSpec {
  pub fn new() -> Self {
    Self::default()
  }

  /// Sets `DateTimeOriginal` (`YYYY:MM:DD HH:MM:SS`).
  pub fn captured(self, date_time: &str) -> Self {
    self.ascii(Tag::DateTimeOriginal, date_time)
  }

  /// Sets `DateTime` (`YYYY:MM:DD HH:MM:SS`).
  pub fn modified(self, date_time: &str) -> Self {
    self.ascii(Tag::DateTime, date_time)
  }

  pub fn gps(self, latitude: f64, longitude: f64) -> Self {
    let (lat, lat_ref) = Dms::from_decimal(latitude, Axis::Latitude);
    let (lon, lon_ref) = Dms::from_decimal(longitude, Axis::Longitude);
    let reference = |h: Hemisphere| match h {
      Hemisphere::North => "N",
      Hemisphere::South => "S",
      Hemisphere::East => "E",
      Hemisphere::West => "W",
    };

    self
      .field(Tag::GPSLatitude, dms_value(lat))
      .ascii(Tag::GPSLatitudeRef, reference(lat_ref))
      .field(Tag::GPSLongitude, dms_value(lon))
      .ascii(Tag::GPSLongitudeRef, reference(lon_ref))
  }

  pub fn orientation(self, orientation: u16) -> Self {
    self.field(Tag::Orientation, Value::Short(vec![orientation]))
  }

  fn ascii(self, tag: Tag, value: &str) -> Self {
    self.field(tag, Value::Ascii(vec![value.as_bytes().to_vec()]))
  }

  fn field(mut self, tag: Tag, value: Value) -> Self {
    self.fields.push(Field {
      tag,
      ifd_num: In::PRIMARY,
      value,
    });
    self
  }

  /// Serializes the fields as a little-endian TIFF structure.
  fn to_tiff(&self) -> Option<Vec<u8>> {
    if self.fields.is_empty() {
      return None;
    }

    let mut writer = Writer::new();
    for field in &self.fields {
      writer.push_field(field);
    }

    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, true).unwrap();
    Some(tiff.into_inner())
  }
}

fn dms_value(dms: Dms) -> Value {
  let rational = |value: f64, denom: u32| Rational {
    num: (value * f64::from(denom)).round() as u32,
    denom,
  };

  Value::Rational(vec![
    rational(dms.degrees, 1),
    rational(dms.minutes, 1),
    rational(dms.seconds, 10_000),
  ])
}
