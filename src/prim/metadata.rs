// Copyright 2025-6 Seth Pendergrass. See LICENSE.

//! Capture metadata extraction from embedded EXIF.

use std::{fs, io::Cursor, path::Path};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use exif::{Exif, In, Reader, Tag, Value};

use super::{Coordinates, Dms, Hemisphere};
use crate::error::ExtractionError;

/// Metadata for an image file. Absent tags are `None`, which is normal (e.g.
/// no GPS on a scanned photo).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Metadata {
  /// `DateTimeOriginal`, falling back to `DateTime`.
  pub captured:    Option<NaiveDateTime>,
  pub coordinates: Option<Coordinates>,
  /// EXIF orientation, 1-8.
  pub orientation: Option<u16>,
}

impl Metadata {
  /// Reads metadata from `path`. Fails only if the file cannot be read or is
  /// not a recognisable image; missing or malformed EXIF yields empty fields.
  pub fn extract(path: impl AsRef<Path>) -> Result<Metadata, ExtractionError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| ExtractionError::Io {
      path: path.to_path_buf(),
      source,
    })?;

    if image::guess_format(&bytes).is_err() {
      return Err(ExtractionError::NotAnImage {
        path: path.to_path_buf(),
      });
    }

    let exif = match Reader::new().read_from_container(&mut Cursor::new(&bytes)) {
      Ok(exif) => exif,
      Err(exif::Error::NotFound(_) | exif::Error::BlankValue(_)) => {
        log::trace!("{}: No EXIF.", path.display());
        return Ok(Metadata::default());
      }
      Err(e) => {
        log::warn!("{}: Ignoring unreadable EXIF ({e}).", path.display());
        return Ok(Metadata::default());
      }
    };

    Ok(Metadata::from_exif(&exif))
  }

  fn from_exif(exif: &Exif) -> Metadata {
    let captured = read_date_time(exif, Tag::DateTimeOriginal)
      .or_else(|| read_date_time(exif, Tag::DateTime));

    let orientation = exif
      .get_field(Tag::Orientation, In::PRIMARY)
      .and_then(|f| f.value.get_uint(0))
      .and_then(|v| u16::try_from(v).ok())
      .filter(|v| (1..=8).contains(v));

    Metadata {
      captured,
      coordinates: read_coordinates(exif),
      orientation,
    }
  }
}

fn read_date_time(exif: &Exif, tag: Tag) -> Option<NaiveDateTime> {
  let field = exif.get_field(tag, In::PRIMARY)?;
  let Value::Ascii(ref ascii) = field.value else {
    return None;
  };
  let dt = exif::DateTime::from_ascii(ascii.first()?).ok()?;

  let date = NaiveDate::from_ymd_opt(i32::from(dt.year), u32::from(dt.month), u32::from(dt.day))?;
  let time = NaiveTime::from_hms_opt(u32::from(dt.hour), u32::from(dt.minute), u32::from(dt.second))?;
  Some(NaiveDateTime::new(date, time))
}

/// Reads GPS position, requiring both axes and their reference tags.
fn read_coordinates(exif: &Exif) -> Option<Coordinates> {
  let latitude = read_axis(exif, Tag::GPSLatitude, Tag::GPSLatitudeRef)?;
  let longitude = read_axis(exif, Tag::GPSLongitude, Tag::GPSLongitudeRef)?;

  let coordinates = Coordinates::new(latitude, longitude);
  if !coordinates.is_valid() {
    log::debug!("Ignoring out of range GPS position ({coordinates}).");
    return None;
  }

  Some(coordinates)
}

fn read_axis(exif: &Exif, value_tag: Tag, ref_tag: Tag) -> Option<f64> {
  let dms = parse_dms(&exif.get_field(value_tag, In::PRIMARY)?.value)?;

  let reference = exif.get_field(ref_tag, In::PRIMARY)?;
  let hemisphere = Hemisphere::from_ref(&reference.display_value().to_string())?;

  Some(dms.to_decimal(hemisphere))
}

/// Parses the three EXIF rationals of a GPS coordinate.
fn parse_dms(value: &Value) -> Option<Dms> {
  let Value::Rational(rationals) = value else {
    return None;
  };

  if rationals.len() < 3 || rationals[..3].iter().any(|r| r.denom == 0) {
    return None;
  }

  Some(Dms::new(
    rationals[0].to_f64(),
    rationals[1].to_f64(),
    rationals[2].to_f64(),
  ))
}

#[cfg(test)]
mod test_extract {
  use super::*;
  use crate::testing::*;

  #[test]
  fn reads_gps_and_capture_time() {
    let d = test_dir!();
    let path = d.add_photo(
      "tokyo.jpg",
      1,
      &ExifSpec::new()
        .captured("2023:04:01 10:30:00")
        .gps(35.6895, 139.6917)
        .orientation(6),
    );

    let metadata = Metadata::extract(&path).unwrap();

    assert_eq!(metadata.captured, Some(make_date_naive(2023, 4, 1, 10, 30, 0)));
    assert_eq!(metadata.orientation, Some(6));
    let coordinates = metadata.coordinates.unwrap();
    assert!((coordinates.latitude - 35.6895).abs() < 1e-6);
    assert!((coordinates.longitude - 139.6917).abs() < 1e-6);
  }

  #[test]
  fn negates_southern_and_western_positions() {
    let d = test_dir!();
    let path = d.add_photo("sydney.jpg", 2, &ExifSpec::new().gps(-33.8688, -151.2093));

    let coordinates = Metadata::extract(&path).unwrap().coordinates.unwrap();

    assert!((coordinates.latitude + 33.8688).abs() < 1e-6);
    assert!((coordinates.longitude + 151.2093).abs() < 1e-6);
  }

  #[test]
  fn falls_back_to_date_time() {
    let d = test_dir!();
    let path = d.add_photo("a.jpg", 3, &ExifSpec::new().modified("2019:12:31 23:59:59"));

    let metadata = Metadata::extract(&path).unwrap();

    assert_eq!(metadata.captured, Some(make_date_naive(2019, 12, 31, 23, 59, 59)));
    assert_eq!(metadata.coordinates, None);
  }

  #[test]
  fn returns_empty_without_exif() {
    let d = test_dir!();
    let path = d.add_blurry("plain.png");

    assert_eq!(Metadata::extract(&path).unwrap(), Metadata::default());
  }

  #[test]
  fn errors_if_not_an_image() {
    let d = test_dir!();
    let path = d.add_bytes("notes.jpg", b"shopping list: eggs, milk");

    assert!(matches!(
      Metadata::extract(&path),
      Err(ExtractionError::NotAnImage { .. })
    ));
  }

  #[test]
  fn errors_if_file_does_not_exist() {
    let d = test_dir!();

    assert!(matches!(
      Metadata::extract(d.get_path("missing.jpg")),
      Err(ExtractionError::Io { .. })
    ));
  }
}
