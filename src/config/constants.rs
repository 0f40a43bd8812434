/*
    Constants for library layout, supported files and default thresholds.

    Copyright 2025-6 Seth Pendergrass. See LICENSE.
*/

/// Flat holding area for rejected images, directly under the library root.
pub const NONESSENTIAL_DIR: &str = "NONESSENTIAL";

/// Location used when a photo has no coordinates or geocoding fails.
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// Year directory used when no capture date, modification time or override
/// is available.
pub const UNKNOWN_YEAR: &str = "Unknown Year";

/// Persisted location index, directly under the library root.
pub const MANIFEST_FILE: &str = "atlas.json";
pub const MANIFEST_VERSION: &str = "1.0.0";

// Extension, decodable format name.
pub const EXTENSIONS: [(&str, &str); 8] = [
  ("bmp", "BMP"),
  ("jpeg", "JPEG"),
  ("jpg", "JPEG"),
  ("png", "PNG"),
  ("tif", "TIFF"),
  ("tiff", "TIFF"),
  ("webp", "WebP"),
  ("jfif", "JPEG"),
];

// Classifier.
pub const BLUR_THRESHOLD: f64 = 100.0;
pub const MIN_UNIQUE_COLORS: usize = 2000;
pub const COLOR_SAMPLE_SIZE: u32 = 100;
pub const DOCUMENT_MAX_SATURATION: f64 = 30.0;
pub const DOCUMENT_MIN_EDGE_DENSITY: f64 = 0.10;
pub const CANNY_LOW: f64 = 50.0;
pub const CANNY_HIGH: f64 = 150.0;

// Geocoder. Nominatim allows at most one request per second.
pub const GEOCODER_ENDPOINT: &str = "https://nominatim.openstreetmap.org/reverse";
pub const GEOCODER_USER_AGENT: &str = concat!("photo_atlas/", env!("CARGO_PKG_VERSION"));
pub const GEOCODER_LANGUAGE: &str = "en";
pub const GEOCODER_TIMEOUT_SECS: u64 = 5;
pub const GEOCODER_MIN_INTERVAL_MS: u64 = 1000;
pub const GEOCODER_CACHE_PRECISION: u32 = 1;
