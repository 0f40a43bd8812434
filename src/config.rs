/*
    Structure for holding configuration.

    Copyright 2025-6 Seth Pendergrass. See LICENSE.
*/
use std::{
  collections::HashMap,
  fs,
  path::Path,
  time::Duration,
};

use serde::Deserialize;

use crate::{error::ConfigError, geocode::sanitize_name};

pub mod constants;

/// Thresholds for the essentiality heuristics.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierConfig {
  /// Laplacian variance below which an image is blurry.
  pub blur_threshold:            f64,
  /// Unique colours (after downsampling) below which an image is a screenshot.
  pub min_unique_colors:         usize,
  /// Side length of the downsampled image used for counting colours.
  pub color_sample_size:         u32,
  /// Mean saturation (0-255) below which an image may be a document.
  pub document_max_saturation:   f64,
  /// Edge pixel fraction above which a low saturation image is a document.
  pub document_min_edge_density: f64,
  pub canny_low:                 f64,
  pub canny_high:                f64,
}

impl Default for ClassifierConfig {
  fn default() -> Self {
    Self {
      blur_threshold:            constants::BLUR_THRESHOLD,
      min_unique_colors:         constants::MIN_UNIQUE_COLORS,
      color_sample_size:         constants::COLOR_SAMPLE_SIZE,
      document_max_saturation:   constants::DOCUMENT_MAX_SATURATION,
      document_min_edge_density: constants::DOCUMENT_MIN_EDGE_DENSITY,
      canny_low:                 constants::CANNY_LOW,
      canny_high:                constants::CANNY_HIGH,
    }
  }
}

/// Reverse geocoding service settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeocoderConfig {
  pub endpoint:        String,
  pub user_agent:      String,
  pub language:        String,
  pub timeout_secs:    u64,
  pub min_interval_ms: u64,
  /// Decimal places coordinates are rounded to for caching.
  pub cache_precision: u32,
}

impl GeocoderConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }

  pub fn min_interval(&self) -> Duration {
    Duration::from_millis(self.min_interval_ms)
  }
}

impl Default for GeocoderConfig {
  fn default() -> Self {
    Self {
      endpoint:        constants::GEOCODER_ENDPOINT.to_string(),
      user_agent:      constants::GEOCODER_USER_AGENT.to_string(),
      language:        constants::GEOCODER_LANGUAGE.to_string(),
      timeout_secs:    constants::GEOCODER_TIMEOUT_SECS,
      min_interval_ms: constants::GEOCODER_MIN_INTERVAL_MS,
      cache_precision: constants::GEOCODER_CACHE_PRECISION,
    }
  }
}

/// A circle that resolves to a fixed name without asking the geocoding
/// service (e.g. "Home").
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamedPlace {
  pub name:      String,
  pub latitude:  f64,
  pub longitude: f64,
  #[serde(default = "default_radius_km")]
  pub radius_km: f64,
}

fn default_radius_km() -> f64 {
  1.0
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  pub classifier: ClassifierConfig,
  pub geocoder:   GeocoderConfig,
  pub places:     Vec<NamedPlace>,
}

impl Config {
  /// Loads configuration from a TOML file. Unset values keep their defaults.
  pub fn load(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;

    let config: Config = toml::from_str(&text).map_err(|source| ConfigError::Format {
      path: path.to_path_buf(),
      source,
    })?;

    if let Some(place) = config
      .places
      .iter()
      .find(|p| sanitize_name(&p.name).as_deref() != Some(p.name.as_str()))
    {
      return Err(ConfigError::PlaceName {
        path: path.to_path_buf(),
        name: place.name.clone(),
      });
    }

    Ok(config)
  }

  /// Loads `path` if it exists, otherwise returns the defaults.
  pub fn load_or_default(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    if path.as_ref().exists() {
      Self::load(path)
    } else {
      log::debug!(
        "{}: No config file, using defaults.",
        path.as_ref().display()
      );
      Ok(Config::default())
    }
  }
}

/// Lookup of supported image extensions.
pub struct Extensions {
  formats: HashMap<&'static str, &'static str>,
}

impl Extensions {
  pub fn new() -> Extensions {
    let mut formats = HashMap::new();
    for extension in constants::EXTENSIONS {
      formats.insert(extension.0, extension.1);
    }

    Extensions { formats }
  }

  // Gets the format name for the given extension, if supported.
  // This is case-insensitive.
  pub fn get_format(&self, extension: &str) -> Option<&'static str> {
    self
      .formats
      .get(extension.to_lowercase().as_str())
      .copied()
  }

  pub fn path_is_image(&self, path: &Path) -> bool {
    let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
      return false;
    };
    self.get_format(extension).is_some()
  }
}

impl Default for Extensions {
  fn default() -> Self {
    Self::new()
  }
}
