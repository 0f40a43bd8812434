// Copyright 2025-6 Seth Pendergrass. See LICENSE.

//! Reverse geocoding of photo coordinates to place names.
//!
//! The `Geocoder` answers from, in order: configured named places, its cache
//! (quantized coordinates, including remembered failures), and finally a
//! rate-limited `PlaceLookup` backend. Every failure resolves to the unknown
//! location; nothing is propagated to the caller.

use std::{
  collections::HashMap,
  fs,
  io,
  path::Path,
  sync::LazyLock,
  thread,
  time::{Duration, Instant},
};

use regex::Regex;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::{
  config::{GeocoderConfig, NamedPlace, constants},
  error::GeocodeError,
  prim::Coordinates,
};

/// Characters that cannot appear in a directory name on common file systems.
static RESERVED: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1F]"#).expect("valid pattern"));

/// Address components of a reverse geocoding result. Field names follow
/// Nominatim's `address` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
  pub city:         Option<String>,
  pub town:         Option<String>,
  pub village:      Option<String>,
  pub municipality: Option<String>,
  pub county:       Option<String>,
  pub state:        Option<String>,
  pub province:     Option<String>,
  pub region:       Option<String>,
  pub country:      Option<String>,
}

impl Address {
  /// Address with only a city, e.g. for tests and named lookups.
  pub fn city(name: impl Into<String>) -> Address {
    Address {
      city: Some(name.into()),
      ..Address::default()
    }
  }

  /// Most specific populated component, from city down to country.
  pub fn place_name(&self) -> Option<&str> {
    [
      &self.city,
      &self.town,
      &self.village,
      &self.municipality,
      &self.county,
      &self.state,
      &self.province,
      &self.region,
      &self.country,
    ]
    .into_iter()
    .filter_map(Option::as_deref)
    .find(|s| !s.trim().is_empty())
  }
}

/// Backend answering a single reverse geocoding request.
pub trait PlaceLookup: Send {
  /// Returns the address at `coordinates`, or `None` if there is none (e.g.
  /// open ocean).
  fn lookup(&mut self, coordinates: Coordinates) -> Result<Option<Address>, GeocodeError>;

  /// Whether requests leave the process and are subject to rate limiting.
  fn is_remote(&self) -> bool {
    true
  }
}

#[derive(Deserialize)]
struct ReverseResponse {
  address: Option<Address>,
  error:   Option<String>,
}

/// Nominatim (OpenStreetMap) reverse geocoding over HTTPS.
pub struct NominatimLookup {
  client:   Client,
  endpoint: String,
  language: String,
}

impl NominatimLookup {
  pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
    let client = Client::builder()
      .user_agent(&config.user_agent)
      .timeout(config.timeout())
      .build()?;

    Ok(Self {
      client,
      endpoint: config.endpoint.clone(),
      language: config.language.clone(),
    })
  }
}

impl PlaceLookup for NominatimLookup {
  fn lookup(&mut self, coordinates: Coordinates) -> Result<Option<Address>, GeocodeError> {
    log::trace!("Geocoding request for {coordinates}.");

    let latitude = coordinates.latitude.to_string();
    let longitude = coordinates.longitude.to_string();

    let response = self
      .client
      .get(&self.endpoint)
      .query(&[
        ("format", "jsonv2"),
        ("lat", latitude.as_str()),
        ("lon", longitude.as_str()),
        ("accept-language", self.language.as_str()),
      ])
      .send()?;

    let status = response.status();
    if !status.is_success() {
      return Err(GeocodeError::Service(format!("HTTP {status}")));
    }

    let body: ReverseResponse = response.json()?;
    if let Some(error) = body.error {
      log::trace!("Geocoding service returned no result for {coordinates} ({error}).");
      return Ok(None);
    }

    Ok(body.address)
  }
}

/// Backend for running without network access. Every coordinate resolves to
/// the unknown location, unless covered by a named place.
pub struct OfflineLookup;

impl PlaceLookup for OfflineLookup {
  fn lookup(&mut self, _: Coordinates) -> Result<Option<Address>, GeocodeError> {
    Err(GeocodeError::Unavailable)
  }

  fn is_remote(&self) -> bool {
    false
  }
}

#[derive(Serialize, Deserialize)]
struct CacheEntry {
  latitude:  i64,
  longitude: i64,
  name:      String,
}

#[derive(Serialize, Deserialize)]
struct CacheFile {
  precision: u32,
  entries:   Vec<CacheEntry>,
}

/// Resolved names keyed by quantized coordinates. Failed lookups are
/// remembered as `None` for the lifetime of the cache but never saved.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeCache {
  precision: u32,
  entries:   HashMap<(i64, i64), Option<String>>,
}

impl GeocodeCache {
  pub fn new(precision: u32) -> Self {
    Self {
      precision,
      entries: HashMap::new(),
    }
  }

  /// Loads a cache saved by `save`. A missing, unreadable or differently
  /// quantized file yields an empty cache.
  pub fn load(path: impl AsRef<Path>, precision: u32) -> Self {
    let path = path.as_ref();
    let Ok(bytes) = fs::read(path) else {
      log::debug!("{}: No geocode cache.", path.display());
      return Self::new(precision);
    };

    let file = match serde_json::from_slice::<CacheFile>(&bytes) {
      Ok(file) => file,
      Err(e) => {
        log::warn!("{}: Ignoring invalid geocode cache ({e}).", path.display());
        return Self::new(precision);
      }
    };

    if file.precision != precision {
      log::info!(
        "{}: Discarding geocode cache (precision {} != {precision}).",
        path.display(),
        file.precision
      );
      return Self::new(precision);
    }

    let entries = file
      .entries
      .into_iter()
      .map(|e| ((e.latitude, e.longitude), Some(e.name)))
      .collect::<HashMap<_, _>>();
    log::debug!("{}: Loaded {} geocode cache entries.", path.display(), entries.len());

    Self { precision, entries }
  }

  /// Writes resolved entries as JSON, sorted for stable output.
  pub fn save(&self, path: impl AsRef<Path>) -> io::Result<()> {
    let mut entries = self
      .entries
      .iter()
      .filter_map(|(&(latitude, longitude), name)| {
        name.as_ref().map(|name| CacheEntry {
          latitude,
          longitude,
          name: name.clone(),
        })
      })
      .collect::<Vec<_>>();
    entries.sort_by_key(|e| (e.latitude, e.longitude));

    let file = CacheFile {
      precision: self.precision,
      entries,
    };

    if let Some(parent) = path.as_ref().parent() {
      fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_vec_pretty(&file).map_err(io::Error::other)?)
  }

  pub fn precision(&self) -> u32 {
    self.precision
  }

  /// `Some(None)` is a remembered failure.
  pub fn get(&self, coordinates: Coordinates) -> Option<Option<&str>> {
    self
      .entries
      .get(&coordinates.quantize(self.precision))
      .map(Option::as_deref)
  }

  pub fn insert(&mut self, coordinates: Coordinates, name: Option<String>) {
    self
      .entries
      .insert(coordinates.quantize(self.precision), name);
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

/// Enforces a minimum interval between requests.
struct RateLimiter {
  last_request: Option<Instant>,
  min_interval: Duration,
}

impl RateLimiter {
  fn new(min_interval: Duration) -> Self {
    Self {
      last_request: None,
      min_interval,
    }
  }

  fn wait(&mut self) {
    if let Some(last) = self.last_request {
      let elapsed = last.elapsed();
      if elapsed < self.min_interval {
        let wait = self.min_interval - elapsed;
        log::trace!("Rate limiting geocoder for {wait:?}.");
        thread::sleep(wait);
      }
    }

    self.last_request = Some(Instant::now());
  }
}

/// Maps coordinates to directory-safe place names.
pub struct Geocoder {
  lookup:       Box<dyn PlaceLookup>,
  cache:        GeocodeCache,
  places:       Vec<NamedPlace>,
  rate_limiter: RateLimiter,
}

impl Geocoder {
  pub fn new(
    config: &GeocoderConfig,
    places: Vec<NamedPlace>,
    lookup: impl PlaceLookup + 'static,
  ) -> Self {
    Self {
      lookup: Box::new(lookup),
      cache: GeocodeCache::new(config.cache_precision),
      places: sanitize_places(places),
      rate_limiter: RateLimiter::new(config.min_interval()),
    }
  }

  /// Geocoder backed by the configured Nominatim endpoint.
  pub fn nominatim(config: &GeocoderConfig, places: Vec<NamedPlace>) -> Result<Self, GeocodeError> {
    Ok(Self::new(config, places, NominatimLookup::new(config)?))
  }

  pub fn offline(config: &GeocoderConfig, places: Vec<NamedPlace>) -> Self {
    Self::new(config, places, OfflineLookup)
  }

  /// Replaces the cache, e.g. with one loaded from disk. Ignored if its
  /// quantization differs.
  #[must_use]
  pub fn with_cache(mut self, cache: GeocodeCache) -> Self {
    if cache.precision() == self.cache.precision() {
      self.cache = cache;
    } else {
      log::warn!(
        "Ignoring geocode cache with precision {} (expected {}).",
        cache.precision(),
        self.cache.precision()
      );
    }
    self
  }

  pub fn cache(&self) -> &GeocodeCache {
    &self.cache
  }

  /// Place name for `coordinates`, or the unknown location if it cannot be
  /// determined. Issues at most one request per cache key.
  pub fn resolve(&mut self, coordinates: Coordinates) -> String {
    if !coordinates.is_valid() {
      log::warn!("Cannot geocode invalid position ({coordinates}).");
      return constants::UNKNOWN_LOCATION.to_string();
    }

    if let Some(place) = self.named_place(coordinates) {
      log::debug!("{coordinates}: Within named place \"{place}\".");
      return place.to_string();
    }

    if let Some(cached) = self.cache.get(coordinates) {
      return cached.unwrap_or(constants::UNKNOWN_LOCATION).to_string();
    }

    if self.lookup.is_remote() {
      self.rate_limiter.wait();
    }

    let name = match self.lookup.lookup(coordinates) {
      Ok(Some(address)) => address.place_name().and_then(sanitize_name),
      Ok(None) | Err(GeocodeError::Unavailable) => None,
      Err(e) => {
        log::warn!("{coordinates}: {e}");
        None
      }
    };

    match &name {
      Some(name) => log::debug!("{coordinates}: Resolved to \"{name}\"."),
      None => log::debug!("{coordinates}: No place name."),
    }

    self.cache.insert(coordinates, name.clone());
    name.unwrap_or_else(|| constants::UNKNOWN_LOCATION.to_string())
  }

  fn named_place(&self, coordinates: Coordinates) -> Option<&str> {
    self
      .places
      .iter()
      .find(|p| {
        let centre = Coordinates::new(p.latitude, p.longitude);
        coordinates.distance_km(&centre) <= p.radius_km
      })
      .map(|p| p.name.as_str())
  }
}

/// Named places with directory-safe names. Places whose name is unusable are
/// dropped.
fn sanitize_places(places: Vec<NamedPlace>) -> Vec<NamedPlace> {
  places
    .into_iter()
    .filter_map(|mut place| match sanitize_name(&place.name) {
      Some(name) => {
        if name != place.name {
          log::warn!("Named place \"{}\" stored as \"{name}\".", place.name);
        }
        place.name = name;
        Some(place)
      }
      None => {
        log::warn!("Ignoring named place with unusable name \"{}\".", place.name);
        None
      }
    })
    .collect()
}

/// Makes `name` usable as a single directory name: keeps the text before any
/// `/` (e.g. bilingual names), replaces reserved characters and trims
/// whitespace and trailing dots. Returns `None` if nothing usable remains.
pub fn sanitize_name(name: &str) -> Option<String> {
  let name = name.split('/').next().unwrap_or_default();
  let name = RESERVED.replace_all(name, "_");
  let name = name.trim().trim_end_matches('.').trim();

  if name.is_empty() || name == "." || name == ".." {
    None
  } else {
    Some(name.to_string())
  }
}
