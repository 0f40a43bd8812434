// Copyright 2025-6 Seth Pendergrass. See LICENSE.

//! Program setup functions.

use std::{fs, io::Write, path::PathBuf};

use env_logger::Builder;
use log::LevelFilter;
use photo_atlas::{config::Config, error::ConfigError};
use xdg::BaseDirectories;

const XDG_PREFIX: &str = "photo_atlas";
const LIBRARY_FILE: &str = "library";
const CONFIG_FILE: &str = "config.toml";
const GEOCODE_CACHE_FILE: &str = "geocode.json";

/// Sets up `env_logger` with the format "LEVEL message" (e.g. "WARN something
/// went wrong").
///
/// Log levels:
/// Error: Program errors.
/// Warn: Rejected or deleted files, degraded geocoding.
/// Info: General program flow and file moves.
/// Debug: Per-file decisions and classifier scores.
/// Trace: Geocoder requests.
pub fn configure_logging(verbosity: u8) {
  let level = match verbosity {
    0 => LevelFilter::Info,
    1 => LevelFilter::Debug,
    _ => LevelFilter::Trace,
  };

  Builder::new()
    .filter_level(level)
    .format(|buf, record| {
      let style = buf.default_level_style(record.level());
      writeln!(buf, "{style}{}{style:#}\t{}", record.level(), record.args())
    })
    .init();
}

/// Get library root from provided arg, if present, and write to
/// `XDG_CONFIG_HOME/photo_atlas/library`. Else, read library root from there.
pub fn get_or_update_library(path: Option<PathBuf>) -> Result<PathBuf, String> {
  let xdg_dirs = BaseDirectories::with_prefix(XDG_PREFIX);

  if let Some(path) = path {
    if !path.is_dir() {
      return Err(format!("{}: Library path is not a directory.", path.display()));
    }
    let path = path
      .canonicalize()
      .map_err(|e| format!("{}: Invalid library path ({e}).", path.display()))?;

    let config_path = xdg_dirs
      .place_config_file(LIBRARY_FILE)
      .map_err(|e| format!("Failed to create config directory ({e})."))?;
    let library = path.to_str().ok_or("Library path is not valid UTF-8.")?;
    fs::write(&config_path, library)
      .map_err(|e| format!("{}: Failed to write library path ({e}).", config_path.display()))?;

    return Ok(path);
  }

  let config_path = xdg_dirs
    .find_config_file(LIBRARY_FILE)
    .ok_or("No library set. Pass one with `-l`.")?;
  let library = fs::read_to_string(&config_path)
    .map_err(|e| format!("{}: Failed to read library path ({e}).", config_path.display()))?;

  Ok(PathBuf::from(library.trim()))
}

/// Loads `path` if given, else `XDG_CONFIG_HOME/photo_atlas/config.toml` if it
/// exists, else the defaults.
pub fn load_config(path: Option<PathBuf>) -> Result<Config, ConfigError> {
  match path {
    Some(path) => Config::load(path),
    None => match BaseDirectories::with_prefix(XDG_PREFIX).find_config_file(CONFIG_FILE) {
      Some(path) => Config::load_or_default(path),
      None => Ok(Config::default()),
    },
  }
}

/// Location of the persisted geocode cache, creating its directory.
pub fn geocode_cache_path() -> Option<PathBuf> {
  match BaseDirectories::with_prefix(XDG_PREFIX).place_cache_file(GEOCODE_CACHE_FILE) {
    Ok(path) => Some(path),
    Err(e) => {
      log::warn!("Geocode cache unavailable ({e}).");
      None
    }
  }
}
