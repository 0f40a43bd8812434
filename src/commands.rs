// Copyright 2025-6 Seth Pendergrass. See LICENSE.

//! Program subcommands for managing a photo atlas.

use std::path::{Path, PathBuf};

use photo_atlas::{
  classify::Classifier,
  config::Config,
  geocode::{GeocodeCache, Geocoder},
  io,
  org::{BatchResult, Organizer},
  prim::Year,
  runner::{PipelineEvent, PipelineRunner},
};

use crate::setup;

/// Shared options for opening the library.
pub struct Context {
  pub library: PathBuf,
  pub config:  Config,
  pub offline: bool,
}

/// Organizes the images directly inside `source` into the library.
pub fn process(context: &Context, source: &Path, year: Option<i32>) -> Result<(), String> {
  log::info!(
    "Processing {} into {}.",
    source.display(),
    context.library.display()
  );

  let organizer = open(context)?;
  let files = io::list_images(source, organizer.extensions())
    .map_err(|e| format!("{}: Could not list images ({e}).", source.display()))?;

  let mut runner = PipelineRunner::new(organizer);
  runner.start(files, year).map_err(|e| e.to_string())?;

  let mut outcome = Ok(());
  while let Some(event) = runner.next_event() {
    match event {
      PipelineEvent::Progress(p) => {
        log::info!("[{}/{}] {}", p.completed, p.total, p.path.display());
      }
      PipelineEvent::Completed(result) => print_summary(&result),
      PipelineEvent::Cancelled(result) => {
        log::warn!("Cancelled.");
        print_summary(&result);
      }
      PipelineEvent::Failed(e) => outcome = Err(e.to_string()),
    }
  }

  let organizer = runner.finish().map_err(|e| e.to_string())?;
  save_cache(&organizer);
  outcome
}

/// Rebuilds the manifest from the directory tree.
pub fn scan(context: &Context) -> Result<(), String> {
  let mut organizer = open(context)?;
  organizer.rescan().map_err(|e| e.to_string())?;
  organizer.save_manifest().map_err(|e| e.to_string())?;
  Ok(())
}

/// Prints every location group.
pub fn list(context: &Context) -> Result<(), String> {
  let organizer = open(context)?;

  for group in organizer.index().groups() {
    let pin = group
      .coordinates()
      .map_or_else(|| "-".to_string(), |c| c.to_string());
    println!(
      "{}\t{}\t{} photos\t{pin}",
      group.year(),
      group.name(),
      group.len()
    );
  }

  println!(
    "{} photos in {} locations.",
    organizer.index().photo_count(),
    organizer.index().len()
  );
  Ok(())
}

/// Deletes one organized photo.
pub fn delete(context: &Context, path: &Path) -> Result<(), String> {
  let mut organizer = open(context)?;
  let photo = organizer.delete_photo(path).map_err(|e| e.to_string())?;
  log::info!("{photo}: Removed from library.");
  organizer.save_manifest().map_err(|e| e.to_string())?;
  Ok(())
}

/// Renames a location of `year`.
pub fn rename(context: &Context, year: Year, old: &str, new: &str) -> Result<(), String> {
  let mut organizer = open(context)?;
  organizer
    .rename_location(year, old, new)
    .map_err(|e| e.to_string())?;
  organizer.save_manifest().map_err(|e| e.to_string())?;
  Ok(())
}

fn open(context: &Context) -> Result<Organizer, String> {
  let config = &context.config;
  let classifier = Classifier::new(config.classifier.clone());

  let geocoder = if context.offline {
    Geocoder::offline(&config.geocoder, config.places.clone())
  } else {
    Geocoder::nominatim(&config.geocoder, config.places.clone()).map_err(|e| e.to_string())?
  };
  let geocoder = match setup::geocode_cache_path() {
    Some(path) => geocoder.with_cache(GeocodeCache::load(path, config.geocoder.cache_precision)),
    None => geocoder,
  };

  Organizer::load_library(&context.library, classifier, geocoder).map_err(|e| e.to_string())
}

fn save_cache(organizer: &Organizer) {
  let Some(path) = setup::geocode_cache_path() else {
    return;
  };

  if let Err(e) = organizer.geocoder().cache().save(&path) {
    log::warn!("{}: Failed to save geocode cache ({e}).", path.display());
  }
}

fn print_summary(result: &BatchResult) {
  println!(
    "Organized {}, rejected {}, failed {}.",
    result.organized.len(),
    result.rejected.len(),
    result.errors.len()
  );

  for photo in &result.rejected {
    if let Some(reason) = photo.rejection_reason() {
      println!("\t{reason}\t{photo}");
    }
  }
  for error in &result.errors {
    println!("\terror\t{error}");
  }
}
