// Copyright 2025-6 Seth Pendergrass. See LICENSE.

//! Command line front end: sorts a folder of photos into a year/location
//! library, setting aside blurry shots, screenshots and documents.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use photo_atlas::prim::Year;

mod commands;
mod setup;

#[derive(Parser)]
struct Args {
  /// Directory of photo library. Updates default in `XDG_CONFIG_HOME`.
  #[arg(short, long, global = true)]
  library: Option<PathBuf>,

  /// Verbosity level. Max: 2.
  #[arg(short, action = ArgAction::Count, global = true)]
  verbose: u8,

  /// Configuration file. Defaults to `XDG_CONFIG_HOME/photo_atlas/config.toml`.
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Skip reverse geocoding; only named places are resolved.
  #[arg(long, global = true)]
  offline: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Organize images from a directory into the library.
  Process {
    source: PathBuf,
    /// Year for photos without capture date or modification time.
    #[arg(long)]
    year:   Option<i32>,
  },
  /// Rebuild the manifest from the library's directories.
  Scan,
  /// List locations.
  List,
  /// Delete a photo from the library.
  Delete { path: PathBuf },
  /// Rename a location.
  Rename { year: Year, old: String, new: String },
}

fn main() {
  let args = Args::parse();
  setup::configure_logging(args.verbose);

  if let Err(e) = run(args) {
    log::error!("{e}");
    std::process::exit(1);
  }
}

fn run(args: Args) -> Result<(), String> {
  let library = setup::get_or_update_library(args.library)?;
  let config = setup::load_config(args.config).map_err(|e| e.to_string())?;
  let context = commands::Context {
    library,
    config,
    offline: args.offline,
  };

  match args.command {
    Commands::Process { source, year } => commands::process(&context, &source, year),
    Commands::Scan => commands::scan(&context),
    Commands::List => commands::list(&context),
    Commands::Delete { path } => commands::delete(&context, &path),
    Commands::Rename { year, old, new } => commands::rename(&context, year, &old, &new),
  }
}
