// Copyright 2025-6 Seth Pendergrass. See LICENSE.

//! Sorts unsorted photos into a `Year/Location` library.
//!
//! Each image is classified as essential or not (blurry, screenshot,
//! document), its GPS position reverse geocoded to a place name, and the file
//! moved under the library root. Essential photos are tracked in a location
//! index that is persisted as a manifest alongside the files.

pub mod classify;
pub mod config;
pub mod error;
pub mod geocode;
pub mod io;
pub mod org;
pub mod prim;
pub mod runner;

#[cfg(test)]
mod testing;
