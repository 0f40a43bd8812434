// Copyright 2025-6 Seth Pendergrass. See LICENSE.

//! In-memory geocoding backend.

use std::sync::{
  Arc,
  atomic::{AtomicUsize, Ordering},
};

use crossbeam_channel::{Receiver, Sender};

use crate::{
  error::GeocodeError,
  geocode::{Address, PlaceLookup},
  prim::Coordinates,
};

/// Answers from a fixed list of places, counting requests. Clones share the
/// counter, so a test can keep a clone after handing one to a `Geocoder`.
#[derive(Clone, Default)]
pub struct FakeLookup {
  places: Vec<(Coordinates, Address)>,
  fail:   bool,
  calls:  Arc<AtomicUsize>,
  gate:   Option<Receiver<()>>,
}

impl FakeLookup {
  pub fn new() -> Self {
    Self::default()
  }

  /// Fails every request.
  pub fn failing() -> Self {
    Self {
      fail: true,
      ..Self::default()
    }
  }

  /// Blocks each request until a token is sent, or the sender is dropped.
  pub fn gated() -> (Self, Sender<()>) {
    let (sender, receiver) = crossbeam_channel::unbounded();
    let lookup = Self {
      gate: Some(receiver),
      ..Self::default()
    };
    (lookup, sender)
  }

  /// Answers `address` for anything within 50 km of `centre`.
  pub fn with(mut self, centre: Coordinates, address: Address) -> Self {
    self.places.push((centre, address));
    self
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

impl PlaceLookup for FakeLookup {
  fn lookup(&mut self, coordinates: Coordinates) -> Result<Option<Address>, GeocodeError> {
    if let Some(gate) = &self.gate {
      let _ = gate.recv();
    }
    self.calls.fetch_add(1, Ordering::SeqCst);

    if self.fail {
      return Err(GeocodeError::Service("fake failure".to_string()));
    }

    Ok(
      self
        .places
        .iter()
        .find(|(centre, _)| centre.distance_km(&coordinates) < 50.0)
        .map(|(_, address)| address.clone()),
    )
  }
}
