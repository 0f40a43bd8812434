// Copyright 2025-6 Seth Pendergrass. See LICENSE.

//! Photo library organization.

mod batch;
mod edits;
mod library;
mod organizer;

pub use batch::{BatchObserver, BatchResult, Progress};
pub use organizer::Organizer;
