// Copyright 2025-6 Seth Pendergrass. See LICENSE.

//! Primitive types for representing photos, their metadata, and the location
//! groups they are organized into.

mod coordinates;
mod location;
mod metadata;
mod photo;

pub use coordinates::*;
pub use location::*;
pub use metadata::*;
pub use photo::*;
