//! Asset loading for Marionette.
//!
//! - [`loaders`]: glTF import into the shared import types (feature `gltf`)
//! - [`placement`]: per-instance, per-frame model matrices from text files
//! - [`material`]: Phong parameters with fallback defaults

pub mod loaders;
pub mod material;
pub mod placement;

pub use material::PhongMaterial;
pub use placement::PlacementTrack;
