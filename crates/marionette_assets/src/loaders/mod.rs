#[cfg(feature = "gltf")]
pub mod gltf;

#[cfg(feature = "gltf")]
pub use self::gltf::{GLTF_TICKS_PER_SECOND, load_gltf, load_gltf_slice};

use marionette_animation::{PlaybackSettings, SkinnedModel};
use marionette_core::Result;
use marionette_core::import::ImportedScene;

/// Builds a model from an imported scene, attaching its first animation if
/// it has one.
pub fn build_model(scene: &ImportedScene, settings: &PlaybackSettings) -> Result<SkinnedModel> {
    let model = SkinnedModel::from_scene(scene)?;
    if scene.animations.is_empty() {
        log::warn!("'{}' has no animation; it cannot be played back", model.name);
        return Ok(model);
    }
    model.with_animation_from(scene, 0, settings.fallback_ticks_per_second)
}

/// Loads a glTF file straight into a [`SkinnedModel`].
#[cfg(feature = "gltf")]
pub fn load_gltf_model(
    path: impl AsRef<std::path::Path>,
    settings: &PlaybackSettings,
) -> Result<SkinnedModel> {
    build_model(&load_gltf(path)?, settings)
}
