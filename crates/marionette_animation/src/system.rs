use std::sync::Arc;

use glam::Mat4;

use marionette_core::{MarionetteError, Result};

use crate::export::TransformExporter;
use crate::instance::StartFrame;
use crate::model::SkinnedModel;
use crate::pool::{InstanceId, InstancePool};
use crate::settings::PlaybackSettings;

/// Index of a model inside a [`Crowd`].
pub type ModelId = usize;

#[derive(Debug)]
struct CrowdModel {
    model: Arc<SkinnedModel>,
    pool: InstancePool,
    // Reused output buffer, one matrix per bone.
    scratch: Vec<Mat4>,
}

/// Per-frame driver for every animated model in a scene.
///
/// Each frame runs in a fixed order: advance all instance clocks, compute
/// the bone transforms of every instance, hand them to the exporter.
#[derive(Debug)]
pub struct Crowd {
    settings: PlaybackSettings,
    models: Vec<CrowdModel>,
}

impl Crowd {
    #[must_use]
    pub fn new(settings: PlaybackSettings) -> Self {
        Self {
            settings,
            models: Vec::new(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    /// Adds a model with an empty instance pool. The model must carry an
    /// animation clip.
    pub fn add_model(&mut self, model: Arc<SkinnedModel>) -> Result<ModelId> {
        let duration = model.clip()?.duration_ticks();
        let id = self.models.len();
        let pool = match self.settings.rng_seed {
            // Distinct but reproducible stream per model.
            Some(seed) => InstancePool::with_seed(duration, seed.wrapping_add(id as u64))?,
            None => InstancePool::new(duration)?,
        };

        log::debug!("Crowd model {id}: '{}'", model.name);
        self.models.push(CrowdModel {
            scratch: vec![Mat4::IDENTITY; model.bone_count()],
            model,
            pool,
        });
        Ok(id)
    }

    /// Registers an instance of `model`. `speed` of `None` uses the
    /// configured default speed.
    pub fn register_instance(
        &mut self,
        model: ModelId,
        speed: Option<f32>,
        start: StartFrame,
    ) -> Result<InstanceId> {
        let speed = speed.unwrap_or(self.settings.default_speed);
        Ok(self.entry_mut(model)?.pool.register_instance(speed, start))
    }

    #[must_use]
    pub fn model(&self, id: ModelId) -> Option<&Arc<SkinnedModel>> {
        self.models.get(id).map(|m| &m.model)
    }

    #[must_use]
    pub fn pool(&self, id: ModelId) -> Option<&InstancePool> {
        self.models.get(id).map(|m| &m.pool)
    }

    pub fn pool_mut(&mut self, id: ModelId) -> Result<&mut InstancePool> {
        Ok(&mut self.entry_mut(id)?.pool)
    }

    #[must_use]
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.models.iter().map(|m| m.pool.len()).sum()
    }

    /// Pauses every playing instance and resumes every paused one, across
    /// all models.
    pub fn toggle_animating(&mut self) {
        for entry in &mut self.models {
            entry.pool.toggle_animating();
        }
    }

    /// Runs one frame with `delta_ticks` of clip time.
    pub fn update(&mut self, delta_ticks: f32, exporter: &mut impl TransformExporter) -> Result<()> {
        for entry in &mut self.models {
            entry.pool.advance(delta_ticks);
        }

        for (id, entry) in self.models.iter_mut().enumerate() {
            Self::export_model(id, entry, exporter)?;
        }
        Ok(())
    }

    /// Runs one frame of `dt_seconds`, converted with each clip's tick rate.
    pub fn update_seconds(&mut self, dt_seconds: f32, exporter: &mut impl TransformExporter) -> Result<()> {
        for entry in &mut self.models {
            let delta_ticks = entry.model.clip()?.seconds_to_ticks(dt_seconds);
            entry.pool.advance(delta_ticks);
        }

        for (id, entry) in self.models.iter_mut().enumerate() {
            Self::export_model(id, entry, exporter)?;
        }
        Ok(())
    }

    fn export_model(id: ModelId, entry: &mut CrowdModel, exporter: &mut impl TransformExporter) -> Result<()> {
        let CrowdModel { model, pool, scratch } = entry;
        exporter.begin_frame(id, pool.len(), model.bone_count());

        // Instances sharing a frame (e.g. all paused at 0) reuse the result.
        let mut computed_at: Option<f32> = None;
        for (slot, (_, state)) in pool.iter().enumerate() {
            let time = state.current_frame();
            if computed_at != Some(time) {
                model.bone_transforms_into(time, scratch)?;
                computed_at = Some(time);
            }
            exporter.export_bone_transforms(id, slot, scratch);
        }

        exporter.export_playback(id, &pool.playback_params());
        Ok(())
    }

    fn entry_mut(&mut self, id: ModelId) -> Result<&mut CrowdModel> {
        self.models.get_mut(id).ok_or(MarionetteError::UnknownModel(id))
    }
}
