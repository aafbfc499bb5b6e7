//! Crowd Baker
//!
//! Loads a skinned glTF model, spawns a crowd of instances and plays it back
//! headless at a fixed frame rate. Optionally writes the baked bone
//! transforms of the whole clip to a binary file.
//!
//! ```text
//! crowd_baker soldier.glb --instances 64 --frames 240 --bake-out soldier.bake
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;

use marionette::assets::loaders::{build_model, load_gltf};
use marionette::{
    AnimationBake, AnimationClip, CpuTransformBuffer, Crowd, FrameClock, PlacementTrack,
    PlaybackSettings, StartFrame,
};

#[derive(Parser)]
#[command(name = "crowd_baker")]
#[command(about = "Play back a crowd of skinned glTF instances without a window")]
struct Cli {
    /// glTF or GLB file with a skin and at least one animation
    model: PathBuf,

    /// Number of instances to spawn
    #[arg(short, long, default_value_t = 16)]
    instances: usize,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 120)]
    frames: u64,

    /// Simulated frame rate
    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// Play this animation of the file instead of the first one
    #[arg(short, long)]
    animation: Option<usize>,

    /// Pause every instance after this many frames
    #[arg(long)]
    pause_at: Option<u64>,

    /// JSON file with playback settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Placement track with one matrix per instance and frame
    #[arg(long)]
    placement: Option<PathBuf>,

    /// Write the baked clip here
    #[arg(long)]
    bake_out: Option<PathBuf>,
}

fn load_settings(path: Option<&PathBuf>) -> Result<PlaybackSettings> {
    let Some(path) = path else {
        return Ok(PlaybackSettings::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading settings {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing settings {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let Some(mut clock) = FrameClock::from_fps(cli.fps) else {
        bail!("--fps must be positive, got {}", cli.fps);
    };

    let settings = load_settings(cli.config.as_ref())?;
    let scene = load_gltf(&cli.model).with_context(|| format!("loading {}", cli.model.display()))?;
    let mut model = build_model(&scene, &settings)?;
    if let Some(index) = cli.animation {
        let animation = scene.animations.get(index).with_context(|| {
            format!("{} has {} animations", cli.model.display(), scene.animations.len())
        })?;
        model.set_animation(AnimationClip::from_imported(
            animation,
            settings.fallback_ticks_per_second,
        )?);
    }
    if !model.has_animation() {
        bail!("{} has no animation to play", cli.model.display());
    }

    if let Some(path) = &cli.bake_out {
        let bake = AnimationBake::bake(&model)?;
        std::fs::write(path, bake.as_bytes())
            .with_context(|| format!("writing bake {}", path.display()))?;
        println!(
            "Baked {} frames x {} bones to {}",
            bake.frame_count(),
            bake.bone_count(),
            path.display()
        );
    }

    let placement = cli
        .placement
        .as_ref()
        .map(|path| PlacementTrack::from_file(path, cli.instances))
        .transpose()?;

    let mut crowd = Crowd::new(settings);
    let model_id = crowd.add_model(Arc::new(model))?;
    for _ in 0..cli.instances {
        crowd.register_instance(model_id, None, StartFrame::Random)?;
    }

    let mut staging = CpuTransformBuffer::new();
    let mut uploads = 0_u64;
    let mut seen_version = staging.version(model_id);

    while clock.frame_count < cli.frames {
        clock.tick();
        if cli.pause_at == Some(clock.frame_count) {
            log::info!("Frame {}: toggling playback", clock.frame_count);
            crowd.toggle_animating();
        }

        crowd.update_seconds(clock.dt_seconds(), &mut staging)?;

        // A renderer would upload here; count how often that is needed.
        if staging.version(model_id) != seen_version {
            seen_version = staging.version(model_id);
            uploads += 1;
        }

        if let Some(track) = &placement {
            let frame = track.frame_at(clock.frame_count as f32);
            log::debug!(
                "Frame {}: instance 0 at {}",
                clock.frame_count,
                frame.first().map_or(glam::Vec3::ZERO, |m| m.w_axis.truncate())
            );
        }
    }

    let pool = crowd.pool(model_id).context("crowd lost its model")?;
    println!(
        "Simulated {} frames ({:.2} s) of {} instances, {} uploads",
        clock.frame_count,
        clock.elapsed.as_secs_f32(),
        pool.len(),
        uploads
    );
    for (id, state) in pool.iter().take(8) {
        println!(
            "  instance {id}: frame {:.2} speed {:.2} {}",
            state.current_frame(),
            state.speed(),
            if state.is_animating() { "playing" } else { "paused" }
        );
    }
    Ok(())
}
