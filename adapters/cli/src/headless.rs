//! Windowless rendering backend that steps the simulation at a fixed rate.

use std::time::Duration;

use anyhow::{bail, Result};
use lane_defense_rendering::{
    FrameInput, Presentation, RenderingBackend, Scene, SoundCue, SoundSink,
};
use tracing::{debug, info, trace, warn};

/// Drives the scene update closure without presenting anything.
#[derive(Clone, Copy, Debug)]
pub(crate) struct HeadlessBackend {
    frame: Duration,
    max_frames: u64,
}

impl HeadlessBackend {
    pub(crate) const fn new(frame: Duration, max_frames: u64) -> Self {
        Self { frame, max_frames }
    }
}

impl RenderingBackend for HeadlessBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> bool + 'static,
    {
        if self.frame.is_zero() {
            bail!("frame duration must be positive");
        }

        let Presentation {
            window_title,
            mut scene,
            ..
        } = presentation;
        info!(
            title = %window_title,
            frame_ms = self.frame.as_millis() as u64,
            max_frames = self.max_frames,
            "running headless"
        );

        for frame in 0..self.max_frames {
            if !update_scene(self.frame, FrameInput::default(), &mut scene) {
                debug!(frame, "presentation finished");
                log_scene(&scene);
                return Ok(());
            }
        }

        warn!(
            max_frames = self.max_frames,
            "frame limit reached before the level was decided"
        );
        log_scene(&scene);
        Ok(())
    }
}

fn log_scene(scene: &Scene) {
    info!(
        enemies = scene.enemies.len(),
        towers = scene.towers.len(),
        projectiles = scene.projectiles.len(),
        money = %scene.money,
        "final scene"
    );
}

/// Sound sink that records cues in the log instead of playing them.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct TracingSoundSink;

impl SoundSink for TracingSoundSink {
    fn play(&mut self, cue: SoundCue) {
        trace!(?cue, "sound cue");
    }
}
