use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::sleep;
use std::time::{Duration, Instant};

use common::core::components::RenderableHandle;
use common::core::scene::Scene;
use glam::Vec3;
use log::{debug, info};

use crate::scene_builder::CURSOR_NAME;
use crate::simulation::registry::{BodySyncRegistry, RegistryError};

pub const DEFAULT_TICK_RATE: u64 = 16; // ~60 fps

/// Source of the externally driven cursor position, sampled once per frame.
pub trait CursorDriver {
    fn position(&mut self, elapsed: f32) -> Vec3;
}

/// Cursor sweeping a horizontal circle, standing in for pointer input in headless runs.
#[derive(Debug, Clone)]
pub struct OrbitCursor {
    pub radius: f32,
    pub height: f32,
    /// radians per second
    pub speed: f32,
}

impl CursorDriver for OrbitCursor {
    fn position(&mut self, elapsed: f32) -> Vec3 {
        let angle = elapsed * self.speed;
        Vec3::new(
            self.radius * angle.cos(),
            self.height,
            self.radius * angle.sin(),
        )
    }
}

/// Drives one physics step and one sync pass per frame, then pushes the cursor onto its probe.
pub struct SceneLoop<C> {
    scene: Scene,
    registry: BodySyncRegistry,
    cursor: C,

    // while unfocused the world is frozen but the cursor still follows its driver
    focused: bool,

    // used to stop the loop (mostly for testing and debugging purposes)
    running: Arc<AtomicBool>,

    tick: Duration,
    elapsed: f32,
    frames: u64,
}

impl<C: CursorDriver> SceneLoop<C> {
    pub fn new(
        scene: Scene,
        registry: BodySyncRegistry,
        cursor: C,
        running: Arc<AtomicBool>,
        tick: Duration,
    ) -> SceneLoop<C> {
        SceneLoop {
            scene,
            registry,
            cursor,
            focused: true,
            running,
            tick,
            elapsed: 0.0,
            frames: 0,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn registry(&self) -> &BodySyncRegistry {
        &self.registry
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn set_focused(&mut self, focused: bool) {
        if focused != self.focused {
            info!("Simulation {}", if focused { "resumed" } else { "paused" });
        }
        self.focused = focused;
    }

    fn cursor_handle(&self) -> Option<RenderableHandle> {
        self.scene.by_name(CURSOR_NAME)
    }

    /// Runs a single frame with the given delta time (negative deltas are clamped to zero).
    ///
    /// A failed step aborts the frame; the error is not retried.
    pub fn frame(&mut self, delta_time: f32) -> Result<(), RegistryError> {
        let delta_time = delta_time.max(0.0);
        if self.focused {
            self.registry.step_and_sync(delta_time, &mut self.scene)?;
        }

        self.elapsed += delta_time;
        let position = self.cursor.position(self.elapsed);
        if let Some(cursor) = self.cursor_handle() {
            if let Some(renderable) = self.scene.get_mut(cursor) {
                renderable.transform.translation = position;
            }
            self.registry.sync_renderable_to_body(cursor, position);
        }

        self.frames += 1;
        Ok(())
    }

    /// Runs frames at the fixed tick until stopped, or until `max_frames` frames have run.
    pub fn run(&mut self, max_frames: Option<u64>) -> Result<(), RegistryError> {
        let mut last_instant = Instant::now(); // used to calculate the delta time

        while self.running.load(Ordering::SeqCst) {
            if max_frames.map_or(false, |max| self.frames >= max) {
                break;
            }
            let tick_start = Instant::now();

            // calculate the delta time
            let delta_time = tick_start.duration_since(last_instant);
            last_instant = tick_start;

            self.frame(delta_time.as_secs_f32())?;

            // wait for the fixed interval tick
            let elapsed = tick_start.elapsed();
            if elapsed < self.tick {
                sleep(self.tick - elapsed);
            } else {
                // this should usually not happen unless the machine is under heavy load
                debug!("Frame took too long: {:?}", elapsed)
            }
        }
        Ok(())
    }
}
