//! Game facade
//!
//! Owns the scene and every pass that touches it. Hosts call `frame` from
//! their render loop and `tap` from their input handler, always on the same
//! thread, so no pass ever interleaves with another.

use glam::Vec2;

use super::effects::{EffectLibrary, Effects};
use super::physics::PhysicsWorld;
use super::pick::Camera;
use super::random::GameRng;
use super::scene::{NodeId, SceneRegistry};
use super::score::ScoreBoard;
use super::shape::spawn_shape;
use super::tick::{CleanupSweeper, SpawnScheduler, TapOutcome, handle_tap};
use crate::error::GameError;
use crate::settings::Settings;

pub struct Game {
    settings: Settings,
    rng: GameRng,
    scene: SceneRegistry,
    physics: PhysicsWorld,
    camera: Camera,
    scheduler: SpawnScheduler,
    sweeper: CleanupSweeper,
    score: ScoreBoard,
    effects: Effects,
    last_frame: Option<f64>,
}

impl Game {
    /// Game using the bundled effect templates
    pub fn new(settings: Settings, seed: u64) -> Result<Self, GameError> {
        Self::with_library(settings, seed, &EffectLibrary::builtin())
    }

    /// Game resolving its particle template from `library`. A missing
    /// template is a packaging defect and fails startup.
    pub fn with_library(
        settings: Settings,
        seed: u64,
        library: &EffectLibrary,
    ) -> Result<Self, GameError> {
        settings.validate()?;
        for warning in settings.warnings() {
            log::warn!("settings: {warning}");
        }

        let template = library.get(&settings.effects.template)?.clone();
        let effects = Effects::new(template, settings.effects.max_instances);

        let mut scene = SceneRegistry::new();
        let score = ScoreBoard::new(&mut scene, &settings.hud);

        log::info!("Game initialized with seed: {}", seed);
        Ok(Self {
            rng: GameRng::new(seed),
            physics: PhysicsWorld::new(settings.physics.gravity),
            camera: Camera::from_settings(&settings.camera),
            scheduler: SpawnScheduler::new(),
            sweeper: CleanupSweeper::new(settings.spawn.cull_y),
            scene,
            score,
            effects,
            settings,
            last_frame: None,
        })
    }

    /// Per-frame update. `now` is the host clock in seconds and must not go
    /// backwards; a repeated or earlier time advances nothing.
    pub fn frame(&mut self, now: f64) {
        let dt = match self.last_frame {
            Some(last) => (now - last).max(0.0) as f32,
            None => 0.0,
        };
        self.last_frame = Some(self.last_frame.map_or(now, |last| last.max(now)));

        if self
            .scheduler
            .poll(now, &mut self.rng, self.settings.spawn.interval)
        {
            self.spawn();
            self.sweep();
        }

        self.physics.advance(&mut self.scene, dt);
        self.effects.update(dt, &self.scene);
    }

    /// Launch one shape now
    pub fn spawn(&mut self) -> NodeId {
        let id = spawn_shape(&mut self.scene, &mut self.rng, &self.settings);
        self.score.record_spawn();

        if let Some(every) = self.settings.effects.trail_every {
            if self.score.spawned() % every == 0 {
                if let Some(node) = self.scene.get(id) {
                    if let Some(entity) = node.entity() {
                        let emission = entity.material.emission;
                        self.effects
                            .attach_trail(id, entity.geometry, node.presentation, emission);
                    }
                }
            }
        }
        id
    }

    /// Remove shapes below the cull line; returns how many were missed
    pub fn sweep(&mut self) -> usize {
        self.sweeper.sweep(&mut self.scene, &mut self.score)
    }

    /// Resolve a tap at a view point
    pub fn tap(&mut self, point: Vec2) -> TapOutcome {
        let effects = self
            .settings
            .effects
            .enabled
            .then_some(&mut self.effects);
        handle_tap(point, &self.camera, &mut self.scene, &mut self.score, effects)
    }

    /// Host view changed size
    pub fn resize(&mut self, width: f32, height: f32) {
        self.camera.set_viewport(width, height);
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn scene(&self) -> &SceneRegistry {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneRegistry {
        &mut self.scene
    }

    pub fn score(&self) -> &ScoreBoard {
        &self.score
    }

    pub fn effects(&self) -> &Effects {
        &self.effects
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn scheduler(&self) -> &SpawnScheduler {
        &self.scheduler
    }
}
