//! Per-frame gameplay passes
//!
//! Spawn cadence, off-screen cleanup, and tap resolution. Each pass takes the
//! pieces of state it touches explicitly; `Game` wires them together.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::effects::Effects;
use super::pick::{Camera, pick};
use super::random::GameRng;
use super::scene::{NodeId, NodeKind, SceneRegistry};
use super::score::ScoreBoard;
use super::shape::ShapeKind;
use crate::settings::SampleRange;

/// Decides when the next shape launches
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnScheduler {
    next_spawn_time: f64,
}

impl SpawnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheduler whose first spawn waits until after `time`
    pub fn starting_at(time: f64) -> Self {
        Self {
            next_spawn_time: time,
        }
    }

    pub fn next_spawn_time(&self) -> f64 {
        self.next_spawn_time
    }

    /// Poll once per frame. Returns true when a spawn is due, and pushes the
    /// next spawn out by a random interval. Strictly after the due time, so a
    /// frame landing exactly on it waits one more frame.
    pub fn poll(&mut self, now: f64, rng: &mut GameRng, interval: SampleRange) -> bool {
        if now > self.next_spawn_time {
            self.next_spawn_time = now + rng.sample(interval) as f64;
            true
        } else {
            false
        }
    }
}

/// Removes shapes that fell out of view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CleanupSweeper {
    pub cull_y: f32,
}

impl CleanupSweeper {
    pub fn new(cull_y: f32) -> Self {
        Self { cull_y }
    }

    /// Evict every shape whose rendered y is below the cull line, counting
    /// each as a miss. Returns how many were removed.
    pub fn sweep(&self, scene: &mut SceneRegistry, score: &mut ScoreBoard) -> usize {
        let mut removed = 0;
        for id in scene.snapshot() {
            let fallen = scene.get(id).is_some_and(|node| {
                matches!(node.kind, NodeKind::Shape(_)) && node.presentation.position.y < self.cull_y
            });
            if !fallen {
                continue;
            }
            if scene.remove(id).is_some() {
                score.record_miss(scene);
                removed += 1;
                log::debug!("Missed #{} (misses: {})", id, score.misses());
            }
        }
        removed
    }
}

/// Result of a tap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// Nothing under the tap
    Nothing,
    /// Tap landed on a HUD label; ignored
    Hud(NodeId),
    /// A shape was destroyed
    Hit { node: NodeId, kind: ShapeKind },
}

/// Resolve a tap at a view point against the rendered scene
pub fn handle_tap(
    point: Vec2,
    camera: &Camera,
    scene: &mut SceneRegistry,
    score: &mut ScoreBoard,
    effects: Option<&mut Effects>,
) -> TapOutcome {
    let Some(hit) = pick(camera, scene, point) else {
        return TapOutcome::Nothing;
    };
    let Some(node) = scene.get(hit.node) else {
        return TapOutcome::Nothing;
    };

    let entity = match &node.kind {
        NodeKind::Label(_) => return TapOutcome::Hud(hit.node),
        NodeKind::Shape(entity) => entity,
    };

    let geometry = entity.geometry;
    let color = entity.material.diffuse;
    let transform = node.presentation;

    if let Some(effects) = effects {
        effects.spawn_smoke_out(geometry, transform, color);
    }

    if scene.remove(hit.node).is_none() {
        return TapOutcome::Nothing;
    }
    score.record_hit(scene);
    log::debug!(
        "Hit {} #{} at ({:.2}, {:.2}) (hits: {})",
        geometry.kind().as_str(),
        hit.node,
        transform.position.x,
        transform.position.y,
        score.hits()
    );

    TapOutcome::Hit {
        node: hit.node,
        kind: geometry.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{HudSettings, Settings};
    use crate::sim::effects::ParticleTemplate;
    use crate::sim::shape::spawn_shape;
    use glam::Vec3;

    struct Fixture {
        scene: SceneRegistry,
        score: ScoreBoard,
        rng: GameRng,
        camera: Camera,
        effects: Effects,
        settings: Settings,
    }

    impl Fixture {
        fn new() -> Self {
            let settings = Settings::default();
            let mut scene = SceneRegistry::new();
            let score = ScoreBoard::new(&mut scene, &HudSettings::default());
            Self {
                scene,
                score,
                rng: GameRng::new(777),
                camera: Camera::from_settings(&settings.camera),
                effects: Effects::new(ParticleTemplate::smoke_trail(), 16),
                settings,
            }
        }

        fn spawn_at(&mut self, pos: Vec3) -> NodeId {
            let id = spawn_shape(&mut self.scene, &mut self.rng, &self.settings);
            self.score.record_spawn();
            self.scene.set_position(id, pos);
            id
        }

        fn tap(&mut self, point: Vec2) -> TapOutcome {
            handle_tap(
                point,
                &self.camera,
                &mut self.scene,
                &mut self.score,
                Some(&mut self.effects),
            )
        }
    }

    #[test]
    fn test_scheduler_strict_boundary() {
        let mut rng = GameRng::new(1);
        let interval = SampleRange::new(0.2, 2.5);
        let mut sched = SpawnScheduler::starting_at(5.0);

        assert!(!sched.poll(5.0, &mut rng, interval));
        assert_eq!(sched.next_spawn_time(), 5.0);

        assert!(sched.poll(5.0001, &mut rng, interval));
        let next = sched.next_spawn_time();
        assert!(next >= 5.0001 + 0.2 - 1e-6 && next <= 5.0001 + 2.5 + 1e-6, "next {next}");
    }

    #[test]
    fn test_scheduler_one_spawn_per_due_time() {
        let mut rng = GameRng::new(2);
        let interval = SampleRange::new(0.2, 2.5);
        let mut sched = SpawnScheduler::new();
        assert!(sched.poll(0.016, &mut rng, interval));
        // Same frame time again: already pushed out
        assert!(!sched.poll(0.016, &mut rng, interval));
        assert!(!sched.poll(0.1, &mut rng, interval));
    }

    #[test]
    fn test_scheduler_never_moves_backward() {
        let mut rng = GameRng::new(3);
        let interval = SampleRange::new(0.2, 2.5);
        let mut sched = SpawnScheduler::new();
        let mut last = sched.next_spawn_time();
        let mut now = 0.0;
        for _ in 0..1000 {
            now += 1.0 / 60.0;
            sched.poll(now, &mut rng, interval);
            assert!(sched.next_spawn_time() >= last);
            last = sched.next_spawn_time();
        }
    }

    #[test]
    fn test_sweep_counts_fallen_as_miss() {
        let mut fx = Fixture::new();
        fx.spawn_at(Vec3::new(0.0, -2.0, 0.0));
        let sweeper = CleanupSweeper::new(-1.0);
        assert_eq!(sweeper.sweep(&mut fx.scene, &mut fx.score), 1);
        assert_eq!(fx.score.misses(), 1);
        assert_eq!(fx.score.live(), 0);
        assert_eq!(fx.scene.entity_count(), 0);
    }

    #[test]
    fn test_sweep_keeps_visible_and_hud() {
        let mut fx = Fixture::new();
        let keep = fx.spawn_at(Vec3::new(0.0, -1.0, 0.0));
        fx.spawn_at(Vec3::new(0.0, -1.5, 0.0));
        fx.spawn_at(Vec3::new(1.0, -8.0, 0.0));
        let hud_before = fx.scene.iter().filter(|n| n.is_hud()).count();

        let removed = CleanupSweeper::new(-1.0).sweep(&mut fx.scene, &mut fx.score);
        assert_eq!(removed, 2);
        assert!(fx.scene.contains(keep));
        assert_eq!(fx.scene.iter().filter(|n| n.is_hud()).count(), hud_before);
        assert!(fx.scene.entities().all(|(n, _)| n.presentation.position.y >= -1.0));
    }

    #[test]
    fn test_sweep_uses_rendered_position() {
        let mut fx = Fixture::new();
        let id = fx.spawn_at(Vec3::ZERO);
        // Simulation already below the line, presentation still above it
        fx.scene.get_mut(id).unwrap().transform.position.y = -3.0;
        assert_eq!(CleanupSweeper::new(-1.0).sweep(&mut fx.scene, &mut fx.score), 0);
        assert!(fx.scene.contains(id));
    }

    #[test]
    fn test_tap_hits_shape() {
        let mut fx = Fixture::new();
        let id = fx.spawn_at(Vec3::ZERO);
        let point = fx.camera.project(Vec3::ZERO).unwrap();

        let outcome = fx.tap(point);
        assert!(matches!(outcome, TapOutcome::Hit { node, .. } if node == id));
        assert_eq!(fx.score.hits(), 1);
        assert_eq!(fx.score.live(), 0);
        assert!(!fx.scene.contains(id));
        assert_eq!(fx.effects.len(), 1);
    }

    #[test]
    fn test_tap_removes_only_target() {
        let mut fx = Fixture::new();
        let target = fx.spawn_at(Vec3::ZERO);
        let other = fx.spawn_at(Vec3::new(0.0, 4.0, 0.0));
        let point = fx.camera.project(Vec3::ZERO).unwrap();

        fx.tap(point);
        assert!(!fx.scene.contains(target));
        assert!(fx.scene.contains(other));
        assert_eq!(fx.score.hits(), 1);
        assert_eq!(fx.score.live(), 1);
    }

    #[test]
    fn test_tap_smoke_uses_shape_color() {
        let mut fx = Fixture::new();
        let id = fx.spawn_at(Vec3::ZERO);
        let color = fx.scene.entity(id).unwrap().material.diffuse;
        fx.tap(fx.camera.project(Vec3::ZERO).unwrap());
        assert_eq!(fx.effects.instances()[0].color, color);
    }

    #[test]
    fn test_tap_on_hud_is_ignored() {
        let mut fx = Fixture::new();
        fx.spawn_at(Vec3::ZERO);
        let hud = fx.scene.iter().find(|n| n.is_hud()).unwrap();
        let hud_id = hud.id;
        let (min, max) = crate::sim::pick::label_bounds(hud, &hud.label().unwrap().text);
        let point = fx.camera.project((min + max) / 2.0).unwrap();
        let before = fx.score.state();

        assert_eq!(fx.tap(point), TapOutcome::Hud(hud_id));
        assert_eq!(fx.score.state(), before);
        assert!(fx.scene.contains(hud_id));
        assert!(fx.effects.is_empty());
    }

    #[test]
    fn test_tap_on_empty_space_is_noop() {
        let mut fx = Fixture::new();
        fx.spawn_at(Vec3::ZERO);
        let before = fx.score.state();
        assert_eq!(fx.tap(Vec2::new(2.0, 400.0)), TapOutcome::Nothing);
        assert_eq!(fx.score.state(), before);
    }

    #[test]
    fn test_tap_without_effects() {
        let mut fx = Fixture::new();
        fx.spawn_at(Vec3::ZERO);
        let point = fx.camera.project(Vec3::ZERO).unwrap();
        let outcome = handle_tap(point, &fx.camera, &mut fx.scene, &mut fx.score, None);
        assert!(matches!(outcome, TapOutcome::Hit { .. }));
    }
}
