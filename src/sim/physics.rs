//! Rigid body integration
//!
//! Fixed timestep with an accumulator. Each node keeps the transform from the
//! previous step so the rendered (presentation) transform can be interpolated
//! between the last two steps.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::scene::{NodeKind, SceneRegistry};
use crate::consts::{MAX_SUBSTEPS, SIM_DT};

/// A dynamic body driven only by gravity and impulses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigidBody {
    pub mass: f32,
    /// Inverse moment of inertia (solid sphere around the bounding radius)
    pub inv_inertia: f32,
    pub velocity: Vec3,
    /// Angular velocity (axis * radians/sec, world space)
    pub angular_velocity: Vec3,
}

impl RigidBody {
    pub fn dynamic(mass: f32, bounding_radius: f32) -> Self {
        let inertia = 0.4 * mass * bounding_radius * bounding_radius;
        Self {
            mass,
            inv_inertia: if inertia > 0.0 { 1.0 / inertia } else { 0.0 },
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
        }
    }

    /// Instantaneous impulse at a body-local point
    pub fn apply_impulse(&mut self, impulse: Vec3, local_point: Vec3, rotation: Quat) {
        self.velocity += impulse / self.mass;
        let arm = rotation * local_point;
        self.angular_velocity += arm.cross(impulse) * self.inv_inertia;
    }
}

/// Steps every body in the scene
#[derive(Debug, Clone)]
pub struct PhysicsWorld {
    pub gravity: Vec3,
    accumulator: f32,
}

impl PhysicsWorld {
    pub fn new(gravity: Vec3) -> Self {
        Self {
            gravity,
            accumulator: 0.0,
        }
    }

    /// Interpolation factor between the previous and current step
    pub fn alpha(&self) -> f32 {
        (self.accumulator / SIM_DT).clamp(0.0, 1.0)
    }

    /// Advance by a frame's worth of time, then refresh presentation transforms.
    /// Returns the number of fixed steps taken.
    pub fn advance(&mut self, scene: &mut SceneRegistry, dt: f32) -> u32 {
        let dt = dt.clamp(0.0, 0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.step(scene, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        // Drop the backlog rather than spiral
        if self.accumulator >= SIM_DT {
            log::trace!("physics backlog dropped ({:.4}s)", self.accumulator);
            self.accumulator %= SIM_DT;
        }

        self.interpolate(scene);
        substeps
    }

    /// One fixed step (semi-implicit Euler)
    pub fn step(&self, scene: &mut SceneRegistry, dt: f32) {
        for node in scene.iter_mut() {
            let NodeKind::Shape(entity) = &mut node.kind else {
                continue;
            };
            node.previous = node.transform;

            let body = &mut entity.body;
            body.velocity += self.gravity * dt;
            node.transform.position += body.velocity * dt;

            let spin = body.angular_velocity * dt;
            if spin.length_squared() > 0.0 {
                node.transform.rotation =
                    (Quat::from_scaled_axis(spin) * node.transform.rotation).normalize();
            }
        }
    }

    /// Rendered transform = previous step blended toward current step
    fn interpolate(&self, scene: &mut SceneRegistry) {
        let alpha = self.alpha();
        for node in scene.iter_mut() {
            if !matches!(node.kind, NodeKind::Shape(_)) {
                continue;
            }
            node.presentation.position = node.previous.position.lerp(node.transform.position, alpha);
            node.presentation.rotation = node.previous.rotation.slerp(node.transform.rotation, alpha);
            node.presentation.scale = node.transform.scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;
    use crate::sim::scene::{Entity, Material, Transform};
    use crate::sim::shape::{Geometry, ShapeKind};

    fn add_body(scene: &mut SceneRegistry, pos: Vec3, velocity: Vec3) -> u32 {
        let geometry = Geometry::default_for(ShapeKind::Sphere);
        let mut body = RigidBody::dynamic(1.0, geometry.bounding_radius());
        body.velocity = velocity;
        scene.add(
            Transform::from_translation(pos),
            NodeKind::Shape(Entity {
                geometry,
                body,
                material: Material {
                    diffuse: Color::WHITE,
                    emission: Color::WHITE,
                },
            }),
        )
    }

    #[test]
    fn test_impulse_changes_velocity_by_j_over_m() {
        let mut body = RigidBody::dynamic(2.0, 0.5);
        body.apply_impulse(Vec3::new(1.0, 10.0, 0.0), Vec3::ZERO, Quat::IDENTITY);
        assert_eq!(body.velocity, Vec3::new(0.5, 5.0, 0.0));
        assert_eq!(body.angular_velocity, Vec3::ZERO);
    }

    #[test]
    fn test_off_center_impulse_spins() {
        let mut body = RigidBody::dynamic(1.0, 0.5);
        body.apply_impulse(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.05, 0.05, 0.05), Quat::IDENTITY);
        // r x J = (0.05,0.05,0.05) x (0,10,0) = (-0.5, 0, 0.5)
        let expected = Vec3::new(-0.5, 0.0, 0.5) * body.inv_inertia;
        assert!((body.angular_velocity - expected).length() < 1e-5);
    }

    #[test]
    fn test_gravity_pulls_down() {
        let mut scene = SceneRegistry::new();
        let id = add_body(&mut scene, Vec3::ZERO, Vec3::ZERO);
        let mut world = PhysicsWorld::new(Vec3::new(0.0, -9.8, 0.0));
        for _ in 0..60 {
            world.advance(&mut scene, 1.0 / 60.0);
        }
        let node = scene.get(id).unwrap();
        // ~0.5 * g * t² after one second
        assert!(node.transform.position.y < -4.5 && node.transform.position.y > -5.2);
        assert!(node.presentation.position.y <= 0.0);
    }

    #[test]
    fn test_launched_body_rises_then_falls() {
        let mut scene = SceneRegistry::new();
        let id = add_body(&mut scene, Vec3::ZERO, Vec3::new(0.0, 10.0, 0.0));
        let mut world = PhysicsWorld::new(Vec3::new(0.0, -9.8, 0.0));
        let mut peak = 0.0f32;
        for _ in 0..180 {
            world.advance(&mut scene, 1.0 / 60.0);
            peak = peak.max(scene.get(id).unwrap().presentation.position.y);
        }
        assert!(peak > 4.5 && peak < 5.5, "peak {peak}");
        assert!(scene.get(id).unwrap().presentation.position.y < -1.0);
    }

    #[test]
    fn test_presentation_lags_simulation() {
        let mut scene = SceneRegistry::new();
        let id = add_body(&mut scene, Vec3::ZERO, Vec3::new(0.0, -3.0, 0.0));
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        // One and a half steps: presentation sits between previous and current
        world.advance(&mut scene, SIM_DT * 1.5);
        let node = scene.get(id).unwrap();
        assert!(node.presentation.position.y > node.transform.position.y);
        assert!(node.presentation.position.y < node.previous.position.y);
        assert!((world.alpha() - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_substeps_are_capped() {
        let mut scene = SceneRegistry::new();
        add_body(&mut scene, Vec3::ZERO, Vec3::ZERO);
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        assert_eq!(world.advance(&mut scene, 5.0), MAX_SUBSTEPS);
        assert!(world.alpha() < 1.0);
    }

    #[test]
    fn test_zero_dt_takes_no_step() {
        let mut scene = SceneRegistry::new();
        add_body(&mut scene, Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        assert_eq!(world.advance(&mut scene, 0.0), 0);
    }
}
