//! Shape kinds, their geometry, and the spawn factory

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::physics::RigidBody;
use super::random::GameRng;
use super::scene::{Entity, Material, NodeId, NodeKind, SceneRegistry, Transform};
use crate::consts::EMISSION_ALPHA;
use crate::settings::Settings;

/// Every shape the factory can launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShapeKind {
    Capsule,
    Cone,
    Cylinder,
    Pyramid,
    Sphere,
    Torus,
    Tube,
    #[default]
    Box,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 8] = [
        ShapeKind::Capsule,
        ShapeKind::Cone,
        ShapeKind::Cylinder,
        ShapeKind::Pyramid,
        ShapeKind::Sphere,
        ShapeKind::Torus,
        ShapeKind::Tube,
        ShapeKind::Box,
    ];

    /// Uniform pick over all kinds
    pub fn random(rng: &mut GameRng) -> Self {
        Self::ALL[rng.index(Self::ALL.len())]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Capsule => "capsule",
            ShapeKind::Cone => "cone",
            ShapeKind::Cylinder => "cylinder",
            ShapeKind::Pyramid => "pyramid",
            ShapeKind::Sphere => "sphere",
            ShapeKind::Torus => "torus",
            ShapeKind::Tube => "tube",
            ShapeKind::Box => "box",
        }
    }
}

/// Geometry with its dimensions (local space, centered on the node origin
/// except the pyramid, whose origin is the center of its base)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Capsule { cap_radius: f32, height: f32 },
    Cone { top_radius: f32, bottom_radius: f32, height: f32 },
    Cylinder { radius: f32, height: f32 },
    Pyramid { width: f32, height: f32, length: f32 },
    Sphere { radius: f32 },
    Torus { ring_radius: f32, pipe_radius: f32 },
    Tube { inner_radius: f32, outer_radius: f32, height: f32 },
    Box { width: f32, height: f32, length: f32, chamfer_radius: f32 },
}

impl Geometry {
    /// Default dimensions for a kind
    pub fn default_for(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Capsule => Geometry::Capsule { cap_radius: 0.5, height: 2.0 },
            ShapeKind::Cone => Geometry::Cone { top_radius: 0.0, bottom_radius: 0.5, height: 1.0 },
            ShapeKind::Cylinder => Geometry::Cylinder { radius: 0.5, height: 1.0 },
            ShapeKind::Pyramid => Geometry::Pyramid { width: 1.0, height: 1.0, length: 1.0 },
            ShapeKind::Sphere => Geometry::Sphere { radius: 0.5 },
            ShapeKind::Torus => Geometry::Torus { ring_radius: 0.5, pipe_radius: 0.25 },
            ShapeKind::Tube => Geometry::Tube { inner_radius: 0.25, outer_radius: 0.5, height: 1.0 },
            ShapeKind::Box => Geometry::Box {
                width: 1.0,
                height: 1.0,
                length: 1.0,
                chamfer_radius: 0.0,
            },
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Geometry::Capsule { .. } => ShapeKind::Capsule,
            Geometry::Cone { .. } => ShapeKind::Cone,
            Geometry::Cylinder { .. } => ShapeKind::Cylinder,
            Geometry::Pyramid { .. } => ShapeKind::Pyramid,
            Geometry::Sphere { .. } => ShapeKind::Sphere,
            Geometry::Torus { .. } => ShapeKind::Torus,
            Geometry::Tube { .. } => ShapeKind::Tube,
            Geometry::Box { .. } => ShapeKind::Box,
        }
    }

    /// Radius of a sphere around the node origin that encloses the shape.
    /// Used as the pick broad phase and for inertia.
    pub fn bounding_radius(&self) -> f32 {
        match *self {
            Geometry::Capsule { cap_radius, height } => (height / 2.0).max(cap_radius),
            Geometry::Cone { top_radius, bottom_radius, height } => {
                Vec3::new(top_radius.max(bottom_radius), height / 2.0, 0.0).length()
            }
            Geometry::Cylinder { radius, height } => Vec3::new(radius, height / 2.0, 0.0).length(),
            Geometry::Pyramid { width, height, length } => {
                Vec3::new(width / 2.0, 0.0, length / 2.0).length().max(height)
            }
            Geometry::Sphere { radius } => radius,
            Geometry::Torus { ring_radius, pipe_radius } => ring_radius + pipe_radius,
            Geometry::Tube { outer_radius, height, .. } => {
                Vec3::new(outer_radius, height / 2.0, 0.0).length()
            }
            Geometry::Box { width, height, length, .. } => {
                Vec3::new(width, height, length).length() / 2.0
            }
        }
    }
}

/// Build a random shape, launch it, and add it to the scene
pub fn spawn_shape(scene: &mut SceneRegistry, rng: &mut GameRng, settings: &Settings) -> NodeId {
    let spawn = &settings.spawn;

    let kind = ShapeKind::random(rng);
    let geometry = Geometry::default_for(kind);
    let transform = Transform::from_translation(spawn.origin);

    let mut body = RigidBody::dynamic(settings.physics.body_mass, geometry.bounding_radius());
    let impulse = Vec3::new(rng.sample(spawn.impulse_x), rng.sample(spawn.impulse_y), 0.0);
    body.apply_impulse(impulse, spawn.impulse_point, transform.rotation);

    let material = Material {
        diffuse: rng.random_color(),
        emission: rng.random_color().with_alpha(EMISSION_ALPHA),
    };

    let id = scene.add(
        transform,
        NodeKind::Shape(Entity {
            geometry,
            body,
            material,
        }),
    );
    log::debug!(
        "Spawned {} #{} impulse=({:.2}, {:.2})",
        kind.as_str(),
        id,
        impulse.x,
        impulse.y
    );
    id
}
