//! Headless simulation module
//!
//! All gameplay logic lives here. This module must stay deterministic for a
//! given seed and frame-time sequence:
//! - Fixed physics timestep only
//! - Seeded RNG only
//! - Stable iteration order (by node id)
//! - No rendering or platform dependencies

pub mod effects;
pub mod game;
pub mod physics;
pub mod pick;
pub mod random;
pub mod scene;
pub mod score;
pub mod shape;
pub mod tick;

pub use effects::{BirthLocation, EffectInstance, EffectLibrary, Effects, ParticleTemplate};
pub use game::Game;
pub use physics::{PhysicsWorld, RigidBody};
pub use pick::{Camera, PickHit, Ray, pick};
pub use random::GameRng;
pub use scene::{Entity, HudRole, Label, Material, Node, NodeId, NodeKind, SceneRegistry, Transform};
pub use score::{ScoreBoard, ScoreState};
pub use shape::{Geometry, ShapeKind, spawn_shape};
pub use tick::{CleanupSweeper, SpawnScheduler, TapOutcome, handle_tap};
