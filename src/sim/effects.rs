//! Particle effects
//!
//! Purely cosmetic: nothing here feeds back into scoring. The renderer reads
//! `Effects::instances()` and draws each one with its template.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::scene::{NodeId, SceneRegistry, Transform};
use super::shape::Geometry;
use crate::Color;
use crate::consts::SMOKE_TEMPLATE;
use crate::error::GameError;

/// Where particles are born on the emitter geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BirthLocation {
    Surface,
    Volume,
}

/// Pre-authored particle system parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleTemplate {
    pub name: String,
    /// Particles per second while emitting
    pub birth_rate: f32,
    /// How long a one-shot instance emits (seconds)
    pub emission_duration: f32,
    /// Lifetime of each particle (seconds)
    pub particle_lifetime: f32,
}

impl ParticleTemplate {
    pub fn smoke_trail() -> Self {
        Self {
            name: SMOKE_TEMPLATE.to_string(),
            birth_rate: 120.0,
            emission_duration: 0.25,
            particle_lifetime: 1.2,
        }
    }
}

/// Named templates available to the game
#[derive(Debug, Clone, Default)]
pub struct EffectLibrary {
    templates: HashMap<String, ParticleTemplate>,
}

impl EffectLibrary {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Library with the bundled templates
    pub fn builtin() -> Self {
        let mut lib = Self::empty();
        lib.insert(ParticleTemplate::smoke_trail());
        lib
    }

    pub fn insert(&mut self, template: ParticleTemplate) {
        self.templates.insert(template.name.clone(), template);
    }

    pub fn get(&self, name: &str) -> Result<&ParticleTemplate, GameError> {
        self.templates
            .get(name)
            .ok_or_else(|| GameError::MissingTemplate(name.to_string()))
    }
}

/// Live particle system in the scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectInstance {
    pub id: u32,
    pub color: Color,
    pub emitter: Geometry,
    pub birth_location: BirthLocation,
    pub transform: Transform,
    pub age: f32,
    /// None while emitting indefinitely (attached trails)
    pub lifetime: Option<f32>,
    /// Node this instance follows
    pub follow: Option<NodeId>,
}

impl EffectInstance {
    pub fn is_expired(&self) -> bool {
        self.lifetime.is_some_and(|l| self.age >= l)
    }
}

/// All live effect instances, oldest first
#[derive(Debug, Clone)]
pub struct Effects {
    template: ParticleTemplate,
    instances: Vec<EffectInstance>,
    max_instances: usize,
    next_id: u32,
}

impl Effects {
    pub fn new(template: ParticleTemplate, max_instances: usize) -> Self {
        Self {
            template,
            instances: Vec::new(),
            max_instances,
            next_id: 1,
        }
    }

    pub fn template(&self) -> &ParticleTemplate {
        &self.template
    }

    pub fn instances(&self) -> &[EffectInstance] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// One-shot burst from the surface of a tapped shape
    pub fn spawn_smoke_out(&mut self, emitter: Geometry, transform: Transform, color: Color) -> u32 {
        let lifetime = self.template.emission_duration + self.template.particle_lifetime;
        self.push(EffectInstance {
            id: 0,
            color,
            emitter,
            birth_location: BirthLocation::Surface,
            transform,
            age: 0.0,
            lifetime: Some(lifetime),
            follow: None,
        })
    }

    /// Continuous trail following a node until it leaves the scene
    pub fn attach_trail(
        &mut self,
        node: NodeId,
        emitter: Geometry,
        transform: Transform,
        color: Color,
    ) -> u32 {
        self.push(EffectInstance {
            id: 0,
            color,
            emitter,
            birth_location: BirthLocation::Volume,
            transform,
            age: 0.0,
            lifetime: None,
            follow: Some(node),
        })
    }

    /// Age instances, track followed nodes, drop expired ones
    pub fn update(&mut self, dt: f32, scene: &SceneRegistry) {
        let particle_lifetime = self.template.particle_lifetime;
        for fx in &mut self.instances {
            fx.age += dt;
            let Some(node_id) = fx.follow else {
                continue;
            };
            match scene.get(node_id) {
                Some(node) => fx.transform = node.presentation,
                None => {
                    // Stop emitting; particles already out fade normally
                    fx.follow = None;
                    fx.lifetime = Some(fx.age + particle_lifetime);
                }
            }
        }
        self.instances.retain(|fx| !fx.is_expired());
    }

    fn push(&mut self, mut instance: EffectInstance) -> u32 {
        if self.max_instances == 0 {
            return 0;
        }
        while self.instances.len() >= self.max_instances {
            let dropped = self.instances.remove(0);
            log::trace!("effect #{} dropped (cap {})", dropped.id, self.max_instances);
        }
        instance.id = self.next_id;
        self.next_id += 1;
        let id = instance.id;
        self.instances.push(instance);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::physics::RigidBody;
    use crate::sim::scene::{Entity, Material, NodeKind};
    use crate::sim::shape::ShapeKind;
    use glam::Vec3;

    fn effects() -> Effects {
        Effects::new(ParticleTemplate::smoke_trail(), 8)
    }

    fn sphere() -> Geometry {
        Geometry::default_for(ShapeKind::Sphere)
    }

    #[test]
    fn test_builtin_library_has_smoke() {
        let lib = EffectLibrary::builtin();
        assert_eq!(lib.get("SmokeTrail").unwrap().name, "SmokeTrail");
    }

    #[test]
    fn test_missing_template_is_error() {
        let lib = EffectLibrary::empty();
        assert!(matches!(
            lib.get("SmokeTrail"),
            Err(GameError::MissingTemplate(name)) if name == "SmokeTrail"
        ));
    }

    #[test]
    fn test_smoke_out_expires() {
        let scene = SceneRegistry::new();
        let mut fx = effects();
        fx.spawn_smoke_out(sphere(), Transform::IDENTITY, Color::BLUE);
        assert_eq!(fx.len(), 1);
        assert_eq!(fx.instances()[0].birth_location, BirthLocation::Surface);
        fx.update(1.0, &scene);
        assert_eq!(fx.len(), 1);
        fx.update(1.0, &scene);
        assert!(fx.is_empty());
    }

    #[test]
    fn test_cap_drops_oldest() {
        let mut fx = effects();
        let first = fx.spawn_smoke_out(sphere(), Transform::IDENTITY, Color::BLUE);
        for _ in 0..8 {
            fx.spawn_smoke_out(sphere(), Transform::IDENTITY, Color::BLUE);
        }
        assert_eq!(fx.len(), 8);
        assert!(fx.instances().iter().all(|i| i.id != first));
    }

    #[test]
    fn test_trail_follows_then_detaches() {
        let mut scene = SceneRegistry::new();
        let geometry = sphere();
        let node = scene.add(
            Transform::IDENTITY,
            NodeKind::Shape(Entity {
                geometry,
                body: RigidBody::dynamic(1.0, 0.5),
                material: Material {
                    diffuse: Color::WHITE,
                    emission: Color::WHITE,
                },
            }),
        );
        let mut fx = effects();
        fx.attach_trail(node, geometry, Transform::IDENTITY, Color::WHITE);

        scene.set_position(node, Vec3::new(0.0, 3.0, 0.0));
        fx.update(10.0, &scene);
        assert_eq!(fx.instances()[0].transform.position.y, 3.0);
        assert!(fx.instances()[0].lifetime.is_none());

        scene.remove(node);
        fx.update(0.1, &scene);
        assert_eq!(fx.len(), 1);
        assert!(fx.instances()[0].follow.is_none());
        fx.update(2.0, &scene);
        assert!(fx.is_empty());
    }
}
