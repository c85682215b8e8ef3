//! Scene registry
//!
//! Owns every node in the scene: launched shapes and HUD labels. Nodes are
//! kept sorted by id (ids are never reused) so iteration order is stable.

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::physics::RigidBody;
use super::shape::Geometry;
use crate::Color;

/// Handle to a scene node
pub type NodeId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub diffuse: Color,
    pub emission: Color,
}

/// A launched, tappable shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub geometry: Geometry,
    pub body: RigidBody,
    pub material: Material,
}

/// Which counter a HUD label shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HudRole {
    Hit,
    Miss,
    Accuracy,
}

/// Extruded HUD text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub role: HudRole,
    pub text: String,
    pub color: Color,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeKind {
    Shape(Entity),
    Label(Label),
}

/// A node attached to the scene root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Simulation transform
    pub transform: Transform,
    /// Simulation transform at the previous physics step
    pub previous: Transform,
    /// Rendered transform (interpolated between `previous` and `transform`)
    pub presentation: Transform,
    pub kind: NodeKind,
}

impl Node {
    pub fn is_hud(&self) -> bool {
        matches!(self.kind, NodeKind::Label(_))
    }

    pub fn entity(&self) -> Option<&Entity> {
        match &self.kind {
            NodeKind::Shape(entity) => Some(entity),
            NodeKind::Label(_) => None,
        }
    }

    pub fn label(&self) -> Option<&Label> {
        match &self.kind {
            NodeKind::Label(label) => Some(label),
            NodeKind::Shape(_) => None,
        }
    }
}

/// Children of the scene root
#[derive(Debug, Clone)]
pub struct SceneRegistry {
    nodes: Vec<Node>,
    next_id: NodeId,
}

impl Default for SceneRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            next_id: 1,
        }
    }

    /// Attach a new node; raw, previous and rendered transforms start equal
    pub fn add(&mut self, transform: Transform, kind: NodeKind) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.push(Node {
            id,
            transform,
            previous: transform,
            presentation: transform,
            kind,
        });
        id
    }

    /// Detach a node, returning it if it was present
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        let index = self.index_of(id)?;
        Some(self.nodes.remove(index))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.index_of(id).map(|i| &self.nodes[i])
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.index_of(id).map(move |i| &mut self.nodes[i])
    }

    pub fn entity(&self, id: NodeId) -> Option<&Entity> {
        self.get(id).and_then(Node::entity)
    }

    /// Teleport a node: raw, previous and rendered positions all move
    pub fn set_position(&mut self, id: NodeId, position: Vec3) -> bool {
        let Some(node) = self.get_mut(id) else {
            return false;
        };
        node.transform.position = position;
        node.previous.position = position;
        node.presentation.position = position;
        true
    }

    /// Replace a label's text; false if the node isn't a label
    pub fn set_label_text(&mut self, id: NodeId, text: &str) -> bool {
        match self.get_mut(id).map(|n| &mut n.kind) {
            Some(NodeKind::Label(label)) => {
                if label.text != text {
                    label.text.clear();
                    label.text.push_str(text);
                }
                true
            }
            _ => false,
        }
    }

    /// Ids of all current nodes, safe to hold across removals
    pub fn snapshot(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|n| n.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.iter_mut()
    }

    /// Launched shapes only
    pub fn entities(&self) -> impl Iterator<Item = (&Node, &Entity)> {
        self.nodes.iter().filter_map(|n| n.entity().map(|e| (n, e)))
    }

    pub fn entity_count(&self) -> usize {
        self.entities().count()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn index_of(&self, id: NodeId) -> Option<usize> {
        self.nodes.binary_search_by_key(&id, |n| n.id).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::shape::ShapeKind;

    fn shape() -> NodeKind {
        let geometry = Geometry::default_for(ShapeKind::Box);
        NodeKind::Shape(Entity {
            geometry,
            body: RigidBody::dynamic(1.0, geometry.bounding_radius()),
            material: Material {
                diffuse: Color::WHITE,
                emission: Color::WHITE,
            },
        })
    }

    fn label() -> NodeKind {
        NodeKind::Label(Label {
            role: HudRole::Hit,
            text: "HIT: 0".into(),
            color: Color::BLUE,
        })
    }

    #[test]
    fn test_ids_are_unique_and_ordered() {
        let mut scene = SceneRegistry::new();
        let a = scene.add(Transform::IDENTITY, shape());
        let b = scene.add(Transform::IDENTITY, shape());
        scene.remove(a);
        let c = scene.add(Transform::IDENTITY, shape());
        assert!(a < b && b < c);
        assert_eq!(scene.snapshot(), vec![b, c]);
    }

    #[test]
    fn test_remove_twice_is_none() {
        let mut scene = SceneRegistry::new();
        let id = scene.add(Transform::IDENTITY, shape());
        assert!(scene.remove(id).is_some());
        assert!(scene.remove(id).is_none());
        assert!(!scene.contains(id));
        assert!(scene.is_empty());
    }

    #[test]
    fn test_snapshot_survives_removal() {
        let mut scene = SceneRegistry::new();
        for _ in 0..5 {
            scene.add(Transform::IDENTITY, shape());
        }
        let mut visited = Vec::new();
        for id in scene.snapshot() {
            visited.push(id);
            scene.remove(id);
        }
        assert_eq!(visited, vec![1, 2, 3, 4, 5]);
        assert!(scene.is_empty());
    }

    #[test]
    fn test_entities_skip_labels() {
        let mut scene = SceneRegistry::new();
        let hud = scene.add(Transform::IDENTITY, label());
        scene.add(Transform::IDENTITY, shape());
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.entity_count(), 1);
        assert!(scene.get(hud).unwrap().is_hud());
        assert!(scene.entity(hud).is_none());
    }

    #[test]
    fn test_set_position_moves_all_transforms() {
        let mut scene = SceneRegistry::new();
        let id = scene.add(Transform::IDENTITY, shape());
        assert!(scene.set_position(id, Vec3::new(0.0, -2.0, 0.0)));
        let node = scene.get(id).unwrap();
        assert_eq!(node.transform.position.y, -2.0);
        assert_eq!(node.previous.position.y, -2.0);
        assert_eq!(node.presentation.position.y, -2.0);
        assert!(!scene.set_position(999, Vec3::ZERO));
    }

    #[test]
    fn test_set_label_text_only_on_labels() {
        let mut scene = SceneRegistry::new();
        let hud = scene.add(Transform::IDENTITY, label());
        let ent = scene.add(Transform::IDENTITY, shape());
        assert!(scene.set_label_text(hud, "HIT: 3"));
        assert_eq!(scene.get(hud).unwrap().label().unwrap().text, "HIT: 3");
        assert!(!scene.set_label_text(ent, "nope"));
    }

    #[test]
    fn test_transform_matrix_translation() {
        let t = Transform::from_translation(Vec3::new(1.0, 2.0, 3.0)).with_scale(Vec3::splat(2.0));
        let p = t.matrix().transform_point3(Vec3::ONE);
        assert_eq!(p, Vec3::new(3.0, 4.0, 5.0));
    }
}
