//! Score counters and HUD labels

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::scene::{HudRole, Label, NodeId, NodeKind, SceneRegistry, Transform};
use crate::Color;
use crate::settings::HudSettings;

/// Raw counters. `live == spawned - hits - misses` at all times.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreState {
    pub hits: u32,
    pub misses: u32,
    pub live: u32,
    pub spawned: u32,
}

impl ScoreState {
    /// Fraction of resolved shapes that were hit (0 before any resolve)
    pub fn accuracy(&self) -> f32 {
        let resolved = self.hits + self.misses;
        if resolved == 0 {
            0.0
        } else {
            self.hits as f32 / resolved as f32
        }
    }

    fn check(&self) {
        debug_assert_eq!(
            self.live as u64 + self.hits as u64 + self.misses as u64,
            self.spawned as u64,
            "score counters out of balance: {self:?}"
        );
    }
}

/// Counters plus the HUD labels that display them
#[derive(Debug, Clone)]
pub struct ScoreBoard {
    state: ScoreState,
    hit_label: NodeId,
    miss_label: NodeId,
    /// Only attached when the HUD asks for it
    accuracy_label: Option<NodeId>,
}

impl ScoreBoard {
    /// Create the HUD labels in the scene
    pub fn new(scene: &mut SceneRegistry, hud: &HudSettings) -> Self {
        let state = ScoreState::default();
        let mut add_label = |role: HudRole, position: Vec3, color: Color| {
            scene.add(
                Transform::from_translation(position).with_scale(hud.scale),
                NodeKind::Label(Label {
                    role,
                    text: Self::text_for(role, &state),
                    color,
                }),
            )
        };

        let hit_label = add_label(HudRole::Hit, hud.hit_position, Color::BLUE);
        let miss_label = add_label(HudRole::Miss, hud.miss_position, Color::YELLOW);
        let accuracy_label = hud
            .show_accuracy
            .then(|| add_label(HudRole::Accuracy, hud.accuracy_position, Color::WHITE));

        Self {
            state,
            hit_label,
            miss_label,
            accuracy_label,
        }
    }

    pub fn state(&self) -> ScoreState {
        self.state
    }

    pub fn hits(&self) -> u32 {
        self.state.hits
    }

    pub fn misses(&self) -> u32 {
        self.state.misses
    }

    pub fn live(&self) -> u32 {
        self.state.live
    }

    pub fn spawned(&self) -> u32 {
        self.state.spawned
    }

    pub fn accuracy(&self) -> f32 {
        self.state.accuracy()
    }

    /// Ids of every HUD label this board owns
    pub fn label_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        [Some(self.hit_label), Some(self.miss_label), self.accuracy_label]
            .into_iter()
            .flatten()
    }

    pub fn is_hud(&self, id: NodeId) -> bool {
        self.label_ids().any(|l| l == id)
    }

    pub fn record_spawn(&mut self) {
        self.state.spawned += 1;
        self.state.live += 1;
        self.state.check();
    }

    pub fn record_hit(&mut self, scene: &mut SceneRegistry) {
        self.take_live();
        self.state.hits += 1;
        self.state.check();
        self.render(scene);
    }

    pub fn record_miss(&mut self, scene: &mut SceneRegistry) {
        self.take_live();
        self.state.misses += 1;
        self.state.check();
        self.render(scene);
    }

    /// Push current counters into the label nodes
    pub fn render(&self, scene: &mut SceneRegistry) {
        scene.set_label_text(self.hit_label, &Self::text_for(HudRole::Hit, &self.state));
        scene.set_label_text(self.miss_label, &Self::text_for(HudRole::Miss, &self.state));
        if let Some(id) = self.accuracy_label {
            scene.set_label_text(id, &Self::text_for(HudRole::Accuracy, &self.state));
        }
    }

    pub fn text(&self, role: HudRole) -> String {
        Self::text_for(role, &self.state)
    }

    fn text_for(role: HudRole, state: &ScoreState) -> String {
        match role {
            HudRole::Hit => format!("HIT: {}", state.hits),
            HudRole::Miss => format!("MISS: {}", state.misses),
            HudRole::Accuracy => format!("ACCURACY: {:.0}%", state.accuracy() * 100.0),
        }
    }

    fn take_live(&mut self) {
        debug_assert!(self.state.live > 0, "resolved a shape with none live");
        self.state.live = self.state.live.saturating_sub(1);
    }
}
