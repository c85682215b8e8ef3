//! Game settings and tuning
//!
//! Loaded from a JSON file on native, LocalStorage on web. Every section is
//! `#[serde(default)]` so partial files only override what they name.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::GameError;

/// Inclusive `[min, max]` range sampled uniformly
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleRange {
    pub min: f32,
    pub max: f32,
}

impl SampleRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, v: f32) -> bool {
        v >= self.min && v <= self.max
    }
}

/// Spawn cadence and launch parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnSettings {
    /// Delay between spawns (seconds)
    pub interval: SampleRange,
    /// Horizontal launch impulse
    pub impulse_x: SampleRange,
    /// Vertical launch impulse
    pub impulse_y: SampleRange,
    /// Body-local point the impulse is applied at
    pub impulse_point: Vec3,
    /// World position new shapes appear at
    pub origin: Vec3,
    /// Rendered y below which a shape counts as missed
    pub cull_y: f32,
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            interval: SampleRange::new(SPAWN_INTERVAL_MIN, SPAWN_INTERVAL_MAX),
            impulse_x: SampleRange::new(IMPULSE_X_MIN, IMPULSE_X_MAX),
            impulse_y: SampleRange::new(IMPULSE_Y_MIN, IMPULSE_Y_MAX),
            impulse_point: Vec3::from_array(IMPULSE_POINT),
            origin: Vec3::ZERO,
            cull_y: CULL_Y,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    pub gravity: Vec3,
    pub body_mass: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, GRAVITY, 0.0),
            body_mass: BODY_MASS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub position: Vec3,
    /// Look direction (normalized on use)
    pub forward: Vec3,
    /// Vertical field of view in degrees
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// View size in points (tap coordinates use the same space)
    pub viewport: Vec2,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 5.0, 10.0),
            forward: Vec3::NEG_Z,
            fov_y_degrees: 60.0,
            near: 1.0,
            far: 100.0,
            viewport: Vec2::new(844.0, 390.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HudSettings {
    pub hit_position: Vec3,
    pub miss_position: Vec3,
    pub accuracy_position: Vec3,
    pub scale: Vec3,
    /// Attach the accuracy label to the scene
    pub show_accuracy: bool,
}

impl Default for HudSettings {
    fn default() -> Self {
        Self {
            hit_position: Vec3::new(-3.0, 10.0, 0.0),
            miss_position: Vec3::new(1.5, 10.0, 0.0),
            accuracy_position: Vec3::new(1.0, 10.0, 0.0),
            scale: Vec3::new(0.03, 0.03, 1.0),
            show_accuracy: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectSettings {
    /// Smoke-out on hit
    pub enabled: bool,
    /// Particle template used for smoke
    pub template: String,
    /// Cap on live effect instances (oldest dropped first)
    pub max_instances: usize,
    /// Attach a following smoke trail to every n-th spawn (None = off).
    /// Expensive with many overlapping colored trails.
    pub trail_every: Option<u32>,
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            template: SMOKE_TEMPLATE.to_string(),
            max_instances: 64,
            trail_every: None,
        }
    }
}

/// Game settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub spawn: SpawnSettings,
    pub physics: PhysicsSettings,
    pub camera: CameraSettings,
    pub hud: HudSettings,
    pub effects: EffectSettings,
}

impl Settings {
    /// Reject settings the simulation can't run with
    pub fn validate(&self) -> Result<(), GameError> {
        let ranges = [
            ("spawn.interval", &self.spawn.interval),
            ("spawn.impulse_x", &self.spawn.impulse_x),
            ("spawn.impulse_y", &self.spawn.impulse_y),
        ];
        for (label, r) in ranges {
            if !r.min.is_finite() || !r.max.is_finite() {
                return Err(GameError::InvalidSettings(format!("{label} must be finite")));
            }
            if r.min > r.max {
                return Err(GameError::InvalidSettings(format!(
                    "{label} min ({}) greater than max ({})",
                    r.min, r.max
                )));
            }
        }
        if self.spawn.interval.min <= 0.0 {
            return Err(GameError::InvalidSettings(
                "spawn.interval.min must be > 0".into(),
            ));
        }
        if self.physics.body_mass <= 0.0 {
            return Err(GameError::InvalidSettings(
                "physics.body_mass must be > 0".into(),
            ));
        }
        let cam = &self.camera;
        if cam.viewport.x <= 0.0 || cam.viewport.y <= 0.0 {
            return Err(GameError::InvalidSettings(
                "camera.viewport must be positive".into(),
            ));
        }
        if !(cam.near > 0.0 && cam.far > cam.near) {
            return Err(GameError::InvalidSettings(
                "camera clip planes must satisfy 0 < near < far".into(),
            ));
        }
        if !(1.0..179.0).contains(&cam.fov_y_degrees) {
            return Err(GameError::InvalidSettings(format!(
                "camera.fov_y_degrees {} outside 1..179",
                cam.fov_y_degrees
            )));
        }
        if cam.forward.length_squared() == 0.0 {
            return Err(GameError::InvalidSettings("camera.forward is zero".into()));
        }
        if self.effects.trail_every == Some(0) {
            return Err(GameError::InvalidSettings(
                "effects.trail_every must be >= 1".into(),
            ));
        }
        Ok(())
    }

    /// Non-fatal oddities worth logging
    pub fn warnings(&self) -> Vec<String> {
        let mut w = Vec::new();
        if self.spawn.impulse_y.max <= 0.0 {
            w.push("spawn.impulse_y never launches upward; shapes fall immediately".into());
        }
        if self.physics.gravity.y >= 0.0 {
            w.push(format!(
                "physics.gravity.y is {}; shapes will never fall below the cull line",
                self.physics.gravity.y
            ));
        }
        if self.effects.trail_every.is_some() && self.effects.max_instances < 16 {
            w.push("trails enabled with a small effects.max_instances; smoke-outs may be dropped".into());
        }
        w
    }

    /// Load settings from a JSON file (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path(path: impl AsRef<std::path::Path>) -> Result<Self, GameError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&json)?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "shape_tap_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<Settings>(&json) {
                    Ok(settings) if settings.validate().is_ok() => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    _ => log::warn!("Stored settings invalid, ignoring"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }
}
