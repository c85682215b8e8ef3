//! Shape Tap - A 3D reflex game
//!
//! Core modules:
//! - `sim`: Headless simulation (scene registry, physics, picking, scoring)
//! - `settings`: Data-driven game tuning and preferences
//! - `error`: Fatal startup errors

pub mod error;
pub mod settings;
pub mod sim;

pub use error::GameError;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Spawn interval bounds (seconds)
    pub const SPAWN_INTERVAL_MIN: f32 = 0.2;
    pub const SPAWN_INTERVAL_MAX: f32 = 2.5;

    /// Launch impulse ranges (N·s, bodies have unit mass)
    pub const IMPULSE_X_MIN: f32 = -2.0;
    pub const IMPULSE_X_MAX: f32 = 2.0;
    pub const IMPULSE_Y_MIN: f32 = 10.0;
    pub const IMPULSE_Y_MAX: f32 = 18.0;
    /// Local point the launch impulse is applied at (slightly off-center, gives spin)
    pub const IMPULSE_POINT: [f32; 3] = [0.05, 0.05, 0.05];

    /// Entities whose rendered y drops below this are counted as missed
    pub const CULL_Y: f32 = -1.0;

    /// Standard gravity (m/s²)
    pub const GRAVITY: f32 = -9.8;
    /// Default body mass
    pub const BODY_MASS: f32 = 1.0;

    /// Alpha of every spawned diffuse color
    pub const COLOR_ALPHA: f32 = 0.8;
    /// Alpha of the emission glow
    pub const EMISSION_ALPHA: f32 = 0.1;

    /// Default HUD text size in points before scaling
    pub const HUD_FONT_SIZE: f32 = 36.0;

    /// Name of the bundled smoke particle template
    pub const SMOKE_TEMPLATE: &str = "SmokeTrail";
}

/// Color with straight (non-premultiplied) alpha, components in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLUE: Color = Color::rgba(0.0, 0.0, 1.0, 1.0);
    pub const YELLOW: Color = Color::rgba(1.0, 1.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a different alpha
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_alpha_keeps_rgb() {
        let c = Color::rgba(0.1, 0.2, 0.3, 0.8).with_alpha(0.1);
        assert_eq!(c.to_array(), [0.1, 0.2, 0.3, 0.1]);
    }
}
