//! Tunables for the animation and the scene

use glam::Vec3;

/// Flight animator gains and pointer ranges
#[derive(Debug, Clone, PartialEq)]
pub struct FlightConfig {
    /// Pointer range that drives the targets; values outside are clamped
    pub pointer_range: (f32, f32),
    /// Horizontal target range (computed each frame, not applied to the pose)
    pub horizontal_range: (f32, f32),
    /// Altitude target range
    pub altitude_range: (f32, f32),
    /// Fraction of the remaining altitude error closed each frame
    pub smoothing: f32,
    /// Roll (rotation.z) per unit of remaining altitude error
    pub roll_gain: f32,
    /// Pitch (rotation.x) per unit of remaining altitude error, opposite sign
    pub pitch_gain: f32,
    /// Propeller radians per second of elapsed time
    pub propeller_speed: f32,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            pointer_range: (-0.75, 0.75),
            horizontal_range: (-100.0, 100.0),
            altitude_range: (25.0, 130.0),
            smoothing: 0.1,
            roll_gain: 0.0128,
            pitch_gain: 0.0064,
            propeller_speed: 50.0,
        }
    }
}

/// Per-frame roll increments of the sea and the sky, in radians
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentConfig {
    pub sea_roll_step: f32,
    pub sky_roll_step: f32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            sea_roll_step: 0.005,
            sky_roll_step: 0.01,
        }
    }
}

/// Flat colors used by the scene builders (0xRRGGBB)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub red: u32,
    pub white: u32,
    pub brown: u32,
    pub brown_dark: u32,
    pub blue: u32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            red: 0xf25346,
            white: 0xd8d0d1,
            brown: 0x59332e,
            brown_dark: 0x23190f,
            blue: 0x68c3c0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FogConfig {
    pub color: u32,
    pub near: f32,
    pub far: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightConfig {
    pub hemisphere_sky: u32,
    pub hemisphere_ground: u32,
    pub hemisphere_intensity: f32,
    pub sun_color: u32,
    pub sun_intensity: f32,
    pub sun_position: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    pub fov_y_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub eye: Vec3,
    pub target: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub palette: Palette,
    pub cloud_count: usize,
    pub fog: FogConfig,
    pub lights: LightConfig,
    pub camera: CameraConfig,
    pub airplane_scale: f32,
    pub airplane_start: Vec3,
    /// Height of the sea and sky centers
    pub horizon_y: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            cloud_count: 20,
            fog: FogConfig {
                color: 0xf7d9aa,
                near: 100.0,
                far: 950.0,
            },
            lights: LightConfig {
                hemisphere_sky: 0xaaaaaa,
                hemisphere_ground: 0x000000,
                hemisphere_intensity: 0.9,
                sun_color: 0xffffff,
                sun_intensity: 0.9,
                sun_position: Vec3::new(150.0, 350.0, 350.0),
            },
            camera: CameraConfig {
                fov_y_degrees: 60.0,
                z_near: 1.0,
                z_far: 10000.0,
                eye: Vec3::new(0.0, 100.0, 200.0),
                target: Vec3::ZERO,
            },
            airplane_scale: 0.25,
            airplane_start: Vec3::new(0.0, 100.0, 0.0),
            horizon_y: -600.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AviatorConfig {
    pub flight: FlightConfig,
    pub environment: EnvironmentConfig,
    pub scene: SceneConfig,
}

/// Convert 0xRRGGBB into RGB floats in [0, 1]
pub fn hex_to_rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}
