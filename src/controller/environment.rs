use crate::config::EnvironmentConfig;
use crate::model::Transform;

/// Rolls the sea and the sky by a fixed step every frame
#[derive(Debug, Clone)]
pub struct EnvironmentRoller {
    pub sea_roll_step: f32,
    pub sky_roll_step: f32,
}

impl EnvironmentRoller {
    pub fn new(config: &EnvironmentConfig) -> Self {
        Self {
            sea_roll_step: config.sea_roll_step,
            sky_roll_step: config.sky_roll_step,
        }
    }

    // Angles are never wrapped; the matrix math handles any magnitude
    pub fn update(&self, sea: &mut Transform, sky: &mut Transform) {
        sea.rotation.z += self.sea_roll_step;
        sky.rotation.z += self.sky_roll_step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hundred_ticks() {
        let roller = EnvironmentRoller::new(&EnvironmentConfig::default());
        let mut sea = Transform::default();
        let mut sky = Transform::default();
        for _ in 0..100 {
            roller.update(&mut sea, &mut sky);
        }
        assert!((sea.rotation.z - 0.5).abs() < 1e-5, "sea roll {}", sea.rotation.z);
        assert!((sky.rotation.z - 1.0).abs() < 1e-5, "sky roll {}", sky.rotation.z);
        assert_eq!(sea.rotation.x, 0.0);
        assert_eq!(sky.position, glam::Vec3::ZERO);
    }

    #[test]
    fn test_angles_grow_past_full_turn() {
        let roller = EnvironmentRoller::new(&EnvironmentConfig::default());
        let mut sea = Transform::default();
        let mut sky = Transform::default();
        for _ in 0..1000 {
            roller.update(&mut sea, &mut sky);
        }
        assert!(sky.rotation.z > std::f32::consts::TAU);
        assert!((sky.rotation.z - 10.0).abs() < 1e-3);
    }
}
