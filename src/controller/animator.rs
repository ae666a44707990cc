use crate::config::AviatorConfig;
use crate::error::Result;
use crate::model::AviatorScene;

use super::environment::EnvironmentRoller;
use super::flight::{FlightAnimator, FlightTargets};
use super::input::PointerState;

/// Per-frame composition of the flight animator and the environment roller
#[derive(Debug, Clone)]
pub struct Animator {
    flight: FlightAnimator,
    environment: EnvironmentRoller,
    frames: u64,
}

impl Animator {
    pub fn new(config: &AviatorConfig) -> Result<Self> {
        Ok(Self {
            flight: FlightAnimator::new(&config.flight)?,
            environment: EnvironmentRoller::new(&config.environment),
            frames: 0,
        })
    }

    /// Advance the scene by one frame using the latest pointer and the clock reading
    pub fn tick(&mut self, scene: &mut AviatorScene, pointer: PointerState, elapsed: f64) -> FlightTargets {
        let (pose, propeller) = scene.airplane.pose_mut();
        let targets = self.flight.update(pointer, elapsed, pose, propeller);

        self.environment
            .update(&mut scene.sea.mesh.transform, &mut scene.sky.container.transform);

        self.frames += 1;
        targets
    }

    /// Number of ticks run so far
    pub fn frames(&self) -> u64 {
        self.frames
    }
}
