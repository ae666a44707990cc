use crate::config::FlightConfig;
use crate::error::Result;
use crate::math::RangeMap;
use crate::model::Transform;

use super::input::PointerState;

/// Targets derived from the pointer for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightTargets {
    /// Horizontal target. Computed every frame but never applied to the pose.
    pub x: f32,
    /// Altitude the airplane is easing toward
    pub y: f32,
}

/// Moves the airplane toward the pointer and spins its propeller
#[derive(Debug, Clone)]
pub struct FlightAnimator {
    horizontal: RangeMap,
    altitude: RangeMap,
    smoothing: f32,
    roll_gain: f32,
    pitch_gain: f32,
    propeller_speed: f32,
}

impl FlightAnimator {
    /// Validates the pointer ranges up front so the per-frame update cannot fail
    pub fn new(config: &FlightConfig) -> Result<Self> {
        let (in_min, in_max) = config.pointer_range;
        let horizontal = RangeMap::new(in_min, in_max, config.horizontal_range.0, config.horizontal_range.1)?;
        let altitude = RangeMap::new(in_min, in_max, config.altitude_range.0, config.altitude_range.1)?;
        Ok(Self {
            horizontal,
            altitude,
            smoothing: config.smoothing,
            roll_gain: config.roll_gain,
            pitch_gain: config.pitch_gain,
            propeller_speed: config.propeller_speed,
        })
    }

    pub fn targets(&self, pointer: PointerState) -> FlightTargets {
        FlightTargets {
            x: self.horizontal.apply(pointer.x),
            y: self.altitude.apply(pointer.y),
        }
    }

    /// One frame: ease the altitude, bank on the remaining error, set the propeller angle.
    ///
    /// `elapsed` is seconds since the animation started. The propeller angle is a
    /// function of it alone, not an accumulation over frames.
    pub fn update(
        &self,
        pointer: PointerState,
        elapsed: f64,
        pose: &mut Transform,
        propeller: &mut Transform,
    ) -> FlightTargets {
        let targets = self.targets(pointer);

        pose.position.y += (targets.y - pose.position.y) * self.smoothing;

        // Error after the move
        pose.rotation.z = (targets.y - pose.position.y) * self.roll_gain;
        pose.rotation.x = (pose.position.y - targets.y) * self.pitch_gain;

        propeller.rotation.x = (elapsed * self.propeller_speed as f64) as f32;

        targets
    }
}
