/// Input resolution: raw device snapshot → per-tick `FrameInput`.
///
/// Movement sources, lowest to highest priority:
///   1. Analog stick (with dead zone)
///   2. Accelerometer tilt, when active and tilted past its threshold
///   3. Digital left/right (keys, d-pad)

use super::entity::FrameInput;
use super::geometry::Vec2;
use super::physics::PhysicsParams;

/// Stick deflection below this is treated as zero.
pub const STICK_DEAD_ZONE: f32 = 0.5;

/// Tilt below this is ignored.
pub const ACCELEROMETER_THRESHOLD: f32 = 0.10;

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct AccelerometerState {
    pub acceleration: Vec2,
    pub active: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Orientation {
    #[default]
    LandscapeLeft,
    LandscapeRight,
}

/// Everything the input port reports for one tick.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct InputSnapshot {
    /// Horizontal stick axis in [-1, 1].
    pub stick_x: f32,
    pub digital_left: bool,
    pub digital_right: bool,
    /// Held.
    pub jump: bool,
    /// Fresh press.
    pub attack: bool,
    /// Fresh press.
    pub continue_pressed: bool,
    pub accelerometer: AccelerometerState,
    pub orientation: Orientation,
}

/// Resolve the movement axis and buttons for the simulation.
pub fn resolve(snapshot: &InputSnapshot, params: &PhysicsParams) -> FrameInput {
    let mut movement = snapshot.stick_x * params.move_stick_scale;
    if movement.abs() < STICK_DEAD_ZONE {
        movement = 0.0;
    }

    let acc = snapshot.accelerometer;
    if acc.active && acc.acceleration.y.abs() > ACCELEROMETER_THRESHOLD {
        let tilt = -acc.acceleration.y * params.accelerometer_scale;
        movement = match snapshot.orientation {
            Orientation::LandscapeLeft => tilt,
            Orientation::LandscapeRight => -tilt,
        }
        .clamp(-1.0, 1.0);
    }

    if snapshot.digital_left {
        movement = -1.0;
    } else if snapshot.digital_right {
        movement = 1.0;
    }

    FrameInput { movement, jump: snapshot.jump, attack: snapshot.attack }
}
