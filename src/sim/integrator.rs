//! Constant-acceleration point-mass integrator
//!
//! Acceleration is held fixed over the step, so position picks up the
//! exact quadratic term. Under uniform gravity this reproduces the analytic
//! trajectory, which the floor collision rule depends on.

use crate::math::Vector2;

/// Position and velocity after a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    pub pos: Vector2,
    pub vel: Vector2,
}

/// Advance `pos`/`vel` by `dt` under constant `acc`.
///
/// `dt` is not validated here; callers reject non-positive steps.
#[inline]
pub fn integrate(pos: Vector2, vel: Vector2, acc: Vector2, dt: f64) -> Kinematics {
    Kinematics {
        pos: pos + vel * dt + acc * (0.5 * dt * dt),
        vel: vel + acc * dt,
    }
}
