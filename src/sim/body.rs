//! The simulated ball
//!
//! A point mass with a radius, a material and a gravity value. One call to
//! [`Body::step`] runs the whole per-tick pipeline for the ball: gather
//! accelerations, apply floor friction, integrate, resolve boundary contact,
//! settle tiny velocities.

use serde::{Deserialize, Serialize};

use crate::math::{Vector2, normalize_floored};
use crate::settings::{BodyConfig, Tolerances};

use super::collision::{BoundaryResolution, Bounds, collide_boundary};
use super::forces::{ForceInputs, on_floor};
use super::integrator::integrate;

/// Mutable kinematic state
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyState {
    pub pos: Vector2,
    pub vel: Vector2,
    /// Scratch acceleration accumulated between steps, zeroed by each step
    pub acc: Vector2,
}

/// Physical parameters, already range-checked
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyParams {
    pub mass: f64,
    pub radius: f64,
    pub restitution: f64,
    pub friction_coefficient: f64,
    /// Downward acceleration (m/s²), negative pulls up
    pub gravity: f64,
}

impl BodyParams {
    pub fn from_config(config: &BodyConfig) -> Self {
        Self {
            mass: config.mass,
            radius: config.radius(),
            restitution: config.restitution,
            friction_coefficient: config.friction_coefficient,
            gravity: config.gravity.acceleration(),
        }
    }

    pub fn force_inputs(&self) -> ForceInputs {
        ForceInputs {
            mass: self.mass,
            radius: self.radius,
            gravity: self.gravity,
            friction_coefficient: self.friction_coefficient,
        }
    }
}

/// Why a step did not run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SkipReason {
    /// dt was zero, negative or NaN
    InvalidDt(f64),
    /// Gravity is not a finite number
    MissingGravity,
    /// Restitution is not a finite number
    MissingRestitution,
    /// External acceleration was not finite
    InvalidForce,
    /// The host is positioning the body by hand
    Dragging,
}

/// Result of [`Body::step`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    Advanced(BoundaryResolution),
    Skipped(SkipReason),
}

impl StepOutcome {
    pub fn advanced(&self) -> bool {
        matches!(self, StepOutcome::Advanced(_))
    }
}

/// A ball in a rectangular domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub params: BodyParams,
    pub state: BodyState,
    pub tolerances: Tolerances,
    #[serde(default)]
    dragging: bool,
}

impl Body {
    pub fn new(params: BodyParams, pos: Vector2, vel: Vector2) -> Self {
        Self::with_tolerances(params, pos, vel, Tolerances::default())
    }

    pub fn with_tolerances(params: BodyParams, pos: Vector2, vel: Vector2, tolerances: Tolerances) -> Self {
        Self {
            params,
            state: BodyState {
                pos,
                vel,
                acc: Vector2::ZERO,
            },
            tolerances,
            dragging: false,
        }
    }

    pub fn from_config(config: &BodyConfig, tolerances: Tolerances) -> Self {
        Self::with_tolerances(
            BodyParams::from_config(config),
            config.initial_position,
            config.initial_velocity,
            tolerances,
        )
    }

    pub fn set_params(&mut self, params: BodyParams) {
        self.params = params;
    }

    /// Accumulate a force (N) for the next step only
    pub fn apply_force(&mut self, force: Vector2) {
        self.state.acc += force / self.params.mass.max(self.tolerances.min_mass);
    }

    /// Advance the body by `dt` seconds.
    ///
    /// Never panics: invalid input is logged and the step is skipped.
    pub fn step(&mut self, dt: f64, bounds: Bounds, external_acc: Option<Vector2>) -> StepOutcome {
        if let Err(reason) = self.check_step(dt, external_acc) {
            return StepOutcome::Skipped(reason);
        }

        let BodyParams {
            radius,
            restitution,
            friction_coefficient,
            gravity,
            ..
        } = self.params;
        let tol = self.tolerances;
        let BodyState { pos, vel, acc } = self.state;

        let applied = acc + Vector2::new(0.0, gravity) + external_acc.unwrap_or(Vector2::ZERO);
        let mut total_acc = applied;

        // Kinetic friction while sliding on the floor, capped so it can stop
        // the ball within this step but never push it backwards.
        let speed = vel.length();
        if on_floor(pos, radius, &bounds, tol.contact_epsilon)
            && speed > tol.friction_speed
            && friction_coefficient > 0.0
            && gravity > 0.0
        {
            let magnitude = (friction_coefficient * gravity).min(speed / dt);
            total_acc -= normalize_floored(vel, tol.direction_epsilon) * magnitude;
        }

        let moved = integrate(pos, vel, total_acc, dt);
        // The floor rule sees the acceleration from before friction
        let resolution = collide_boundary(moved.pos, moved.vel, bounds, radius, restitution, Some(applied));

        self.state.pos = resolution.pos;
        self.state.vel = if resolution.vel.length() < tol.rest_speed {
            Vector2::ZERO
        } else {
            resolution.vel
        };
        self.state.acc = Vector2::ZERO;

        StepOutcome::Advanced(resolution)
    }

    fn check_step(&self, dt: f64, external_acc: Option<Vector2>) -> Result<(), SkipReason> {
        if self.dragging {
            return Err(SkipReason::Dragging);
        }
        if dt.is_nan() || dt <= 0.0 {
            if dt == 0.0 {
                log::debug!("Skipping zero-length step");
            } else {
                log::warn!("Skipping step with invalid dt {}", dt);
            }
            return Err(SkipReason::InvalidDt(dt));
        }
        if !self.params.gravity.is_finite() {
            log::warn!("Skipping step: gravity is undefined");
            return Err(SkipReason::MissingGravity);
        }
        if !self.params.restitution.is_finite() {
            log::warn!("Skipping step: restitution is undefined");
            return Err(SkipReason::MissingRestitution);
        }
        if external_acc.is_some_and(|a| !a.is_finite()) {
            log::warn!("Skipping step: external acceleration {:?} is not finite", external_acc);
            return Err(SkipReason::InvalidForce);
        }
        Ok(())
    }

    pub fn begin_drag(&mut self) {
        self.dragging = true;
        self.state.vel = Vector2::ZERO;
        self.state.acc = Vector2::ZERO;
    }

    /// Move the body by hand. Position is kept inside `bounds`.
    pub fn drag_to(&mut self, pos: Vector2, bounds: Bounds) {
        self.state.pos = bounds.clamp_inside(pos, self.params.radius);
        self.state.vel = Vector2::ZERO;
        self.state.acc = Vector2::ZERO;
    }

    /// Release the body; it starts again from rest
    pub fn end_drag(&mut self) {
        self.dragging = false;
        self.state.vel = Vector2::ZERO;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn on_floor(&self, bounds: &Bounds) -> bool {
        on_floor(self.state.pos, self.params.radius, bounds, self.tolerances.contact_epsilon)
    }

    /// Touching the floor and not moving
    pub fn is_resting(&self, bounds: &Bounds) -> bool {
        self.on_floor(bounds) && self.state.vel.length() <= self.tolerances.rest_speed
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.params.mass * self.state.vel.length_squared()
    }

    /// Gravitational potential energy relative to resting on the floor
    pub fn potential_energy(&self, bounds: &Bounds) -> f64 {
        self.params.mass * self.params.gravity * self.height_above_floor(bounds)
    }

    /// Distance from the bottom of the ball to the floor
    pub fn height_above_floor(&self, bounds: &Bounds) -> f64 {
        bounds.floor_y() - self.params.radius - self.state.pos.y
    }
}
