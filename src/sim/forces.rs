//! Force registry
//!
//! Each [`ForceDescriptor`] is a pure function of the body state, the body's
//! physical inputs and the tick context. A descriptor that does not apply
//! this tick returns `None`. The same registry feeds both the integrator
//! (through [`ForcePipeline::external_acceleration`]) and the force-arrow
//! overlay (through [`ForcePipeline::active_forces`]), so evaluation must
//! never depend on call order or earlier calls.

use serde::{Deserialize, Serialize};

use crate::math::{Vector2, normalize_floored};
use crate::settings::Tolerances;

use super::body::BodyState;
use super::collision::Bounds;

/// Physical inputs a force may read
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceInputs {
    pub mass: f64,
    pub radius: f64,
    /// Downward gravitational acceleration (m/s²)
    pub gravity: f64,
    pub friction_coefficient: f64,
}

/// Per-tick environment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceContext {
    pub bounds: Bounds,
    pub tolerances: Tolerances,
    /// Step length (s) the forces act over; 0 when unknown
    pub dt: f64,
}

/// Whether a ball touches the floor, within `eps`
#[inline]
pub fn on_floor(pos: Vector2, radius: f64, bounds: &Bounds, eps: f64) -> bool {
    pos.y + radius >= bounds.floor_y() - eps
}

/// The kinds of force the lessons use
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ForceKind {
    /// Weight, `m * g` downward
    Gravity,
    /// Quadratic air drag `-k |v| v`
    Drag { coefficient: f64 },
    /// Uniform acceleration field (m/s²), e.g. wind
    Wind { acceleration: Vector2 },
    /// Floor reaction balancing weight while in contact
    ContactNormal,
    /// Kinetic floor friction opposing motion
    Friction,
    /// Constant force (N) set by the host
    Applied { force: Vector2 },
}

impl ForceKind {
    /// Forces the body integrates on its own (gravity and floor contact).
    /// They are drawn but left out of the external acceleration sum.
    pub fn is_intrinsic(&self) -> bool {
        matches!(
            self,
            ForceKind::Gravity | ForceKind::ContactNormal | ForceKind::Friction
        )
    }

    /// Force in newtons, or `None` when inactive
    pub fn evaluate(&self, state: &BodyState, inputs: &ForceInputs, ctx: &ForceContext) -> Option<Vector2> {
        let tol = &ctx.tolerances;
        match *self {
            ForceKind::Gravity => {
                (inputs.gravity != 0.0).then(|| Vector2::new(0.0, inputs.mass * inputs.gravity))
            }
            ForceKind::Drag { coefficient } => {
                let speed = state.vel.length();
                (coefficient > 0.0 && speed > tol.rest_speed)
                    .then(|| -state.vel * (coefficient * speed))
            }
            ForceKind::Wind { acceleration } => {
                (acceleration != Vector2::ZERO).then(|| acceleration * inputs.mass)
            }
            ForceKind::ContactNormal => {
                let touching = on_floor(state.pos, inputs.radius, &ctx.bounds, tol.contact_epsilon);
                (touching && inputs.gravity > 0.0)
                    .then(|| Vector2::new(0.0, -inputs.mass * inputs.gravity))
            }
            ForceKind::Friction => {
                let touching = on_floor(state.pos, inputs.radius, &ctx.bounds, tol.contact_epsilon);
                let speed = state.vel.length();
                if !touching
                    || speed <= tol.friction_speed
                    || inputs.friction_coefficient <= 0.0
                    || inputs.gravity <= 0.0
                {
                    return None;
                }
                // Same cap the body applies: friction may stop the ball
                // within the step but never reverse it.
                let mut magnitude = inputs.friction_coefficient * inputs.mass * inputs.gravity;
                if ctx.dt > 0.0 {
                    magnitude = magnitude.min(inputs.mass * speed / ctx.dt);
                }
                Some(-normalize_floored(state.vel, tol.direction_epsilon) * magnitude)
            }
            ForceKind::Applied { force } => (force != Vector2::ZERO).then_some(force),
        }
    }
}

/// A named force in the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForceDescriptor {
    pub key: String,
    pub kind: ForceKind,
}

impl ForceDescriptor {
    pub fn new(key: impl Into<String>, kind: ForceKind) -> Self {
        Self { key: key.into(), kind }
    }

    pub fn evaluate(&self, state: &BodyState, inputs: &ForceInputs, ctx: &ForceContext) -> Option<Vector2> {
        self.kind.evaluate(state, inputs, ctx)
    }
}

/// An evaluated, active force (for drawing arrows)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForceVector {
    pub key: String,
    pub force: Vector2,
}

/// Ordered collection of force descriptors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForcePipeline {
    forces: Vec<ForceDescriptor>,
}

impl ForcePipeline {
    pub fn new() -> Self {
        Self { forces: Vec::new() }
    }

    /// Gravity, normal, friction, wind and drag, in drawing order
    pub fn with_defaults(wind: Vector2, drag_coefficient: f64) -> Self {
        let mut pipeline = Self::new();
        pipeline.push(ForceDescriptor::new("gravity", ForceKind::Gravity));
        pipeline.push(ForceDescriptor::new("normal", ForceKind::ContactNormal));
        pipeline.push(ForceDescriptor::new("friction", ForceKind::Friction));
        pipeline.push(ForceDescriptor::new("wind", ForceKind::Wind { acceleration: wind }));
        pipeline.push(ForceDescriptor::new(
            "drag",
            ForceKind::Drag {
                coefficient: drag_coefficient,
            },
        ));
        pipeline
    }

    /// Add a descriptor, replacing any existing one with the same key in place
    pub fn push(&mut self, descriptor: ForceDescriptor) {
        match self.forces.iter_mut().find(|f| f.key == descriptor.key) {
            Some(existing) => *existing = descriptor,
            None => self.forces.push(descriptor),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<ForceDescriptor> {
        let index = self.forces.iter().position(|f| f.key == key)?;
        Some(self.forces.remove(index))
    }

    pub fn get(&self, key: &str) -> Option<&ForceDescriptor> {
        self.forces.iter().find(|f| f.key == key)
    }

    pub fn len(&self) -> usize {
        self.forces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forces.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ForceDescriptor> {
        self.forces.iter()
    }

    /// Every active force, in registry order
    pub fn active_forces(&self, state: &BodyState, inputs: &ForceInputs, ctx: &ForceContext) -> Vec<ForceVector> {
        self.forces
            .iter()
            .filter_map(|f| {
                f.evaluate(state, inputs, ctx).map(|force| ForceVector {
                    key: f.key.clone(),
                    force,
                })
            })
            .collect()
    }

    /// Sum of all active forces, intrinsic ones included
    pub fn net_force(&self, state: &BodyState, inputs: &ForceInputs, ctx: &ForceContext) -> Vector2 {
        self.forces
            .iter()
            .filter_map(|f| f.evaluate(state, inputs, ctx))
            .fold(Vector2::ZERO, |acc, f| acc + f)
    }

    /// Acceleration from the non-intrinsic forces, to hand to the body step
    pub fn external_acceleration(&self, state: &BodyState, inputs: &ForceInputs, ctx: &ForceContext) -> Vector2 {
        let force = self
            .forces
            .iter()
            .filter(|f| !f.kind.is_intrinsic())
            .filter_map(|f| f.evaluate(state, inputs, ctx))
            .fold(Vector2::ZERO, |acc, f| acc + f);
        force / inputs.mass.max(ctx.tolerances.min_mass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> ForceInputs {
        ForceInputs {
            mass: 2.0,
            radius: 0.5,
            gravity: 9.81,
            friction_coefficient: 0.4,
        }
    }

    fn ctx() -> ForceContext {
        ForceContext {
            bounds: Bounds::new(10.0, 5.0),
            tolerances: Tolerances::default(),
            dt: 0.0,
        }
    }

    fn state(pos: Vector2, vel: Vector2) -> BodyState {
        BodyState {
            pos,
            vel,
            acc: Vector2::ZERO,
        }
    }

    #[test]
    fn test_gravity_force() {
        let s = state(Vector2::new(5.0, 1.0), Vector2::ZERO);
        let f = ForceKind::Gravity.evaluate(&s, &inputs(), &ctx()).unwrap();
        assert!((f.y - 19.62).abs() < 1e-12);
        let zero_g = ForceInputs {
            gravity: 0.0,
            ..inputs()
        };
        assert!(ForceKind::Gravity.evaluate(&s, &zero_g, &ctx()).is_none());
    }

    #[test]
    fn test_contact_test_epsilon() {
        let b = Bounds::new(10.0, 5.0);
        assert!(on_floor(Vector2::new(1.0, 4.5), 0.5, &b, 1e-9));
        assert!(on_floor(Vector2::new(1.0, 4.5 - 5e-10), 0.5, &b, 1e-9));
        assert!(!on_floor(Vector2::new(1.0, 4.4), 0.5, &b, 1e-9));
    }

    #[test]
    fn test_friction_only_on_floor_and_moving() {
        let airborne = state(Vector2::new(5.0, 2.0), Vector2::new(3.0, 0.0));
        assert!(ForceKind::Friction.evaluate(&airborne, &inputs(), &ctx()).is_none());

        let resting = state(Vector2::new(5.0, 4.5), Vector2::ZERO);
        assert!(ForceKind::Friction.evaluate(&resting, &inputs(), &ctx()).is_none());

        let sliding = state(Vector2::new(5.0, 4.5), Vector2::new(3.0, 0.0));
        let f = ForceKind::Friction.evaluate(&sliding, &inputs(), &ctx()).unwrap();
        assert!((f.x + 0.4 * 2.0 * 9.81).abs() < 1e-12);
        assert_eq!(f.y, 0.0);
    }

    #[test]
    fn test_friction_capped_by_step() {
        // mu m g = 7.848 N, but 0.05 m/s over 1/60 s only needs 6 N to stop
        let slow = state(Vector2::new(5.0, 4.5), Vector2::new(0.05, 0.0));
        let step_ctx = ForceContext { dt: 1.0 / 60.0, ..ctx() };
        let f = ForceKind::Friction.evaluate(&slow, &inputs(), &step_ctx).unwrap();
        assert!((f.x + 2.0 * 0.05 * 60.0).abs() < 1e-9);

        let fast = state(Vector2::new(5.0, 4.5), Vector2::new(3.0, 0.0));
        let f = ForceKind::Friction.evaluate(&fast, &inputs(), &step_ctx).unwrap();
        assert!((f.x + 0.4 * 2.0 * 9.81).abs() < 1e-12);
    }

    #[test]
    fn test_normal_balances_weight_on_floor() {
        let resting = state(Vector2::new(5.0, 4.5), Vector2::ZERO);
        let n = ForceKind::ContactNormal.evaluate(&resting, &inputs(), &ctx()).unwrap();
        let w = ForceKind::Gravity.evaluate(&resting, &inputs(), &ctx()).unwrap();
        assert!((n + w).length() < 1e-12);
    }

    #[test]
    fn test_drag_opposes_velocity() {
        let kind = ForceKind::Drag { coefficient: 0.5 };
        let s = state(Vector2::new(5.0, 2.0), Vector2::new(0.0, -4.0));
        let f = kind.evaluate(&s, &inputs(), &ctx()).unwrap();
        assert!((f.y - 8.0).abs() < 1e-12);
        let still = state(Vector2::new(5.0, 2.0), Vector2::ZERO);
        assert!(kind.evaluate(&still, &inputs(), &ctx()).is_none());
    }

    #[test]
    fn test_pipeline_external_excludes_intrinsic() {
        let pipeline = ForcePipeline::with_defaults(Vector2::new(1.5, 0.0), 0.0);
        let s = state(Vector2::new(5.0, 4.5), Vector2::new(2.0, 0.0));
        let acc = pipeline.external_acceleration(&s, &inputs(), &ctx());
        assert!((acc - Vector2::new(1.5, 0.0)).length() < 1e-12);

        let keys: Vec<_> = pipeline
            .active_forces(&s, &inputs(), &ctx())
            .into_iter()
            .map(|f| f.key)
            .collect();
        assert_eq!(keys, ["gravity", "normal", "friction", "wind"]);
    }

    #[test]
    fn test_pipeline_evaluation_is_order_independent() {
        let pipeline = ForcePipeline::with_defaults(Vector2::new(0.5, -0.2), 0.1);
        let s = state(Vector2::new(5.0, 4.5), Vector2::new(2.0, 0.0));
        let first = pipeline.active_forces(&s, &inputs(), &ctx());
        let second = pipeline.active_forces(&s, &inputs(), &ctx());
        assert_eq!(first, second);

        let mut reversed = ForcePipeline::new();
        for f in pipeline.iter().rev() {
            reversed.push(f.clone());
        }
        let a = pipeline.net_force(&s, &inputs(), &ctx());
        let b = reversed.net_force(&s, &inputs(), &ctx());
        assert!((a - b).length() < 1e-12);
    }

    #[test]
    fn test_push_replaces_same_key() {
        let mut pipeline = ForcePipeline::with_defaults(Vector2::ZERO, 0.0);
        let len = pipeline.len();
        pipeline.push(ForceDescriptor::new(
            "wind",
            ForceKind::Wind {
                acceleration: Vector2::new(2.0, 0.0),
            },
        ));
        assert_eq!(pipeline.len(), len);
        assert_eq!(pipeline.iter().nth(3).map(|f| f.key.as_str()), Some("wind"));

        pipeline.push(ForceDescriptor::new(
            "thruster",
            ForceKind::Applied {
                force: Vector2::new(0.0, -1.0),
            },
        ));
        assert_eq!(pipeline.len(), len + 1);
        assert!(pipeline.remove("thruster").is_some());
        assert!(pipeline.remove("thruster").is_none());
        assert!(pipeline.get("drag").is_some());
    }
}
