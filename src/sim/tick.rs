//! Per-instance simulation tick
//!
//! Glues the clock, the force registry and the body together for one lesson
//! widget. Within a tick, forces are evaluated before integration, and
//! integration runs before collision resolution. The returned snapshot is
//! the only thing the renderer reads.

use serde::{Deserialize, Serialize};

use crate::error::PhyslabResult;
use crate::math::Vector2;
use crate::settings::SimulationConfig;

use super::body::{Body, BodyParams, StepOutcome};
use super::clock::{ClockContext, InstanceId};
use super::collision::Bounds;
use super::forces::{ForceContext, ForceDescriptor, ForceKind, ForcePipeline, ForceVector};

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub instance: InstanceId,
    pub pos: Vector2,
    pub vel: Vector2,
    pub speed: f64,
    pub radius: f64,
    /// Active forces (N), in registry order
    pub forces: Vec<ForceVector>,
    pub resting: bool,
    pub dragging: bool,
    /// Simulated seconds consumed by this tick (0 when nothing ran)
    pub dt: f64,
}

/// One bouncing-ball lesson instance
#[derive(Debug, Clone)]
pub struct Simulation {
    id: InstanceId,
    config: SimulationConfig,
    body: Body,
    forces: ForcePipeline,
    /// Total simulated time (s)
    elapsed: f64,
}

impl Simulation {
    pub fn new(id: InstanceId, config: SimulationConfig) -> PhyslabResult<Self> {
        let config = config.validated()?;
        let body = Body::from_config(&config.body, config.tolerances);
        let forces = ForcePipeline::with_defaults(config.wind, config.drag_coefficient);
        log::info!(
            "Simulation {} ready: mass={} size={} gravity={} ({}) in {}x{}",
            id.0,
            config.body.mass,
            config.body.size,
            config.body.gravity.acceleration(),
            config.body.gravity.as_str(),
            config.bounds.width,
            config.bounds.height
        );
        Ok(Self {
            id,
            config,
            body,
            forces,
            elapsed: 0.0,
        })
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn bounds(&self) -> Bounds {
        self.config.bounds
    }

    pub fn forces(&self) -> &ForcePipeline {
        &self.forces
    }

    /// Mutable access for hosts that register extra forces
    pub fn forces_mut(&mut self) -> &mut ForcePipeline {
        &mut self.forces
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Advance by wall-clock time read once per frame by the host.
    ///
    /// The step is capped by both the clock and this simulation's
    /// `tolerances.max_dt`, so a shared clock cannot exceed a per-instance cap.
    pub fn tick(&mut self, clock: &mut ClockContext, now_ms: f64) -> FrameSnapshot {
        let cap = self.config.tolerances.max_dt * clock.time_scale();
        let dt = clock.compute_delta(now_ms, self.id).min(cap);
        self.advance(dt)
    }

    /// Advance by an explicit step. Zero or invalid steps only re-report state.
    pub fn advance(&mut self, dt: f64) -> FrameSnapshot {
        let mut consumed = 0.0;
        if dt > 0.0 && !self.body.is_dragging() {
            let inputs = self.body.params.force_inputs();
            let ctx = self.force_context(dt);
            let external = self.forces.external_acceleration(&self.body.state, &inputs, &ctx);
            if let StepOutcome::Advanced(_) = self.body.step(dt, self.config.bounds, Some(external)) {
                consumed = dt;
                self.elapsed += dt;
            }
        }
        self.snapshot(consumed)
    }

    /// Current state without advancing. Force arrows are evaluated for a
    /// step of `dt`, so a capped friction arrow matches what the body applies.
    pub fn snapshot(&self, dt: f64) -> FrameSnapshot {
        let inputs = self.body.params.force_inputs();
        let ctx = self.force_context(dt);
        let bounds = self.config.bounds;
        FrameSnapshot {
            instance: self.id,
            pos: self.body.state.pos,
            vel: self.body.state.vel,
            speed: self.body.state.vel.length(),
            radius: self.body.params.radius,
            forces: self.forces.active_forces(&self.body.state, &inputs, &ctx),
            resting: self.body.is_resting(&bounds),
            dragging: self.body.is_dragging(),
            dt,
        }
    }

    fn force_context(&self, dt: f64) -> ForceContext {
        ForceContext {
            bounds: self.config.bounds,
            tolerances: self.config.tolerances,
            dt,
        }
    }

    /// Apply new parameters, keeping the body's current motion
    pub fn reconfigure(&mut self, config: SimulationConfig) -> PhyslabResult<()> {
        let config = config.validated()?;
        self.body.set_params(BodyParams::from_config(&config.body));
        self.body.tolerances = config.tolerances;
        self.forces.push(ForceDescriptor::new(
            "wind",
            ForceKind::Wind {
                acceleration: config.wind,
            },
        ));
        self.forces.push(ForceDescriptor::new(
            "drag",
            ForceKind::Drag {
                coefficient: config.drag_coefficient,
            },
        ));
        self.config = config;
        self.keep_inside();
        log::info!("Simulation {} reconfigured", self.id.0);
        Ok(())
    }

    /// New domain size (e.g. canvas resize). The body is moved inside if needed.
    pub fn resize(&mut self, bounds: Bounds) -> PhyslabResult<()> {
        let mut config = self.config.clone();
        config.bounds = bounds;
        self.config = config.validated()?;
        self.keep_inside();
        Ok(())
    }

    fn keep_inside(&mut self) {
        let bounds = self.config.bounds;
        let radius = self.body.params.radius;
        self.body.state.pos = bounds.clamp_inside(self.body.state.pos, radius);
    }

    /// Back to the configured spawn state
    pub fn reset(&mut self) {
        self.body = Body::from_config(&self.config.body, self.config.tolerances);
        self.elapsed = 0.0;
    }

    pub fn begin_drag(&mut self) {
        self.body.begin_drag();
    }

    pub fn drag_to(&mut self, pos: Vector2) {
        self.body.drag_to(pos, self.config.bounds);
    }

    pub fn end_drag(&mut self) {
        self.body.end_drag();
    }

    /// Tear down: release this instance's clock slot
    pub fn detach(self, clock: &mut ClockContext) {
        clock.cleanup_instance(self.id);
    }
}
