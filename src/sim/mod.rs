//! Point-mass simulation module
//!
//! Everything that runs once per frame lives here:
//! - `clock`: per-instance delta time with pause and time scale
//! - `forces`: pure force descriptors, summed for motion and drawn as arrows
//! - `integrator`: constant-acceleration position/velocity update
//! - `collision`: box boundary response with the energy-aware floor rule
//! - `body`: the ball and its step pipeline
//! - `tick`: per-instance orchestration and frame snapshots
//!
//! Nothing here blocks, allocates per step beyond the snapshot, or touches
//! rendering.

pub mod body;
pub mod clock;
pub mod collision;
pub mod forces;
pub mod integrator;
pub mod tick;

pub use body::{Body, BodyParams, BodyState, SkipReason, StepOutcome};
pub use clock::{ClockContext, InstanceId, SharedClock};
pub use collision::{
    BoundaryResolution, Bounds, Contacts, FloorOutcome, FloorResolution, collide_boundary, resolve_floor,
};
pub use forces::{
    ForceContext, ForceDescriptor, ForceInputs, ForceKind, ForcePipeline, ForceVector, on_floor,
};
pub use integrator::{Kinematics, integrate};
pub use tick::{FrameSnapshot, Simulation};
