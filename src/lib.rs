//! physlab - 2D physics micro-engine for interactive physics lessons
//!
//! Core modules:
//! - `math`: 2D vector helpers on top of `glam::DVec2`
//! - `sim`: Per-tick point-mass simulation (clock, forces, integration, collisions)
//! - `field`: Magnetic dipole field model and streamline tracing
//! - `settings`: Serializable configuration with range clamping
//! - `error`: Configuration errors
//!
//! The host owns the render loop. Once per frame it asks a [`sim::ClockContext`]
//! for a delta time, advances each [`sim::Simulation`] and draws the returned
//! [`sim::FrameSnapshot`]. Field lines are recomputed only when the dipole or
//! seed configuration changes.

pub mod error;
pub mod field;
pub mod math;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use error::{ConfigError, PhyslabResult};
pub use math::Vector2;
pub use settings::{BodyConfig, DipoleConfig, GravityPreset, SimulationConfig, Tolerances};

/// Engine constants. Runtime code reads them through [`Tolerances`] so tests
/// can swap in different values.
pub mod consts {
    /// Largest simulated step (seconds). Frame stalls are clamped to this.
    pub const MAX_DT: f64 = 1.0 / 30.0;
    /// Distance within which a body counts as touching the floor
    pub const CONTACT_EPSILON: f64 = 1e-9;
    /// Speeds below this (m/s) are snapped to zero after a step
    pub const REST_SPEED: f64 = 1e-3;
    /// Minimum speed (m/s) for kinetic friction to act
    pub const FRICTION_SPEED: f64 = 1e-3;
    /// Magnitude floor when normalizing directions
    pub const DIRECTION_EPSILON: f64 = 1e-12;
    /// Distance floor for the dipole field singularity
    pub const FIELD_EPSILON: f64 = 1e-6;
    /// Smallest mass (kg) a body can be configured with
    pub const MIN_MASS: f64 = 1e-6;
    /// Smallest diameter (m) a body can be configured with
    pub const MIN_SIZE: f64 = 1e-6;

    /// mu0 / 4pi in T*m/A
    pub const MU0_OVER_4PI: f64 = 1e-7;

    /// Tracing stops once a line is this many dipole lengths from the source
    pub const STREAMLINE_CUTOFF_FACTOR: f64 = 10.0;
}
