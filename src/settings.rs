//! Simulation configuration
//!
//! Plain serde data handed over by the host (sliders, presets, URL params).
//! Values are range-checked once when a simulation is built; the tick path
//! trusts them afterwards.

use serde::{Deserialize, Serialize};

use crate::consts;
use crate::error::{ConfigError, PhyslabResult};
use crate::math::Vector2;
use crate::sim::Bounds;

/// Surface gravity presets offered by the lesson UI
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum GravityPreset {
    Sun,
    Mercury,
    Venus,
    #[default]
    Earth,
    Moon,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    ZeroG,
    /// Arbitrary downward acceleration in m/s²
    Custom(f64),
}

impl GravityPreset {
    pub const ALL: [GravityPreset; 12] = [
        GravityPreset::Sun,
        GravityPreset::Mercury,
        GravityPreset::Venus,
        GravityPreset::Earth,
        GravityPreset::Moon,
        GravityPreset::Mars,
        GravityPreset::Jupiter,
        GravityPreset::Saturn,
        GravityPreset::Uranus,
        GravityPreset::Neptune,
        GravityPreset::Pluto,
        GravityPreset::ZeroG,
    ];

    /// Downward acceleration in m/s²
    pub fn acceleration(&self) -> f64 {
        match self {
            GravityPreset::Sun => 274.0,
            GravityPreset::Mercury => 3.7,
            GravityPreset::Venus => 8.87,
            GravityPreset::Earth => 9.81,
            GravityPreset::Moon => 1.62,
            GravityPreset::Mars => 3.71,
            GravityPreset::Jupiter => 24.79,
            GravityPreset::Saturn => 10.44,
            GravityPreset::Uranus => 8.69,
            GravityPreset::Neptune => 11.15,
            GravityPreset::Pluto => 0.62,
            GravityPreset::ZeroG => 0.0,
            GravityPreset::Custom(g) => *g,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GravityPreset::Sun => "Sun",
            GravityPreset::Mercury => "Mercury",
            GravityPreset::Venus => "Venus",
            GravityPreset::Earth => "Earth",
            GravityPreset::Moon => "Moon",
            GravityPreset::Mars => "Mars",
            GravityPreset::Jupiter => "Jupiter",
            GravityPreset::Saturn => "Saturn",
            GravityPreset::Uranus => "Uranus",
            GravityPreset::Neptune => "Neptune",
            GravityPreset::Pluto => "Pluto",
            GravityPreset::ZeroG => "Zero-G",
            GravityPreset::Custom(_) => "Custom",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sun" => Some(GravityPreset::Sun),
            "mercury" => Some(GravityPreset::Mercury),
            "venus" => Some(GravityPreset::Venus),
            "earth" => Some(GravityPreset::Earth),
            "moon" => Some(GravityPreset::Moon),
            "mars" => Some(GravityPreset::Mars),
            "jupiter" => Some(GravityPreset::Jupiter),
            "saturn" => Some(GravityPreset::Saturn),
            "uranus" => Some(GravityPreset::Uranus),
            "neptune" => Some(GravityPreset::Neptune),
            "pluto" => Some(GravityPreset::Pluto),
            "zero-g" | "zerog" | "zero" | "space" => Some(GravityPreset::ZeroG),
            _ => s.parse::<f64>().ok().map(GravityPreset::Custom),
        }
    }
}

/// Numeric thresholds used across the engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    /// Floor contact tolerance (m)
    pub contact_epsilon: f64,
    /// Speed below which velocity snaps to zero (m/s)
    pub rest_speed: f64,
    /// Speed below which kinetic friction is off (m/s)
    pub friction_speed: f64,
    /// Largest step the clock hands out (s)
    pub max_dt: f64,
    /// Magnitude floor for normalization
    pub direction_epsilon: f64,
    /// Distance floor near the dipole (m)
    pub field_epsilon: f64,
    pub min_mass: f64,
    pub min_size: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            contact_epsilon: consts::CONTACT_EPSILON,
            rest_speed: consts::REST_SPEED,
            friction_speed: consts::FRICTION_SPEED,
            max_dt: consts::MAX_DT,
            direction_epsilon: consts::DIRECTION_EPSILON,
            field_epsilon: consts::FIELD_EPSILON,
            min_mass: consts::MIN_MASS,
            min_size: consts::MIN_SIZE,
        }
    }
}

impl Tolerances {
    /// Reject non-finite thresholds and restore usable ones.
    ///
    /// Every threshold must be positive except the contact, rest and
    /// friction thresholds, which may be zero. Mass and size floors never
    /// drop below the built-in minimums. Each correction is logged.
    pub fn validated(&self) -> PhyslabResult<Self> {
        let mut tol = *self;
        finite("tolerances.contact_epsilon", tol.contact_epsilon)?;
        finite("tolerances.rest_speed", tol.rest_speed)?;
        finite("tolerances.friction_speed", tol.friction_speed)?;
        finite("tolerances.max_dt", tol.max_dt)?;
        finite("tolerances.direction_epsilon", tol.direction_epsilon)?;
        finite("tolerances.field_epsilon", tol.field_epsilon)?;
        finite("tolerances.min_mass", tol.min_mass)?;
        finite("tolerances.min_size", tol.min_size)?;

        tol.contact_epsilon = at_least("tolerances.contact_epsilon", tol.contact_epsilon, 0.0);
        tol.rest_speed = at_least("tolerances.rest_speed", tol.rest_speed, 0.0);
        tol.friction_speed = at_least("tolerances.friction_speed", tol.friction_speed, 0.0);
        tol.min_mass = at_least("tolerances.min_mass", tol.min_mass, consts::MIN_MASS);
        tol.min_size = at_least("tolerances.min_size", tol.min_size, consts::MIN_SIZE);
        tol.max_dt = positive_or("tolerances.max_dt", tol.max_dt, consts::MAX_DT);
        tol.direction_epsilon =
            positive_or("tolerances.direction_epsilon", tol.direction_epsilon, consts::DIRECTION_EPSILON);
        tol.field_epsilon = positive_or("tolerances.field_epsilon", tol.field_epsilon, consts::FIELD_EPSILON);
        Ok(tol)
    }
}

fn at_least(field: &str, value: f64, floor: f64) -> f64 {
    if value < floor {
        log::warn!("{} = {} below {}, clamping", field, value, floor);
        floor
    } else {
        value
    }
}

fn positive_or(field: &str, value: f64, fallback: f64) -> f64 {
    if value > 0.0 {
        value
    } else {
        log::warn!("{} = {} must be positive, using {}", field, value, fallback);
        fallback
    }
}

/// Physical parameters of the simulated ball
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    /// Mass (kg)
    pub mass: f64,
    /// Diameter (m)
    pub size: f64,
    pub gravity: GravityPreset,
    /// Fraction of impact speed kept on bounce
    pub restitution: f64,
    /// Kinetic friction coefficient against the floor
    pub friction_coefficient: f64,
    /// Spawn position (m)
    pub initial_position: Vector2,
    /// Spawn velocity (m/s)
    pub initial_velocity: Vector2,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            mass: 1.0,
            size: 0.5,
            gravity: GravityPreset::Earth,
            restitution: 0.8,
            friction_coefficient: 0.3,
            initial_position: Vector2::new(1.0, 1.0),
            initial_velocity: Vector2::ZERO,
        }
    }
}

impl BodyConfig {
    pub fn radius(&self) -> f64 {
        self.size / 2.0
    }

    /// Reject non-finite values and clamp out-of-range ones.
    ///
    /// Mass and size are floored at a small positive value, restitution is
    /// clamped to [0, 1] and friction to >= 0. Each clamp is logged.
    pub fn validated(&self, tolerances: &Tolerances) -> PhyslabResult<Self> {
        let mut cfg = self.clone();
        cfg.mass = finite("body.mass", cfg.mass)?;
        cfg.size = finite("body.size", cfg.size)?;
        finite("body.gravity", cfg.gravity.acceleration())?;
        cfg.restitution = finite("body.restitution", cfg.restitution)?;
        cfg.friction_coefficient = finite("body.friction_coefficient", cfg.friction_coefficient)?;
        finite_vec("body.initial_position", cfg.initial_position)?;
        finite_vec("body.initial_velocity", cfg.initial_velocity)?;

        if cfg.mass < tolerances.min_mass {
            log::warn!("Mass {} below minimum, clamping to {}", cfg.mass, tolerances.min_mass);
            cfg.mass = tolerances.min_mass;
        }
        if cfg.size < tolerances.min_size {
            log::warn!("Size {} below minimum, clamping to {}", cfg.size, tolerances.min_size);
            cfg.size = tolerances.min_size;
        }
        if !(0.0..=1.0).contains(&cfg.restitution) {
            let clamped = cfg.restitution.clamp(0.0, 1.0);
            log::warn!("Restitution {} outside [0, 1], clamping to {}", cfg.restitution, clamped);
            cfg.restitution = clamped;
        }
        if cfg.friction_coefficient < 0.0 {
            log::warn!("Negative friction coefficient {}, using 0", cfg.friction_coefficient);
            cfg.friction_coefficient = 0.0;
        }
        Ok(cfg)
    }
}

/// Everything needed to build one bouncing-ball simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub body: BodyConfig,
    /// Domain size in meters
    pub bounds: Bounds,
    /// Constant wind acceleration (m/s²); zero disables the wind force
    pub wind: Vector2,
    /// Quadratic air drag coefficient (kg/m); zero disables drag
    pub drag_coefficient: f64,
    pub tolerances: Tolerances,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            body: BodyConfig::default(),
            bounds: Bounds::new(10.0, 6.0),
            wind: Vector2::ZERO,
            drag_coefficient: 0.0,
            tolerances: Tolerances::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_json(json: &str) -> PhyslabResult<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validated()
    }

    pub fn to_json(&self) -> PhyslabResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Validate bounds and body, clamping where a safe value exists.
    pub fn validated(&self) -> PhyslabResult<Self> {
        let mut cfg = self.clone();
        cfg.tolerances = cfg.tolerances.validated()?;
        let Bounds { width, height } = cfg.bounds;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ConfigError::InvalidBounds { width, height });
        }
        cfg.body = cfg.body.validated(&cfg.tolerances)?;
        if cfg.body.size > width || cfg.body.size > height {
            return Err(ConfigError::BodyTooLarge {
                diameter: cfg.body.size,
                width,
                height,
            });
        }
        finite_vec("wind", cfg.wind)?;
        cfg.drag_coefficient = finite("drag_coefficient", cfg.drag_coefficient)?;
        if cfg.drag_coefficient < 0.0 {
            log::warn!("Negative drag coefficient {}, using 0", cfg.drag_coefficient);
            cfg.drag_coefficient = 0.0;
        }

        let radius = cfg.body.radius();
        let clamped = cfg.bounds.clamp_inside(cfg.body.initial_position, radius);
        if clamped != cfg.body.initial_position {
            log::warn!(
                "Initial position {:?} outside bounds, moved to {:?}",
                cfg.body.initial_position,
                clamped
            );
            cfg.body.initial_position = clamped;
        }
        Ok(cfg)
    }
}

/// Bar magnet as configured in the field lesson
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DipoleConfig {
    pub position: Vector2,
    /// Counter-clockwise on screen, 0 = north pole pointing right
    pub orientation_degrees: f64,
    /// Dipole moment (A·m²)
    pub moment_magnitude: f64,
    /// Rod length, used for drawing and the tracing cutoff
    pub length: f64,
}

impl Default for DipoleConfig {
    fn default() -> Self {
        Self {
            position: Vector2::new(5.0, 3.0),
            orientation_degrees: 0.0,
            moment_magnitude: 1.0,
            length: 1.0,
        }
    }
}

/// Seeds placed evenly on a circle around the source
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedRing {
    pub count: usize,
    pub radius: f64,
}

impl Default for SeedRing {
    fn default() -> Self {
        Self {
            count: 16,
            radius: 0.3,
        }
    }
}

/// Streamline integration settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TracerConfig {
    /// Arc length per step (m)
    pub step: f64,
    /// Steps per direction
    pub max_steps: usize,
    /// Stop once this many dipole lengths away from the source
    pub cutoff_factor: f64,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            step: 0.02,
            max_steps: 2000,
            cutoff_factor: consts::STREAMLINE_CUTOFF_FACTOR,
        }
    }
}

/// Full field-lesson configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub dipole: DipoleConfig,
    pub seeds: SeedRing,
    pub tracer: TracerConfig,
    pub tolerances: Tolerances,
}

impl FieldConfig {
    pub fn from_json(json: &str) -> PhyslabResult<Self> {
        let mut config: FieldConfig = serde_json::from_str(json)?;
        config.tolerances = config.tolerances.validated()?;
        finite_vec("dipole.position", config.dipole.position)?;
        finite("dipole.orientation_degrees", config.dipole.orientation_degrees)?;
        finite("dipole.moment_magnitude", config.dipole.moment_magnitude)?;
        finite("dipole.length", config.dipole.length)?;
        finite("seeds.radius", config.seeds.radius)?;
        finite("tracer.step", config.tracer.step)?;
        finite("tracer.cutoff_factor", config.tracer.cutoff_factor)?;
        Ok(config)
    }
}

fn finite(field: &'static str, value: f64) -> PhyslabResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFinite { field })
    }
}

fn finite_vec(field: &'static str, value: Vector2) -> PhyslabResult<Vector2> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFinite { field })
    }
}
