//! Point magnetic dipole
//!
//! `B(r) = k / |r|^3 * (3 r_hat (m . r_hat) - m)` with `k = mu0 / 4pi`.
//! The rod length is only used for drawing and for the tracer's stopping
//! distance; the field itself is that of an ideal point dipole.

use serde::{Deserialize, Serialize};

use crate::consts::MU0_OVER_4PI;
use crate::math::{Vector2, normalize_floored, screen_direction};
use crate::settings::{DipoleConfig, Tolerances};

/// A bar magnet modelled as a point dipole
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DipoleSource {
    pub position: Vector2,
    /// Counter-clockwise on screen, 0 = moment pointing right
    pub orientation_radians: f64,
    /// A·m²; negative flips the poles
    pub moment_magnitude: f64,
    pub length: f64,
}

impl From<&DipoleConfig> for DipoleSource {
    fn from(config: &DipoleConfig) -> Self {
        Self {
            position: config.position,
            orientation_radians: config.orientation_degrees.to_radians(),
            moment_magnitude: config.moment_magnitude,
            length: config.length,
        }
    }
}

/// Field value at a sample point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldSample {
    pub point: Vector2,
    pub field: Vector2,
}

impl DipoleSource {
    pub fn new(position: Vector2, orientation_radians: f64, moment_magnitude: f64, length: f64) -> Self {
        Self {
            position,
            orientation_radians,
            moment_magnitude,
            length,
        }
    }

    /// Unit vector from south to north pole
    pub fn axis(&self) -> Vector2 {
        screen_direction(self.orientation_radians)
    }

    /// Dipole moment vector `m`
    pub fn moment(&self) -> Vector2 {
        self.axis() * self.moment_magnitude
    }

    /// Magnetic field (T) at `point`, with the default tolerances
    pub fn field_at(&self, point: Vector2) -> Vector2 {
        self.field_at_with(point, &Tolerances::default())
    }

    /// Magnetic field (T) at `point`, `|r|` floored at `tolerances.field_epsilon`
    pub fn field_at_with(&self, point: Vector2, tolerances: &Tolerances) -> Vector2 {
        let r = point - self.position;
        let dist = r.length().max(tolerances.field_epsilon);
        let r_hat = r / dist;
        let m = self.moment();
        let shape = r_hat * (3.0 * m.dot(r_hat)) - m;
        shape * (MU0_OVER_4PI / (dist * dist * dist))
    }

    /// Unit field direction at `point`, zero where the field vanishes.
    ///
    /// Computed from the geometric factor alone, which has magnitude in
    /// [1, 2] for a unit moment, so the result does not depend on how
    /// small `k / r^3` gets far from the source.
    pub fn direction_at(&self, point: Vector2, tolerances: &Tolerances) -> Vector2 {
        if self.moment_magnitude == 0.0 {
            return Vector2::ZERO;
        }
        let r = point - self.position;
        let dist = r.length().max(tolerances.field_epsilon);
        let r_hat = r / dist;
        let m_hat = self.axis() * self.moment_magnitude.signum();
        let shape = r_hat * (3.0 * m_hat.dot(r_hat)) - m_hat;
        normalize_floored(shape, tolerances.direction_epsilon)
    }

    /// Rod endpoints `(north, south)` for drawing
    pub fn pole_positions(&self) -> (Vector2, Vector2) {
        let half = self.axis() * (self.length / 2.0);
        (self.position + half, self.position - half)
    }

    /// Field on a `cols x rows` grid spanning `min..=max`, row-major
    pub fn sample_grid(
        &self,
        min: Vector2,
        max: Vector2,
        cols: usize,
        rows: usize,
        tolerances: &Tolerances,
    ) -> Vec<FieldSample> {
        let span = max - min;
        let step = Vector2::new(
            span.x / (cols.saturating_sub(1)).max(1) as f64,
            span.y / (rows.saturating_sub(1)).max(1) as f64,
        );
        (0..rows)
            .flat_map(|j| (0..cols).map(move |i| (i, j)))
            .map(|(i, j)| {
                let point = min + Vector2::new(i as f64 * step.x, j as f64 * step.y);
                FieldSample {
                    point,
                    field: self.field_at_with(point, tolerances),
                }
            })
            .collect()
    }
}
