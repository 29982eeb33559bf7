//! Magnetic field lesson
//!
//! Computed on demand, not per tick: the host recomputes field lines only
//! when the magnet or the seed ring changes.

pub mod dipole;
pub mod streamline;

pub use dipole::{DipoleSource, FieldSample};
pub use streamline::{Streamline, StreamlineTracer, seed_ring};

use crate::settings::FieldConfig;

/// All field lines for a configured magnet
pub fn field_lines(config: &FieldConfig) -> Vec<Streamline> {
    let source = DipoleSource::from(&config.dipole);
    StreamlineTracer::with_tolerances(&source, config.tracer, &config.tolerances).trace_field_lines(&config.seeds)
}
