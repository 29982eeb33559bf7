//! Field-line tracing
//!
//! Lines are traced with fixed-length steps along the local field direction.
//! A negative step walks against the field, so a full line through a seed is
//! the reversed backward trace, the seed, then the forward trace.

use std::f64::consts::TAU;

use crate::math::{Vector2, screen_direction};
use crate::settings::{SeedRing, Tolerances, TracerConfig};

use super::dipole::DipoleSource;

/// A traced field line, ordered along the field
pub type Streamline = Vec<Vector2>;

/// Traces field lines of one dipole
#[derive(Debug, Clone, Copy)]
pub struct StreamlineTracer<'a> {
    source: &'a DipoleSource,
    config: TracerConfig,
    tolerances: Tolerances,
}

impl<'a> StreamlineTracer<'a> {
    pub fn new(source: &'a DipoleSource, config: TracerConfig) -> Self {
        Self::with_tolerances(source, config, &Tolerances::default())
    }

    pub fn with_tolerances(source: &'a DipoleSource, config: TracerConfig, tolerances: &Tolerances) -> Self {
        Self {
            source,
            config,
            tolerances: *tolerances,
        }
    }

    /// Distance from the source past which tracing stops, if any
    pub fn cutoff_distance(&self) -> Option<f64> {
        (self.source.length > 0.0).then(|| self.config.cutoff_factor * self.source.length)
    }

    /// Walk from `seed` in steps of `step` (negative = against the field).
    ///
    /// The seed itself is not included. Stops after `max_steps` points, once
    /// a point lies beyond the cutoff distance, when the line falls into the
    /// source from outside, or where the field vanishes.
    pub fn trace(&self, seed: Vector2, step: f64, max_steps: usize) -> Streamline {
        if step == 0.0 || !step.is_finite() || !seed.is_finite() {
            log::warn!("Refusing to trace from {:?} with step {}", seed, step);
            return Vec::new();
        }

        let cutoff = self.cutoff_distance();
        // Lines of a point dipole converge on the source; a line that gets
        // within one step of it would jump through and retrace itself.
        let capture = step.abs();
        let center = self.source.position;

        let mut points = Vec::with_capacity(max_steps.min(4096));
        let mut current = seed;
        let mut outside = current.distance(center) >= capture;

        for _ in 0..max_steps {
            let direction = self.source.direction_at(current, &self.tolerances);
            if direction == Vector2::ZERO {
                break;
            }
            current += direction * step;
            points.push(current);

            let dist = current.distance(center);
            if cutoff.is_some_and(|c| dist > c) {
                break;
            }
            if outside && dist < capture {
                break;
            }
            outside = dist >= capture;
        }
        points
    }

    /// Complete line through `seed`: backward (reversed), seed, forward
    pub fn field_line(&self, seed: Vector2) -> Streamline {
        let step = self.config.step;
        let mut line = self.trace(seed, -step, self.config.max_steps);
        line.reverse();
        line.push(seed);
        line.extend(self.trace(seed, step, self.config.max_steps));
        line
    }

    /// One field line per seed on the ring. Degenerate lines are dropped.
    pub fn trace_field_lines(&self, ring: &SeedRing) -> Vec<Streamline> {
        seed_ring(self.source, ring)
            .into_iter()
            .map(|seed| self.field_line(seed))
            .filter(|line| line.len() > 1)
            .collect()
    }
}

/// `ring.count` seeds evenly spaced on a circle around the source,
/// the first one on the north side of the axis
pub fn seed_ring(source: &DipoleSource, ring: &SeedRing) -> Vec<Vector2> {
    (0..ring.count)
        .map(|i| {
            let angle = source.orientation_radians + TAU * i as f64 / ring.count as f64;
            source.position + screen_direction(angle) * ring.radius
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::cosine_similarity;

    fn source() -> DipoleSource {
        DipoleSource::new(Vector2::new(2.0, 2.0), 0.4, 1.0, 0.5)
    }

    fn config() -> TracerConfig {
        TracerConfig {
            step: 0.01,
            max_steps: 500,
            cutoff_factor: 10.0,
        }
    }

    #[test]
    fn test_forward_trace_follows_field() {
        let src = source();
        let tracer = StreamlineTracer::new(&src, config());
        let seed = src.position + Vector2::new(0.0, -0.6);
        let line = tracer.trace(seed, 0.01, 200);
        assert!(!line.is_empty());

        let mut prev = seed;
        for &p in &line {
            let seg = p - prev;
            assert!((seg.length() - 0.01).abs() < 1e-12);
            assert!(cosine_similarity(seg, src.field_at(prev)) > 1.0 - 1e-9);
            prev = p;
        }
    }

    #[test]
    fn test_backward_trace_goes_against_field() {
        let src = source();
        let tracer = StreamlineTracer::new(&src, config());
        let seed = src.position + Vector2::new(0.7, 0.1);
        let back = tracer.trace(seed, -0.01, 10);
        let first = back[0] - seed;
        assert!(cosine_similarity(first, src.field_at(seed)) < -1.0 + 1e-9);
    }

    #[test]
    fn test_field_line_passes_through_seed() {
        let src = source();
        let tracer = StreamlineTracer::new(&src, config());
        let seed = src.position + Vector2::new(-0.3, 0.5);
        let line = tracer.field_line(seed);
        let idx = line.iter().position(|&p| p == seed).unwrap();
        assert!(idx > 0 && idx < line.len() - 1);
        for pair in line.windows(2) {
            assert!(((pair[1] - pair[0]).length() - 0.01).abs() < 1e-12);
        }
    }

    #[test]
    fn test_cutoff_stops_far_lines() {
        let src = DipoleSource::new(Vector2::ZERO, 0.0, 1.0, 0.1);
        let tracer = StreamlineTracer::new(&src, config());
        // Starts on the axis, heads straight out
        let line = tracer.trace(Vector2::new(0.5, 0.0), 0.01, 10_000);
        let last = *line.last().unwrap();
        assert!(last.length() > 1.0);
        assert!(line[..line.len() - 1].iter().all(|p| p.length() <= 1.0));
        assert!(line.len() < 10_000);
    }

    #[test]
    fn test_max_steps_bounds_trace() {
        let src = DipoleSource::new(Vector2::ZERO, 0.0, 1.0, 0.0);
        let tracer = StreamlineTracer::new(&src, config());
        assert!(tracer.cutoff_distance().is_none());
        let line = tracer.trace(Vector2::new(0.5, 0.0), 0.01, 37);
        assert_eq!(line.len(), 37);
    }

    #[test]
    fn test_degenerate_inputs() {
        let dead = DipoleSource::new(Vector2::ZERO, 0.0, 0.0, 1.0);
        let tracer = StreamlineTracer::new(&dead, config());
        assert!(tracer.trace(Vector2::ONE, 0.01, 100).is_empty());
        assert!(tracer.trace_field_lines(&SeedRing { count: 4, radius: 0.5 }).is_empty());

        let src = source();
        let tracer = StreamlineTracer::new(&src, config());
        assert!(tracer.trace(Vector2::ONE, 0.0, 100).is_empty());
        assert!(tracer.trace(Vector2::ONE, f64::NAN, 100).is_empty());
    }

    #[test]
    fn test_seed_ring_layout() {
        let src = source();
        let ring = SeedRing { count: 6, radius: 0.4 };
        let seeds = seed_ring(&src, &ring);
        assert_eq!(seeds.len(), 6);
        for s in &seeds {
            assert!((s.distance(src.position) - 0.4).abs() < 1e-12);
        }
        // first seed on the north side
        assert!(cosine_similarity(seeds[0] - src.position, src.axis()) > 1.0 - 1e-12);
        assert!(seed_ring(&src, &SeedRing { count: 0, radius: 1.0 }).is_empty());
    }

    #[test]
    fn test_ring_lines_close_on_source() {
        let src = source();
        let tracer = StreamlineTracer::new(&src, config());
        let lines = tracer.trace_field_lines(&SeedRing { count: 8, radius: 0.4 });
        assert_eq!(lines.len(), 8);
        for line in &lines {
            assert!(line.len() <= 2 * config().max_steps + 1);
            assert!(line.iter().all(|p| p.is_finite()));
        }
    }
}
