//! Simulation clock
//!
//! Turns wall-clock readings into per-instance step sizes. Each simulation
//! instance keeps its own last timestamp so several widgets can share one
//! clock without stealing each other's elapsed time.
//!
//! The host owns the [`ClockContext`] and passes it into every tick. Hosts
//! that tick from several threads wrap it in a [`SharedClock`].

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::consts::MAX_DT;
use crate::settings::Tolerances;

/// Identity of one simulation instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(pub u64);

impl From<u64> for InstanceId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Delta-time source with pause and time-scale controls
#[derive(Debug, Clone)]
pub struct ClockContext {
    time_scale: f64,
    paused: bool,
    /// Last wall-clock timestamp (ms) seen per instance
    last_timestamps: HashMap<InstanceId, f64>,
    max_dt: f64,
}

impl Default for ClockContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockContext {
    pub fn new() -> Self {
        Self::with_max_dt(MAX_DT)
    }

    /// Clock capped at `tolerances.max_dt`
    pub fn from_tolerances(tolerances: &Tolerances) -> Self {
        Self::with_max_dt(tolerances.max_dt)
    }

    /// Clock with a custom cap on the raw step (seconds)
    pub fn with_max_dt(max_dt: f64) -> Self {
        Self {
            time_scale: 1.0,
            paused: false,
            last_timestamps: HashMap::new(),
            max_dt: max_dt.max(0.0),
        }
    }

    /// Scaled step in seconds since this instance was last seen.
    ///
    /// Returns 0 while paused (without touching any timestamps) and on the
    /// first call for an instance. Raw steps are clamped to `[0, max_dt]`
    /// before scaling so a stalled tab resumes with one bounded step.
    pub fn compute_delta(&mut self, now_ms: f64, id: InstanceId) -> f64 {
        if self.paused {
            return 0.0;
        }

        let Some(last) = self.last_timestamps.insert(id, now_ms) else {
            return 0.0;
        };

        let dt = (now_ms - last) / 1000.0;
        if !dt.is_finite() {
            return 0.0;
        }
        dt.clamp(0.0, self.max_dt) * self.time_scale
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Set the time multiplier. Negative values clamp to 0 (frozen).
    pub fn set_time_scale(&mut self, scale: f64) {
        if scale.is_nan() {
            log::warn!("Ignoring NaN time scale");
            return;
        }
        self.time_scale = scale.max(0.0);
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) {
        self.set_pause(!self.paused);
    }

    /// Pause or resume. Pausing forgets every instance's timestamp so the
    /// first tick after resuming is treated as a first tick.
    pub fn set_pause(&mut self, paused: bool) {
        self.paused = paused;
        if paused {
            if !self.last_timestamps.is_empty() {
                log::debug!("Clock paused, dropping {} timestamps", self.last_timestamps.len());
            }
            self.last_timestamps.clear();
        }
    }

    /// Back to scale 1, running, no known instances
    pub fn reset_time(&mut self) {
        self.time_scale = 1.0;
        self.paused = false;
        self.last_timestamps.clear();
    }

    /// Forget one instance. Unknown ids are a no-op.
    pub fn cleanup_instance(&mut self, id: InstanceId) {
        if self.last_timestamps.remove(&id).is_some() {
            log::debug!("Clock released instance {}", id.0);
        }
    }

    pub fn is_tracking(&self, id: InstanceId) -> bool {
        self.last_timestamps.contains_key(&id)
    }

    pub fn tracked_instances(&self) -> usize {
        self.last_timestamps.len()
    }

    pub fn max_dt(&self) -> f64 {
        self.max_dt
    }
}

/// Thread-safe handle to a [`ClockContext`]
#[derive(Debug, Clone, Default)]
pub struct SharedClock {
    inner: Arc<Mutex<ClockContext>>,
}

impl SharedClock {
    pub fn new(clock: ClockContext) -> Self {
        Self {
            inner: Arc::new(Mutex::new(clock)),
        }
    }

    pub fn compute_delta(&self, now_ms: f64, id: InstanceId) -> f64 {
        self.inner.lock().compute_delta(now_ms, id)
    }

    pub fn set_time_scale(&self, scale: f64) {
        self.inner.lock().set_time_scale(scale);
    }

    pub fn toggle_pause(&self) {
        self.inner.lock().toggle_pause();
    }

    pub fn set_pause(&self, paused: bool) {
        self.inner.lock().set_pause(paused);
    }

    pub fn reset_time(&self) {
        self.inner.lock().reset_time();
    }

    pub fn cleanup_instance(&self, id: InstanceId) {
        self.inner.lock().cleanup_instance(id);
    }

    /// Run `f` with exclusive access to the clock
    pub fn with<R>(&self, f: impl FnOnce(&mut ClockContext) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: InstanceId = InstanceId(1);
    const B: InstanceId = InstanceId(2);

    #[test]
    fn test_first_tick_is_zero() {
        let mut clock = ClockContext::new();
        assert_eq!(clock.compute_delta(123_456.0, A), 0.0);
        assert!(clock.is_tracking(A));
    }

    #[test]
    fn test_delta_in_seconds() {
        let mut clock = ClockContext::new();
        clock.compute_delta(1000.0, A);
        let dt = clock.compute_delta(1016.0, A);
        assert!((dt - 0.016).abs() < 1e-12);
    }

    #[test]
    fn test_delta_clamped_to_max_step() {
        let mut clock = ClockContext::new();
        clock.compute_delta(0.0, A);
        let dt = clock.compute_delta(5000.0, A);
        assert!((dt - MAX_DT).abs() < 1e-12);
    }

    #[test]
    fn test_backwards_clock_gives_zero() {
        let mut clock = ClockContext::new();
        clock.compute_delta(2000.0, A);
        assert_eq!(clock.compute_delta(1990.0, A), 0.0);
    }

    #[test]
    fn test_configured_max_step() {
        let tol = Tolerances {
            max_dt: 0.01,
            ..Default::default()
        };
        let mut clock = ClockContext::from_tolerances(&tol);
        assert_eq!(clock.max_dt(), 0.01);
        clock.compute_delta(0.0, A);
        assert_eq!(clock.compute_delta(1000.0, A), 0.01);
        assert_eq!(ClockContext::from_tolerances(&Tolerances::default()).max_dt(), MAX_DT);
    }

    #[test]
    fn test_time_scale_applies_after_clamp() {
        let mut clock = ClockContext::new();
        clock.set_time_scale(2.0);
        clock.compute_delta(0.0, A);
        let dt = clock.compute_delta(1000.0, A);
        assert!((dt - 2.0 * MAX_DT).abs() < 1e-12);

        clock.set_time_scale(-3.0);
        assert_eq!(clock.time_scale(), 0.0);
        assert_eq!(clock.compute_delta(1010.0, A), 0.0);
    }

    #[test]
    fn test_instances_are_independent() {
        let mut clock = ClockContext::new();
        clock.compute_delta(0.0, A);
        clock.compute_delta(10.0, A);
        // B first seen late: still a first tick
        assert_eq!(clock.compute_delta(20.0, B), 0.0);
        let dt_a = clock.compute_delta(30.0, A);
        assert!((dt_a - 0.020).abs() < 1e-12);
    }

    #[test]
    fn test_pause_returns_zero_and_clears() {
        let mut clock = ClockContext::new();
        clock.compute_delta(0.0, A);
        clock.compute_delta(0.0, B);
        clock.set_pause(true);
        assert_eq!(clock.tracked_instances(), 0);
        assert_eq!(clock.compute_delta(10.0, A), 0.0);
        // paused calls don't register instances
        assert_eq!(clock.tracked_instances(), 0);

        clock.set_pause(true);
        assert!(clock.is_paused());
        assert_eq!(clock.tracked_instances(), 0);
    }

    #[test]
    fn test_resume_has_no_catch_up_delta() {
        let mut clock = ClockContext::new();
        clock.compute_delta(0.0, A);
        clock.toggle_pause();
        clock.toggle_pause();
        assert!(!clock.is_paused());
        assert_eq!(clock.compute_delta(60_000.0, A), 0.0);
        let dt = clock.compute_delta(60_010.0, A);
        assert!((dt - 0.010).abs() < 1e-12);
    }

    #[test]
    fn test_reset_time() {
        let mut clock = ClockContext::new();
        clock.set_time_scale(0.25);
        clock.compute_delta(0.0, A);
        clock.set_pause(true);
        clock.reset_time();
        assert_eq!(clock.time_scale(), 1.0);
        assert!(!clock.is_paused());
        assert_eq!(clock.tracked_instances(), 0);
    }

    #[test]
    fn test_cleanup_instance_idempotent() {
        let mut clock = ClockContext::new();
        clock.compute_delta(0.0, A);
        clock.cleanup_instance(A);
        clock.cleanup_instance(A);
        clock.cleanup_instance(InstanceId(99));
        assert!(!clock.is_tracking(A));
        // recycled id starts fresh
        assert_eq!(clock.compute_delta(500.0, A), 0.0);
    }

    #[test]
    fn test_shared_clock_across_threads() {
        let shared = SharedClock::default();
        shared.compute_delta(0.0, A);
        let handle = {
            let shared = shared.clone();
            std::thread::spawn(move || shared.compute_delta(10.0, A))
        };
        let dt = handle.join().unwrap();
        assert!((dt - 0.010).abs() < 1e-12);
        shared.set_pause(true);
        assert_eq!(shared.with(|c| c.tracked_instances()), 0);
    }
}
