//! Browser bindings
//!
//! The lesson page owns one [`WasmClock`] and one [`WasmSimulation`] per
//! widget. Snapshots and field lines cross the boundary as JSON strings.

use wasm_bindgen::prelude::*;

use crate::field;
use crate::settings::{FieldConfig, SimulationConfig, Tolerances};
use crate::sim::{Bounds, ClockContext, InstanceId, Simulation};
use crate::Vector2;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // Already initialized by another module instance
        return;
    }
    log::info!("physlab wasm ready");
}

/// Clock shared by all simulations on the page
#[wasm_bindgen]
pub struct WasmClock {
    inner: ClockContext,
}

#[wasm_bindgen]
impl WasmClock {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: ClockContext::new(),
        }
    }

    /// Clock whose step cap comes from a `Tolerances` JSON object
    pub fn from_tolerances(tolerances_json: &str) -> Result<WasmClock, JsError> {
        let tolerances: Tolerances = serde_json::from_str(tolerances_json)?;
        let tolerances = tolerances.validated()?;
        Ok(Self {
            inner: ClockContext::from_tolerances(&tolerances),
        })
    }

    pub fn set_time_scale(&mut self, scale: f64) {
        self.inner.set_time_scale(scale);
    }

    pub fn time_scale(&self) -> f64 {
        self.inner.time_scale()
    }

    pub fn toggle_pause(&mut self) {
        self.inner.toggle_pause();
    }

    pub fn set_pause(&mut self, paused: bool) {
        self.inner.set_pause(paused);
    }

    pub fn is_paused(&self) -> bool {
        self.inner.is_paused()
    }

    pub fn reset_time(&mut self) {
        self.inner.reset_time();
    }
}

impl Default for WasmClock {
    fn default() -> Self {
        Self::new()
    }
}

/// One bouncing-ball widget
#[wasm_bindgen]
pub struct WasmSimulation {
    sim: Simulation,
}

#[wasm_bindgen]
impl WasmSimulation {
    #[wasm_bindgen(constructor)]
    pub fn new(id: u32, config_json: &str) -> Result<WasmSimulation, JsError> {
        let config = SimulationConfig::from_json(config_json)?;
        let sim = Simulation::new(InstanceId(u64::from(id)), config)?;
        Ok(Self { sim })
    }

    /// Advance using the browser clock; returns the frame snapshot as JSON
    pub fn tick(&mut self, clock: &mut WasmClock) -> Result<String, JsError> {
        self.tick_at(clock, js_sys::Date::now())
    }

    /// Advance using a host-supplied timestamp (ms)
    pub fn tick_at(&mut self, clock: &mut WasmClock, now_ms: f64) -> Result<String, JsError> {
        let snapshot = self.sim.tick(&mut clock.inner, now_ms);
        Ok(serde_json::to_string(&snapshot)?)
    }

    pub fn reconfigure(&mut self, config_json: &str) -> Result<(), JsError> {
        let config: SimulationConfig = serde_json::from_str(config_json)?;
        self.sim.reconfigure(config)?;
        Ok(())
    }

    pub fn resize(&mut self, width: f64, height: f64) -> Result<(), JsError> {
        self.sim.resize(Bounds::new(width, height))?;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.sim.reset();
    }

    pub fn begin_drag(&mut self) {
        self.sim.begin_drag();
    }

    pub fn drag_to(&mut self, x: f64, y: f64) {
        self.sim.drag_to(Vector2::new(x, y));
    }

    pub fn end_drag(&mut self) {
        self.sim.end_drag();
    }

    /// Release this widget's clock slot (call on unmount)
    pub fn detach(self, clock: &mut WasmClock) {
        self.sim.detach(&mut clock.inner);
    }
}

/// Field lines for a magnet configuration, as a JSON array of polylines
#[wasm_bindgen]
pub fn field_lines_json(config_json: &str) -> Result<String, JsError> {
    let config = FieldConfig::from_json(config_json)?;
    let lines = field::field_lines(&config);
    Ok(serde_json::to_string(&lines)?)
}
