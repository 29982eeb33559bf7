//! physlab entry point
//!
//! The engine is normally driven by the lesson page through the wasm
//! bindings. The native binary runs a headless demo of both lessons.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("physlab (native) starting...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(42);

    println!("\nDrop test (restitution 1, seed {seed}):");
    demo::drop_test(seed);

    println!("\nDipole field lines:");
    demo::field_lines();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is `wasm::start`, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use physlab::field;
    use physlab::settings::{BodyConfig, FieldConfig, GravityPreset, SimulationConfig};
    use physlab::sim::{Bounds, InstanceId, Simulation};
    use physlab::Vector2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    const DT: f64 = 1.0 / 60.0;

    /// Drop balls from random heights and compare the rebound apex
    pub fn drop_test(seed: u64) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let presets = [GravityPreset::Earth, GravityPreset::Moon, GravityPreset::Jupiter];

        for i in 0..6 {
            let height: f64 = rng.random_range(0.5..20.0);
            let gravity = presets[i % presets.len()];
            let radius = 0.25;
            let bounds = Bounds::new(4.0, height + 2.0 * radius + 1.0);
            let config = SimulationConfig {
                body: BodyConfig {
                    size: 2.0 * radius,
                    gravity,
                    restitution: 1.0,
                    friction_coefficient: 0.0,
                    initial_position: Vector2::new(2.0, bounds.height - radius - height),
                    ..Default::default()
                },
                bounds,
                ..Default::default()
            };

            let mut sim = match Simulation::new(InstanceId(i as u64), config) {
                Ok(sim) => sim,
                Err(e) => {
                    log::error!("Skipping drop {}: {}", i, e);
                    continue;
                }
            };

            let g = gravity.acceleration();
            let mut bounced = false;
            let mut apex = None;
            for _ in 0..100_000 {
                let snap = sim.advance(DT);
                if snap.vel.y < 0.0 {
                    bounced = true;
                    // Apex predicted from the rising state
                    let h = sim.body().height_above_floor(&bounds) + snap.vel.y * snap.vel.y / (2.0 * g);
                    apex = Some(h);
                } else if bounced {
                    break;
                }
            }

            match apex {
                Some(a) => println!(
                    "  {:>8} h = {:>7.3} m  rebound apex = {:>7.3} m  (error {:+.2e})",
                    gravity.as_str(),
                    height,
                    a,
                    a - height
                ),
                None => println!("  {:>8} h = {:>7.3} m  no bounce", gravity.as_str(), height),
            }
        }
    }

    pub fn field_lines() {
        let config = FieldConfig::default();
        let lines = field::field_lines(&config);
        let points: usize = lines.iter().map(|l| l.len()).sum();
        println!(
            "  {} lines from {} seeds, {} points total",
            lines.len(),
            config.seeds.count,
            points
        );
        if let Some(longest) = lines.iter().max_by_key(|l| l.len()) {
            println!("  longest line: {} points", longest.len());
        }
    }
}
