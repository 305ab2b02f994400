use grass_sim::simulate::{SimConfig, Simulator};
use grass_sim::types::Float;
use grass_sim::wind::{WIND_MARGIN, WIND_SPEED};
use rand::{rngs::StdRng, SeedableRng};

/// Headless run of the default meadow: 200 blades over [-200, 200), two
/// wind sources sweeping left to right. Prints the clock and the tip of the
/// middle blade once per simulated second.
pub fn main() {
    env_logger::init();

    let config = SimConfig::default();
    let mut rng = StdRng::seed_from_u64(0);
    let mut sim = Simulator::from_config(&config, &mut rng).expect("default config is valid");
    let mut winds = config.default_wind_sources();

    sim.resume();

    let ticks = (20.0 / config.dt) as usize;
    for tick in 1..=ticks {
        let report = sim.step(&winds).expect("finite inputs");
        if report.integration_failures > 0 {
            eprintln!(
                "t = {:.3}: {} joint(s) held at their last state",
                report.time, report.integration_failures
            );
        }

        for wind in &mut winds {
            wind.translate(WIND_SPEED, config.left, config.right, WIND_MARGIN);
        }

        if tick % 30 == 0 {
            let blade = &sim.grass.blades[sim.grass.blades.len() / 2];
            let tip = blade.nodes[blade.nodes.len() - 1].position;
            println!(
                "t = {:6.3}  mid-blade tip = ({:7.2}, {:6.2})",
                sim.time(),
                tip.x,
                tip.y
            );
        }
    }

    let total: Float = sim.time();
    println!("simulated {total:.1} time units");
}
