//! Prepares and samples the four Bell states.

use qsim::{BellState, QsimError, Simulator, SimulatorConfig, bell_state};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), QsimError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let simulator = Simulator::with_config(SimulatorConfig::default().with_shots(1000).with_seed(42))?;

    for variant in BellState::ALL {
        let circuit = bell_state(variant)?;
        println!("{}:\n{}", variant, circuit);

        let state = simulator.statevector(&circuit)?;
        println!("State: {}", state);

        let result = simulator.run(&circuit)?;
        println!("{}", result);
        match serde_json::to_string(result.counts()) {
            Ok(json) => println!("Counts as JSON: {}\n", json),
            Err(e) => eprintln!("Could not serialize counts: {}", e),
        }
    }
    Ok(())
}
