//! Runs Deutsch's algorithm against each of the four one-bit oracles.

use qsim::{OracleKind, QsimError, Simulator, SimulatorConfig, deutsch_oracle};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), QsimError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let simulator = Simulator::with_config(SimulatorConfig::default().with_shots(100))?;

    for kind in OracleKind::ALL {
        let circuit = deutsch_oracle(kind)?;
        let result = simulator.run(&circuit)?;
        let verdict = match result.counts().most_frequent() {
            Some(("0", _)) => "constant",
            Some(("1", _)) => "balanced",
            _ => "undecided",
        };
        println!(
            "{:?}: f(0)={} f(1)={} -> counts {} -> {} (seed {})",
            kind,
            u8::from(kind.evaluate(false)),
            u8::from(kind.evaluate(true)),
            result.counts(),
            verdict,
            result.seed()
        );
    }
    Ok(())
}
