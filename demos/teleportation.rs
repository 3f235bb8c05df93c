//! Teleports a prepared state step by step, then runs the random-state benchmark.
//!
//! `RUST_LOG=debug cargo run --example teleportation` shows every transition.

use qsim::{
    QsimError, Sampler, StatePreparation, Teleportation, fidelity_benchmark, teleportation_circuit,
};
use std::f64::consts::PI;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), QsimError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Message: R_z(π/4) R_y(π/3) |0>
    let preparation = StatePreparation::euler(PI / 3.0, PI / 4.0)?;
    let reference = preparation.reference_state()?;
    println!("Message state: {}", reference);
    println!("Message Bloch vector: {:?}", reference.bloch_vector(0)?);

    let circuit = teleportation_circuit(&preparation)?;
    println!("\nPre-measurement circuit:\n{}", circuit);

    let mut sampler = Sampler::new(Some(2024));
    let mut protocol = Teleportation::new(preparation)?;
    protocol.entangle()?;
    println!("After entangling: {}", protocol.state());

    let bits = protocol.measure(&mut sampler)?;
    println!("Measured (m0, m1) = ({}, {})", bits.m0(), bits.m1());
    println!("Receiver Bloch vector before correction: {:?}", protocol.state().bloch_vector(2)?);

    protocol.correct()?;
    println!("Receiver Bloch vector after correction:  {:?}", protocol.state().bloch_vector(2)?);

    let fidelity = protocol.verify()?;
    println!("Fidelity: {:.12} ({})", fidelity, protocol.stage());

    println!("\nRunning 100 random preparations...");
    let summary = fidelity_benchmark(100, 7)?;
    println!(
        "min fidelity {:.12}, mean fidelity {:.12}, branches 00/01/10/11 = {:?}",
        summary.min_fidelity, summary.mean_fidelity, summary.branches
    );
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Could not serialize summary: {}", e),
    }
    Ok(())
}
