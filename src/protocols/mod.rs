// src/protocols/mod.rs

//! Multi-step protocols that interleave unitary evolution, mid-circuit
//! measurement and classically controlled corrections.

pub mod teleportation;

pub use teleportation::{
    BenchmarkSummary, ClassicalBits, StatePreparation, Teleportation, TeleportationOutcome,
    TeleportationStage, fidelity_benchmark, teleportation_circuit,
};
