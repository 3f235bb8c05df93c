// src/core/mod.rs

//! Core data structures and types

pub mod error;
pub mod state;

pub use error::{QsimError, QsimResult};
pub use state::StateVector;

pub mod constants;
pub use constants::MAX_QUBITS;
pub use constants::tolerances::{AMPLITUDE_EPSILON, NORM_TOLERANCE, PROBABILITY_TOLERANCE};
