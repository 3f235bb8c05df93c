// src/simulation/results.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Measurement outcome counts keyed by basis label.
///
/// Labels list the measured qubits in ascending index order. Serializes as a
/// plain map, e.g. `{"00": 512, "11": 488}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counts {
    counts: BTreeMap<String, u64>,
}

impl Counts {
    /// Creates an empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `n` observations of `label`.
    pub(crate) fn record(&mut self, label: String, n: u64) {
        *self.counts.entry(label).or_insert(0) += n;
    }

    /// Observations of `label`; zero when it never occurred.
    pub fn get(&self, label: &str) -> u64 {
        self.counts.get(label).copied().unwrap_or(0)
    }

    /// Sum of all counts. Equals the shot count of the run that produced it.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct labels observed.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Returns `true` when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Labels and counts in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// The underlying map.
    pub fn as_map(&self) -> &BTreeMap<String, u64> {
        &self.counts
    }

    /// Empirical frequency of `label`.
    pub fn frequency(&self, label: &str) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.get(label) as f64 / total as f64
        }
    }

    /// Empirical distribution over all observed labels.
    pub fn probabilities(&self) -> BTreeMap<String, f64> {
        self.counts.keys().map(|k| (k.clone(), self.frequency(k))).collect()
    }

    /// The label seen most often; ties go to the smallest label.
    pub fn most_frequent(&self) -> Option<(&str, u64)> {
        self.iter().fold(None, |best, (label, n)| match best {
            Some((_, m)) if m >= n => best,
            _ => Some((label, n)),
        })
    }

    /// Total variation distance between the empirical distributions of two
    /// histograms, in `[0, 1]`.
    pub fn total_variation_distance(&self, other: &Counts) -> f64 {
        let labels: std::collections::BTreeSet<&String> =
            self.counts.keys().chain(other.counts.keys()).collect();
        0.5 * labels
            .into_iter()
            .map(|l| (self.frequency(l) - other.frequency(l)).abs())
            .sum::<f64>()
    }
}

impl fmt::Display for Counts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<String> = self.iter().map(|(k, v)| format!("\"{}\": {}", k, v)).collect();
        write!(f, "{{{}}}", entries.join(", "))
    }
}

/// Holds the results of a sampled circuit execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    counts: Counts,
    measured_qubits: Vec<usize>,
    shots: u64,
    seed: u64,
}

impl SimulationResult {
    pub(crate) fn new(counts: Counts, measured_qubits: Vec<usize>, shots: u64, seed: u64) -> Self {
        Self { counts, measured_qubits, shots, seed }
    }

    /// Outcome histogram.
    pub fn counts(&self) -> &Counts {
        &self.counts
    }

    /// Qubits the labels refer to, in label order.
    pub fn measured_qubits(&self) -> &[usize] {
        &self.measured_qubits
    }

    /// Requested shot count.
    pub fn shots(&self) -> u64 {
        self.shots
    }

    /// Seed the sampler ran with; replaying it reproduces the counts.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Consumes the result, keeping only the histogram.
    pub fn into_counts(self) -> Counts {
        self.counts
    }
}

impl fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulation Results:")?;
        writeln!(f, "  Shots: {} (seed {})", self.shots, self.seed)?;
        writeln!(f, "  Measured qubits: {:?}", self.measured_qubits)?;
        if self.counts.is_empty() {
            writeln!(f, "  No outcomes recorded.")?;
        } else {
            writeln!(f, "  Counts:")?;
            for (label, n) in self.counts.iter() {
                writeln!(f, "    {}: {}", label, n)?;
            }
        }
        Ok(())
    }
}
