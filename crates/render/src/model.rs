use serde::{Deserialize, Serialize};

/// Per-million-token dollar rates for a model.
///
/// Reasoning tokens are billed at the `output` rate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CostTable {
    pub input: f64,
    pub cached_input: f64,
    pub output: f64,
}

impl CostTable {
    /// Dollar cost of `tokens` at a per-million rate.
    #[must_use]
    pub fn dollars(tokens: u64, per_million: f64) -> f64 {
        tokens as f64 / 1_000_000.0 * per_million
    }
}

/// Static display metadata for one model, supplied by the model catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Provider model identifier (e.g. "gpt-5").
    pub id: String,
    /// Human-readable label shown in the usage summary.
    pub label: String,
    #[serde(default)]
    pub cost: CostTable,
}
