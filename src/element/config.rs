//! Per-element update configuration.

/// Default cap on refinement rounds per flush.
pub const DEFAULT_MAX_REFINEMENT_ROUNDS: usize = 32;

/// Configuration for an element's update pipeline.
#[derive(Debug, Clone)]
pub struct UpdateConfig {
    /// Refinement rounds allowed after the initial merge before the flush is
    /// rejected as a non-converging derivation.
    pub max_refinement_rounds: usize,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            max_refinement_rounds: DEFAULT_MAX_REFINEMENT_ROUNDS,
        }
    }
}

impl UpdateConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the refinement cap (builder).
    pub fn with_max_refinement_rounds(mut self, rounds: usize) -> Self {
        self.max_refinement_rounds = rounds;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = UpdateConfig::default();
        assert_eq!(c.max_refinement_rounds, DEFAULT_MAX_REFINEMENT_ROUNDS);
    }

    #[test]
    fn builder_sets_cap() {
        let c = UpdateConfig::new().with_max_refinement_rounds(4);
        assert_eq!(c.max_refinement_rounds, 4);
    }
}
