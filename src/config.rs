use crate::error::{EngineError, Result};

/// Runtime configuration for the orchestration engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Hard cap on auto-validation sweep iterations, as a safety net on top
    /// of the chain-length bound. Exhausting the cap fails the sweep with a
    /// validation error.
    pub max_sweep_iterations: usize,
    /// Emit a tracing event for every store mutation the engine performs.
    pub trace_mutations: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_sweep_iterations: 1024,
            trace_mutations: false,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(max_iter) = std::env::var("APPROVALFLOW_MAX_SWEEP_ITERATIONS") {
            config.max_sweep_iterations = max_iter.parse().map_err(|e| {
                EngineError::validation(format!("Invalid max_sweep_iterations: {e}"))
            })?;
        }

        if let Ok(trace) = std::env::var("APPROVALFLOW_TRACE_MUTATIONS") {
            config.trace_mutations = trace == "1" || trace.eq_ignore_ascii_case("true");
        }

        Ok(config)
    }
}
