use crate::session::SimulationId;
use thiserror::Error;

/// Errors surfaced by the simulation core.
///
/// Every variant is a precondition violation. Nothing in the core is
/// transient, so none of these are worth retrying.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Invalid parameters at creation, or an unusable run budget.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// No simulation is registered under this identifier.
    #[error("Simulation {0} not found")]
    NotFound(SimulationId),

    /// The simulation exists but cannot accept the requested operation.
    #[error("Invalid simulation state: {0}")]
    InvalidState(String),
}

impl SimulationError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SimulationError>;

/// Check that `value` is a probability in `[0, 1]`.
pub(crate) fn check_probability(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimulationError::config(format!(
            "{name} must be between 0.0 and 1.0, got {value}"
        )))
    }
}
