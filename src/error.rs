//! Error types shared across the crate.

use thiserror::Error;

/// Errors produced by lattice construction, Hamiltonian evaluation,
/// sampling and estimation.
#[derive(Error, Debug)]
pub enum VmcError {
    /// Invalid or missing construction parameters: lattice shapes,
    /// couplings, config-file keys, weight vectors.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An operation was called in a state or with arguments that violate
    /// its contract, e.g. sampling without a burn-in length or asking for
    /// an estimate from an empty collector.
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// The spin-conserving generator could not find a partner site of the
    /// required value within its retry budget.
    #[error("no spin partner found after {retries} attempts")]
    PartnerSearchExhausted { retries: usize },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
