//! Samplers drawing spin configurations from a caller-supplied probability.
//!
//! The probability is always unnormalized; for ground-state work it is
//! |ψ(config)|² of some ansatz. [`Metropolis`] walks a Markov chain against
//! it, [`Direct`] draws i.i.d. from an explicit weight vector over the full
//! basis. Both feed the same [`crate::collector::Collector`].

pub mod direct;
pub mod metropolis;

pub use direct::Direct;
pub use metropolis::Metropolis;

use crate::lattice::SpinConfig;

/// Unnormalized target probability of a configuration.
///
/// Blanket-implemented for closures, so a plain `|c| ...` works wherever a
/// probability is expected.
pub trait Probability {
    fn weight(&self, config: &SpinConfig) -> f64;
}

impl<F> Probability for F
where
    F: Fn(&SpinConfig) -> f64,
{
    fn weight(&self, config: &SpinConfig) -> f64 {
        self(config)
    }
}

/// Lifecycle of a Metropolis chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Burning,
    Sampling,
    Done,
}

/// Per-epoch sampling options.
///
/// There is no default burn-in; a chain that wants none passes an explicit
/// `burn(0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleOpts {
    /// Required number of unrecorded equilibration steps.
    pub burn: Option<usize>,
    /// Record every thin-th sampling step (default 1, every step).
    pub thin: usize,
    /// Optional probability of a global spin flip before each step.
    pub inverse: Option<f64>,
}

impl Default for SampleOpts {
    fn default() -> Self {
        SampleOpts {
            burn: None,
            thin: 1,
            inverse: None,
        }
    }
}

impl SampleOpts {
    /// Options with the given burn-in and defaults otherwise.
    pub fn burn(steps: usize) -> Self {
        SampleOpts {
            burn: Some(steps),
            ..SampleOpts::default()
        }
    }

    pub fn with_thin(mut self, thin: usize) -> Self {
        self.thin = thin;
        self
    }

    pub fn with_inverse(mut self, probability: f64) -> Self {
        self.inverse = Some(probability);
        self
    }
}
