//! Lattice VMC - variational Monte Carlo for quantum spin systems
//!
//! This crate provides Metropolis-Hastings sampling over ±1 spin
//! configurations on finite lattices, sparse-row spin Hamiltonians, and the
//! covariance estimator used for stochastic ground-state search.

pub mod collector;
pub mod conf;
pub mod error;
pub mod generator;
pub mod ham;
pub mod lattice;
pub mod measure;
pub mod sampler;

// Re-export commonly used types at crate root
pub use collector::{Collector, SampleRecord};
pub use conf::{read_run_config, RunConfig};
pub use error::VmcError;
pub use generator::{Generator, IterateAll, ENUM_SITE_LIMIT};
pub use ham::local::{SigmaX, SigmaXX, SigmaZ, SigmaZZ};
pub use ham::{Hamiltonian, RowTerm, J1J2, TFI, XXZ};
pub use lattice::{Bond, Lattice, SpinConfig};
pub use measure::{exact_energy, ground, local_energy, SpMat};
pub use sampler::{Direct, Metropolis, Phase, Probability, SampleOpts};
