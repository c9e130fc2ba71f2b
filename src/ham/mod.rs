//! Lattice spin Hamiltonians.
//!
//! A Hamiltonian is consumed row by row: [`Hamiltonian::nnz`] materializes
//! the nonzero matrix elements of one row as (configuration, coefficient)
//! pairs, with the accumulated diagonal term last. That single operation
//! feeds both the local-energy estimator and, through the provided
//! [`Hamiltonian::mat`], exact diagonalization of small systems.

pub mod heisenberg;
pub mod local;
pub mod tfi;

pub use heisenberg::{J1J2, XXZ};
pub use tfi::TFI;

use crate::error::VmcError;
use crate::generator::IterateAll;
use crate::lattice::{Lattice, SpinConfig};
use crate::measure::SpMat;

/// One row of a Hamiltonian: (connected configuration, real coefficient).
pub type RowTerm = (SpinConfig, f64);

pub trait Hamiltonian {
    /// The lattice this Hamiltonian acts on.
    fn lattice(&self) -> &Lattice;

    /// Model name for logs and reports.
    fn name(&self) -> &'static str;

    /// Nonzero entries of the row indexed by `config`: every connected
    /// configuration with its coefficient, then exactly one diagonal term
    /// (the unmodified configuration with the accumulated diagonal
    /// coefficient) as the final element.
    fn nnz(&self, config: &SpinConfig) -> Result<Vec<RowTerm>, VmcError>;

    /// Reject configurations whose length does not match the lattice.
    fn check_config(&self, config: &SpinConfig) -> Result<(), VmcError> {
        let expected = self.lattice().num_sites();
        if config.len() != expected {
            return Err(VmcError::Precondition(format!(
                "configuration has {} sites, lattice expects {}",
                config.len(),
                expected
            )));
        }
        Ok(())
    }

    /// Full matrix form over the 2^N basis, rows and columns indexed by the
    /// configuration encoding. Enumeration is capped at 25 sites; the cap
    /// is checked before anything is allocated.
    fn mat(&self) -> Result<SpMat, VmcError> {
        let num_sites = self.lattice().num_sites();
        let basis = IterateAll::new(num_sites)?;
        let mut data = SpMat::new(1usize << num_sites);
        for lhs in basis {
            let row = lhs.encode();
            for (rhs, coeff) in self.nnz(&lhs)? {
                data.insert_add(row, rhs.encode(), coeff);
            }
        }
        Ok(data)
    }
}
