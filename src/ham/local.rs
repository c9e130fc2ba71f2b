//! Plain local operators: sums of single-site and bond Pauli terms.
//!
//! These are not full models; they are measurement operators, estimated
//! over sampled configurations through the same local-energy machinery as
//! a Hamiltonian. Imaginary-coefficient members of the Pauli family are
//! not represented, coefficients here are real.

use crate::error::VmcError;
use crate::ham::{Hamiltonian, RowTerm};
use crate::lattice::{Lattice, SpinConfig};

/// Σ_i σx_i: one single-site flip per site with unit coefficient.
#[derive(Debug, Clone)]
pub struct SigmaX {
    lattice: Lattice,
}

impl SigmaX {
    pub fn new(lattice: Lattice) -> Self {
        SigmaX { lattice }
    }
}

impl Hamiltonian for SigmaX {
    fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    fn name(&self) -> &'static str {
        "1-local sigma x"
    }

    fn nnz(&self, config: &SpinConfig) -> Result<Vec<RowTerm>, VmcError> {
        self.check_config(config)?;
        let mut terms = Vec::with_capacity(config.len() + 1);
        for site in 0..config.len() {
            let mut cand = config.clone();
            cand.flip(site);
            terms.push((cand, 1.0));
        }
        terms.push((config.clone(), 0.0));
        Ok(terms)
    }
}

/// Σ_i σz_i: purely diagonal, the magnetization operator.
#[derive(Debug, Clone)]
pub struct SigmaZ {
    lattice: Lattice,
}

impl SigmaZ {
    pub fn new(lattice: Lattice) -> Self {
        SigmaZ { lattice }
    }
}

impl Hamiltonian for SigmaZ {
    fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    fn name(&self) -> &'static str {
        "1-local sigma z"
    }

    fn nnz(&self, config: &SpinConfig) -> Result<Vec<RowTerm>, VmcError> {
        self.check_config(config)?;
        Ok(vec![(config.clone(), config.magnetization() as f64)])
    }
}

/// Σ_bonds σx_i·σx_j at a chosen neighbor order: double flips with unit
/// coefficient.
#[derive(Debug, Clone)]
pub struct SigmaXX {
    lattice: Lattice,
    order: usize,
}

impl SigmaXX {
    pub fn new(lattice: Lattice, order: usize) -> Self {
        SigmaXX { lattice, order }
    }
}

impl Hamiltonian for SigmaXX {
    fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    fn name(&self) -> &'static str {
        "2-local sigma x"
    }

    fn nnz(&self, config: &SpinConfig) -> Result<Vec<RowTerm>, VmcError> {
        self.check_config(config)?;
        let bonds = self.lattice.bonds(self.order);
        let mut terms = Vec::with_capacity(bonds.len() + 1);
        for &(i, j) in bonds.iter() {
            let mut cand = config.clone();
            cand.flip(i);
            cand.flip(j);
            terms.push((cand, 1.0));
        }
        terms.push((config.clone(), 0.0));
        Ok(terms)
    }
}

/// Σ_bonds σz_i·σz_j at a chosen neighbor order: purely diagonal.
#[derive(Debug, Clone)]
pub struct SigmaZZ {
    lattice: Lattice,
    order: usize,
}

impl SigmaZZ {
    pub fn new(lattice: Lattice, order: usize) -> Self {
        SigmaZZ { lattice, order }
    }
}

impl Hamiltonian for SigmaZZ {
    fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    fn name(&self) -> &'static str {
        "2-local sigma z"
    }

    fn nnz(&self, config: &SpinConfig) -> Result<Vec<RowTerm>, VmcError> {
        self.check_config(config)?;
        let diag: f64 = self
            .lattice
            .bonds(self.order)
            .iter()
            .map(|&(i, j)| f64::from(config.spin(i) * config.spin(j)))
            .sum();
        Ok(vec![(config.clone(), diag)])
    }
}
