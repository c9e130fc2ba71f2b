//! Transverse-field Ising model.

use crate::error::VmcError;
use crate::ham::{Hamiltonian, RowTerm};
use crate::lattice::{Lattice, SpinConfig};

/// H = -field · Σ_i σx_i - Σ_⟨i,j⟩ σz_i·σz_j over nearest-neighbor bonds.
///
/// Every row has one off-diagonal entry per site (the single-site flip,
/// coefficient -field) plus the Ising diagonal.
#[derive(Debug, Clone)]
pub struct TFI {
    lattice: Lattice,
    field: f64,
}

impl TFI {
    pub fn new(lattice: Lattice, field: f64) -> Self {
        TFI { lattice, field }
    }

    pub fn field(&self) -> f64 {
        self.field
    }
}

impl Hamiltonian for TFI {
    fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    fn name(&self) -> &'static str {
        "TFI"
    }

    fn nnz(&self, config: &SpinConfig) -> Result<Vec<RowTerm>, VmcError> {
        self.check_config(config)?;
        let mut terms = Vec::with_capacity(config.len() + 1);
        for site in 0..config.len() {
            let mut cand = config.clone();
            cand.flip(site);
            terms.push((cand, -self.field));
        }
        let mut sigmaz = 0.0;
        for &(i, j) in self.lattice.bonds(1).iter() {
            sigmaz += f64::from(config.spin(i) * config.spin(j));
        }
        terms.push((config.clone(), -sigmaz));
        Ok(terms)
    }
}
