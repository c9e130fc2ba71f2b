//! Heisenberg-type exchange models: J1-J2 and XXZ.
//!
//! Both share the exchange structure on a bond: a diagonal σz·σz part and
//! an off-diagonal part that flips both bond sites with coefficient
//! proportional to (1 - s_i·s_j), i.e. only anti-aligned pairs exchange.

use crate::error::VmcError;
use crate::ham::{Hamiltonian, RowTerm};
use crate::lattice::{Lattice, SpinConfig};

/// Antiferromagnetic J1-J2 model:
/// H = J1 · Σ_⟨i,j⟩ σ_i·σ_j + J2 · Σ_⟨⟨i,j⟩⟩ σ_i·σ_j
/// with nearest (J1) and next-nearest (J2) neighbor bonds.
#[derive(Debug, Clone)]
pub struct J1J2 {
    lattice: Lattice,
    coupling: (f64, f64),
}

impl J1J2 {
    /// The customary frustration point (J1, J2) = (1, 0.5).
    pub const DEFAULT_COUPLING: (f64, f64) = (1.0, 0.5);

    pub fn new(lattice: Lattice, coupling: (f64, f64)) -> Self {
        J1J2 { lattice, coupling }
    }

    pub fn coupling(&self) -> (f64, f64) {
        self.coupling
    }
}

impl Hamiltonian for J1J2 {
    fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    fn name(&self) -> &'static str {
        "J1-J2"
    }

    fn nnz(&self, config: &SpinConfig) -> Result<Vec<RowTerm>, VmcError> {
        self.check_config(config)?;
        let (j1, j2) = self.coupling;
        let mut terms = Vec::new();
        let mut sigmaz = 0.0;
        for (order, coupling) in [(1usize, j1), (2usize, j2)] {
            for &(i, j) in self.lattice.bonds(order).iter() {
                let zz = f64::from(config.spin(i) * config.spin(j));
                sigmaz += coupling * zz;
                let mut cand = config.clone();
                cand.flip(i);
                cand.flip(j);
                terms.push((cand, coupling * (1.0 - zz)));
            }
        }
        terms.push((config.clone(), sigmaz));
        Ok(terms)
    }
}

/// XXZ model on a single neighbor order:
/// H = Σ_bonds [ -Jxy · (σx_j·σx_k + σy_j·σy_k) - Jz · σz_j·σz_k ].
///
/// The neighbor order is a required parameter; order 1 on a chain is the
/// ferromagnetic XXZ chain.
#[derive(Debug, Clone)]
pub struct XXZ {
    lattice: Lattice,
    coupling: (f64, f64),
    order: usize,
}

impl XXZ {
    /// Isotropic couplings (Jxy, Jz) = (1, 1).
    pub const DEFAULT_COUPLING: (f64, f64) = (1.0, 1.0);

    pub fn new(lattice: Lattice, coupling: (f64, f64), order: usize) -> Self {
        XXZ {
            lattice,
            coupling,
            order,
        }
    }

    pub fn coupling(&self) -> (f64, f64) {
        self.coupling
    }

    pub fn order(&self) -> usize {
        self.order
    }
}

impl Hamiltonian for XXZ {
    fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    fn name(&self) -> &'static str {
        "XXZ"
    }

    fn nnz(&self, config: &SpinConfig) -> Result<Vec<RowTerm>, VmcError> {
        self.check_config(config)?;
        let (jxy, jz) = self.coupling;
        let mut terms = Vec::new();
        let mut sigmaz = 0.0;
        for &(j, k) in self.lattice.bonds(self.order).iter() {
            let zz = f64::from(config.spin(j) * config.spin(k));
            sigmaz += -jz * zz;
            let mut cand = config.clone();
            cand.flip(j);
            cand.flip(k);
            terms.push((cand, -jxy * (1.0 - zz)));
        }
        terms.push((config.clone(), sigmaz));
        Ok(terms)
    }
}
