//! Exact reference calculations for small systems.
//!
//! Everything here works on amplitudes: an ansatz is any `Fn(&SpinConfig) -> f64`
//! returning the (possibly negative) wavefunction value at a configuration.
//!
//! - [`local_energy`]: (Hψ)(c) / ψ(c) through the sparse row enumeration
//! - [`exact_energy`]: normalized full-space expectation ⟨ψ|H|ψ⟩ / ⟨ψ|ψ⟩
//! - [`ground`]: dense symmetric eigendecomposition of the matrix form
//! - [`SpMat`]: the sparse accumulator the matrix form is built in

use std::collections::BTreeMap;

use nalgebra::{DMatrix, DVector};

use crate::error::VmcError;
use crate::generator::IterateAll;
use crate::ham::Hamiltonian;
use crate::lattice::SpinConfig;

/// Sparse square matrix accumulator keyed by (row, col).
///
/// Only what the exact diagnostics need: coefficient accumulation while
/// walking Hamiltonian rows, then densification for the eigensolver.
#[derive(Debug, Clone, PartialEq)]
pub struct SpMat {
    dim: usize,
    entries: BTreeMap<(usize, usize), f64>,
}

impl SpMat {
    pub fn new(dim: usize) -> Self {
        SpMat {
            dim,
            entries: BTreeMap::new(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Add `val` into the (row, col) entry. Zero contributions to an
    /// absent entry are dropped so the stored structure stays sparse.
    pub fn insert_add(&mut self, row: usize, col: usize, val: f64) {
        debug_assert!(row < self.dim && col < self.dim);
        if val == 0.0 && !self.entries.contains_key(&(row, col)) {
            return;
        }
        *self.entries.entry((row, col)).or_insert(0.0) += val;
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.entries.get(&(row, col)).copied().unwrap_or(0.0)
    }

    /// Stored entries in (row, col) order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.entries.iter().map(|(&(r, c), &v)| (r, c, v))
    }

    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut dense = DMatrix::zeros(self.dim, self.dim);
        for (row, col, val) in self.iter() {
            dense[(row, col)] += val;
        }
        dense
    }
}

/// Local energy (Hψ)(config) / ψ(config).
///
/// Errors when the ansatz amplitude vanishes at `config`; a sampler drawing
/// from |ψ|² never lands there.
pub fn local_energy<H, F>(ham: &H, ansatz: &F, config: &SpinConfig) -> Result<f64, VmcError>
where
    H: Hamiltonian + ?Sized,
    F: Fn(&SpinConfig) -> f64,
{
    let psi = ansatz(config);
    if psi == 0.0 {
        return Err(VmcError::Precondition(
            "ansatz amplitude vanishes at the sampled configuration".into(),
        ));
    }
    let mut acc = 0.0;
    for (cand, coeff) in ham.nnz(config)? {
        acc += coeff * ansatz(&cand);
    }
    Ok(acc / psi)
}

/// Full-space energy expectation Σ |ψ|² E_loc / Σ |ψ|², enumerating all
/// 2^N configurations. Subject to the enumeration site limit.
pub fn exact_energy<H, F>(ham: &H, ansatz: &F) -> Result<f64, VmcError>
where
    H: Hamiltonian + ?Sized,
    F: Fn(&SpinConfig) -> f64,
{
    let mut numer = 0.0;
    let mut denom = 0.0;
    for config in IterateAll::new(ham.lattice().num_sites())? {
        let amp = ansatz(&config);
        let weight = amp * amp;
        if weight == 0.0 {
            continue;
        }
        numer += weight * local_energy(ham, ansatz, &config)?;
        denom += weight;
    }
    if denom == 0.0 {
        return Err(VmcError::Precondition(
            "ansatz vanishes on the whole configuration space".into(),
        ));
    }
    Ok(numer / denom)
}

/// Exact ground state by dense diagonalization: minimal eigenvalue and its
/// normalized eigenvector, indexed by the configuration encoding.
pub fn ground<H>(ham: &H) -> Result<(f64, DVector<f64>), VmcError>
where
    H: Hamiltonian + ?Sized,
{
    let dense = ham.mat()?.to_dense();
    let eig = dense.symmetric_eigen();
    // Eigenvalues from nalgebra come back unsorted.
    let mut min_index = 0;
    for i in 1..eig.eigenvalues.len() {
        if eig.eigenvalues[i] < eig.eigenvalues[min_index] {
            min_index = i;
        }
    }
    let energy = eig.eigenvalues[min_index];
    let state = eig.eigenvectors.column(min_index).into_owned();
    Ok((energy, state))
}
