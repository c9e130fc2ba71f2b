//! Spin configurations and the finite lattices they live on.
//!
//! A [`SpinConfig`] is a fixed-length list of ±1 site values. A [`Lattice`]
//! describes the site geometry (chain or square grid, open or periodic) and
//! hands out bond lists for a given neighbor order, memoized after the first
//! request:
//!
//! - order 0: every site paired with itself
//! - order 1: nearest neighbors
//! - order 2: next-nearest neighbors (both diagonals on the square grid)
//!
//! Sites on the square grid are flattened row-major: `site(i, j) = i * cols + j`.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;
use std::rc::Rc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::VmcError;

/// A pair of flat site indices joined by a lattice bond.
pub type Bond = (usize, usize);

/// A configuration of ±1 spins, one per lattice site.
///
/// Configurations are plain owned values: proposal generators and
/// Hamiltonians clone and mutate copies, and a configuration handed to a
/// collector is never touched again.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpinConfig {
    sites: Vec<i8>,
}

impl SpinConfig {
    /// All sites down (-1). This is the first configuration of the
    /// exhaustive enumeration order.
    pub fn all_down(num_sites: usize) -> Self {
        SpinConfig {
            sites: vec![-1; num_sites],
        }
    }

    /// Uniform random configuration over the 2^N spin states.
    pub fn random<R: Rng>(num_sites: usize, rng: &mut R) -> Self {
        let sites = (0..num_sites)
            .map(|_| if rng.gen::<f64>() < 0.5 { -1 } else { 1 })
            .collect();
        SpinConfig { sites }
    }

    /// Build a configuration from raw site values, rejecting anything
    /// other than ±1.
    pub fn from_sites(sites: Vec<i8>) -> Result<Self, VmcError> {
        if sites.iter().any(|&s| s != 1 && s != -1) {
            return Err(VmcError::Configuration(
                "spin values must be +1 or -1".into(),
            ));
        }
        Ok(SpinConfig { sites })
    }

    /// Inverse of [`SpinConfig::encode`]: decode the low `num_sites` bits
    /// of `index` into a configuration (bit i set means site i is up).
    pub fn from_index(index: usize, num_sites: usize) -> Self {
        let sites = (0..num_sites)
            .map(|i| if index >> i & 1 == 1 { 1 } else { -1 })
            .collect();
        SpinConfig { sites }
    }

    /// Basis index of this configuration: bit i = (s_i + 1) / 2.
    ///
    /// Site 0 is the least significant bit, so the enumeration from
    /// [`SpinConfig::all_down`] by repeated [`SpinConfig::shift`] visits
    /// indices 0, 1, 2, ... in order.
    pub fn encode(&self) -> usize {
        debug_assert!(self.sites.len() <= usize::BITS as usize);
        let mut index = 0usize;
        for (i, &s) in self.sites.iter().enumerate() {
            if s > 0 {
                index |= 1 << i;
            }
        }
        index
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn sites(&self) -> &[i8] {
        &self.sites
    }

    /// Value at one site.
    pub fn spin(&self, site: usize) -> i8 {
        self.sites[site]
    }

    /// Negate one site.
    pub fn flip(&mut self, site: usize) {
        self.sites[site] = -self.sites[site];
    }

    /// Negate every site (global Z2 flip).
    pub fn negate(&mut self) {
        for s in self.sites.iter_mut() {
            *s = -*s;
        }
    }

    /// Advance to the next configuration in enumeration order, treating the
    /// sites as a little-endian binary counter over {-1, +1}. Wraps from
    /// all-up back to all-down.
    pub fn shift(&mut self) {
        for s in self.sites.iter_mut() {
            if *s == 1 {
                *s = -1;
            } else {
                *s = 1;
                break;
            }
        }
    }

    /// Total spin Σ s_i.
    pub fn magnetization(&self) -> i64 {
        self.sites.iter().map(|&s| i64::from(s)).sum()
    }
}

impl Index<usize> for SpinConfig {
    type Output = i8;

    fn index(&self, site: usize) -> &i8 {
        &self.sites[site]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Chain,
    Square,
}

/// A finite chain or square lattice with open or periodic boundaries.
///
/// Bond lists per neighbor order are computed on first use and memoized;
/// repeated calls to [`Lattice::bonds`] hand out the same shared slice.
#[derive(Debug, Clone)]
pub struct Lattice {
    kind: Kind,
    shape: Vec<usize>,
    pbc: bool,
    cache: RefCell<BTreeMap<usize, Rc<[Bond]>>>,
}

impl Lattice {
    /// One-dimensional chain of `length` sites.
    pub fn chain(length: usize, pbc: bool) -> Result<Self, VmcError> {
        if length == 0 {
            return Err(VmcError::Configuration(
                "chain length must be positive".into(),
            ));
        }
        Ok(Lattice {
            kind: Kind::Chain,
            shape: vec![length],
            pbc,
            cache: RefCell::new(BTreeMap::new()),
        })
    }

    /// Two-dimensional `rows` x `cols` square grid.
    pub fn square(rows: usize, cols: usize, pbc: bool) -> Result<Self, VmcError> {
        if rows == 0 || cols == 0 {
            return Err(VmcError::Configuration(
                "square lattice extents must be positive".into(),
            ));
        }
        Ok(Lattice {
            kind: Kind::Square,
            shape: vec![rows, cols],
            pbc,
            cache: RefCell::new(BTreeMap::new()),
        })
    }

    /// Resolve a lattice kind by name: "chain" takes a one-element shape,
    /// "square" a two-element shape.
    pub fn from_name(name: &str, shape: &[usize], pbc: bool) -> Result<Self, VmcError> {
        match name.to_ascii_lowercase().as_str() {
            "chain" => match shape {
                &[length] => Lattice::chain(length, pbc),
                _ => Err(VmcError::Configuration(format!(
                    "chain lattice expects a one-element shape, got {:?}",
                    shape
                ))),
            },
            "square" => match shape {
                &[rows, cols] => Lattice::square(rows, cols, pbc),
                _ => Err(VmcError::Configuration(format!(
                    "square lattice expects a two-element shape, got {:?}",
                    shape
                ))),
            },
            other => Err(VmcError::Configuration(format!(
                "unknown lattice kind '{}'",
                other
            ))),
        }
    }

    pub fn num_sites(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn pbc(&self) -> bool {
        self.pbc
    }

    fn kind_name(&self) -> &'static str {
        match self.kind {
            Kind::Chain => "Chain",
            Kind::Square => "Square",
        }
    }

    /// Bond list for the given neighbor order, memoized.
    pub fn bonds(&self, order: usize) -> Rc<[Bond]> {
        if let Some(cached) = self.cache.borrow().get(&order) {
            return Rc::clone(cached);
        }
        let computed: Rc<[Bond]> = self.compute_bonds(order).into();
        self.cache
            .borrow_mut()
            .insert(order, Rc::clone(&computed));
        computed
    }

    /// All sites bonded to `site` at the given order.
    pub fn neighbors(&self, site: usize, order: usize) -> Vec<usize> {
        let mut out = Vec::new();
        for &(a, b) in self.bonds(order).iter() {
            if a == site {
                out.push(b);
            } else if b == site {
                out.push(a);
            }
        }
        out
    }

    fn compute_bonds(&self, order: usize) -> Vec<Bond> {
        match self.kind {
            Kind::Chain => self.chain_bonds(order),
            Kind::Square => self.square_bonds(order),
        }
    }

    fn chain_bonds(&self, order: usize) -> Vec<Bond> {
        let length = self.shape[0];
        let mut bonds = Vec::new();
        for i in 0..length {
            if !self.pbc && i + order >= length {
                break;
            }
            bonds.push((i, (i + order) % length));
        }
        bonds
    }

    fn square_bonds(&self, order: usize) -> Vec<Bond> {
        let (rows, cols) = (self.shape[0], self.shape[1]);
        let site = |i: usize, j: usize| i * cols + j;
        let mut bonds = Vec::new();
        match order {
            0 => {
                for s in 0..rows * cols {
                    bonds.push((s, s));
                }
            }
            1 => {
                if self.pbc {
                    for i in 0..rows {
                        for j in 0..cols {
                            bonds.push((site(i, j), site((i + 1) % rows, j)));
                            bonds.push((site(i, j), site(i, (j + 1) % cols)));
                        }
                    }
                } else {
                    for i in 0..rows.saturating_sub(1) {
                        for j in 0..cols {
                            bonds.push((site(i, j), site(i + 1, j)));
                        }
                    }
                    for i in 0..rows {
                        for j in 0..cols.saturating_sub(1) {
                            bonds.push((site(i, j), site(i, j + 1)));
                        }
                    }
                }
            }
            2 => {
                if self.pbc {
                    for i in 0..rows {
                        for j in 0..cols {
                            bonds.push((
                                site(i, j),
                                site((i + 1) % rows, (j + 1) % cols),
                            ));
                            bonds.push((
                                site(i, j),
                                site((i + 1) % rows, (j + cols - 1) % cols),
                            ));
                        }
                    }
                } else {
                    for i in 0..rows.saturating_sub(1) {
                        for j in 0..cols.saturating_sub(1) {
                            bonds.push((site(i, j), site(i + 1, j + 1)));
                        }
                    }
                    for i in 0..rows.saturating_sub(1) {
                        for j in 0..cols.saturating_sub(1) {
                            bonds.push((site(i + 1, j), site(i, j + 1)));
                        }
                    }
                }
            }
            // No longer-range bonds are defined on the square grid.
            _ => {}
        }
        bonds
    }
}

impl fmt::Display for Lattice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:?}", self.kind_name(), self.shape)?;
        if self.pbc {
            write!(f, " (periodic)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_chain_bonds_periodic() {
        let lattice = Lattice::chain(5, true).unwrap();
        let bonds = lattice.bonds(1);
        assert_eq!(&bonds[..], &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)]);
    }

    #[test]
    fn test_chain_bonds_open() {
        let lattice = Lattice::chain(4, false).unwrap();
        assert_eq!(&lattice.bonds(1)[..], &[(0, 1), (1, 2), (2, 3)]);
        assert_eq!(&lattice.bonds(2)[..], &[(0, 2), (1, 3)]);
        assert_eq!(&lattice.bonds(0)[..], &[(0, 0), (1, 1), (2, 2), (3, 3)]);
    }

    #[test]
    fn test_square_bond_counts() {
        let periodic = Lattice::square(3, 3, true).unwrap();
        assert_eq!(periodic.bonds(1).len(), 18);
        assert_eq!(periodic.bonds(2).len(), 18);

        let open = Lattice::square(3, 3, false).unwrap();
        assert_eq!(open.bonds(1).len(), 12);
        assert_eq!(open.bonds(2).len(), 8);
        assert_eq!(open.bonds(0).len(), 9);
    }

    #[test]
    fn test_square_open_bonds_small() {
        let lattice = Lattice::square(2, 3, false).unwrap();
        // Vertical bonds first, then horizontal, row-major flattening.
        assert_eq!(
            &lattice.bonds(1)[..],
            &[(0, 3), (1, 4), (2, 5), (0, 1), (1, 2), (3, 4), (4, 5)]
        );
        // Both diagonals of each open plaquette.
        assert_eq!(&lattice.bonds(2)[..], &[(0, 4), (1, 5), (3, 1), (4, 2)]);
    }

    #[test]
    fn test_bonds_are_memoized() {
        let lattice = Lattice::chain(6, true).unwrap();
        let first = lattice.bonds(1);
        let second = lattice.bonds(1);
        assert!(Rc::ptr_eq(&first, &second));
        assert!(!Rc::ptr_eq(&first, &lattice.bonds(2)));
    }

    #[test]
    fn test_neighbors() {
        let lattice = Lattice::chain(5, true).unwrap();
        let mut nbrs = lattice.neighbors(0, 1);
        nbrs.sort_unstable();
        assert_eq!(nbrs, vec![1, 4]);

        let open = Lattice::chain(5, false).unwrap();
        assert_eq!(open.neighbors(0, 1), vec![1]);
        assert_eq!(open.neighbors(4, 1), vec![3]);
    }

    #[test]
    fn test_from_name() {
        let chain = Lattice::from_name("chain", &[8], true).unwrap();
        assert_eq!(chain.num_sites(), 8);
        let square = Lattice::from_name("Square", &[2, 3], false).unwrap();
        assert_eq!(square.num_sites(), 6);

        assert!(Lattice::from_name("chain", &[2, 2], false).is_err());
        assert!(Lattice::from_name("square", &[4], false).is_err());
        assert!(Lattice::from_name("kagome", &[4], false).is_err());
        assert!(Lattice::chain(0, false).is_err());
        assert!(Lattice::square(0, 3, false).is_err());
    }

    #[test]
    fn test_display() {
        let lattice = Lattice::chain(5, true).unwrap();
        assert_eq!(lattice.to_string(), "Chain: [5] (periodic)");
        let square = Lattice::square(2, 2, false).unwrap();
        assert_eq!(square.to_string(), "Square: [2, 2]");
    }

    #[test]
    fn test_encode_decode() {
        assert_eq!(SpinConfig::all_down(4).encode(), 0);
        assert_eq!(SpinConfig::from_sites(vec![1, -1, -1]).unwrap().encode(), 1);
        assert_eq!(SpinConfig::from_sites(vec![-1, 1, -1]).unwrap().encode(), 2);
        assert_eq!(SpinConfig::from_sites(vec![1, 1, 1]).unwrap().encode(), 7);

        for index in 0..32 {
            let config = SpinConfig::from_index(index, 5);
            assert_eq!(config.encode(), index);
        }
    }

    #[test]
    fn test_shift_counts_in_binary() {
        let mut config = SpinConfig::all_down(3);
        for expected in 1..8 {
            config.shift();
            assert_eq!(config.encode(), expected);
        }
        // Wraps around after the all-up configuration.
        config.shift();
        assert_eq!(config.encode(), 0);
    }

    #[test]
    fn test_from_sites_rejects_invalid() {
        assert!(SpinConfig::from_sites(vec![1, 0, -1]).is_err());
        assert!(SpinConfig::from_sites(vec![2]).is_err());
        assert!(SpinConfig::from_sites(vec![]).unwrap().is_empty());
    }

    #[test]
    fn test_flip_and_negate() {
        let mut config = SpinConfig::all_down(3);
        config.flip(1);
        assert_eq!(config.sites(), &[-1, 1, -1]);
        assert_eq!(config.magnetization(), -1);
        config.negate();
        assert_eq!(config.sites(), &[1, -1, 1]);
        assert_eq!(config.magnetization(), 1);
    }

    #[test]
    fn test_random_is_valid() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = SpinConfig::random(64, &mut rng);
        assert_eq!(config.len(), 64);
        assert!(config.sites().iter().all(|&s| s == 1 || s == -1));
    }
}
