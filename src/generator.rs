//! Proposal generators for the Metropolis chain.
//!
//! A generator maps the current configuration to a candidate. The three
//! closed variants cover the move families in use:
//!
//! - [`Generator::RandomSelect`]: flip `nflips` distinct random sites
//! - [`Generator::SpinConserve`]: magnetization-preserving paired flips
//! - [`Generator::IterateAll`]: deterministic walk through the full basis
//!
//! [`IterateAll`] is also a standalone iterator over all 2^N configurations,
//! used by exact diagonalization and full-space expectations.

use rand::Rng;

use crate::error::VmcError;
use crate::lattice::SpinConfig;

/// Hard cap on full-space enumeration (2^25 basis states).
pub const ENUM_SITE_LIMIT: usize = 25;

/// Retry budget for the spin-conserving partner search.
const PARTNER_RETRIES: usize = 1000;

/// Configuration proposal strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generator {
    /// Flip `nflips` distinct uniformly chosen sites. The candidate sits at
    /// Hamming distance exactly `nflips` from the input.
    RandomSelect { nflips: usize },
    /// For each of `nflips` primary flips, flip one partner site whose
    /// value equals the primary's post-flip value, so Σ s_i is conserved.
    SpinConserve { nflips: usize },
    /// Advance one step in the binary enumeration order.
    IterateAll,
}

impl Generator {
    /// Resolve a generator by name or abbreviation, with the customary
    /// flip counts (one flip for random selection, two conserving pairs).
    pub fn from_name(name: &str) -> Result<Self, VmcError> {
        match name.to_ascii_lowercase().as_str() {
            "rs" | "randselect" => Ok(Generator::RandomSelect { nflips: 1 }),
            "sc" | "spinconserve" | "spin conserve" => {
                Ok(Generator::SpinConserve { nflips: 2 })
            }
            "ia" | "iterall" | "iterate all" => Ok(Generator::IterateAll),
            other => Err(VmcError::Configuration(format!(
                "unknown generator '{}'",
                other
            ))),
        }
    }

    /// Propose a candidate configuration. The input is never mutated.
    pub fn propose<R: Rng>(
        &self,
        config: &SpinConfig,
        rng: &mut R,
    ) -> Result<SpinConfig, VmcError> {
        match *self {
            Generator::RandomSelect { nflips } => {
                if nflips > config.len() {
                    return Err(VmcError::Precondition(format!(
                        "cannot flip {} distinct sites out of {}",
                        nflips,
                        config.len()
                    )));
                }
                let mut cand = config.clone();
                for site in rand::seq::index::sample(rng, config.len(), nflips) {
                    cand.flip(site);
                }
                Ok(cand)
            }
            Generator::SpinConserve { nflips } => {
                if config.is_empty() && nflips > 0 {
                    return Err(VmcError::Precondition(
                        "cannot propose on an empty configuration".into(),
                    ));
                }
                let mut cand = config.clone();
                for _ in 0..nflips {
                    let site = rng.gen_range(0..cand.len());
                    cand.flip(site);
                    let want = cand.spin(site);
                    // The partner may be the primary site itself, in which
                    // case the pair cancels to a no-op move.
                    let mut partner = None;
                    for _ in 0..PARTNER_RETRIES {
                        let probe = rng.gen_range(0..cand.len());
                        if cand.spin(probe) == want {
                            partner = Some(probe);
                            break;
                        }
                    }
                    match partner {
                        Some(p) => cand.flip(p),
                        None => {
                            return Err(VmcError::PartnerSearchExhausted {
                                retries: PARTNER_RETRIES,
                            })
                        }
                    }
                }
                Ok(cand)
            }
            Generator::IterateAll => {
                let mut cand = config.clone();
                cand.shift();
                Ok(cand)
            }
        }
    }
}

/// Exhaustive iterator over all 2^N configurations of `num_sites` spins,
/// starting from all-down. The i-th item encodes to basis index i.
#[derive(Debug, Clone)]
pub struct IterateAll {
    current: SpinConfig,
    emitted: usize,
    total: usize,
}

impl IterateAll {
    pub fn new(num_sites: usize) -> Result<Self, VmcError> {
        if num_sites > ENUM_SITE_LIMIT {
            return Err(VmcError::Precondition(format!(
                "full enumeration of {} sites exceeds the {}-site limit",
                num_sites, ENUM_SITE_LIMIT
            )));
        }
        Ok(IterateAll {
            current: SpinConfig::all_down(num_sites),
            emitted: 0,
            total: 1usize << num_sites,
        })
    }
}

impl Iterator for IterateAll {
    type Item = SpinConfig;

    fn next(&mut self) -> Option<SpinConfig> {
        if self.emitted == self.total {
            return None;
        }
        let out = self.current.clone();
        self.current.shift();
        self.emitted += 1;
        Some(out)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.total - self.emitted;
        (rest, Some(rest))
    }
}

impl ExactSizeIterator for IterateAll {}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn hamming(a: &SpinConfig, b: &SpinConfig) -> usize {
        a.sites()
            .iter()
            .zip(b.sites().iter())
            .filter(|(x, y)| x != y)
            .count()
    }

    #[test]
    fn test_randselect_hamming_distance() {
        let mut rng = StdRng::seed_from_u64(11);
        let config = SpinConfig::random(10, &mut rng);
        for nflips in 0..=10 {
            let gen = Generator::RandomSelect { nflips };
            for _ in 0..20 {
                let cand = gen.propose(&config, &mut rng).unwrap();
                assert_eq!(hamming(&config, &cand), nflips);
            }
        }
    }

    #[test]
    fn test_randselect_too_many_flips() {
        let mut rng = StdRng::seed_from_u64(1);
        let config = SpinConfig::all_down(4);
        let gen = Generator::RandomSelect { nflips: 5 };
        assert!(gen.propose(&config, &mut rng).is_err());
    }

    #[test]
    fn test_spinconserve_preserves_magnetization() {
        let mut rng = StdRng::seed_from_u64(23);
        let mut config = SpinConfig::random(12, &mut rng);
        let gen = Generator::SpinConserve { nflips: 2 };
        for _ in 0..200 {
            let cand = gen.propose(&config, &mut rng).unwrap();
            assert_eq!(cand.magnetization(), config.magnetization());
            // Paired flips change an even number of sites.
            assert_eq!(hamming(&config, &cand) % 2, 0);
            assert!(hamming(&config, &cand) <= 4);
            config = cand;
        }
    }

    #[test]
    fn test_iterall_proposes_shift() {
        let mut rng = StdRng::seed_from_u64(3);
        let config = SpinConfig::all_down(4);
        let cand = Generator::IterateAll.propose(&config, &mut rng).unwrap();
        assert_eq!(cand.encode(), 1);
        assert_eq!(config.encode(), 0);
    }

    #[test]
    fn test_iterall_enumerates_every_configuration() {
        let all: Vec<SpinConfig> = IterateAll::new(4).unwrap().collect();
        assert_eq!(all.len(), 16);
        for (index, config) in all.iter().enumerate() {
            assert_eq!(config.encode(), index);
        }
    }

    #[test]
    fn test_iterall_len_and_limit() {
        let iter = IterateAll::new(3).unwrap();
        assert_eq!(iter.len(), 8);
        assert!(IterateAll::new(ENUM_SITE_LIMIT + 1).is_err());
    }

    #[test]
    fn test_from_name_aliases() {
        assert_eq!(
            Generator::from_name("rs").unwrap(),
            Generator::RandomSelect { nflips: 1 }
        );
        assert_eq!(
            Generator::from_name("randselect").unwrap(),
            Generator::RandomSelect { nflips: 1 }
        );
        assert_eq!(
            Generator::from_name("SC").unwrap(),
            Generator::SpinConserve { nflips: 2 }
        );
        assert_eq!(Generator::from_name("iterall").unwrap(), Generator::IterateAll);
        assert!(Generator::from_name("teleport").is_err());
    }
}
