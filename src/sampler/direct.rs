//! Exact categorical sampler over the full configuration space.
//!
//! Draws configurations i.i.d. from an explicit weight table via the alias
//! method, as a cross-check for the Markov-chain sampler on systems small
//! enough to enumerate.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, WeightedAliasIndex};

use crate::collector::Collector;
use crate::error::VmcError;
use crate::generator::ENUM_SITE_LIMIT;
use crate::lattice::SpinConfig;

/// Direct sampler backed by a weight table over all 2^N configurations.
///
/// Entry `i` of the table is the unnormalized weight of the configuration
/// whose encoding is `i`. Draws decode through [`SpinConfig::from_index`]
/// and are recorded with the normalized probability as their weight.
pub struct Direct {
    num_sites: usize,
    normalized: Vec<f64>,
    table: WeightedAliasIndex<f64>,
    collector: Collector,
    rng: StdRng,
}

impl Direct {
    /// Validate a weight table and build the alias structure. The table
    /// must hold exactly 2^`num_sites` finite non-negative entries with a
    /// positive sum.
    pub fn new(
        num_sites: usize,
        weights: Vec<f64>,
        collector: Collector,
        seed: Option<u64>,
    ) -> Result<Self, VmcError> {
        if num_sites > ENUM_SITE_LIMIT {
            return Err(VmcError::Precondition(format!(
                "direct sampling over {} sites exceeds the {}-site limit",
                num_sites, ENUM_SITE_LIMIT
            )));
        }
        let states = 1usize << num_sites;
        if weights.len() != states {
            return Err(VmcError::Configuration(format!(
                "weight table holds {} entries, expected {} for {} sites",
                weights.len(),
                states,
                num_sites
            )));
        }
        for (index, &weight) in weights.iter().enumerate() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(VmcError::Configuration(format!(
                    "weight {} at index {} is not a finite non-negative number",
                    weight, index
                )));
            }
        }
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(VmcError::Configuration(
                "weight table sums to zero".into(),
            ));
        }
        let normalized = weights.iter().map(|w| w / total).collect();
        let table = WeightedAliasIndex::new(weights)
            .map_err(|err| VmcError::Configuration(format!("weight table rejected: {}", err)))?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Direct {
            num_sites,
            normalized,
            table,
            collector,
            rng,
        })
    }

    pub fn collector(&self) -> &Collector {
        &self.collector
    }

    pub fn collector_mut(&mut self) -> &mut Collector {
        &mut self.collector
    }

    pub fn into_collector(self) -> Collector {
        self.collector
    }

    /// Draw `itr` independent configurations into the collector.
    pub fn sample(&mut self, itr: usize) -> Result<&Collector, VmcError> {
        if itr == 0 {
            return Err(VmcError::Precondition(
                "iteration count must be positive".into(),
            ));
        }
        for _ in 0..itr {
            let index = self.table.sample(&mut self.rng);
            let config = SpinConfig::from_index(index, self.num_sites);
            self.collector.collect_sample(&config, self.normalized[index]);
        }
        Ok(&self.collector)
    }
}
