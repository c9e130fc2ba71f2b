//! Sample collection and the covariance energy-gradient estimator.
//!
//! A [`Collector`] stores what one sampling epoch produced: configurations
//! with their acceptance-time weights (optionally merged into multiplicity
//! counts), and per-sample gradient snapshots tagged with local energies.
//! The gradient of the energy with respect to the ansatz parameters is then
//! estimated per parameter p as
//!
//!   delta_p = ⟨g_p⟩·⟨E_loc⟩ - ⟨g_p·E_loc⟩
//!
//! and returned to the caller, who owns the parameters and decides how to
//! apply the update.

use serde::{Deserialize, Serialize};

use crate::error::VmcError;
use crate::lattice::SpinConfig;

/// One stored sample: a configuration, the unnormalized probability it was
/// accepted with, and how many times it was recorded (merge mode).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub config: SpinConfig,
    pub weight: f64,
    pub count: usize,
}

/// Sample and gradient storage for one sampling epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collector {
    merge: bool,
    records: Vec<SampleRecord>,
    length: usize,
    elocs: Vec<f64>,
    grads: Vec<Vec<f64>>,
}

impl Collector {
    /// `merge` folds repeated configurations into one record with a
    /// multiplicity count instead of storing them again.
    pub fn new(merge: bool) -> Self {
        Collector {
            merge,
            records: Vec::new(),
            length: 0,
            elocs: Vec::new(),
            grads: Vec::new(),
        }
    }

    pub fn merge(&self) -> bool {
        self.merge
    }

    /// Logical number of collected samples. Every `collect_sample` call
    /// counts, merged or not.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Stored records in discovery order.
    pub fn records(&self) -> &[SampleRecord] {
        &self.records
    }

    /// Record one sample with its acceptance-time weight.
    ///
    /// In merge mode a linear scan looks for an equal configuration first
    /// and bumps its count; the weight of the first occurrence is kept.
    pub fn collect_sample(&mut self, config: &SpinConfig, weight: f64) {
        self.length += 1;
        if self.merge {
            if let Some(record) = self.records.iter_mut().find(|r| &r.config == config) {
                record.count += 1;
                return;
            }
        }
        self.records.push(SampleRecord {
            config: config.clone(),
            weight,
            count: 1,
        });
    }

    /// Record one gradient snapshot together with its local energy. All
    /// snapshots of an epoch must have the same parameter count.
    pub fn collect_grads(&mut self, grads: &[f64], eloc: f64) -> Result<(), VmcError> {
        if let Some(first) = self.grads.first() {
            if first.len() != grads.len() {
                return Err(VmcError::Precondition(format!(
                    "gradient snapshot has {} parameters, expected {}",
                    grads.len(),
                    first.len()
                )));
            }
        }
        self.grads.push(grads.to_vec());
        self.elocs.push(eloc);
        Ok(())
    }

    /// Expanded sample sequence in discovery order, repeating each merged
    /// record `count` times.
    pub fn iter(&self) -> impl Iterator<Item = &SpinConfig> + '_ {
        self.records
            .iter()
            .flat_map(|r| std::iter::repeat(&r.config).take(r.count))
    }

    /// Mean of `op` over the expanded sample sequence.
    pub fn measure<F>(&self, op: F) -> Result<f64, VmcError>
    where
        F: Fn(&SpinConfig) -> f64,
    {
        if self.is_empty() {
            return Err(VmcError::Precondition(
                "cannot measure an empty collector".into(),
            ));
        }
        let total: f64 = self.iter().map(|config| op(config)).sum();
        Ok(total / self.length as f64)
    }

    /// Covariance estimate of the energy gradient,
    /// delta_p = ⟨g_p⟩·⟨E_loc⟩ - ⟨g_p·E_loc⟩ per parameter.
    pub fn energy_gradient(&self) -> Result<Vec<f64>, VmcError> {
        if self.grads.is_empty() {
            return Err(VmcError::Precondition(
                "no gradient snapshots collected".into(),
            ));
        }
        let samples = self.grads.len() as f64;
        let num_params = self.grads[0].len();
        let energy = self.elocs.iter().sum::<f64>() / samples;

        let mut deltas = vec![0.0; num_params];
        for (snapshot, &eloc) in self.grads.iter().zip(self.elocs.iter()) {
            for (p, &g) in snapshot.iter().enumerate() {
                // Accumulate ⟨g⟩ and ⟨g·E_loc⟩ in one pass.
                deltas[p] += g * energy / samples - g * eloc / samples;
            }
        }
        Ok(deltas)
    }

    /// Drop all samples, gradients and energies; the merge flag stays.
    pub fn clear(&mut self) {
        self.records.clear();
        self.elocs.clear();
        self.grads.clear();
        self.length = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn config(bits: &[i8]) -> SpinConfig {
        SpinConfig::from_sites(bits.to_vec()).unwrap()
    }

    #[test]
    fn test_merge_counts_duplicates() {
        let mut collector = Collector::new(true);
        let up = config(&[1, 1]);
        let down = config(&[-1, -1]);
        collector.collect_sample(&up, 0.5);
        collector.collect_sample(&up, 0.5);
        collector.collect_sample(&down, 0.25);
        collector.collect_sample(&up, 0.5);

        assert_eq!(collector.len(), 4);
        assert_eq!(collector.records().len(), 2);
        assert_eq!(collector.records()[0].count, 3);
        assert_eq!(collector.records()[1].count, 1);

        // Expansion repeats per count in discovery order.
        let expanded: Vec<&SpinConfig> = collector.iter().collect();
        assert_eq!(expanded.len(), 4);
        assert_eq!(expanded[0], &up);
        assert_eq!(expanded[2], &up);
        assert_eq!(expanded[3], &down);
    }

    #[test]
    fn test_unmerged_stores_every_sample() {
        let mut collector = Collector::new(false);
        let up = config(&[1, 1]);
        for _ in 0..3 {
            collector.collect_sample(&up, 1.0);
        }
        assert_eq!(collector.len(), 3);
        assert_eq!(collector.records().len(), 3);
        assert!(collector.records().iter().all(|r| r.count == 1));
    }

    #[test]
    fn test_measure_agrees_across_merge_modes() {
        let samples = [
            config(&[1, -1]),
            config(&[1, -1]),
            config(&[1, 1]),
            config(&[-1, -1]),
            config(&[1, -1]),
        ];
        let mut merged = Collector::new(true);
        let mut plain = Collector::new(false);
        for s in &samples {
            merged.collect_sample(s, 1.0);
            plain.collect_sample(s, 1.0);
        }
        let op = |c: &SpinConfig| f64::from(c.spin(0));
        let a = merged.measure(op).unwrap();
        let b = plain.measure(op).unwrap();
        assert_relative_eq!(a, b, epsilon = 1e-12);
        assert_relative_eq!(a, 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_measure_empty_is_error() {
        let collector = Collector::new(false);
        assert!(collector.measure(|_| 1.0).is_err());
    }

    #[test]
    fn test_constant_local_energy_gives_zero_gradient() {
        let mut collector = Collector::new(false);
        for k in 0..10 {
            let grads = vec![k as f64, -0.3 * k as f64, 2.0];
            collector.collect_grads(&grads, 1.7).unwrap();
        }
        let deltas = collector.energy_gradient().unwrap();
        assert_eq!(deltas.len(), 3);
        for delta in deltas {
            assert!(delta.abs() < 1e-12);
        }
    }

    #[test]
    fn test_gradient_known_value() {
        let mut collector = Collector::new(false);
        collector.collect_grads(&[1.0], 2.0).unwrap();
        collector.collect_grads(&[3.0], 4.0).unwrap();
        // ⟨g⟩ = 2, ⟨E⟩ = 3, ⟨gE⟩ = 7 → delta = 2·3 - 7 = -1.
        let deltas = collector.energy_gradient().unwrap();
        assert_relative_eq!(deltas[0], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_gradient_errors() {
        let mut collector = Collector::new(false);
        assert!(collector.energy_gradient().is_err());
        collector.collect_grads(&[1.0, 2.0], 0.5).unwrap();
        assert!(collector.collect_grads(&[1.0], 0.5).is_err());
    }

    #[test]
    fn test_clear_keeps_merge_flag() {
        let mut collector = Collector::new(true);
        collector.collect_sample(&config(&[1]), 1.0);
        collector.collect_grads(&[0.1], 0.2).unwrap();
        collector.clear();
        assert!(collector.is_empty());
        assert!(collector.records().is_empty());
        assert!(collector.energy_gradient().is_err());
        assert!(collector.merge());
    }

    #[test]
    fn test_serde_round_trip() {
        let mut collector = Collector::new(true);
        collector.collect_sample(&config(&[1, -1]), 0.75);
        collector.collect_sample(&config(&[1, -1]), 0.75);
        collector.collect_grads(&[0.5, -0.5], 1.25).unwrap();

        let text = serde_yaml::to_string(&collector).unwrap();
        let restored: Collector = serde_yaml::from_str(&text).unwrap();
        assert_eq!(restored, collector);
    }
}
