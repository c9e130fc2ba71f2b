//! Metropolis-Hastings chain over spin configurations.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::collector::Collector;
use crate::error::VmcError;
use crate::generator::Generator;
use crate::lattice::SpinConfig;
use crate::sampler::{Phase, Probability, SampleOpts};

/// Current weights at or below this floor force acceptance; the ratio test
/// is meaningless where the target has underflowed.
const UNDERFLOW_FLOOR: f64 = 1000.0 * f64::MIN_POSITIVE;

/// Single Metropolis-Hastings chain.
///
/// One epoch is `sample(itr, opts)`: burn-in steps that record nothing,
/// then `itr` sampling steps recording the post-decision state at every
/// thinning boundary. Rejected steps re-record the standing configuration.
pub struct Metropolis<P: Probability> {
    num_sites: usize,
    proposal: P,
    generator: Generator,
    collector: Collector,
    rng: StdRng,
    phase: Phase,
    current: Option<(SpinConfig, f64)>,
    thin: usize,
    inverse: Option<f64>,
    // Sampling-step ordinal for thinning; persists across epochs.
    steps: usize,
}

impl<P: Probability> Metropolis<P> {
    /// A fresh chain. `seed` pins the random stream for reproducible runs;
    /// `None` seeds from entropy.
    pub fn new(
        num_sites: usize,
        proposal: P,
        generator: Generator,
        collector: Collector,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Metropolis {
            num_sites,
            proposal,
            generator,
            collector,
            rng,
            phase: Phase::Uninitialized,
            current: None,
            thin: 1,
            inverse: None,
            steps: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
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

    /// The standing configuration, if the chain has one.
    pub fn current(&self) -> Option<&SpinConfig> {
        self.current.as_ref().map(|(config, _)| config)
    }

    /// Draw a uniform random starting configuration and evaluate its
    /// weight. Called implicitly by the first `sample`.
    pub fn preload(&mut self) {
        let config = SpinConfig::random(self.num_sites, &mut self.rng);
        let weight = self.proposal.weight(&config);
        self.current = Some((config, weight));
    }

    /// Run one epoch: burn-in, then `itr` sampling steps. Returns the
    /// collector with everything recorded so far.
    pub fn sample(&mut self, itr: usize, opts: SampleOpts) -> Result<&Collector, VmcError> {
        if itr == 0 {
            return Err(VmcError::Precondition(
                "iteration count must be positive".into(),
            ));
        }
        let burn = opts.burn.ok_or_else(|| {
            VmcError::Precondition("burn-in length is required".into())
        })?;
        if opts.thin == 0 {
            return Err(VmcError::Precondition(
                "thinning interval must be at least 1".into(),
            ));
        }
        if let Some(p) = opts.inverse {
            if !(0.0..=1.0).contains(&p) {
                return Err(VmcError::Configuration(format!(
                    "global flip probability {} outside [0, 1]",
                    p
                )));
            }
        }
        self.thin = opts.thin;
        self.inverse = opts.inverse;
        if self.current.is_none() {
            self.preload();
        }

        self.phase = Phase::Burning;
        debug!("burning {} steps", burn);
        for _ in 0..burn {
            self.step(false)?;
        }

        self.phase = Phase::Sampling;
        debug!("sampling {} steps (thin = {})", itr, self.thin);
        for _ in 0..itr {
            self.step(true)?;
        }
        self.phase = Phase::Done;
        Ok(&self.collector)
    }

    /// One accept/reject move. `record` is false during burn-in.
    fn step(&mut self, record: bool) -> Result<(), VmcError> {
        let (mut config, mut weight) = match self.current.take() {
            Some(state) => state,
            None => {
                return Err(VmcError::Precondition(
                    "sampler stepped before preload".into(),
                ))
            }
        };

        if let Some(p) = self.inverse {
            // Global Z2 flip. The target is assumed symmetric under it,
            // so the stored weight still applies.
            if self.rng.gen::<f64>() < p {
                config.negate();
            }
        }

        let cand = match self.generator.propose(&config, &mut self.rng) {
            Ok(cand) => cand,
            Err(err) => {
                self.current = Some((config, weight));
                return Err(err);
            }
        };
        let cand_weight = self.proposal.weight(&cand);

        let accept = if weight > UNDERFLOW_FLOOR {
            (cand_weight / weight).min(1.0)
        } else {
            1.0
        };
        if self.rng.gen::<f64>() < accept {
            debug!("accepted move, weight {:.3e} -> {:.3e}", weight, cand_weight);
            config = cand;
            weight = cand_weight;
        } else {
            debug!("rejected move, accept probability {:.3}", accept);
        }

        if record {
            if self.steps % self.thin == 0 {
                self.collector.collect_sample(&config, weight);
            }
            self.steps += 1;
        }
        self.current = Some((config, weight));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(_: &SpinConfig) -> f64 {
        1.0
    }

    #[test]
    fn test_sample_option_validation() {
        let mut sampler = Metropolis::new(
            4,
            uniform,
            Generator::RandomSelect { nflips: 1 },
            Collector::new(false),
            Some(1),
        );
        assert!(sampler.sample(10, SampleOpts::default()).is_err());
        assert!(sampler.sample(0, SampleOpts::burn(5)).is_err());
        assert!(sampler.sample(10, SampleOpts::burn(5).with_thin(0)).is_err());
        assert!(sampler
            .sample(10, SampleOpts::burn(5).with_inverse(1.5))
            .is_err());
        assert!(sampler
            .sample(10, SampleOpts::burn(5).with_inverse(-0.1))
            .is_err());
        // Nothing was recorded by the failed calls.
        assert!(sampler.collector().is_empty());
        assert_eq!(sampler.phase(), Phase::Uninitialized);
    }

    #[test]
    fn test_burn_steps_are_not_recorded() {
        let mut sampler = Metropolis::new(
            4,
            uniform,
            Generator::RandomSelect { nflips: 1 },
            Collector::new(false),
            Some(2),
        );
        sampler.sample(5, SampleOpts::burn(100)).unwrap();
        assert_eq!(sampler.collector().len(), 5);
        assert_eq!(sampler.phase(), Phase::Done);
    }

    #[test]
    fn test_thinning_record_count() {
        let mut sampler = Metropolis::new(
            4,
            uniform,
            Generator::RandomSelect { nflips: 1 },
            Collector::new(false),
            Some(3),
        );
        sampler.sample(100, SampleOpts::burn(10).with_thin(10)).unwrap();
        assert_eq!(sampler.collector().len(), 10);

        // The step ordinal carries across epochs.
        sampler.sample(50, SampleOpts::burn(0).with_thin(10)).unwrap();
        assert_eq!(sampler.collector().len(), 15);
    }

    #[test]
    fn test_rejected_steps_rerecord_current_state() {
        // Two-state system: state 0 has all the weight, state 1 nearly
        // none, and the shift proposal alternates between them. After one
        // burn step the chain sits at state 0 and rejects everything.
        let peaked = |config: &SpinConfig| {
            if config.encode() == 0 {
                1.0
            } else {
                1.0e-300
            }
        };
        let mut sampler = Metropolis::new(
            1,
            peaked,
            Generator::IterateAll,
            Collector::new(false),
            Some(5),
        );
        sampler.sample(20, SampleOpts::burn(2)).unwrap();
        assert_eq!(sampler.collector().len(), 20);
        for record in sampler.collector().records() {
            assert_eq!(record.config.encode(), 0);
            assert_eq!(record.weight, 1.0);
        }
    }

    #[test]
    fn test_underflow_floor_forces_acceptance() {
        // Subnormal current weights would otherwise pin the chain: the
        // ratio against a zero candidate weight always rejects. With the
        // recovery floor every move is accepted and the two states
        // alternate deterministically.
        let dead = |config: &SpinConfig| {
            if config.encode() == 0 {
                1.0e-310
            } else {
                0.0
            }
        };
        let mut sampler = Metropolis::new(
            1,
            dead,
            Generator::IterateAll,
            Collector::new(false),
            Some(7),
        );
        sampler.sample(6, SampleOpts::burn(1)).unwrap();
        let records = sampler.collector().records();
        assert_eq!(records.len(), 6);
        for pair in records.windows(2) {
            assert_ne!(pair[0].config, pair[1].config);
        }
    }

    #[test]
    fn test_global_flip_probability_one_negates_every_step() {
        let mut sampler = Metropolis::new(
            3,
            uniform,
            Generator::RandomSelect { nflips: 0 },
            Collector::new(false),
            Some(11),
        );
        sampler
            .sample(6, SampleOpts::burn(0).with_inverse(1.0))
            .unwrap();
        let records = sampler.collector().records();
        assert_eq!(records.len(), 6);
        for pair in records.windows(2) {
            let mut negated = pair[0].config.clone();
            negated.negate();
            assert_eq!(negated, pair[1].config);
        }
    }
}
