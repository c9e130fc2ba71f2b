//! YAML run configuration.
//!
//! A run file names a lattice, a model, and the sampler schedule. Parsing
//! is serde/serde_yaml; every section is validated up front so a bad file
//! fails before any sampling starts.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::VmcError;
use crate::generator::Generator;
use crate::ham::{Hamiltonian, J1J2, TFI, XXZ};
use crate::lattice::Lattice;
use crate::sampler::SampleOpts;

/// Top-level run description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub lattice: LatticeConfig,
    pub model: ModelConfig,
    pub sampler: SamplerConfig,
    /// Fixed RNG seed; seeded from entropy when absent.
    pub seed: Option<u64>,
}

/// Lattice section, resolved through [`Lattice::from_name`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatticeConfig {
    pub kind: String,
    pub shape: Vec<usize>,
    #[serde(default)]
    pub pbc: bool,
}

/// Model section, tagged by `kind`. Couplings fall back to each model's
/// customary defaults when omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ModelConfig {
    Tfi {
        field: f64,
    },
    J1j2 {
        j: Option<(f64, f64)>,
    },
    Xxz {
        j: Option<(f64, f64)>,
        #[serde(default = "default_order")]
        order: usize,
    },
}

/// Sampler schedule. `burn` has no default and must be given explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerConfig {
    #[serde(default = "default_itr")]
    pub itr: usize,
    pub burn: Option<usize>,
    #[serde(default = "default_thin")]
    pub thin: usize,
    pub inverse: Option<f64>,
    #[serde(default = "default_generator")]
    pub generator: String,
}

fn default_itr() -> usize {
    10000
}

fn default_thin() -> usize {
    1
}

fn default_order() -> usize {
    1
}

fn default_generator() -> String {
    "randselect".to_string()
}

impl LatticeConfig {
    pub fn build(&self) -> Result<Lattice, VmcError> {
        Lattice::from_name(&self.kind, &self.shape, self.pbc)
    }
}

impl ModelConfig {
    /// Instantiate the named Hamiltonian on `lattice`.
    pub fn build(&self, lattice: &Lattice) -> Result<Box<dyn Hamiltonian>, VmcError> {
        match *self {
            ModelConfig::Tfi { field } => {
                check_finite("model field", field)?;
                Ok(Box::new(TFI::new(lattice.clone(), field)))
            }
            ModelConfig::J1j2 { j } => {
                let coupling = j.unwrap_or(J1J2::DEFAULT_COUPLING);
                check_finite("model coupling j1", coupling.0)?;
                check_finite("model coupling j2", coupling.1)?;
                Ok(Box::new(J1J2::new(lattice.clone(), coupling)))
            }
            ModelConfig::Xxz { j, order } => {
                let coupling = j.unwrap_or(XXZ::DEFAULT_COUPLING);
                check_finite("model coupling jxy", coupling.0)?;
                check_finite("model coupling jz", coupling.1)?;
                if order == 0 {
                    return Err(VmcError::Configuration(
                        "model bond order must be at least 1".into(),
                    ));
                }
                Ok(Box::new(XXZ::new(lattice.clone(), coupling, order)))
            }
        }
    }
}

impl SamplerConfig {
    /// Resolve the schedule into sampler options.
    pub fn opts(&self) -> Result<SampleOpts, VmcError> {
        if self.itr == 0 {
            return Err(VmcError::Configuration(
                "sampler iteration count must be positive".into(),
            ));
        }
        let burn = self.burn.ok_or_else(|| {
            VmcError::Configuration("sampler burn-in length is required".into())
        })?;
        if self.thin == 0 {
            return Err(VmcError::Configuration(
                "sampler thinning interval must be at least 1".into(),
            ));
        }
        let mut opts = SampleOpts::burn(burn).with_thin(self.thin);
        if let Some(p) = self.inverse {
            if !(0.0..=1.0).contains(&p) {
                return Err(VmcError::Configuration(format!(
                    "sampler flip probability {} outside [0, 1]",
                    p
                )));
            }
            opts = opts.with_inverse(p);
        }
        Ok(opts)
    }

    pub fn generator(&self) -> Result<Generator, VmcError> {
        Generator::from_name(&self.generator)
    }
}

impl RunConfig {
    /// Check every section without running anything.
    pub fn validate(&self) -> Result<(), VmcError> {
        let lattice = self.lattice.build()?;
        self.model.build(&lattice)?;
        self.sampler.opts()?;
        self.sampler.generator()?;
        Ok(())
    }
}

fn check_finite(what: &str, value: f64) -> Result<(), VmcError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(VmcError::Configuration(format!(
            "{} must be finite, got {}",
            what, value
        )))
    }
}

/// Read and validate a run configuration from a YAML file.
pub fn read_run_config<P: AsRef<Path>>(path: P) -> Result<RunConfig, VmcError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let config: RunConfig = serde_yaml::from_reader(reader)?;
    config.validate()?;
    Ok(config)
}

// example of yaml file
// lattice:
//   kind: chain
//   shape: [4]
//   pbc: true
// model:
//   kind: tfi
//   field: 1.0
// sampler:
//   itr: 10000
//   burn: 500
//   thin: 1
//   generator: randselect
// seed: 42
