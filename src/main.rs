use clap::Parser;

use lattice_vmc::collector::Collector;
use lattice_vmc::conf::read_run_config;
use lattice_vmc::error::VmcError;
use lattice_vmc::lattice::SpinConfig;
use lattice_vmc::measure::{ground, local_energy};
use lattice_vmc::sampler::Metropolis;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config.yml")]
    config: String,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(err) = run(&args.config) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

/// Sample the exact ground state of the configured model and compare the
/// estimated mean local energy against the eigenvalue it should reproduce.
fn run(path: &str) -> Result<(), VmcError> {
    let config = read_run_config(path)?;
    let lattice = config.lattice.build()?;
    let ham = config.model.build(&lattice)?;
    let opts = config.sampler.opts()?;
    let generator = config.sampler.generator()?;

    let (exact, state) = ground(ham.as_ref())?;
    let amplitude = |config: &SpinConfig| state[config.encode()];
    let weight = |config: &SpinConfig| amplitude(config).powi(2);

    let mut sampler = Metropolis::new(
        lattice.num_sites(),
        weight,
        generator,
        Collector::new(true),
        config.seed,
    );
    sampler.sample(config.sampler.itr, opts)?;

    let collector = sampler.collector();
    let mut energy = 0.0;
    for sampled in collector.iter() {
        energy += local_energy(ham.as_ref(), &amplitude, sampled)?;
    }
    let energy = energy / collector.len() as f64;

    println!("VMC ground-state sampling: {}", ham.name());
    println!("----------------------------------------");
    println!("Lattice: {}", lattice);
    println!(
        "Samples: {} (burn {}, thin {})",
        config.sampler.itr,
        opts.burn.unwrap_or(0),
        opts.thin
    );
    println!("Estimated energy: {:.6}", energy);
    println!("Exact ground energy: {:.6}", exact);
    println!("Deviation: {:.2e}", (energy - exact).abs());
    Ok(())
}
