//! Benchmark FEM synthesis against a factored-inference estimator.
//!
//! Loads the `adult` dataset from `$HD_DATA`, measures a random workload of
//! 64 three-way marginals, runs the FEM mechanism, fits the factored model
//! to the synthetic marginals, and reports L1/L-infinity reconstruction
//! error for both.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hdsynth_bench::{
    append_csv, marginal_errors, select_cliques, stepsize_for_epsilon, ResultRow, CLIQUE_COUNT,
};
use hdsynth_core::Dataset;
use hdsynth_inference::{FactoredInference, Measurement};
use hdsynth_mechanisms::Fem;

/// Benchmarked mechanism configuration.
const NOISE_MULTIPLE: f64 = 0.16;
const EPSILON_SPLIT: f64 = 0.008;
const SAMPLES_PER_ROUND: usize = 50;
const DATASET_NAME: &str = "adult";

#[derive(Debug, Parser)]
#[command(name = "fem", about = "FEM vs PGM marginal-reconstruction benchmark")]
struct Args {
    /// Number of optimization iterations.
    #[arg(long, default_value_t = 50)]
    iters: usize,

    /// Privacy parameter.
    #[arg(long, default_value_t = 1.0)]
    epsilon: f64,

    /// Random seed.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Path to append results to; prints to stdout when absent.
    #[arg(long)]
    save: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let stepsize = stepsize_for_epsilon(args.epsilon)?;

    let prefix = env::var("HD_DATA").context("HD_DATA must point at the dataset directory")?;
    let data_path = Path::new(&prefix).join(format!("{DATASET_NAME}.csv"));
    let domain_path = Path::new(&prefix).join(format!("{DATASET_NAME}-domain.json"));
    let data = Dataset::load(&data_path, &domain_path)
        .with_context(|| format!("loading {DATASET_NAME} from {prefix}"))?;

    let total = data.records();
    let delta = 1.0 / (total as f64).powi(2);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    let cliques = select_cliques(data.domain(), total, CLIQUE_COUNT, &mut rng)?;
    info!(
        records = total,
        attributes = data.domain().len(),
        cliques = cliques.len(),
        "selected measurement workload"
    );

    let mech = Fem::new(
        args.epsilon,
        delta,
        NOISE_MULTIPLE,
        EPSILON_SPLIT,
        SAMPLES_PER_ROUND,
    )?;
    let synth = mech.run(&data, &cliques, &mut rng)?;

    let measurements = cliques
        .iter()
        .map(|cl| {
            let target = synth.project(cl)?.distribution()? * total as f64;
            Ok(Measurement {
                clique: cl.clone(),
                weight: 1.0,
                target,
            })
        })
        .collect::<hdsynth_core::Result<Vec<_>>>()?;

    info!(iters = args.iters, stepsize, "starting optimization");
    let engine = FactoredInference::new(data.domain().clone(), args.iters, stepsize)?;
    let model = engine.estimate(&measurements, total as f64, |cb| {
        match marginal_errors(&data, cb.marginals, &cliques) {
            Ok(e) => info!(
                step = cb.step,
                loss = cb.loss,
                pgm_l1 = e.l1,
                pgm_linf = e.linf,
                "estimator progress"
            ),
            Err(err) => warn!(step = cb.step, %err, "progress evaluation failed"),
        }
        false
    })?;

    let fem = marginal_errors(&data, &synth, &cliques)?;
    let pgm = marginal_errors(&data, &model, &cliques)?;

    let row = ResultRow {
        iters: args.iters,
        epsilon: args.epsilon,
        seed: args.seed,
        fem_l1: fem.l1,
        pgm_l1: pgm.l1,
        fem_linf: fem.linf,
        pgm_linf: pgm.linf,
    };

    match &args.save {
        Some(path) => append_csv(path, &row)
            .with_context(|| format!("appending results to {}", path.display()))?,
        None => println!("{row}"),
    }

    Ok(())
}
