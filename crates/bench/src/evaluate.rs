//! Marginal reconstruction error between the true data and an estimator.

use hdsynth_core::{l1_distance, linf_distance, Clique, Dataset, DpError, MarginalSource, Result};

/// Aggregated reconstruction error over a clique workload.
#[derive(Clone, Copy, Debug)]
pub struct ErrorSummary {
    /// Mean halved L1 distance across cliques (total-variation convention:
    /// raw L1 between distributions double-counts shifted mass).
    pub l1: f64,
    /// Worst per-cell deviation across all cliques, not averaged.
    pub linf: f64,
}

/// Compare an estimator's marginals to the true data on every clique.
///
/// Both aggregates lie in [0, 1] for probability-vector inputs.
pub fn marginal_errors<E: MarginalSource + ?Sized>(
    data: &Dataset,
    estimate: &E,
    cliques: &[Clique],
) -> Result<ErrorSummary> {
    if cliques.is_empty() {
        return Err(DpError::invalid("no cliques to evaluate"));
    }

    let mut l1_sum = 0.0;
    let mut linf_max: f64 = 0.0;
    for cl in cliques {
        let x = data.project(cl)?.distribution()?;
        let z = estimate.marginal(cl)?.distribution()?;
        l1_sum += l1_distance(&x, &z)?;
        linf_max = linf_max.max(linf_distance(&x, &z)?);
    }

    Ok(ErrorSummary {
        l1: l1_sum / 2.0 / cliques.len() as f64,
        linf: linf_max,
    })
}
