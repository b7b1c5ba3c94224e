//! Random selection of feasible measurement cliques.

use rand::Rng;

use hdsynth_core::{combinations, sample_without_replacement, Clique, Domain, Result};

/// Arity of the measured marginals.
pub const CLIQUE_ARITY: usize = 3;

/// Number of cliques measured per run.
pub const CLIQUE_COUNT: usize = 64;

/// Enumerate every feasible clique: attribute combinations of
/// [`CLIQUE_ARITY`] whose joint domain size does not exceed the record
/// count. Larger joints would leave the marginal under-determined.
pub fn feasible_cliques(domain: &Domain, records: usize) -> Vec<Clique> {
    combinations(domain.len(), CLIQUE_ARITY)
        .into_iter()
        .map(|idx| {
            idx.into_iter()
                .map(|i| domain.attrs()[i].clone())
                .collect::<Clique>()
        })
        .filter(|cl| matches!(domain.size(cl), Ok(size) if size <= records))
        .collect()
}

/// Draw the measurement workload: `count` feasible cliques selected
/// uniformly without replacement.
///
/// Errors when fewer than `count` cliques are feasible. The selection is
/// fixed for the whole run: mechanism input, live callback, and final
/// metrics all see the same workload.
pub fn select_cliques<R: Rng>(
    domain: &Domain,
    records: usize,
    count: usize,
    rng: &mut R,
) -> Result<Vec<Clique>> {
    let feasible = feasible_cliques(domain, records);
    let picks = sample_without_replacement(feasible.len(), count, rng)?;
    Ok(picks.into_iter().map(|i| feasible[i].clone()).collect())
}
