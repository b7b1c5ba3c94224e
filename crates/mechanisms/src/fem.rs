//! FEM: follow-the-perturbed-leader exponential mechanism for synthetic
//! data release.
//!
//! Each round spends a slice of the privacy budget selecting the
//! worst-approximated marginal cell via the exponential mechanism, then
//! extends the synthetic dataset with records chosen by a Gumbel-perturbed
//! best-response pass over the attributes.

use ndarray::Array1;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, Gumbel};
use tracing::{debug, info};

use hdsynth_core::{Clique, Dataset, Domain, DpError, Result};

use crate::noise::ExponentialMechanism;

/// Per-clique bookkeeping for the mechanism's query class.
struct TrackedClique {
    /// Positions of the clique's attributes in the full domain.
    positions: Vec<usize>,
    /// The clique's projected domain.
    domain: Domain,
    /// Normalized true marginal.
    answers: Array1<f64>,
    /// Running synthetic record counts per cell.
    synth_counts: Array1<f64>,
}

impl TrackedClique {
    fn cell_of(&self, row: &[usize]) -> usize {
        let mut cell = 0;
        for (&pos, stride) in self.positions.iter().zip(self.domain.strides()) {
            cell += row[pos] * stride;
        }
        cell
    }

    fn synth_fraction(&self, cell: usize, synth_len: usize) -> f64 {
        if synth_len == 0 {
            0.0
        } else {
            self.synth_counts[cell] / synth_len as f64
        }
    }
}

/// A marginal-cell query picked up by the selection step.
struct SelectedQuery {
    clique: usize,
    cell: usize,
    /// The cell's per-attribute values, parallel to the clique's positions.
    values: Vec<usize>,
}

/// FEM differentially private synthesis mechanism.
#[derive(Clone, Debug)]
pub struct Fem {
    epsilon: f64,
    delta: f64,
    noise_multiple: f64,
    epsilon_split: f64,
    samples: usize,
}

impl Fem {
    /// Create a mechanism, validating its parameters.
    pub fn new(
        epsilon: f64,
        delta: f64,
        noise_multiple: f64,
        epsilon_split: f64,
        samples: usize,
    ) -> Result<Self> {
        if !epsilon.is_finite() || epsilon <= 0.0 {
            return Err(DpError::invalid("epsilon must be positive"));
        }
        if !delta.is_finite() || delta <= 0.0 || delta >= 1.0 {
            return Err(DpError::invalid("delta must be in (0, 1)"));
        }
        if !noise_multiple.is_finite() || noise_multiple <= 0.0 {
            return Err(DpError::invalid("noise_multiple must be positive"));
        }
        if !epsilon_split.is_finite() || epsilon_split <= 0.0 || epsilon_split > epsilon {
            return Err(DpError::invalid(
                "epsilon_split must be in (0, epsilon]",
            ));
        }
        if samples == 0 {
            return Err(DpError::invalid("samples must be positive"));
        }
        Ok(Self {
            epsilon,
            delta,
            noise_multiple,
            epsilon_split,
            samples,
        })
    }

    /// The overall privacy parameter.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// The overall failure parameter.
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Number of selection rounds the budget affords.
    pub fn rounds(&self) -> usize {
        (self.epsilon / self.epsilon_split).ceil() as usize
    }

    /// Run the mechanism, producing a synthetic dataset over `data`'s
    /// domain that approximates the workload marginals.
    pub fn run<R: Rng>(
        &self,
        data: &Dataset,
        workload: &[Clique],
        rng: &mut R,
    ) -> Result<Dataset> {
        if workload.is_empty() {
            return Err(DpError::invalid("workload must contain at least one clique"));
        }
        let total = data.records();
        if total == 0 {
            return Err(DpError::dataset("cannot synthesize from an empty dataset"));
        }

        let domain = data.domain().clone();
        let mut tracked = Vec::with_capacity(workload.len());
        for clique in workload {
            let marginal = data.project(clique)?;
            let positions: Vec<usize> = clique
                .iter()
                .map(|a| domain.position(a).expect("attr checked by project"))
                .collect();
            let answers = marginal.distribution()?;
            let cells = answers.len();
            tracked.push(TrackedClique {
                positions,
                domain: marginal.domain().clone(),
                answers,
                synth_counts: Array1::zeros(cells),
            });
        }

        // Flat score layout: one entry per cell of every workload marginal.
        let offsets: Vec<usize> = tracked
            .iter()
            .scan(0, |acc, t| {
                let start = *acc;
                *acc += t.answers.len();
                Some(start)
            })
            .collect();
        let n_queries = offsets.last().copied().unwrap_or(0)
            + tracked.last().map_or(0, |t| t.answers.len());

        let rounds = self.rounds();
        let selection = ExponentialMechanism::new(self.epsilon_split, 1.0 / total as f64);
        let perturbation = Gumbel::new(0.0, self.noise_multiple)
            .map_err(|e| DpError::numerical(format!("invalid Gumbel scale: {e}")))?;

        info!(
            rounds,
            samples = self.samples,
            queries = n_queries,
            "running FEM synthesis"
        );

        let mut selected: Vec<SelectedQuery> = Vec::with_capacity(rounds);
        let mut rows: Vec<Vec<usize>> = Vec::with_capacity(rounds * self.samples);
        let mut scores = vec![0.0; n_queries];

        for round in 0..rounds {
            // Score every query by its current approximation gap.
            for (t, &start) in tracked.iter().zip(&offsets) {
                for cell in 0..t.answers.len() {
                    scores[start + cell] =
                        (t.answers[cell] - t.synth_fraction(cell, rows.len())).abs();
                }
            }

            let flat = selection
                .select(&scores, rng)
                .ok_or_else(|| DpError::numerical("exponential mechanism found no outcome"))?;
            let clique = match offsets.binary_search(&flat) {
                Ok(i) => i,
                Err(i) => i - 1,
            };
            let cell = flat - offsets[clique];
            debug!(round, clique, cell, gap = scores[flat], "selected query");
            selected.push(SelectedQuery {
                clique,
                cell,
                values: tracked[clique].domain.unravel(cell),
            });

            // Signed deficits for this round's best response.
            let signs: Vec<f64> = selected
                .iter()
                .map(|q| {
                    let t = &tracked[q.clique];
                    if t.answers[q.cell] >= t.synth_fraction(q.cell, rows.len()) {
                        1.0
                    } else {
                        -1.0
                    }
                })
                .collect();

            // Attribute position -> (selected query, slot within its clique).
            let mut by_attr: Vec<Vec<(usize, usize)>> = vec![Vec::new(); domain.len()];
            for (s, q) in selected.iter().enumerate() {
                for (slot, &pos) in tracked[q.clique].positions.iter().enumerate() {
                    by_attr[pos].push((s, slot));
                }
            }

            let mut order: Vec<usize> = (0..domain.len()).collect();
            for _ in 0..self.samples {
                let mut row: Vec<usize> = domain
                    .shape()
                    .iter()
                    .map(|&card| rng.gen_range(0..card))
                    .collect();

                // One perturbed best-response pass in random attribute order.
                order.shuffle(rng);
                for &pos in &order {
                    let card = domain.shape()[pos];
                    let mut utilities = vec![0.0; card];
                    for &(s, slot) in &by_attr[pos] {
                        let q = &selected[s];
                        let t = &tracked[q.clique];
                        let others_match = t
                            .positions
                            .iter()
                            .zip(&q.values)
                            .enumerate()
                            .all(|(j, (&p, &v))| j == slot || row[p] == v);
                        if others_match {
                            utilities[q.values[slot]] += signs[s];
                        }
                    }

                    let mut best = row[pos];
                    let mut best_value = f64::NEG_INFINITY;
                    for (v, &u) in utilities.iter().enumerate() {
                        let perturbed = u + perturbation.sample(rng);
                        if perturbed > best_value {
                            best_value = perturbed;
                            best = v;
                        }
                    }
                    row[pos] = best;
                }

                for t in tracked.iter_mut() {
                    let cell = t.cell_of(&row);
                    t.synth_counts[cell] += 1.0;
                }
                rows.push(row);
            }
        }

        info!(records = rows.len(), "FEM synthesis finished");
        Dataset::new(domain, rows)
    }
}
