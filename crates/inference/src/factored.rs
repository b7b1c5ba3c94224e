//! Warm-started mirror-descent estimation over measured cliques.
//!
//! The model is the local-polytope relaxation of the graphical model: one
//! distribution per measured clique, reconciled on shared sub-marginals
//! after every update. Estimation runs exponentiated-gradient (mirror
//! descent) steps against the squared marginal loss.

use ndarray::Array1;
use tracing::{debug, info};

use hdsynth_core::{Clique, Domain, DpError, Marginal, MarginalSource, Result};

use crate::clique_vector::CliqueVector;

/// A single marginal measurement the estimator fits against.
#[derive(Clone, Debug)]
pub struct Measurement {
    /// Attributes of the measured marginal.
    pub clique: Clique,
    /// Relative weight in the loss.
    pub weight: f64,
    /// Measured frequency vector over the clique's cells.
    pub target: Array1<f64>,
}

/// Callback information emitted on each estimation step.
#[derive(Clone, Debug)]
pub struct CallbackArgs<'a> {
    /// Zero-based optimization step.
    pub step: usize,
    /// Loss value at the current step.
    pub loss: f64,
    /// Current model marginals (unit mass per clique).
    pub marginals: &'a CliqueVector,
}

/// Mirror-descent estimator of clique marginals.
pub struct FactoredInference {
    domain: Domain,
    iters: usize,
    stepsize: f64,
    warmup: usize,
}

/// Mass floor used when smoothing warm-start marginals; multiplicative
/// updates cannot revive an exactly-zero cell.
const SMOOTHING: f64 = 1e-6;

impl FactoredInference {
    /// Create an estimator, validating the step size.
    pub fn new(domain: Domain, iters: usize, stepsize: f64) -> Result<Self> {
        if !stepsize.is_finite() || stepsize <= 0.0 {
            return Err(DpError::invalid("stepsize must be positive"));
        }
        Ok(Self {
            domain,
            iters,
            stepsize,
            warmup: 100,
        })
    }

    /// Override the number of warm-start consistency sweeps.
    pub fn with_warmup(mut self, warmup: usize) -> Self {
        self.warmup = warmup;
        self
    }

    /// Fit the model to the measurements.
    ///
    /// `total` is the record count the fitted model is scaled to. The
    /// callback fires once per iteration; returning `true` stops early.
    pub fn estimate(
        &self,
        measurements: &[Measurement],
        total: f64,
        mut callback: impl FnMut(CallbackArgs<'_>) -> bool,
    ) -> Result<FittedModel> {
        if measurements.is_empty() {
            return Err(DpError::invalid("at least one measurement is required"));
        }
        if !total.is_finite() || total <= 0.0 {
            return Err(DpError::invalid("total must be positive"));
        }

        // Normalized targets, one per measurement.
        let mut targets = Vec::with_capacity(measurements.len());
        let mut entries = Vec::with_capacity(measurements.len());
        for m in measurements {
            if !m.weight.is_finite() || m.weight <= 0.0 {
                return Err(DpError::invalid("measurement weight must be positive"));
            }
            let cells = self.domain.size(&m.clique)?;
            if m.target.len() != cells {
                return Err(DpError::invalid(format!(
                    "measurement over {:?} has {} cells, expected {cells}",
                    m.clique,
                    m.target.len()
                )));
            }
            if m.target.iter().any(|v| !v.is_finite()) {
                return Err(DpError::numerical(format!(
                    "measurement over {:?} contains non-finite cells",
                    m.clique
                )));
            }

            let clamped = m.target.mapv(|v| v.max(0.0));
            let mass = clamped.sum();
            if mass <= 0.0 {
                return Err(DpError::numerical(format!(
                    "measurement over {:?} has no mass",
                    m.clique
                )));
            }
            let target = clamped.mapv(|v| v / mass);

            // Warm start from the smoothed measurement itself.
            let smoothed = target.mapv(|p| p + SMOOTHING);
            let smoothed_mass = smoothed.sum();
            let init = smoothed.mapv(|p| p / smoothed_mass);

            let proj = self.domain.project(&m.clique)?;
            entries.push((m.clique.clone(), Marginal::new(proj, init)?));
            targets.push(target);
        }

        let mut mu = CliqueVector::new(entries);
        let pairs = shared_pairs(measurements);

        info!(
            measurements = measurements.len(),
            pairs = pairs.len(),
            warmup = self.warmup,
            iters = self.iters,
            "fitting factored model"
        );

        for _ in 0..self.warmup {
            reconcile(&mut mu, &pairs)?;
        }

        for step in 0..self.iters {
            // Exponentiated-gradient step on each measured clique.
            for (i, (m, target)) in measurements.iter().zip(&targets).enumerate() {
                let marginal = mu.marginal_mut(i);
                let values = marginal.datavector_mut();
                for (v, &y) in values.iter_mut().zip(target.iter()) {
                    let grad = m.weight * (*v - y);
                    *v *= (-self.stepsize * grad).exp();
                }
                let mass = values.sum();
                if !mass.is_finite() || mass <= 0.0 {
                    return Err(DpError::numerical(
                        "mirror-descent update produced a degenerate marginal",
                    ));
                }
                values.mapv_inplace(|v| v / mass);
            }

            reconcile(&mut mu, &pairs)?;

            let loss = loss_value(&mu, measurements, &targets);
            debug!(step, loss, "estimator step");
            if callback(CallbackArgs {
                step,
                loss,
                marginals: &mu,
            }) {
                break;
            }
        }

        Ok(FittedModel {
            marginals: mu,
            total,
        })
    }
}

/// Weighted squared-error loss against the normalized targets.
fn loss_value(mu: &CliqueVector, measurements: &[Measurement], targets: &[Array1<f64>]) -> f64 {
    let mut loss = 0.0;
    for (i, (m, target)) in measurements.iter().zip(targets).enumerate() {
        let values = mu.marginal_at(i).datavector();
        let mut sq = 0.0;
        for (&v, &y) in values.iter().zip(target.iter()) {
            sq += (v - y) * (v - y);
        }
        loss += 0.5 * m.weight * sq;
    }
    loss
}

/// Pairs of measurement indices with a non-empty attribute intersection.
fn shared_pairs(measurements: &[Measurement]) -> Vec<(usize, usize, Clique)> {
    let mut pairs = Vec::new();
    for i in 0..measurements.len() {
        for j in (i + 1)..measurements.len() {
            let shared: Clique = measurements[i]
                .clique
                .iter()
                .filter(|a| measurements[j].clique.contains(a))
                .cloned()
                .collect();
            if !shared.is_empty() {
                pairs.push((i, j, shared));
            }
        }
    }
    pairs
}

/// One local-consistency sweep: every overlapping pair agrees on the
/// average of its shared sub-marginal afterwards.
fn reconcile(mu: &mut CliqueVector, pairs: &[(usize, usize, Clique)]) -> Result<()> {
    for (i, j, shared) in pairs {
        let p_i = mu.marginal_at(*i).project(shared)?;
        let p_j = mu.marginal_at(*j).project(shared)?;
        let avg: Array1<f64> = p_i
            .datavector()
            .iter()
            .zip(p_j.datavector().iter())
            .map(|(&a, &b)| 0.5 * (a + b))
            .collect();

        rescale_to_shared(mu.marginal_mut(*i), shared, &p_i, &avg);
        rescale_to_shared(mu.marginal_mut(*j), shared, &p_j, &avg);
    }
    Ok(())
}

/// Multiplicatively rescale `marginal` so its sub-marginal over `shared`
/// becomes `avg`.
fn rescale_to_shared(
    marginal: &mut Marginal,
    shared: &[String],
    current: &Marginal,
    avg: &Array1<f64>,
) {
    let domain = marginal.domain().clone();
    let positions: Vec<usize> = shared
        .iter()
        .map(|a| domain.position(a).expect("shared attrs come from the clique"))
        .collect();
    let strides = domain.strides();
    let shape = domain.shape().to_vec();
    let shared_strides = current.domain().strides();

    let values = marginal.datavector_mut();
    for cell in 0..values.len() {
        let mut s = 0;
        for (&pos, &stride) in positions.iter().zip(&shared_strides) {
            s += (cell / strides[pos] % shape[pos]) * stride;
        }
        let mass = current.datavector()[s];
        if mass > f64::MIN_POSITIVE {
            values[cell] *= avg[s] / mass;
        }
    }
}

/// A fitted factored model, read-only after estimation.
pub struct FittedModel {
    marginals: CliqueVector,
    total: f64,
}

impl FittedModel {
    /// The record count the model is scaled to.
    pub fn total(&self) -> f64 {
        self.total
    }

    /// The fitted marginals at unit mass per clique.
    pub fn marginals(&self) -> &CliqueVector {
        &self.marginals
    }
}

impl MarginalSource for FittedModel {
    /// Project onto any subset of a tracked clique, in counts.
    fn marginal(&self, clique: &[String]) -> Result<Marginal> {
        Ok(self.marginals.marginal(clique)?.scaled(self.total))
    }
}
