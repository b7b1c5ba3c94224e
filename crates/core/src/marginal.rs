//! Projected marginal frequency vectors.

use ndarray::Array1;

use crate::domain::Domain;
use crate::error::{DpError, Result};

/// The frequency vector of a dataset (or model) projected onto a clique.
///
/// Cells are indexed in row-major order over the projected domain.
#[derive(Clone, Debug, PartialEq)]
pub struct Marginal {
    domain: Domain,
    counts: Array1<f64>,
}

impl Marginal {
    /// Create a marginal, checking the vector length against the domain.
    pub fn new(domain: Domain, counts: Array1<f64>) -> Result<Self> {
        let cells = domain.cell_count()?;
        if counts.len() != cells {
            return Err(DpError::invalid(format!(
                "frequency vector has {} cells, domain has {}",
                counts.len(),
                cells
            )));
        }
        Ok(Self { domain, counts })
    }

    /// The projected domain this marginal is defined over.
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// The raw frequency vector.
    pub fn datavector(&self) -> &Array1<f64> {
        &self.counts
    }

    /// Mutable access to the frequency vector, for estimator updates.
    pub fn datavector_mut(&mut self) -> &mut Array1<f64> {
        &mut self.counts
    }

    /// Consume the marginal, keeping only the frequency vector.
    pub fn into_datavector(self) -> Array1<f64> {
        self.counts
    }

    /// Total mass of the frequency vector.
    pub fn total(&self) -> f64 {
        self.counts.sum()
    }

    /// L1-normalize into a probability distribution.
    ///
    /// Errors when the total mass is zero or not finite, rather than
    /// producing NaN cells.
    pub fn distribution(&self) -> Result<Array1<f64>> {
        let total = self.total();
        if !total.is_finite() || total <= 0.0 {
            return Err(DpError::numerical(format!(
                "cannot normalize marginal with total mass {total}"
            )));
        }
        Ok(self.counts.mapv(|c| c / total))
    }

    /// Marginalize further onto a subset of this marginal's attributes.
    pub fn project(&self, clique: &[String]) -> Result<Marginal> {
        if clique == self.domain.attrs() {
            return Ok(self.clone());
        }
        let sub = self.domain.project(clique)?;
        let positions: Vec<usize> = clique
            .iter()
            .map(|a| self.domain.position(a).expect("attr checked by project"))
            .collect();
        let strides = self.domain.strides();
        let shape = self.domain.shape();
        let sub_strides = sub.strides();

        let mut counts = Array1::zeros(sub.cell_count()?);
        for (cell, &mass) in self.counts.iter().enumerate() {
            let mut target = 0;
            for (&pos, &stride) in positions.iter().zip(&sub_strides) {
                target += (cell / strides[pos] % shape[pos]) * stride;
            }
            counts[target] += mass;
        }
        Marginal::new(sub, counts)
    }

    /// A copy with every cell scaled by `factor`.
    pub fn scaled(&self, factor: f64) -> Marginal {
        Marginal {
            domain: self.domain.clone(),
            counts: self.counts.mapv(|c| c * factor),
        }
    }
}

/// Anything that can produce the marginal distribution over a clique.
///
/// This is the seam the metric evaluator works against: datasets, fitted
/// models, and clique-vector snapshots all answer marginal queries.
pub trait MarginalSource {
    /// Project onto `clique` and return the resulting frequency vector.
    fn marginal(&self, clique: &[String]) -> Result<Marginal>;
}
