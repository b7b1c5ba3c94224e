//! Clique-indexed collections of marginals.

use hdsynth_core::{Clique, Dataset, DpError, Marginal, MarginalSource, Result};

/// An ordered collection of marginals, one per tracked clique.
#[derive(Clone, Debug)]
pub struct CliqueVector {
    entries: Vec<(Clique, Marginal)>,
}

impl CliqueVector {
    /// Build from explicit (clique, marginal) pairs.
    pub fn new(entries: Vec<(Clique, Marginal)>) -> Self {
        Self { entries }
    }

    /// Project a dataset onto every clique in the list.
    pub fn from_dataset(data: &Dataset, cliques: &[Clique]) -> Result<Self> {
        let entries = cliques
            .iter()
            .map(|cl| Ok((cl.clone(), data.project(cl)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    /// Number of tracked cliques.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no cliques are tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over (clique, marginal) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &(Clique, Marginal)> {
        self.entries.iter()
    }

    /// The marginal tracked for exactly this clique, if any.
    pub fn get(&self, clique: &[String]) -> Option<&Marginal> {
        self.entries
            .iter()
            .find(|(cl, _)| cl.as_slice() == clique)
            .map(|(_, m)| m)
    }

    /// The tracked marginal at `index`, in insertion order.
    pub(crate) fn marginal_at(&self, index: usize) -> &Marginal {
        &self.entries[index].1
    }

    /// Mutable access to a tracked marginal by position.
    pub(crate) fn marginal_mut(&mut self, index: usize) -> &mut Marginal {
        &mut self.entries[index].1
    }

    /// A copy with every marginal scaled by `factor`.
    pub fn scaled(&self, factor: f64) -> CliqueVector {
        Self {
            entries: self
                .entries
                .iter()
                .map(|(cl, m)| (cl.clone(), m.scaled(factor)))
                .collect(),
        }
    }
}

impl MarginalSource for CliqueVector {
    /// Answer a clique query from the first tracked clique containing it.
    fn marginal(&self, clique: &[String]) -> Result<Marginal> {
        for (cl, m) in &self.entries {
            if clique.iter().all(|a| cl.contains(a)) {
                return m.project(clique);
            }
        }
        Err(DpError::invalid(format!(
            "no tracked clique contains {clique:?}"
        )))
    }
}
