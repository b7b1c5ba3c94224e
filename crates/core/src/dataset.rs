//! Integer-coded tabular datasets.

use std::path::Path;

use ndarray::Array1;

use crate::domain::{Clique, Domain};
use crate::error::{DpError, Result};
use crate::marginal::{Marginal, MarginalSource};

/// A table of records over a fixed attribute domain.
///
/// Each record stores one integer code per domain attribute, in schema
/// order. Datasets are immutable once constructed.
#[derive(Clone, Debug)]
pub struct Dataset {
    domain: Domain,
    rows: Vec<Vec<usize>>,
}

impl Dataset {
    /// Create a dataset, validating every code against the domain.
    pub fn new(domain: Domain, rows: Vec<Vec<usize>>) -> Result<Self> {
        let shape = domain.shape();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != domain.len() {
                return Err(DpError::dataset(format!(
                    "record {i} has {} values, domain has {} attributes",
                    row.len(),
                    domain.len()
                )));
            }
            for ((&v, &card), attr) in row.iter().zip(shape).zip(domain.attrs()) {
                if v >= card {
                    return Err(DpError::dataset(format!(
                        "record {i}: value {v} out of range for attribute {attr:?} (cardinality {card})"
                    )));
                }
            }
        }
        Ok(Self { domain, rows })
    }

    /// Load a dataset from a `<name>.csv` / `<name>-domain.json` pair.
    ///
    /// The CSV header maps columns to schema attributes; columns absent from
    /// the schema are ignored, schema attributes absent from the header are
    /// an error.
    pub fn load(data_path: &Path, domain_path: &Path) -> Result<Self> {
        let domain = Domain::load(domain_path)?;

        let mut reader = csv::Reader::from_path(data_path)
            .map_err(|e| DpError::dataset(format!("cannot open {}: {e}", data_path.display())))?;
        let headers = reader
            .headers()
            .map_err(|e| DpError::dataset(format!("malformed CSV header: {e}")))?
            .clone();

        let mut columns = Vec::with_capacity(domain.len());
        for attr in domain.attrs() {
            let col = headers
                .iter()
                .position(|h| h == attr.as_str())
                .ok_or_else(|| DpError::dataset(format!("CSV is missing column {attr:?}")))?;
            columns.push(col);
        }

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record =
                record.map_err(|e| DpError::dataset(format!("malformed CSV record {i}: {e}")))?;
            let mut row = Vec::with_capacity(columns.len());
            for (&col, attr) in columns.iter().zip(domain.attrs()) {
                let field = record.get(col).ok_or_else(|| {
                    DpError::dataset(format!("record {i} is missing column {attr:?}"))
                })?;
                let value: usize = field.trim().parse().map_err(|_| {
                    DpError::dataset(format!(
                        "record {i}, attribute {attr:?}: {field:?} is not an integer code"
                    ))
                })?;
                row.push(value);
            }
            rows.push(row);
        }

        Self::new(domain, rows)
    }

    /// The attribute domain.
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Number of records.
    pub fn records(&self) -> usize {
        self.rows.len()
    }

    /// The integer-coded records, in file order.
    pub fn rows(&self) -> &[Vec<usize>] {
        &self.rows
    }

    /// Project onto a clique, counting records per joint cell.
    pub fn project(&self, clique: &[String]) -> Result<Marginal> {
        let sub = self.domain.project(clique)?;
        let positions: Vec<usize> = clique
            .iter()
            .map(|a| self.domain.position(a).expect("attr checked by project"))
            .collect();
        let strides = sub.strides();

        let mut counts = Array1::zeros(sub.cell_count()?);
        for row in &self.rows {
            let mut cell = 0;
            for (&pos, &stride) in positions.iter().zip(&strides) {
                cell += row[pos] * stride;
            }
            counts[cell] += 1.0;
        }
        Marginal::new(sub, counts)
    }

    /// All cliques of the given arity, in schema-enumeration order.
    pub fn all_cliques(&self, arity: usize) -> Vec<Clique> {
        crate::sampling::combinations(self.domain.len(), arity)
            .into_iter()
            .map(|idx| {
                idx.into_iter()
                    .map(|i| self.domain.attrs()[i].clone())
                    .collect()
            })
            .collect()
    }
}

impl MarginalSource for Dataset {
    fn marginal(&self, clique: &[String]) -> Result<Marginal> {
        self.project(clique)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::io::Write;

    pub(crate) fn toy_dataset() -> Dataset {
        let domain = Domain::new(
            vec!["A".into(), "B".into(), "C".into()],
            vec![2, 3, 2],
        )
        .unwrap();
        let rows = vec![
            vec![0, 0, 0],
            vec![0, 1, 1],
            vec![1, 2, 0],
            vec![1, 2, 1],
            vec![0, 0, 0],
        ];
        Dataset::new(domain, rows).unwrap()
    }

    #[test]
    fn out_of_range_code_rejected() {
        let domain = Domain::new(vec!["A".into()], vec![2]).unwrap();
        assert!(Dataset::new(domain, vec![vec![2]]).is_err());
    }

    #[test]
    fn projection_counts_records() {
        let data = toy_dataset();
        let a = data.project(&["A".into()]).unwrap();
        assert_eq!(a.datavector(), &array![3.0, 2.0]);
        assert_eq!(a.total(), data.records() as f64);
    }

    #[test]
    fn pairwise_projection_matches_manual_count() {
        let data = toy_dataset();
        let ab = data.project(&["A".into(), "B".into()]).unwrap();
        // Cells in row-major (A, B) order.
        assert_eq!(ab.datavector(), &array![2.0, 1.0, 0.0, 0.0, 0.0, 2.0]);
    }

    #[test]
    fn marginal_subprojection_matches_direct_projection() {
        let data = toy_dataset();
        let abc = data
            .project(&["A".into(), "B".into(), "C".into()])
            .unwrap();
        let via_marginal = abc.project(&["A".into(), "C".into()]).unwrap();
        let direct = data.project(&["A".into(), "C".into()]).unwrap();
        assert_eq!(via_marginal, direct);
    }

    #[test]
    fn load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let domain_path = dir.path().join("toy-domain.json");
        std::fs::write(&domain_path, r#"{"A": 2, "B": 3}"#).unwrap();

        let data_path = dir.path().join("toy.csv");
        let mut f = std::fs::File::create(&data_path).unwrap();
        // An extra column not in the schema is ignored.
        writeln!(f, "B,A,junk").unwrap();
        writeln!(f, "2,0,9").unwrap();
        writeln!(f, "1,1,9").unwrap();
        drop(f);

        let data = Dataset::load(&data_path, &domain_path).unwrap();
        assert_eq!(data.records(), 2);
        assert_eq!(data.rows(), [vec![0, 2], vec![1, 1]]);
    }

    #[test]
    fn load_rejects_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let domain_path = dir.path().join("toy-domain.json");
        std::fs::write(&domain_path, r#"{"A": 2, "B": 3}"#).unwrap();
        let data_path = dir.path().join("toy.csv");
        std::fs::write(&data_path, "A\n0\n").unwrap();
        assert!(Dataset::load(&data_path, &domain_path).is_err());
    }

    #[test]
    fn all_cliques_enumerates_in_order() {
        let data = toy_dataset();
        let cliques = data.all_cliques(2);
        assert_eq!(
            cliques,
            vec![
                vec!["A".to_string(), "B".to_string()],
                vec!["A".to_string(), "C".to_string()],
                vec!["B".to_string(), "C".to_string()],
            ]
        );
    }
}
