//! Result assembly and CSV sink.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Header of the accumulated result file.
pub const CSV_HEADER: &str = "iters,epsilon,seed,FEM_L1,PGM_L1,FEM_Linf,PGM_Linf";

/// One benchmark run's parameters and metrics.
#[derive(Clone, Debug)]
pub struct ResultRow {
    /// Optimization iteration count.
    pub iters: usize,
    /// Privacy budget.
    pub epsilon: f64,
    /// Random seed.
    pub seed: u64,
    /// FEM mean halved L1 error.
    pub fem_l1: f64,
    /// PGM mean halved L1 error.
    pub pgm_l1: f64,
    /// FEM worst-case cell error.
    pub fem_linf: f64,
    /// PGM worst-case cell error.
    pub pgm_linf: f64,
}

impl ResultRow {
    fn csv_line(&self) -> String {
        format!(
            "{},{},{},{},{},{},{}",
            self.iters,
            self.epsilon,
            self.seed,
            self.fem_l1,
            self.pgm_l1,
            self.fem_linf,
            self.pgm_linf
        )
    }
}

impl fmt::Display for ResultRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{CSV_HEADER}")?;
        write!(f, "{}", self.csv_line())
    }
}

/// Append a result row to the CSV at `path`.
///
/// The header is written only when the file is currently empty, so N runs
/// appending to one path produce one header line followed by N data lines.
pub fn append_csv(path: &Path, row: &ResultRow) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if file.metadata()?.len() == 0 {
        writeln!(file, "{CSV_HEADER}")?;
    }
    writeln!(file, "{}", row.csv_line())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(seed: u64) -> ResultRow {
        ResultRow {
            iters: 50,
            epsilon: 1.0,
            seed,
            fem_l1: 0.25,
            pgm_l1: 0.125,
            fem_linf: 0.5,
            pgm_linf: 0.0625,
        }
    }

    #[test]
    fn repeated_appends_write_the_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");

        for seed in 0..3 {
            append_csv(&path, &row(seed)).unwrap();
        }

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], CSV_HEADER);
        assert!(lines[1].starts_with("50,1,0,"));
        assert!(lines[3].starts_with("50,1,2,"));
    }

    #[test]
    fn appending_to_an_existing_file_keeps_prior_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");

        append_csv(&path, &row(0)).unwrap();
        let first = std::fs::read_to_string(&path).unwrap();
        append_csv(&path, &row(1)).unwrap();
        let second = std::fs::read_to_string(&path).unwrap();

        assert!(second.starts_with(&first));
        assert_eq!(second.lines().count(), first.lines().count() + 1);
    }

    #[test]
    fn display_prints_header_and_row() {
        let text = row(7).to_string();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        assert_eq!(lines.next(), Some("50,1,7,0.25,0.125,0.5,0.0625"));
    }
}
