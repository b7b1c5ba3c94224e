//! Experiment harness for the FEM vs PGM benchmark.
//!
//! The heavy lifting lives in the mechanism and inference crates; this
//! crate owns the harness-only pieces: clique selection, error evaluation,
//! the step-size schedule, and the result sink.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cliques;
pub mod evaluate;
pub mod results;
pub mod schedule;

pub use cliques::{feasible_cliques, select_cliques, CLIQUE_ARITY, CLIQUE_COUNT};
pub use evaluate::{marginal_errors, ErrorSummary};
pub use results::{append_csv, ResultRow, CSV_HEADER};
pub use schedule::stepsize_for_epsilon;
