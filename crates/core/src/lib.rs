//! Core primitives for marginal-synthesis benchmarks.
//!
//! This crate provides the dataset/domain model, marginal projection, and
//! the sampling and distance primitives shared by the mechanism and
//! inference crates.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod dataset;
pub mod domain;
pub mod error;
pub mod marginal;
pub mod metrics;
pub mod sampling;

pub use dataset::Dataset;
pub use domain::{Clique, Domain};
pub use error::{DpError, Result};
pub use marginal::{Marginal, MarginalSource};
pub use metrics::{l1_distance, linf_distance};
pub use sampling::{combinations, sample_without_replacement};

/// Common imports for downstream users.
pub mod prelude {
    pub use crate::{
        combinations, l1_distance, linf_distance, sample_without_replacement, Clique, Dataset,
        Domain, DpError, Marginal, MarginalSource, Result,
    };
}
