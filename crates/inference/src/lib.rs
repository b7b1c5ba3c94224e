//! Factored graphical-model estimation of marginal measurements.
//!
//! Fits per-clique marginal distributions to (noisy or synthetic) marginal
//! measurements via warm-started mirror descent over the local polytope,
//! reporting progress through a per-step callback.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod clique_vector;
pub mod factored;

pub use clique_vector::CliqueVector;
pub use factored::{CallbackArgs, FactoredInference, FittedModel, Measurement};

/// Common imports for downstream users.
pub mod prelude {
    pub use crate::{CallbackArgs, CliqueVector, FactoredInference, FittedModel, Measurement};
}
