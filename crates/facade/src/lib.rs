//! Facade crate re-exporting stable APIs.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use hdsynth_core as core;
pub use hdsynth_inference as inference;
pub use hdsynth_mechanisms as mechanisms;

pub use hdsynth_core::{
    combinations, l1_distance, linf_distance, sample_without_replacement, Clique, Dataset, Domain,
    DpError, Marginal, MarginalSource, Result,
};
pub use hdsynth_inference::{CallbackArgs, CliqueVector, FactoredInference, FittedModel, Measurement};
pub use hdsynth_mechanisms::{add_gumbel_noise, ExponentialMechanism, Fem};

/// Convenience prelude covering the benchmark building blocks.
pub mod prelude {
    pub use crate::{
        combinations, l1_distance, linf_distance, sample_without_replacement, CallbackArgs, Clique,
        CliqueVector, Dataset, Domain, DpError, ExponentialMechanism, FactoredInference, Fem,
        FittedModel, Marginal, MarginalSource, Measurement, Result,
    };
}
