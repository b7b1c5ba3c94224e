//! Differentially private data synthesis mechanisms.
//!
//! Provides the FEM (follow-the-perturbed-leader exponential mechanism)
//! synthesizer benchmarked by the driver, plus the noise primitives it is
//! built from.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fem;
pub mod noise;

pub use fem::Fem;
pub use noise::{add_gumbel_noise, ExponentialMechanism};

/// Common imports for downstream users.
pub mod prelude {
    pub use crate::{add_gumbel_noise, ExponentialMechanism, Fem};
}
