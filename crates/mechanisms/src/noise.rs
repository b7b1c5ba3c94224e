//! Noise primitives for the synthesis mechanisms.

use ndarray::Array1;
use rand::Rng;
use rand_distr::{Distribution, Gumbel};

/// Add i.i.d. Gumbel noise with the given scale to a vector in-place.
pub fn add_gumbel_noise<R: Rng>(values: &mut Array1<f64>, scale: f64, rng: &mut R) {
    if !scale.is_finite() || scale <= 0.0 || values.is_empty() {
        return;
    }

    let dist = match Gumbel::new(0.0, scale) {
        Ok(d) => d,
        Err(_) => return,
    };

    values.mapv_inplace(|x| {
        if x.is_finite() {
            x + dist.sample(rng)
        } else {
            x
        }
    });
}

/// Exponential mechanism over a finite scored outcome set.
///
/// Selection uses the Gumbel-max trick: adding Gumbel(2Δ/ε) noise to each
/// score and taking the argmax samples outcome `i` with probability
/// proportional to exp(ε·score_i / 2Δ).
#[derive(Clone, Debug)]
pub struct ExponentialMechanism {
    /// Privacy parameter spent per invocation.
    pub epsilon: f64,
    /// Score sensitivity bound.
    pub sensitivity: f64,
}

impl ExponentialMechanism {
    /// Create a new exponential mechanism.
    pub fn new(epsilon: f64, sensitivity: f64) -> Self {
        Self {
            epsilon,
            sensitivity,
        }
    }

    /// Get the Gumbel noise scale.
    pub fn scale(&self) -> f64 {
        2.0 * self.sensitivity / self.epsilon
    }

    /// Select an outcome index given per-outcome scores.
    ///
    /// Returns `None` when the score list is empty or contains no finite
    /// entry.
    pub fn select<R: Rng>(&self, scores: &[f64], rng: &mut R) -> Option<usize> {
        let dist = Gumbel::new(0.0, self.scale()).ok()?;

        let mut best = None;
        let mut best_value = f64::NEG_INFINITY;
        for (i, &score) in scores.iter().enumerate() {
            if !score.is_finite() {
                continue;
            }
            let perturbed = score + dist.sample(rng);
            if perturbed > best_value {
                best_value = perturbed;
                best = Some(i);
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn gumbel_noise_is_deterministic() {
        let mut r1 = ChaCha8Rng::seed_from_u64(42);
        let mut v1 = Array1::zeros(100);
        add_gumbel_noise(&mut v1, 1.0, &mut r1);

        let mut r2 = ChaCha8Rng::seed_from_u64(42);
        let mut v2 = Array1::zeros(100);
        add_gumbel_noise(&mut v2, 1.0, &mut r2);

        assert_eq!(v1, v2);
    }

    #[test]
    fn nonpositive_scale_is_a_noop() {
        let mut v = Array1::from_vec(vec![1.0, 2.0]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        add_gumbel_noise(&mut v, 0.0, &mut rng);
        assert_eq!(v, Array1::from_vec(vec![1.0, 2.0]));
    }

    #[test]
    fn select_prefers_high_scores() {
        let mech = ExponentialMechanism::new(2.0, 0.1);
        let scores = [0.0, 0.0, 1.0];
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let mut hits = 0;
        let trials = 2_000;
        for _ in 0..trials {
            if mech.select(&scores, &mut rng) == Some(2) {
                hits += 1;
            }
        }
        // exp(eps / 2Δ) heavily favors the last outcome.
        assert!(hits as f64 / trials as f64 > 0.9);
    }

    #[test]
    fn select_handles_degenerate_inputs() {
        let mech = ExponentialMechanism::new(1.0, 1.0);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(mech.select(&[], &mut rng), None);
        assert_eq!(mech.select(&[f64::NAN], &mut rng), None);
    }
}
