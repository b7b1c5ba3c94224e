//! Combination enumeration and seeded subset sampling.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{DpError, Result};

/// Enumerate all `k`-element combinations of `0..n` in lexicographic order.
pub fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    if k == 0 {
        out.push(Vec::new());
        return out;
    }
    if k > n {
        return out;
    }

    let mut idx: Vec<usize> = (0..k).collect();
    loop {
        out.push(idx.clone());

        // Rightmost position that can still advance.
        let mut i = k;
        while i > 0 && idx[i - 1] == n - k + (i - 1) {
            i -= 1;
        }
        if i == 0 {
            return out;
        }
        idx[i - 1] += 1;
        for j in i..k {
            idx[j] = idx[j - 1] + 1;
        }
    }
}

/// Draw `k` distinct indices from `0..n` uniformly at random.
///
/// Errors when `k` exceeds the population size; requesting more items than
/// exist is a caller bug, not something to truncate silently.
pub fn sample_without_replacement<R: Rng>(n: usize, k: usize, rng: &mut R) -> Result<Vec<usize>> {
    if k > n {
        return Err(DpError::invalid(format!(
            "cannot draw {k} items from a population of {n}"
        )));
    }
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    indices.truncate(k);
    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn combinations_are_lexicographic() {
        assert_eq!(
            combinations(4, 3),
            vec![vec![0, 1, 2], vec![0, 1, 3], vec![0, 2, 3], vec![1, 2, 3]]
        );
    }

    #[test]
    fn combination_count_is_binomial() {
        // C(6, 3) = 20.
        assert_eq!(combinations(6, 3).len(), 20);
        assert_eq!(combinations(3, 5).len(), 0);
        assert_eq!(combinations(3, 0).len(), 1);
    }

    #[test]
    fn sample_is_deterministic_for_fixed_seed() {
        let mut r1 = ChaCha8Rng::seed_from_u64(7);
        let mut r2 = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(
            sample_without_replacement(100, 10, &mut r1).unwrap(),
            sample_without_replacement(100, 10, &mut r2).unwrap()
        );
    }

    #[test]
    fn sample_has_distinct_elements() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut s = sample_without_replacement(50, 20, &mut rng).unwrap();
        s.sort_unstable();
        s.dedup();
        assert_eq!(s.len(), 20);
    }

    #[test]
    fn oversized_request_is_an_error() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(sample_without_replacement(10, 11, &mut rng).is_err());
    }
}
