//! Distance metrics between frequency vectors.

use ndarray::Array1;

use crate::error::{DpError, Result};

fn check_lengths(x: &Array1<f64>, y: &Array1<f64>) -> Result<()> {
    if x.len() != y.len() {
        return Err(DpError::invalid(format!(
            "vector lengths differ: {} vs {}",
            x.len(),
            y.len()
        )));
    }
    Ok(())
}

/// L1 distance: the sum of absolute elementwise differences.
///
/// NaN inputs propagate to a NaN result.
pub fn l1_distance(x: &Array1<f64>, y: &Array1<f64>) -> Result<f64> {
    check_lengths(x, y)?;
    let mut sum = 0.0;
    for (&a, &b) in x.iter().zip(y.iter()) {
        let d = (a - b).abs();
        if d.is_nan() {
            return Ok(f64::NAN);
        }
        sum += d;
    }
    Ok(sum)
}

/// L-infinity distance: the maximum absolute elementwise difference.
///
/// NaN inputs propagate to a NaN result.
pub fn linf_distance(x: &Array1<f64>, y: &Array1<f64>) -> Result<f64> {
    check_lengths(x, y)?;
    let mut max = 0.0;
    for (&a, &b) in x.iter().zip(y.iter()) {
        let d = (a - b).abs();
        if d.is_nan() {
            return Ok(f64::NAN);
        }
        if d > max {
            max = d;
        }
    }
    Ok(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use proptest::prelude::*;

    #[test]
    fn known_distances() {
        let x = array![0.5, 0.3, 0.2];
        let y = array![0.2, 0.3, 0.5];
        assert!((l1_distance(&x, &y).unwrap() - 0.6).abs() < 1e-12);
        assert!((linf_distance(&x, &y).unwrap() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn zero_iff_equal() {
        let x = array![0.25, 0.75];
        assert_eq!(l1_distance(&x, &x).unwrap(), 0.0);
        assert_eq!(linf_distance(&x, &x).unwrap(), 0.0);

        let y = array![0.26, 0.74];
        assert!(l1_distance(&x, &y).unwrap() > 0.0);
        assert!(linf_distance(&x, &y).unwrap() > 0.0);
    }

    #[test]
    fn length_mismatch_is_an_error() {
        let x = array![1.0];
        let y = array![1.0, 2.0];
        assert!(l1_distance(&x, &y).is_err());
        assert!(linf_distance(&x, &y).is_err());
    }

    #[test]
    fn nan_propagates() {
        let x = array![f64::NAN, 0.0];
        let y = array![0.0, 0.0];
        assert!(l1_distance(&x, &y).unwrap().is_nan());
        assert!(linf_distance(&x, &y).unwrap().is_nan());
    }

    proptest! {
        #[test]
        fn distances_between_distributions_are_bounded(
            (raw, raw2) in (2usize..16).prop_flat_map(|n| {
                (
                    prop::collection::vec(0.0f64..1.0, n),
                    prop::collection::vec(0.0f64..1.0, n),
                )
            }),
        ) {
            let sum: f64 = raw.iter().sum::<f64>().max(1e-9);
            let sum2: f64 = raw2.iter().sum::<f64>().max(1e-9);
            let x = Array1::from_iter(raw.iter().map(|v| v / sum));
            let y = Array1::from_iter(raw2.iter().map(|v| v / sum2));

            let l1 = l1_distance(&x, &y).unwrap();
            let linf = linf_distance(&x, &y).unwrap();
            prop_assert!((0.0..=2.0 + 1e-9).contains(&l1));
            prop_assert!((0.0..=1.0 + 1e-9).contains(&linf));
            prop_assert!(linf <= l1 + 1e-12);
        }

        #[test]
        fn distances_are_symmetric(
            a in prop::collection::vec(0.0f64..10.0, 4),
            b in prop::collection::vec(0.0f64..10.0, 4),
        ) {
            let x = Array1::from_vec(a);
            let y = Array1::from_vec(b);
            prop_assert_eq!(l1_distance(&x, &y).unwrap(), l1_distance(&y, &x).unwrap());
            prop_assert_eq!(linf_distance(&x, &y).unwrap(), linf_distance(&y, &x).unwrap());
        }
    }
}
