//! Delay selection from average mutual information.
//!
//! AMI(τ) is estimated from an equal-width joint histogram of `x(t)` and
//! `x(t+τ)`. The delay is the first interior local minimum of the curve; when
//! the curve has none, the global minimum is used instead.

use crate::core::{DegenerateInput, Estimate};

/// Histogram bins per axis used by the study.
pub const DEFAULT_BINS: usize = 32;

/// Upper limit on the delay search.
pub const DEFAULT_MAX_DELAY: usize = 50;

/// Mutual information (bits) between `signal[..n-τ]` and `signal[τ..]`.
///
/// Returns NaN when fewer than two pairs remain.
pub fn average_mutual_information(signal: &[f64], delay: usize, bins: usize) -> f64 {
    if bins == 0 || delay == 0 || signal.len() < delay + 2 {
        return f64::NAN;
    }

    let x = &signal[..signal.len() - delay];
    let y = &signal[delay..];
    let n = x.len();

    let x_bins = bin_indices(x, bins);
    let y_bins = bin_indices(y, bins);

    let mut joint = vec![0usize; bins * bins];
    let mut x_hist = vec![0usize; bins];
    let mut y_hist = vec![0usize; bins];
    for (&bx, &by) in x_bins.iter().zip(y_bins.iter()) {
        joint[bx * bins + by] += 1;
        x_hist[bx] += 1;
        y_hist[by] += 1;
    }

    let total = n as f64;
    let mut mi = 0.0;
    for i in 0..bins {
        for j in 0..bins {
            let count = joint[i * bins + j];
            if count == 0 {
                continue;
            }
            let p_xy = count as f64 / total;
            let p_x = x_hist[i] as f64 / total;
            let p_y = y_hist[j] as f64 / total;
            mi += p_xy * (p_xy / (p_x * p_y)).log2();
        }
    }

    mi
}

/// Equal-width bin index for each value; the maximum falls in the last bin.
fn bin_indices(values: &[f64], bins: usize) -> Vec<usize> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if range <= 0.0 {
        return vec![0; values.len()];
    }

    values
        .iter()
        .map(|&v| {
            let bin = ((v - min) / range * bins as f64).floor() as usize;
            bin.min(bins - 1)
        })
        .collect()
}

/// AMI for τ = 1..=max_delay, stopping once fewer than two pairs remain.
pub fn ami_curve(signal: &[f64], max_delay: usize, bins: usize) -> Vec<f64> {
    (1..=max_delay)
        .take_while(|&tau| signal.len() >= tau + 2)
        .map(|tau| average_mutual_information(signal, tau, bins))
        .collect()
}

/// Index of the first interior local minimum of `curve`.
///
/// A flat valley (equal neighbouring values bounded by larger values on both
/// sides) resolves to its middle index, rounding down.
pub fn first_local_minimum(curve: &[f64]) -> Option<usize> {
    let n = curve.len();
    if n < 3 {
        return None;
    }

    let mut i = 1;
    while i < n - 1 {
        if curve[i] < curve[i - 1] {
            let mut ahead = i + 1;
            while ahead < n - 1 && curve[ahead] == curve[i] {
                ahead += 1;
            }
            if curve[ahead] > curve[i] {
                return Some((i + ahead - 1) / 2);
            }
            i = ahead;
        } else {
            i += 1;
        }
    }

    None
}

/// Select the embedding delay for `signal`.
///
/// The search covers τ = 1..=min(max_delay, n/2).
pub fn estimate_delay(signal: &[f64], max_delay: usize, bins: usize) -> Estimate<usize> {
    let max_tau = max_delay.min(signal.len() / 2);
    let curve = ami_curve(signal, max_tau, bins);

    if curve.is_empty() {
        return Estimate::Fallback {
            value: 1,
            reason: DegenerateInput::TooShort { len: signal.len() },
        };
    }

    if let Some(idx) = first_local_minimum(&curve) {
        return Estimate::Computed(idx + 1);
    }

    let global = curve
        .iter()
        .enumerate()
        .fold((0, f64::INFINITY), |(best, best_v), (i, &v)| {
            if v < best_v {
                (i, v)
            } else {
                (best, best_v)
            }
        })
        .0;

    Estimate::Fallback {
        value: global + 1,
        reason: DegenerateInput::NoLocalMinimum,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn ami_of_identical_halves_is_marginal_entropy() {
        // Period-2 signal: x(t+2) == x(t), two equiprobable bins -> 1 bit
        let signal: Vec<f64> = (0..100).map(|i| (i % 2) as f64).collect();
        assert_relative_eq!(average_mutual_information(&signal, 2, 32), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn ami_of_constant_signal_is_zero() {
        let signal = vec![3.0; 20];
        assert_relative_eq!(average_mutual_information(&signal, 1, 32), 0.0);
    }

    #[test]
    fn ami_short_signal_is_nan() {
        assert!(average_mutual_information(&[1.0, 2.0], 1, 32).is_nan());
        assert!(average_mutual_information(&[1.0, 2.0, 3.0], 0, 32).is_nan());
    }

    #[test]
    fn bin_indices_put_maximum_in_last_bin() {
        let bins = bin_indices(&[0.0, 0.5, 1.0], 4);
        assert_eq!(bins, vec![0, 2, 3]);
    }

    #[test]
    fn first_local_minimum_strict() {
        assert_eq!(first_local_minimum(&[3.0, 2.0, 1.0, 2.0, 0.5, 1.0]), Some(2));
    }

    #[test]
    fn first_local_minimum_plateau() {
        assert_eq!(first_local_minimum(&[3.0, 1.0, 1.0, 1.0, 2.0]), Some(2));
        assert_eq!(first_local_minimum(&[3.0, 1.0, 1.0, 2.0]), Some(1));
    }

    #[test]
    fn first_local_minimum_none() {
        assert_eq!(first_local_minimum(&[5.0, 4.0, 3.0, 2.0]), None);
        assert_eq!(first_local_minimum(&[1.0, 2.0, 3.0]), None);
        // Plateau reaching the end is not a minimum
        assert_eq!(first_local_minimum(&[3.0, 1.0, 1.0]), None);
        assert_eq!(first_local_minimum(&[1.0, 2.0]), None);
    }

    #[test]
    fn delay_of_short_signal_defaults_to_one() {
        let e = estimate_delay(&[1.0, 2.0], 50, 32);
        assert_eq!(e.value(), 1);
        assert_eq!(e.reason(), Some(DegenerateInput::TooShort { len: 2 }));
    }

    #[test]
    fn delay_of_monotone_curve_uses_global_minimum() {
        // Every lagged pair of a short ramp lands in its own bin, so AMI is
        // log2(n - τ) and only falls.
        let signal: Vec<f64> = (0..8).map(|i| i as f64).collect();
        let e = estimate_delay(&signal, 50, 32);
        assert_eq!(e.value(), 4);
        assert_eq!(e.reason(), Some(DegenerateInput::NoLocalMinimum));
    }

    #[test]
    fn delay_of_sine_is_found() {
        let signal: Vec<f64> = (0..400)
            .map(|i| (2.0 * PI * i as f64 / 40.0).sin())
            .collect();
        let e = estimate_delay(&signal, 50, 32);
        assert!(e.value() >= 1 && e.value() <= 20, "tau = {}", e.value());
    }
}
