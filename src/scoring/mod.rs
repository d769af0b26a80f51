//! Goodness-of-fit scores over a projected survival curve and observed
//! survivor counts.
//!
//! All three scores treat the curve and the counts as already validated
//! and aligned: same length, counts non-increasing, curve normalized with
//! first entry 1. A log-likelihood of `-inf` is a legitimate value (the
//! parameters explain the data with probability zero), not an error.
use crate::utils::{first, last};
use ndarray::ArrayView1;

/// Multinomial log-likelihood of the observed deaths under the projected
/// curve.
///
/// Each observation interval with `diff_y` deaths contributes
/// `diff_y * ln(p[i-1] - p[i])`; the survivors at the final time
/// contribute `y_last * ln(p_last)`. Returns `-inf` exactly when a
/// positive death count meets a zero survival drop, or survivors remain
/// while the curve ends at 0.
pub fn log_likelihood(survival: ArrayView1<'_, f64>, observed: ArrayView1<'_, u64>) -> f64 {
    let mut loglik = if last(observed) > 0 {
        if last(survival) == 0.0 {
            return f64::NEG_INFINITY;
        }
        last(observed) as f64 * last(survival).ln()
    } else {
        0.0
    };
    for i in 1..observed.len() {
        let diff_y = observed[i - 1].saturating_sub(observed[i]);
        if diff_y > 0 {
            let diff_s = survival[i - 1] - survival[i];
            if diff_s == 0.0 {
                return f64::NEG_INFINITY;
            }
            loglik += diff_y as f64 * diff_s.ln();
        }
    }
    loglik
}

/// Survival-probability prediction error, in percent:
/// `(y_last / y_first - p_last) * 100`.
pub fn sppe(survival: ArrayView1<'_, f64>, observed: ArrayView1<'_, u64>) -> f64 {
    (last(observed) as f64 / first(observed) as f64 - last(survival)) * 100.0
}

/// Sum of squared deviations between observed counts and the curve scaled
/// to the initial cohort size.
pub fn sum_of_squares(survival: ArrayView1<'_, f64>, observed: ArrayView1<'_, u64>) -> f64 {
    let initial = first(observed) as f64;
    observed
        .iter()
        .zip(survival.iter())
        .map(|(&count, &p)| {
            let diff = count as f64 - initial * p;
            diff * diff
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Deaths observed across an interval with no survival drop make the
    // data impossible under the parameters: the log-likelihood is exactly
    // -inf.
    //
    // Given
    // -----
    // - p = [1, 0.5, 0.5], y = [10, 10, 8]: two deaths in the flat
    //   interval.
    //
    // Expect
    // ------
    // - `log_likelihood == -inf`.
    fn deaths_on_flat_interval_give_negative_infinity() {
        // Arrange
        let survival = array![1.0, 0.5, 0.5];
        let observed: ndarray::Array1<u64> = array![10, 10, 8];

        // Act
        let loglik = log_likelihood(survival.view(), observed.view());

        // Assert
        assert_eq!(loglik, f64::NEG_INFINITY);
    }

    #[test]
    // Purpose
    // -------
    // Survivors remaining at the final time against a curve ending at 0
    // are impossible too.
    //
    // Given
    // -----
    // - p = [1, 0.5, 0], y = [10, 6, 2].
    //
    // Expect
    // ------
    // - `log_likelihood == -inf`.
    fn survivors_against_zero_terminal_survival_give_negative_infinity() {
        // Arrange
        let survival = array![1.0, 0.5, 0.0];
        let observed: ndarray::Array1<u64> = array![10, 6, 2];

        // Act + Assert
        assert_eq!(log_likelihood(survival.view(), observed.view()), f64::NEG_INFINITY);
    }

    #[test]
    // Purpose
    // -------
    // A regular curve sums interval and terminal contributions.
    //
    // Given
    // -----
    // - p = [1, 0.6, 0.3], y = [10, 7, 4].
    //
    // Expect
    // ------
    // - loglik = 3*ln(0.4) + 3*ln(0.3) + 4*ln(0.3).
    fn regular_curve_sums_interval_and_terminal_terms() {
        // Arrange
        let survival = array![1.0, 0.6, 0.3];
        let observed: ndarray::Array1<u64> = array![10, 7, 4];

        // Act
        let loglik = log_likelihood(survival.view(), observed.view());

        // Assert
        let expected = 4.0 * 0.3f64.ln() + 3.0 * 0.4f64.ln() + 3.0 * 0.3f64.ln();
        assert!((loglik - expected).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // SPPE compares the observed terminal survival fraction against the
    // projected one, in percent.
    //
    // Given
    // -----
    // - y = [10, 10, 4], p = [1, 1, 0.3]: observed fraction 0.4 versus
    //   projected 0.3.
    //
    // Expect
    // ------
    // - SPPE = 10.0.
    fn sppe_compares_terminal_fractions_in_percent() {
        // Arrange
        let survival = array![1.0, 1.0, 0.3];
        let observed: ndarray::Array1<u64> = array![10, 10, 4];

        // Act + Assert
        assert!((sppe(survival.view(), observed.view()) - 10.0).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // The sum of squares scales the curve by the initial cohort and
    // accumulates squared deviations over every observation.
    //
    // Given
    // -----
    // - y = [10, 8, 5], p = [1, 0.7, 0.5]: deviations [0, 1, 0].
    //
    // Expect
    // ------
    // - Sum of squares = 1.
    fn sum_of_squares_accumulates_scaled_deviations() {
        // Arrange
        let survival = array![1.0, 0.7, 0.5];
        let observed: ndarray::Array1<u64> = array![10, 8, 5];

        // Act + Assert
        assert!((sum_of_squares(survival.view(), observed.view()) - 1.0).abs() < 1e-12);
    }
}
