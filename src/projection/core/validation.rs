//! Input checks for exposure and survival records.
//!
//! Purpose
//! -------
//! Centralize the admissibility rules every projection run relies on:
//! value vectors are finite and non-negative with at least two entries,
//! time vectors additionally strictly ascend from exactly 0, and a series
//! pairs times with values one-to-one. Container constructors in
//! [`crate::projection::core::data`] call these before accepting input, so
//! the solver and models can index freely without re-checking.
//!
//! Conventions
//! -----------
//! - `label` is the conventional short name of the vector (`"Ct"`, `"C"`,
//!   `"yt"`) and is carried into the error for context.
//! - Checks run in order (length, finiteness/sign, ordering, origin) and
//!   report the first violation.
use crate::projection::errors::{GutsError, GutsResult};
use ndarray::ArrayView1;

/// Minimum number of entries in any input vector.
pub const MIN_POINTS: usize = 2;

/// Validate a value vector: at least [`MIN_POINTS`] entries, all finite and
/// non-negative.
///
/// # Errors
/// - [`GutsError::TooFewElements`] when shorter than the minimum.
/// - [`GutsError::NonFiniteValue`] on the first NaN/±inf entry.
/// - [`GutsError::NegativeValue`] on the first negative entry.
pub fn validate_value_vector(values: ArrayView1<'_, f64>, label: &'static str) -> GutsResult<()> {
    if values.len() < MIN_POINTS {
        return Err(GutsError::TooFewElements { label, len: values.len(), min: MIN_POINTS });
    }
    for (index, &value) in values.iter().enumerate() {
        if !value.is_finite() {
            return Err(GutsError::NonFiniteValue { label, index, value });
        }
        if value < 0.0 {
            return Err(GutsError::NegativeValue { label, index, value });
        }
    }
    Ok(())
}

/// Validate a time vector: a value vector that is strictly ascending with
/// first entry exactly 0.
///
/// # Errors
/// - Everything [`validate_value_vector`] reports.
/// - [`GutsError::FirstValueNotZero`] when the vector does not start at 0.
/// - [`GutsError::NotAscending`] at the first index whose entry does not
///   exceed its predecessor.
pub fn validate_time_vector(times: ArrayView1<'_, f64>, label: &'static str) -> GutsResult<()> {
    validate_value_vector(times, label)?;
    if times[0] != 0.0 {
        return Err(GutsError::FirstValueNotZero { label, value: times[0] });
    }
    for index in 1..times.len() {
        if times[index] <= times[index - 1] {
            return Err(GutsError::NotAscending { label, index });
        }
    }
    Ok(())
}

/// Validate a (times, values) series: matching lengths, valid time vector,
/// valid value vector. Each half carries its own conventional label; the
/// length mismatch is reported under the values label.
///
/// # Errors
/// - [`GutsError::LengthMismatch`] when the two vectors differ in length.
/// - Everything [`validate_time_vector`] and [`validate_value_vector`]
///   report for the respective halves.
pub fn validate_time_series(
    times: ArrayView1<'_, f64>, values: ArrayView1<'_, f64>, times_label: &'static str,
    values_label: &'static str,
) -> GutsResult<()> {
    if times.len() != values.len() {
        return Err(GutsError::LengthMismatch {
            label: values_label,
            times: times.len(),
            values: values.len(),
        });
    }
    validate_time_vector(times, times_label)?;
    validate_value_vector(values, values_label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // A well-formed time vector passes all checks.
    //
    // Given
    // -----
    // - `[0, 1, 2.5, 4]`: ascending from 0, finite, non-negative.
    //
    // Expect
    // ------
    // - `validate_time_vector` returns `Ok(())`.
    fn accepts_well_formed_time_vector() {
        // Arrange
        let times = array![0.0, 1.0, 2.5, 4.0];

        // Act + Assert
        assert!(validate_time_vector(times.view(), "Ct").is_ok());
    }

    #[test]
    // Purpose
    // -------
    // A time vector whose first entry is not 0 is rejected with the offending
    // value in the error.
    //
    // Given
    // -----
    // - `[1, 2, 3]`.
    //
    // Expect
    // ------
    // - `Err(FirstValueNotZero { value: 1.0 })`.
    fn rejects_time_vector_not_starting_at_zero() {
        // Arrange
        let times = array![1.0, 2.0, 3.0];

        // Act
        let result = validate_time_vector(times.view(), "Ct");

        // Assert
        assert_eq!(
            result,
            Err(GutsError::FirstValueNotZero { label: "Ct", value: 1.0 })
        );
    }

    #[test]
    // Purpose
    // -------
    // Ties count as "not ascending": the ordering check is strict.
    //
    // Given
    // -----
    // - `[0, 1, 1, 2]` with a tie at index 2.
    //
    // Expect
    // ------
    // - `Err(NotAscending { index: 2 })`.
    fn rejects_tied_time_points() {
        // Arrange
        let times = array![0.0, 1.0, 1.0, 2.0];

        // Act
        let result = validate_time_vector(times.view(), "yt");

        // Assert
        assert_eq!(result, Err(GutsError::NotAscending { label: "yt", index: 2 }));
    }

    #[test]
    // Purpose
    // -------
    // Value vectors reject NaN, negative entries, and too-short input, in
    // that order of discovery.
    //
    // Given
    // -----
    // - A vector with a NaN, one with a negative value, and a singleton.
    //
    // Expect
    // ------
    // - The matching error variant for each, with index and value filled in.
    fn rejects_bad_value_vectors() {
        // Arrange
        let with_nan = array![1.0, f64::NAN, 3.0];
        let with_negative = array![1.0, -0.5, 3.0];
        let too_short = array![1.0];

        // Act + Assert
        assert!(matches!(
            validate_value_vector(with_nan.view(), "C"),
            Err(GutsError::NonFiniteValue { label: "C", index: 1, .. })
        ));
        assert_eq!(
            validate_value_vector(with_negative.view(), "C"),
            Err(GutsError::NegativeValue { label: "C", index: 1, value: -0.5 })
        );
        assert_eq!(
            validate_value_vector(too_short.view(), "C"),
            Err(GutsError::TooFewElements { label: "C", len: 1, min: MIN_POINTS })
        );
    }

    #[test]
    // Purpose
    // -------
    // A series with mismatched lengths fails before any per-entry check.
    //
    // Given
    // -----
    // - 3 times against 2 values.
    //
    // Expect
    // ------
    // - `Err(LengthMismatch { times: 3, values: 2 })`.
    fn rejects_length_mismatch_in_series() {
        // Arrange
        let times = array![0.0, 1.0, 2.0];
        let values = array![5.0, 4.0];

        // Act
        let result = validate_time_series(times.view(), values.view(), "Ct", "C");

        // Assert
        assert_eq!(
            result,
            Err(GutsError::LengthMismatch { label: "C", times: 3, values: 2 })
        );
    }
}
