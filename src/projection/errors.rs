//! Errors for GUTS-RED projection (input validation, variant wiring, and
//! threshold-distribution domain checks).
//!
//! This module defines a projection error type, [`GutsError`], and a
//! distribution error type, [`DistError`], used across the engine and the
//! internal modeling core. Both implement `Display`/`Error`.
//!
//! ## Conventions
//! - **Indices are 0-based.**
//! - Time vectors must be strictly ascending with first entry exactly 0;
//!   values must be finite and non-negative.
//! - Distribution-parameter failures surface as [`DistError`] and are
//!   widened into [`GutsError::Distribution`] at the projection boundary.
//! - A log-likelihood of `-inf` is a value, not an error.
use statrs::distribution::LogNormalError;

/// Crate-wide result alias for projection operations that may produce
/// [`GutsError`].
pub type GutsResult<T> = Result<T, GutsError>;

/// Result alias for threshold-distribution construction paths that may
/// produce [`DistError`].
pub type DistResult<T> = Result<T, DistError>;

/// Unified error type for GUTS-RED projection.
///
/// Covers input/data validation, engine wiring (variant selection, parameter
/// vectors, external samples), and fatal numeric conditions. `label` fields
/// name the offending input vector (`"Ct"`, `"C"`, `"yt"`, `"y"`).
#[derive(Debug, Clone, PartialEq)]
pub enum GutsError {
    // ---- Input/data validation ----
    /// Input vector has fewer entries than its minimum.
    TooFewElements { label: &'static str, len: usize, min: usize },

    /// A data point is NaN/±inf.
    NonFiniteValue { label: &'static str, index: usize, value: f64 },

    /// A data point is negative.
    NegativeValue { label: &'static str, index: usize, value: f64 },

    /// A time vector is not strictly ascending at `index`.
    NotAscending { label: &'static str, index: usize },

    /// A time vector does not start at exactly 0.
    FirstValueNotZero { label: &'static str, value: f64 },

    /// Times and values of a series differ in length.
    LengthMismatch { label: &'static str, times: usize, values: usize },

    /// Last survival observation time lies past the last exposure time.
    SurvivalPastExposure { survival_end: f64, exposure_end: f64 },

    /// Observed survivor counts increase at `index`.
    IncreasingSurvivorCounts { index: usize },

    /// Dense time-step count must be at least 2.
    InvalidTimeSteps { value: usize },

    /// Importance-sample size must be at least 3.
    InvalidSampleSize { value: usize },

    /// Surface-volume ratio must be finite and at least 2.
    InvalidSurfaceVolumeRatio { value: f64 },

    // ---- Engine wiring ----
    /// Parameter vector length does not match the variant's layout.
    ParameterCountMismatch { variant: &'static str, expected: usize, actual: usize },

    /// Variant requires a caller-supplied threshold sample; none given, or
    /// the given sample is empty.
    MissingExternalSample,

    /// Variant projects on the dense grid but no time-step count was set.
    MissingTimeSteps,

    /// Variant draws an importance sample but no sample size was set.
    MissingSampleSize,

    /// Family/distribution combination has no model.
    UnsupportedVariant { family: &'static str, distribution: &'static str },

    // ---- Numeric invariants ----
    /// Survival at time 0 is not strictly positive (zero, negative, or
    /// NaN); the run cannot be normalized.
    SurvivalUnderflow { value: f64 },

    // ---- Distribution errors ----
    /// Threshold-distribution domain or overflow failure.
    Distribution(DistError),
}

impl std::error::Error for GutsError {}

impl std::fmt::Display for GutsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Input/data validation ----
            GutsError::TooFewElements { label, len, min } => {
                write!(f, "Vector '{label}' needs at least {min} entries, got {len}.")
            }
            GutsError::NonFiniteValue { label, index, value } => {
                write!(f, "Vector '{label}' has a non-finite entry at index {index}: {value}")
            }
            GutsError::NegativeValue { label, index, value } => {
                write!(f, "Vector '{label}' has a negative entry at index {index}: {value}")
            }
            GutsError::NotAscending { label, index } => {
                write!(f, "Time vector '{label}' is not strictly ascending at index {index}.")
            }
            GutsError::FirstValueNotZero { label, value } => {
                write!(f, "Time vector '{label}' must start at 0, got {value}.")
            }
            GutsError::LengthMismatch { label, times, values } => {
                write!(
                    f,
                    "Series '{label}' has {times} time points but {values} values."
                )
            }
            GutsError::SurvivalPastExposure { survival_end, exposure_end } => {
                write!(
                    f,
                    "Survival observations end at {survival_end}, past the exposure record ending at {exposure_end}."
                )
            }
            GutsError::IncreasingSurvivorCounts { index } => {
                write!(f, "Survivor counts must be non-increasing; they rise at index {index}.")
            }
            GutsError::InvalidTimeSteps { value } => {
                write!(f, "Dense time-step count must be >= 2, got {value}.")
            }
            GutsError::InvalidSampleSize { value } => {
                write!(f, "Importance-sample size must be >= 3, got {value}.")
            }
            GutsError::InvalidSurfaceVolumeRatio { value } => {
                write!(f, "Surface-volume ratio must be finite and >= 2, got {value}.")
            }
            // ---- Engine wiring ----
            GutsError::ParameterCountMismatch { variant, expected, actual } => {
                write!(
                    f,
                    "Variant '{variant}' takes {expected} parameters, got {actual}."
                )
            }
            GutsError::MissingExternalSample => {
                write!(f, "External-threshold variant requires a non-empty caller-supplied sample.")
            }
            GutsError::MissingTimeSteps => {
                write!(f, "Variant projects on the dense grid; set a time-step count on the data.")
            }
            GutsError::MissingSampleSize => {
                write!(f, "Variant draws an importance sample; set a sample size on the data.")
            }
            GutsError::UnsupportedVariant { family, distribution } => {
                write!(
                    f,
                    "No model for family '{family}' with threshold distribution '{distribution}'."
                )
            }
            // ---- Numeric invariants ----
            GutsError::SurvivalUnderflow { value } => {
                write!(f, "Survival probability at time 0 underflowed to {value}.")
            }
            // ---- Distribution errors ----
            GutsError::Distribution(err) => {
                write!(f, "Threshold distribution error: {err}")
            }
        }
    }
}

impl From<DistError> for GutsError {
    fn from(err: DistError) -> GutsError {
        GutsError::Distribution(err)
    }
}

/// Errors specific to threshold-distribution parameters and sampling.
///
/// Typical causes are non-positive scale/shape parameters, a log-logistic
/// shape too small for a finite mean, and importance-node overflow.
#[derive(Debug, Clone, PartialEq)]
pub enum DistError {
    /// Lognormal with mean 0 but non-zero spread has no parameterization.
    IncompleteLognormal { mean: f64, sd: f64 },

    /// Scale parameter must be > 0.
    NonPositiveScale { value: f64 },

    /// Shape parameter must be > 0.
    NonPositiveShape { value: f64 },

    /// Log-logistic shape must exceed 1 for the importance nodes to exist.
    ShapeNotAboveOne { value: f64 },

    /// Top importance node would overflow `exp` (exponent above 700).
    VariateOverflow { exponent: f64 },

    /// Wrapper for statrs::distribution::LogNormalError::LocationInvalid
    LognormalLocationInvalid,

    /// Wrapper for statrs::distribution::LogNormalError::ScaleInvalid
    LognormalScaleInvalid,

    /// ---- Fallback ----
    UnknownError,
}

impl std::error::Error for DistError {}

impl std::fmt::Display for DistError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DistError::IncompleteLognormal { mean, sd } => {
                write!(
                    f,
                    "Lognormal threshold with mean {mean} and sd {sd} has no parameterization."
                )
            }
            DistError::NonPositiveScale { value } => {
                write!(f, "Threshold scale parameter must be > 0, got {value}.")
            }
            DistError::NonPositiveShape { value } => {
                write!(f, "Threshold shape parameter must be > 0, got {value}.")
            }
            DistError::ShapeNotAboveOne { value } => {
                write!(f, "Log-logistic shape must be > 1, got {value}.")
            }
            DistError::VariateOverflow { exponent } => {
                write!(f, "Importance node exponent {exponent} exceeds 700; variates would overflow.")
            }
            DistError::LognormalLocationInvalid => {
                write!(f, "Lognormal location parameter rejected (non-finite).")
            }
            DistError::LognormalScaleInvalid => {
                write!(f, "Lognormal scale parameter rejected (must be > 0).")
            }
            DistError::UnknownError => {
                write!(f, "An unknown error occurred in the distribution.")
            }
        }
    }
}

impl From<LogNormalError> for DistError {
    fn from(err: LogNormalError) -> DistError {
        match err {
            LogNormalError::LocationInvalid => DistError::LognormalLocationInvalid,
            LogNormalError::ScaleInvalid => DistError::LognormalScaleInvalid,
            _ => DistError::UnknownError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Distribution errors widen into `GutsError::Distribution` via `From`,
    // preserving the inner variant.
    //
    // Given
    // -----
    // - A `DistError::ShapeNotAboveOne`.
    //
    // Expect
    // ------
    // - `GutsError::from` wraps it unchanged.
    fn dist_error_widens_into_guts_error() {
        // Arrange
        let inner = DistError::ShapeNotAboveOne { value: 0.5 };

        // Act
        let outer = GutsError::from(inner.clone());

        // Assert
        assert_eq!(outer, GutsError::Distribution(inner));
    }

    #[test]
    // Purpose
    // -------
    // statrs lognormal parameter rejections map onto the crate's own
    // distribution error variants.
    //
    // Given
    // -----
    // - The two `LogNormalError` parameter variants.
    //
    // Expect
    // ------
    // - Each maps to its dedicated wrapper variant.
    fn statrs_lognormal_errors_map_to_wrappers() {
        // Act + Assert
        assert_eq!(
            DistError::from(LogNormalError::LocationInvalid),
            DistError::LognormalLocationInvalid
        );
        assert_eq!(
            DistError::from(LogNormalError::ScaleInvalid),
            DistError::LognormalScaleInvalid
        );
    }

    #[test]
    // Purpose
    // -------
    // Display output names the offending vector so engine callers can
    // surface messages verbatim.
    //
    // Given
    // -----
    // - A `NotAscending` error for the exposure time vector.
    //
    // Expect
    // ------
    // - The message contains the label and index.
    fn display_names_vector_and_index() {
        // Arrange
        let err = GutsError::NotAscending { label: "Ct", index: 2 };

        // Act
        let message = err.to_string();

        // Assert
        assert!(message.contains("'Ct'"));
        assert!(message.contains("index 2"));
    }
}
