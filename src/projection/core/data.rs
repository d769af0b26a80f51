//! Validated input containers for a projection run.
//!
//! Purpose
//! -------
//! Hold the three observation records a GUTS-RED projection consumes — the
//! exposure concentration series, the survival observation timeline, and
//! the observed survivor counts — behind constructors that enforce every
//! admissibility rule once. Downstream code (solver, models, projectors)
//! indexes these containers without re-validating.
//!
//! Key behaviors
//! -------------
//! - [`ExposureSeries`] precomputes the per-interval linear slopes of the
//!   concentration record at construction; the damage solver reads them on
//!   every evaluation.
//! - [`GutsData`] bundles the records with the surface-volume ratio and the
//!   optional discretization settings (dense step count, importance-sample
//!   size), cross-checking that the survival timeline does not extend past
//!   the exposure record.
//!
//! Invariants
//! ----------
//! - Time vectors are strictly ascending from exactly 0; values are finite
//!   and non-negative; every vector has at least two entries.
//! - Survivor counts are non-increasing and aligned with the timeline.
//! - All fields are immutable after construction.
use crate::projection::core::validation::{validate_time_series, validate_time_vector};
use crate::projection::errors::{GutsError, GutsResult};
use crate::utils::last;
use ndarray::{Array1, ArrayView1};

/// Exposure concentration record `C(t)`, linearly interpolated between
/// measurements.
///
/// Fields
/// ------
/// - `times`: measurement times, strictly ascending from 0.
/// - `concentrations`: non-negative concentrations, one per time.
/// - `slopes`: per-interval linear slope `(C[k+1] - C[k]) / (Ct[k+1] - Ct[k])`;
///   the final entry is 0 (no interval starts at the last measurement).
#[derive(Debug, Clone, PartialEq)]
pub struct ExposureSeries {
    times: Array1<f64>,
    concentrations: Array1<f64>,
    slopes: Array1<f64>,
}

impl ExposureSeries {
    /// Build a validated exposure record and precompute interval slopes.
    ///
    /// # Errors
    /// - Everything `validate_time_series` reports for `(times,
    ///   concentrations)` under the labels `"Ct"` / `"C"`.
    pub fn new(times: Array1<f64>, concentrations: Array1<f64>) -> GutsResult<Self> {
        validate_time_series(times.view(), concentrations.view(), "Ct", "C")?;

        let n = times.len();
        let mut slopes = Array1::zeros(n);
        for k in 0..n - 1 {
            slopes[k] = (concentrations[k + 1] - concentrations[k]) / (times[k + 1] - times[k]);
        }
        Ok(ExposureSeries { times, concentrations, slopes })
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        false // at least two points by construction
    }

    /// Measurement time `Ct[k]`.
    pub fn time_at(&self, k: usize) -> f64 {
        self.times[k]
    }

    /// Concentration `C[k]`.
    pub fn concentration_at(&self, k: usize) -> f64 {
        self.concentrations[k]
    }

    /// Linear slope of `C(t)` on the interval starting at `Ct[k]`.
    pub fn slope_at(&self, k: usize) -> f64 {
        self.slopes[k]
    }

    pub fn times(&self) -> ArrayView1<'_, f64> {
        self.times.view()
    }

    /// Last measurement time; the projection horizon may not exceed it.
    pub fn end_time(&self) -> f64 {
        last(self.times.view())
    }
}

/// Times at which survivors were counted, strictly ascending from 0.
#[derive(Debug, Clone, PartialEq)]
pub struct SurvivalTimeline {
    times: Array1<f64>,
}

impl SurvivalTimeline {
    /// # Errors
    /// - Everything `validate_time_vector` reports under the label `"yt"`.
    pub fn new(times: Array1<f64>) -> GutsResult<Self> {
        validate_time_vector(times.view(), "yt")?;
        Ok(SurvivalTimeline { times })
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn time_at(&self, i: usize) -> f64 {
        self.times[i]
    }

    pub fn times(&self) -> ArrayView1<'_, f64> {
        self.times.view()
    }

    /// Projection horizon: the last observation time.
    pub fn duration(&self) -> f64 {
        last(self.times.view())
    }
}

/// Observed survivor counts, non-increasing over the timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedSurvivors {
    counts: Array1<u64>,
}

impl ObservedSurvivors {
    /// # Errors
    /// - [`GutsError::TooFewElements`] on fewer than two counts.
    /// - [`GutsError::IncreasingSurvivorCounts`] at the first index where
    ///   the count rises.
    pub fn new(counts: Array1<u64>) -> GutsResult<Self> {
        if counts.len() < 2 {
            return Err(GutsError::TooFewElements { label: "y", len: counts.len(), min: 2 });
        }
        for index in 1..counts.len() {
            if counts[index] > counts[index - 1] {
                return Err(GutsError::IncreasingSurvivorCounts { index });
            }
        }
        Ok(ObservedSurvivors { counts })
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn counts(&self) -> ArrayView1<'_, u64> {
        self.counts.view()
    }

    /// Cohort size at time 0.
    pub fn initial(&self) -> u64 {
        self.counts[0]
    }
}

/// Everything a projection run consumes, cross-validated.
///
/// The dense step count `time_steps` (M) and importance-sample size
/// `sample_size` (N) are optional because not every variant needs them;
/// the engine reports a missing setting as an error only when the selected
/// variant requires it.
#[derive(Debug, Clone, PartialEq)]
pub struct GutsData {
    pub exposure: ExposureSeries,
    pub timeline: SurvivalTimeline,
    pub observed: ObservedSurvivors,
    svr: f64,
    time_steps: Option<usize>,
    sample_size: Option<usize>,
}

impl GutsData {
    /// Bundle the records and run the cross-checks.
    ///
    /// # Errors
    /// - [`GutsError::LengthMismatch`] when counts and timeline disagree in
    ///   length.
    /// - [`GutsError::SurvivalPastExposure`] when the timeline extends past
    ///   the exposure record.
    /// - [`GutsError::InvalidSurfaceVolumeRatio`] when `svr` is NaN or
    ///   below 2.
    pub fn new(
        exposure: ExposureSeries, timeline: SurvivalTimeline, observed: ObservedSurvivors,
        svr: f64,
    ) -> GutsResult<Self> {
        if observed.len() != timeline.len() {
            return Err(GutsError::LengthMismatch {
                label: "y",
                times: timeline.len(),
                values: observed.len(),
            });
        }
        if timeline.duration() > exposure.end_time() {
            return Err(GutsError::SurvivalPastExposure {
                survival_end: timeline.duration(),
                exposure_end: exposure.end_time(),
            });
        }
        if !(svr >= 2.0) || !svr.is_finite() {
            return Err(GutsError::InvalidSurfaceVolumeRatio { value: svr });
        }
        Ok(GutsData { exposure, timeline, observed, svr, time_steps: None, sample_size: None })
    }

    /// Set the dense-grid step count M.
    ///
    /// # Errors
    /// - [`GutsError::InvalidTimeSteps`] when `steps < 2`.
    pub fn with_time_steps(mut self, steps: usize) -> GutsResult<Self> {
        if steps < 2 {
            return Err(GutsError::InvalidTimeSteps { value: steps });
        }
        self.time_steps = Some(steps);
        Ok(self)
    }

    /// Set the importance-sample size N.
    ///
    /// # Errors
    /// - [`GutsError::InvalidSampleSize`] when `size < 3`.
    pub fn with_sample_size(mut self, size: usize) -> GutsResult<Self> {
        if size < 3 {
            return Err(GutsError::InvalidSampleSize { value: size });
        }
        self.sample_size = Some(size);
        Ok(self)
    }

    pub fn svr(&self) -> f64 {
        self.svr
    }

    pub fn time_steps(&self) -> Option<usize> {
        self.time_steps
    }

    pub fn sample_size(&self) -> Option<usize> {
        self.sample_size
    }

    /// Dense-grid step width: projection horizon over M.
    pub fn dtau(&self) -> Option<f64> {
        self.time_steps.map(|m| self.timeline.duration() / m as f64)
    }
}
