//! Deterministic importance samples over threshold distributions.
//!
//! Purpose
//! -------
//! Generate the node/log-weight pairs the IT-quadrature and Proper models
//! integrate over. Nodes are placed at equispaced quantile positions
//! `ztmp = (2i - N + 1)/(N - 1)` in log space, widened by a
//! distribution-specific importance rate so the grid covers the far tails;
//! the log-weights undo the widening.
//!
//! Key behaviors
//! -------------
//! - [`ImportanceSample::calc_sample`] regenerates nodes and log-weights
//!   from the current shape parameters; the engine calls it at the start of
//!   every projection run.
//! - The degenerate delta "distribution" is a single node with log-weight
//!   0, which collapses the Proper model onto stochastic death.
//! - [`ExternalSample`] wraps caller-supplied threshold variates, sorted
//!   ascending at construction.
//!
//! Invariants
//! ----------
//! - Generated nodes ascend strictly whenever the spread parameter is
//!   positive; log-weights are symmetric around the center node.
//! - The top-node exponent is guarded at 700; beyond that `exp` would
//!   overflow and the sample is refused instead.
use crate::projection::errors::{DistError, DistResult};

/// Importance rate for the lognormal threshold distribution.
pub const LOGNORMAL_IMPORTANCE_RATE: f64 = 4.0;

/// Importance rate for the log-logistic threshold distribution.
pub const LOGLOGISTIC_IMPORTANCE_RATE: f64 = 50.0;

/// Largest admissible `exp` argument when generating nodes.
pub const MAX_EXPONENT: f64 = 700.0;

/// Threshold-distribution family with its parameters.
///
/// Parameters arrive as the "natural" pair of the family: mean/sd for the
/// lognormal, scale/shape for the log-logistic, the single threshold for
/// the degenerate delta.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThresholdShape {
    Lognormal { mean: f64, sd: f64 },
    Loglogistic { scale: f64, shape: f64 },
    Delta { threshold: f64 },
}

/// Deterministic importance sample: ascending nodes plus log-weights.
///
/// Constructed once per model with unset (NaN) parameters; the engine
/// writes parameters via [`ImportanceSample::set_shape`] and regenerates
/// with [`ImportanceSample::calc_sample`] on every run.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportanceSample {
    shape: ThresholdShape,
    rate: f64,
    variates: Vec<f64>,
    log_weights: Vec<f64>,
}

impl ImportanceSample {
    /// Lognormal sample of `sample_size` nodes, parameters unset.
    pub fn lognormal(sample_size: usize) -> Self {
        ImportanceSample {
            shape: ThresholdShape::Lognormal { mean: f64::NAN, sd: f64::NAN },
            rate: LOGNORMAL_IMPORTANCE_RATE,
            variates: vec![0.0; sample_size],
            log_weights: vec![0.0; sample_size],
        }
    }

    /// Log-logistic sample of `sample_size` nodes, parameters unset.
    pub fn loglogistic(sample_size: usize) -> Self {
        ImportanceSample {
            shape: ThresholdShape::Loglogistic { scale: f64::NAN, shape: f64::NAN },
            rate: LOGLOGISTIC_IMPORTANCE_RATE,
            variates: vec![0.0; sample_size],
            log_weights: vec![0.0; sample_size],
        }
    }

    /// Degenerate single-node sample, threshold unset.
    pub fn delta() -> Self {
        ImportanceSample {
            shape: ThresholdShape::Delta { threshold: f64::NAN },
            rate: 0.0,
            variates: vec![0.0],
            log_weights: vec![0.0],
        }
    }

    pub fn shape(&self) -> &ThresholdShape {
        &self.shape
    }

    /// Replace the shape parameters; takes effect at the next
    /// [`ImportanceSample::calc_sample`].
    pub fn set_shape(&mut self, shape: ThresholdShape) {
        self.shape = shape;
    }

    pub fn sample_size(&self) -> usize {
        self.variates.len()
    }

    pub fn variate_at(&self, i: usize) -> f64 {
        self.variates[i]
    }

    pub fn variate_back(&self) -> f64 {
        self.variates[self.variates.len() - 1]
    }

    pub fn log_weight_at(&self, i: usize) -> f64 {
        self.log_weights[i]
    }

    pub fn variates(&self) -> &[f64] {
        &self.variates
    }

    pub fn log_weights(&self) -> &[f64] {
        &self.log_weights
    }

    /// Regenerate nodes and log-weights from the current shape parameters.
    ///
    /// # Errors
    /// - [`DistError::IncompleteLognormal`] for a lognormal with mean 0 but
    ///   non-zero spread.
    /// - [`DistError::NonPositiveScale`] / [`DistError::NonPositiveShape`] /
    ///   [`DistError::ShapeNotAboveOne`] for inadmissible log-logistic
    ///   parameters.
    /// - [`DistError::VariateOverflow`] when the top node's exponent
    ///   exceeds [`MAX_EXPONENT`].
    pub fn calc_sample(&mut self) -> DistResult<()> {
        match self.shape {
            ThresholdShape::Lognormal { mean, sd } => {
                if mean == 0.0 && sd != 0.0 {
                    return Err(DistError::IncompleteLognormal { mean, sd });
                }
                let sigma_sq = (1.0 + (sd / mean).powi(2)).ln();
                let mu = mean.ln() - 0.5 * sigma_sq;
                let sigma_wide = sigma_sq.sqrt() * self.rate;
                if sigma_wide + mu > MAX_EXPONENT {
                    return Err(DistError::VariateOverflow { exponent: sigma_wide + mu });
                }
                let rate = self.rate;
                self.fill_nodes(|ztmp| ztmp * sigma_wide + mu, |ztmp| {
                    -0.5 * (ztmp * rate).powi(2)
                });
            }
            ThresholdShape::Loglogistic { scale, shape } => {
                if scale <= 0.0 {
                    return Err(DistError::NonPositiveScale { value: scale });
                }
                if shape <= 0.0 {
                    return Err(DistError::NonPositiveShape { value: shape });
                }
                if shape <= 1.0 {
                    return Err(DistError::ShapeNotAboveOne { value: shape });
                }
                let mu = scale.ln();
                let spread_wide = self.rate / shape;
                if spread_wide + mu > MAX_EXPONENT {
                    return Err(DistError::VariateOverflow { exponent: spread_wide + mu });
                }
                let rate = self.rate;
                self.fill_nodes(|ztmp| ztmp * spread_wide + mu, |ztmp| {
                    -2.0 * (ztmp * rate / 2.0).cosh().ln()
                });
            }
            ThresholdShape::Delta { threshold } => {
                self.variates.clear();
                self.variates.push(threshold);
                self.log_weights.clear();
                self.log_weights.push(0.0);
            }
        }
        Ok(())
    }

    fn fill_nodes(&mut self, exponent: impl Fn(f64) -> f64, log_weight: impl Fn(f64) -> f64) {
        let n = self.variates.len();
        for i in 0..n {
            let ztmp = (2.0 * i as f64 - n as f64 + 1.0) / (n as f64 - 1.0);
            self.variates[i] = exponent(ztmp).exp();
            self.log_weights[i] = log_weight(ztmp);
        }
    }
}

/// Caller-supplied threshold variates, sorted ascending at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalSample {
    variates: Vec<f64>,
}

impl ExternalSample {
    pub fn new(mut variates: Vec<f64>) -> Self {
        variates.sort_by(f64::total_cmp);
        ExternalSample { variates }
    }

    pub fn sample_size(&self) -> usize {
        self.variates.len()
    }

    pub fn variate_at(&self, i: usize) -> f64 {
        self.variates[i]
    }

    pub fn variate_back(&self) -> f64 {
        self.variates[self.variates.len() - 1]
    }

    pub fn variates(&self) -> &[f64] {
        &self.variates
    }
}
