//! Exact threshold-distribution CDFs for the individual-tolerance model.
//!
//! The lognormal is evaluated through `statrs`; the log-logistic CDF has a
//! closed form and is evaluated directly. Parameters arrive as the natural
//! mean/sd resp. scale/shape pair and are mapped to the underlying
//! location/scale at [`ThresholdCdf::build`], which is where domain errors
//! surface.
use crate::projection::errors::{DistError, DistResult};
use statrs::distribution::{ContinuousCDF, LogNormal};

/// Threshold-distribution parameters for exact CDF evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThresholdCdf {
    Lognormal { mean: f64, sd: f64 },
    Loglogistic { scale: f64, shape: f64 },
}

impl ThresholdCdf {
    /// Map the natural parameters onto an evaluator.
    ///
    /// For the lognormal, mean `m` and sd `s` map to
    /// `sigma^2 = ln(1 + s^2/m^2)`, `mu = ln(m) - sigma^2/2`.
    ///
    /// # Errors
    /// - [`DistError::IncompleteLognormal`] for mean 0 with non-zero sd.
    /// - statrs parameter rejections, mapped through `From`.
    /// - [`DistError::NonPositiveScale`] / [`DistError::NonPositiveShape`]
    ///   for the log-logistic.
    pub fn build(&self) -> DistResult<CdfEvaluator> {
        match *self {
            ThresholdCdf::Lognormal { mean, sd } => {
                if mean == 0.0 && sd != 0.0 {
                    return Err(DistError::IncompleteLognormal { mean, sd });
                }
                let sigma_sq = (1.0 + (sd * sd) / (mean * mean)).ln();
                let mu = mean.ln() - 0.5 * sigma_sq;
                let dist = LogNormal::new(mu, sigma_sq.sqrt()).map_err(DistError::from)?;
                Ok(CdfEvaluator::Lognormal(dist))
            }
            ThresholdCdf::Loglogistic { scale, shape } => {
                if scale <= 0.0 {
                    return Err(DistError::NonPositiveScale { value: scale });
                }
                if shape <= 0.0 {
                    return Err(DistError::NonPositiveShape { value: shape });
                }
                Ok(CdfEvaluator::Loglogistic { scale, shape })
            }
        }
    }
}

/// Ready-to-evaluate CDF, built once per projection run.
#[derive(Debug, Clone)]
pub enum CdfEvaluator {
    Lognormal(LogNormal),
    Loglogistic { scale: f64, shape: f64 },
}

impl CdfEvaluator {
    /// `P(threshold <= x)`.
    pub fn cdf(&self, x: f64) -> f64 {
        match self {
            CdfEvaluator::Lognormal(dist) => dist.cdf(x),
            CdfEvaluator::Loglogistic { scale, shape } => {
                1.0 / (1.0 + (x / scale).powf(-shape))
            }
        }
    }
}
