//! Individual-tolerance toxicodynamics.
//!
//! Each organism carries a fixed threshold drawn from a distribution;
//! death occurs once the running damage *maximum* first exceeds the
//! threshold, so survival is the upper tail of the threshold distribution
//! at the maximum. Three renditions share that semantics:
//!
//! - [`ItQuadrature`]: the tail integrated over a deterministic
//!   importance sample; kept for cross-checks against the exact form.
//! - [`ItCdf`]: the exact tail `1 - F(max D)` through a cached CDF
//!   evaluator; what the engine wires for parametric IT variants.
//! - [`ItExternal`]: the empirical tail over a caller-supplied sample.
//!
//! All three are [`MaximumDriven`] and run on the fast projector.
use crate::projection::core::damage::DamageSolver;
use crate::projection::core::distributions::{CdfEvaluator, ThresholdCdf};
use crate::projection::core::samplers::{ExternalSample, ImportanceSample, ThresholdShape};
use crate::projection::errors::{GutsError, GutsResult};
use crate::projection::models::{MaximumDriven, Toxicodynamics};
use ndarray::{array, Array1};

/// Individual tolerance over a deterministic importance sample.
///
/// `pointer` is the lowest sample index whose variate has not yet been
/// exceeded by damage; `top_weight_sums[j]` caches the tail weight
/// `sum_{i >= j} exp(zw[i])`, recomputed at every start-conditions reset.
#[derive(Debug, Clone)]
pub struct ItQuadrature {
    sampler: ImportanceSample,
    background_mortality: f64,
    pointer: usize,
    top_weight_sums: Vec<f64>,
}

impl ItQuadrature {
    pub fn lognormal(sample_size: usize) -> Self {
        Self::over(ImportanceSample::lognormal(sample_size))
    }

    pub fn loglogistic(sample_size: usize) -> Self {
        Self::over(ImportanceSample::loglogistic(sample_size))
    }

    fn over(sampler: ImportanceSample) -> Self {
        ItQuadrature {
            sampler,
            background_mortality: f64::NAN,
            pointer: 0,
            top_weight_sums: Vec::new(),
        }
    }

    /// Apply the `[hb, kd, t1, t2]` parameter vector across model and
    /// solver; `(t1, t2)` feed the sampler's distribution family.
    ///
    /// # Errors
    /// - [`GutsError::ParameterCountMismatch`] unless exactly 4 values.
    pub fn set_parameters(
        &mut self, solver: &mut DamageSolver<'_>, params: &[f64],
    ) -> GutsResult<()> {
        if params.len() != 4 {
            return Err(GutsError::ParameterCountMismatch {
                variant: "IT",
                expected: 4,
                actual: params.len(),
            });
        }
        self.set_background_mortality(params[0]);
        solver.set_dominant_rate_constant(params[1]);
        let shape = match self.sampler.shape() {
            ThresholdShape::Lognormal { .. } => {
                ThresholdShape::Lognormal { mean: params[2], sd: params[3] }
            }
            ThresholdShape::Loglogistic { .. } => {
                ThresholdShape::Loglogistic { scale: params[2], shape: params[3] }
            }
            ThresholdShape::Delta { .. } => ThresholdShape::Delta { threshold: params[2] },
        };
        self.sampler.set_shape(shape);
        Ok(())
    }

    /// Read back the `[hb, kd, t1, t2]` parameter vector.
    pub fn parameters(&self, solver: &DamageSolver<'_>) -> Array1<f64> {
        let (t1, t2) = match *self.sampler.shape() {
            ThresholdShape::Lognormal { mean, sd } => (mean, sd),
            ThresholdShape::Loglogistic { scale, shape } => (scale, shape),
            ThresholdShape::Delta { threshold } => (threshold, f64::NAN),
        };
        array![self.background_mortality, solver.dominant_rate_constant(), t1, t2]
    }

    pub fn sampler(&self) -> &ImportanceSample {
        &self.sampler
    }
}

impl Toxicodynamics for ItQuadrature {
    fn set_start_conditions(&mut self) -> GutsResult<()> {
        self.sampler.calc_sample().map_err(GutsError::from)?;
        self.pointer = 0;

        let n = self.sampler.sample_size();
        self.top_weight_sums.clear();
        self.top_weight_sums.resize(n, 0.0);
        let mut tail = 0.0;
        for j in (0..n).rev() {
            tail += self.sampler.log_weight_at(j).exp();
            self.top_weight_sums[j] = tail;
        }
        Ok(())
    }

    fn gather_effect(&mut self, damage: f64) {
        let n = self.sampler.sample_size();
        while self.pointer < n && self.sampler.variate_at(self.pointer) < damage {
            self.pointer += 1;
        }
    }

    fn is_still_gathering(&self) -> bool {
        self.pointer < self.sampler.sample_size()
    }

    fn current_survival(&self, yt: f64) -> f64 {
        if self.pointer >= self.sampler.sample_size() {
            return 0.0;
        }
        self.top_weight_sums[self.pointer] / self.sampler.sample_size() as f64
            * (-self.background_mortality * yt).exp()
    }

    fn background_mortality(&self) -> f64 {
        self.background_mortality
    }

    fn set_background_mortality(&mut self, hb: f64) {
        self.background_mortality = hb;
    }
}

impl MaximumDriven for ItQuadrature {}

/// Individual tolerance through the exact threshold CDF.
#[derive(Debug, Clone)]
pub struct ItCdf {
    cdf: ThresholdCdf,
    evaluator: Option<CdfEvaluator>,
    background_mortality: f64,
    /// Running maximum of `F(D)` over all gathered damage.
    max_cdf: f64,
}

impl ItCdf {
    pub fn lognormal() -> Self {
        Self::over(ThresholdCdf::Lognormal { mean: f64::NAN, sd: f64::NAN })
    }

    pub fn loglogistic() -> Self {
        Self::over(ThresholdCdf::Loglogistic { scale: f64::NAN, shape: f64::NAN })
    }

    fn over(cdf: ThresholdCdf) -> Self {
        ItCdf { cdf, evaluator: None, background_mortality: f64::NAN, max_cdf: 0.0 }
    }

    /// Apply the `[hb, kd, t1, t2]` parameter vector across model and
    /// solver. The CDF is rebuilt (and its domain checked) at the next
    /// start-conditions reset.
    ///
    /// # Errors
    /// - [`GutsError::ParameterCountMismatch`] unless exactly 4 values.
    pub fn set_parameters(
        &mut self, solver: &mut DamageSolver<'_>, params: &[f64],
    ) -> GutsResult<()> {
        if params.len() != 4 {
            return Err(GutsError::ParameterCountMismatch {
                variant: "IT",
                expected: 4,
                actual: params.len(),
            });
        }
        self.set_background_mortality(params[0]);
        solver.set_dominant_rate_constant(params[1]);
        self.cdf = match self.cdf {
            ThresholdCdf::Lognormal { .. } => {
                ThresholdCdf::Lognormal { mean: params[2], sd: params[3] }
            }
            ThresholdCdf::Loglogistic { .. } => {
                ThresholdCdf::Loglogistic { scale: params[2], shape: params[3] }
            }
        };
        Ok(())
    }

    /// Read back the `[hb, kd, t1, t2]` parameter vector.
    pub fn parameters(&self, solver: &DamageSolver<'_>) -> Array1<f64> {
        let (t1, t2) = match self.cdf {
            ThresholdCdf::Lognormal { mean, sd } => (mean, sd),
            ThresholdCdf::Loglogistic { scale, shape } => (scale, shape),
        };
        array![self.background_mortality, solver.dominant_rate_constant(), t1, t2]
    }
}

impl Toxicodynamics for ItCdf {
    fn set_start_conditions(&mut self) -> GutsResult<()> {
        self.evaluator = Some(self.cdf.build().map_err(GutsError::from)?);
        self.max_cdf = 0.0;
        Ok(())
    }

    fn gather_effect(&mut self, damage: f64) {
        if let Some(evaluator) = &self.evaluator {
            self.max_cdf = self.max_cdf.max(evaluator.cdf(damage));
        }
    }

    fn is_still_gathering(&self) -> bool {
        self.max_cdf < 1.0
    }

    fn current_survival(&self, yt: f64) -> f64 {
        (1.0 - self.max_cdf) * (-self.background_mortality * yt).exp()
    }

    fn background_mortality(&self) -> f64 {
        self.background_mortality
    }

    fn set_background_mortality(&mut self, hb: f64) {
        self.background_mortality = hb;
    }
}

impl MaximumDriven for ItCdf {}

/// Individual tolerance over a caller-supplied threshold sample.
#[derive(Debug, Clone)]
pub struct ItExternal {
    sample: ExternalSample,
    background_mortality: f64,
    pointer: usize,
}

impl ItExternal {
    /// Model with an empty sample; the engine supplies variates before
    /// projecting.
    pub fn new() -> Self {
        ItExternal {
            sample: ExternalSample::new(Vec::new()),
            background_mortality: f64::NAN,
            pointer: 0,
        }
    }

    pub fn set_sample(&mut self, sample: ExternalSample) {
        self.sample = sample;
    }

    pub fn sample(&self) -> &ExternalSample {
        &self.sample
    }

    /// Apply the fixed `[hb, kd]` prefix of the parameter vector; the
    /// threshold sample travels separately.
    ///
    /// # Errors
    /// - [`GutsError::ParameterCountMismatch`] unless exactly 2 values.
    pub fn set_parameters(
        &mut self, solver: &mut DamageSolver<'_>, params: &[f64],
    ) -> GutsResult<()> {
        if params.len() != 2 {
            return Err(GutsError::ParameterCountMismatch {
                variant: "IT-external",
                expected: 2,
                actual: params.len(),
            });
        }
        self.set_background_mortality(params[0]);
        solver.set_dominant_rate_constant(params[1]);
        Ok(())
    }

    /// Read back the `[hb, kd]` parameter prefix.
    pub fn parameters(&self, solver: &DamageSolver<'_>) -> Array1<f64> {
        array![self.background_mortality, solver.dominant_rate_constant()]
    }
}

impl Default for ItExternal {
    fn default() -> Self {
        Self::new()
    }
}

impl Toxicodynamics for ItExternal {
    fn set_start_conditions(&mut self) -> GutsResult<()> {
        self.pointer = 0;
        Ok(())
    }

    fn gather_effect(&mut self, damage: f64) {
        let n = self.sample.sample_size();
        while self.pointer < n && self.sample.variate_at(self.pointer) < damage {
            self.pointer += 1;
        }
    }

    fn is_still_gathering(&self) -> bool {
        self.pointer < self.sample.sample_size()
    }

    fn current_survival(&self, yt: f64) -> f64 {
        let n = self.sample.sample_size();
        (n - self.pointer) as f64 / n as f64 * (-self.background_mortality * yt).exp()
    }

    fn background_mortality(&self) -> f64 {
        self.background_mortality
    }

    fn set_background_mortality(&mut self, hb: f64) {
        self.background_mortality = hb;
    }
}

impl MaximumDriven for ItExternal {}
