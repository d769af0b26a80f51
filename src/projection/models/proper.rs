//! Proper GUTS toxicodynamics: stochastic death mixed over a threshold
//! distribution.
//!
//! Every organism draws a threshold from the distribution and then dies
//! stochastically with hazard `kk * max(D - z, 0)`. Gathered damage is
//! binned against the threshold sample; survival marginalizes the
//! per-threshold SD survival over the sample, importance-weighted for the
//! parametric families, unweighted for a caller-supplied sample. The
//! single-node delta sample collapses the mixture back onto plain
//! stochastic death.
//!
//! The model depends on every gathered damage point, not just the running
//! maximum, so it is not maximum-driven and always projects densely.
use crate::projection::core::damage::DamageSolver;
use crate::projection::core::samplers::{ExternalSample, ImportanceSample, ThresholdShape};
use crate::projection::errors::{DistResult, GutsError, GutsResult};
use crate::projection::models::Toxicodynamics;
use ndarray::{array, Array1};

/// Threshold sample behind a Proper model: generated importance nodes or
/// caller-supplied variates.
#[derive(Debug, Clone)]
pub enum ThresholdSample {
    Importance(ImportanceSample),
    External(ExternalSample),
}

impl ThresholdSample {
    pub fn sample_size(&self) -> usize {
        match self {
            ThresholdSample::Importance(sample) => sample.sample_size(),
            ThresholdSample::External(sample) => sample.sample_size(),
        }
    }

    pub fn variate_at(&self, i: usize) -> f64 {
        match self {
            ThresholdSample::Importance(sample) => sample.variate_at(i),
            ThresholdSample::External(sample) => sample.variate_at(i),
        }
    }

    pub fn variate_back(&self) -> f64 {
        match self {
            ThresholdSample::Importance(sample) => sample.variate_back(),
            ThresholdSample::External(sample) => sample.variate_back(),
        }
    }

    /// Log importance weight of node `i`; 0 for external variates, which
    /// are equally weighted by construction.
    pub fn log_weight_at(&self, i: usize) -> f64 {
        match self {
            ThresholdSample::Importance(sample) => sample.log_weight_at(i),
            ThresholdSample::External(_) => 0.0,
        }
    }

    /// Regenerate importance nodes from the current shape parameters;
    /// external variates are fixed and pass through.
    pub fn regenerate(&mut self) -> DistResult<()> {
        match self {
            ThresholdSample::Importance(sample) => sample.calc_sample(),
            ThresholdSample::External(_) => Ok(()),
        }
    }
}

/// Proper model: per-bin damage and count accumulators over the threshold
/// sample.
///
/// `bin_damage[j]` / `bin_count[j]` accumulate the damage points that fell
/// between variates `j` and `j + 1`; `bin_pointer` is the locally-scanned
/// candidate bin, reset to the sample midpoint at start conditions.
#[derive(Debug, Clone)]
pub struct ProperModel {
    sample: ThresholdSample,
    background_mortality: f64,
    killing_rate: f64,
    killing_rate_dtau: f64,
    dtau: f64,
    bin_damage: Vec<f64>,
    bin_count: Vec<u64>,
    bin_pointer: usize,
}

impl ProperModel {
    pub fn lognormal(sample_size: usize, dtau: f64) -> Self {
        Self::over(ThresholdSample::Importance(ImportanceSample::lognormal(sample_size)), dtau)
    }

    pub fn loglogistic(sample_size: usize, dtau: f64) -> Self {
        Self::over(ThresholdSample::Importance(ImportanceSample::loglogistic(sample_size)), dtau)
    }

    pub fn delta(dtau: f64) -> Self {
        Self::over(ThresholdSample::Importance(ImportanceSample::delta()), dtau)
    }

    pub fn external(dtau: f64) -> Self {
        Self::over(ThresholdSample::External(ExternalSample::new(Vec::new())), dtau)
    }

    fn over(sample: ThresholdSample, dtau: f64) -> Self {
        ProperModel {
            sample,
            background_mortality: f64::NAN,
            killing_rate: f64::NAN,
            killing_rate_dtau: f64::NAN,
            dtau,
            bin_damage: Vec::new(),
            bin_count: Vec::new(),
            bin_pointer: 0,
        }
    }

    pub fn set_killing_rate(&mut self, kk: f64) {
        self.killing_rate = kk;
        self.killing_rate_dtau = kk * self.dtau;
    }

    pub fn killing_rate(&self) -> f64 {
        self.killing_rate
    }

    /// Replace the external threshold sample; only meaningful for models
    /// built with [`ProperModel::external`].
    pub fn set_sample(&mut self, sample: ExternalSample) {
        self.sample = ThresholdSample::External(sample);
    }

    pub fn sample(&self) -> &ThresholdSample {
        &self.sample
    }

    /// Apply the variant's parameter vector across model and solver:
    /// `[hb, kd, kk, t1, t2]` for the parametric families,
    /// `[hb, kd, kk, z]` for delta, `[hb, kd, kk]` for external.
    ///
    /// # Errors
    /// - [`GutsError::ParameterCountMismatch`] on a wrong-length vector.
    pub fn set_parameters(
        &mut self, solver: &mut DamageSolver<'_>, params: &[f64],
    ) -> GutsResult<()> {
        match &mut self.sample {
            ThresholdSample::Importance(sampler) => match *sampler.shape() {
                ThresholdShape::Delta { .. } => {
                    if params.len() != 4 {
                        return Err(GutsError::ParameterCountMismatch {
                            variant: "Proper-delta",
                            expected: 4,
                            actual: params.len(),
                        });
                    }
                    sampler.set_shape(ThresholdShape::Delta { threshold: params[3] });
                }
                ThresholdShape::Lognormal { .. } => {
                    if params.len() != 5 {
                        return Err(GutsError::ParameterCountMismatch {
                            variant: "Proper",
                            expected: 5,
                            actual: params.len(),
                        });
                    }
                    sampler
                        .set_shape(ThresholdShape::Lognormal { mean: params[3], sd: params[4] });
                }
                ThresholdShape::Loglogistic { .. } => {
                    if params.len() != 5 {
                        return Err(GutsError::ParameterCountMismatch {
                            variant: "Proper",
                            expected: 5,
                            actual: params.len(),
                        });
                    }
                    sampler.set_shape(ThresholdShape::Loglogistic {
                        scale: params[3],
                        shape: params[4],
                    });
                }
            },
            ThresholdSample::External(_) => {
                if params.len() != 3 {
                    return Err(GutsError::ParameterCountMismatch {
                        variant: "Proper-external",
                        expected: 3,
                        actual: params.len(),
                    });
                }
            }
        }
        self.set_background_mortality(params[0]);
        solver.set_dominant_rate_constant(params[1]);
        self.set_killing_rate(params[2]);
        Ok(())
    }

    /// Read back the variant's parameter vector in the layout
    /// `set_parameters` consumes.
    pub fn parameters(&self, solver: &DamageSolver<'_>) -> Array1<f64> {
        let prefix = array![
            self.background_mortality,
            solver.dominant_rate_constant(),
            self.killing_rate,
        ];
        match &self.sample {
            ThresholdSample::Importance(sampler) => match *sampler.shape() {
                ThresholdShape::Delta { threshold } => {
                    array![prefix[0], prefix[1], prefix[2], threshold]
                }
                ThresholdShape::Lognormal { mean, sd } => {
                    array![prefix[0], prefix[1], prefix[2], mean, sd]
                }
                ThresholdShape::Loglogistic { scale, shape } => {
                    array![prefix[0], prefix[1], prefix[2], scale, shape]
                }
            },
            ThresholdSample::External(_) => prefix,
        }
    }
}

impl Toxicodynamics for ProperModel {
    fn set_start_conditions(&mut self) -> GutsResult<()> {
        self.sample.regenerate().map_err(GutsError::from)?;
        let n = self.sample.sample_size();
        self.bin_damage.clear();
        self.bin_damage.resize(n, 0.0);
        self.bin_count.clear();
        self.bin_count.resize(n, 0);
        self.bin_pointer = n / 2;
        Ok(())
    }

    fn gather_effect(&mut self, damage: f64) {
        let n = self.sample.sample_size();
        if damage > self.sample.variate_back() {
            // Above the top variate: fold into the last bin.
            self.bin_damage[n - 1] += damage;
            self.bin_count[n - 1] += 1;
        } else if damage > self.sample.variate_at(0) {
            while self.bin_pointer > 0 && damage < self.sample.variate_at(self.bin_pointer) {
                self.bin_pointer -= 1;
            }
            while self.bin_pointer < n - 1 && damage > self.sample.variate_at(self.bin_pointer) {
                self.bin_pointer += 1;
            }
            self.bin_damage[self.bin_pointer - 1] += damage;
            self.bin_count[self.bin_pointer - 1] += 1;
        }
        // Damage at or below the bottom variate exceeds no threshold.
    }

    fn is_still_gathering(&self) -> bool {
        true
    }

    fn current_survival(&self, yt: f64) -> f64 {
        let n = self.sample.sample_size();
        let mut survival = 0.0;
        let mut count_above = 0u64;
        let mut damage_above = 0.0;
        for u in (0..n).rev() {
            count_above += self.bin_count[u];
            damage_above += self.bin_damage[u];
            let hazard = self.killing_rate_dtau
                * (self.sample.variate_at(u) * count_above as f64 - damage_above);
            survival += (hazard + self.sample.log_weight_at(u)).exp();
        }
        survival / n as f64 * (-self.background_mortality * yt).exp()
    }

    fn background_mortality(&self) -> f64 {
        self.background_mortality
    }

    fn set_background_mortality(&mut self, hb: f64) {
        self.background_mortality = hb;
    }
}
