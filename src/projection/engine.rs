//! Runtime variant dispatch: build, project, and score a GUTS-RED model.
//!
//! Purpose
//! -------
//! Map a `(family, distribution)` pair onto the concrete model/projector
//! combination, apply the variant's parameter vector, run the projection,
//! and score the curve against the observed survivor counts — the one
//! entry point a caller needs.
//!
//! Wiring
//! ------
//! - IT with a parametric threshold runs the exact-CDF model on the fast
//!   projector; IT with an external sample runs the empirical tail on the
//!   fast projector. IT has no delta variant.
//! - SD always projects densely; its threshold is the scalar `z` in the
//!   parameter vector, so the distribution selector is ignored.
//! - Every Proper variant projects densely: lognormal/log-logistic over a
//!   generated importance sample (requires both M and N), delta over the
//!   single-node sample, external over the caller's variates (M only).
//!
//! Parameter layouts
//! -----------------
//! - SD: `[hb, kd, kk, z]`
//! - IT parametric: `[hb, kd, t1, t2]`
//! - IT external: `[hb, kd]` plus the sample
//! - Proper parametric: `[hb, kd, kk, t1, t2]`
//! - Proper delta: `[hb, kd, kk, z]`
//! - Proper external: `[hb, kd, kk]` plus the sample
//!
//! External samples are sorted ascending here, at the boundary.
use crate::projection::core::data::{GutsData, ObservedSurvivors};
use crate::projection::core::samplers::ExternalSample;
use crate::projection::errors::{GutsError, GutsResult};
use crate::projection::models::it::{ItCdf, ItExternal};
use crate::projection::models::proper::ProperModel;
use crate::projection::models::sd::StochasticDeath;
use crate::projection::models::{MaximumDriven, Toxicodynamics};
use crate::projection::projector::{DenseProjector, FastProjector};
use crate::scoring;
use ndarray::Array1;

/// Toxicodynamic family selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TdFamily {
    StochasticDeath,
    IndividualTolerance,
    Proper,
}

impl TdFamily {
    fn name(self) -> &'static str {
        match self {
            TdFamily::StochasticDeath => "SD",
            TdFamily::IndividualTolerance => "IT",
            TdFamily::Proper => "Proper",
        }
    }
}

/// Threshold-distribution selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdDistribution {
    Lognormal,
    Loglogistic,
    Delta,
    External,
}

impl ThresholdDistribution {
    fn name(self) -> &'static str {
        match self {
            ThresholdDistribution::Lognormal => "lognormal",
            ThresholdDistribution::Loglogistic => "loglogistic",
            ThresholdDistribution::Delta => "delta",
            ThresholdDistribution::External => "external",
        }
    }
}

/// A fully specified model variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSpec {
    pub family: TdFamily,
    pub distribution: ThresholdDistribution,
}

/// Everything a projection run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionOutcome {
    /// Normalized survival curve over the observation timeline.
    pub survival: Array1<f64>,
    /// Damage trajectory of the run (dense grid, or densified sparse).
    pub damage: Vec<f64>,
    /// Evaluation times matching `damage`.
    pub damage_time: Vec<f64>,
    pub log_likelihood: f64,
    pub sppe: f64,
    pub sum_of_squares: f64,
}

/// Build the variant, apply `params`, project, and score.
///
/// `external_sample` supplies the threshold variates for the external
/// variants (sorted ascending here) and is ignored otherwise.
///
/// # Errors
/// - [`GutsError::UnsupportedVariant`] for a combination with no model.
/// - [`GutsError::MissingTimeSteps`] / [`GutsError::MissingSampleSize`] /
///   [`GutsError::MissingExternalSample`] when the variant needs a
///   setting the data (or call) does not carry.
/// - [`GutsError::ParameterCountMismatch`] on a wrong-length vector.
/// - Everything projection itself can raise (distribution domain errors,
///   survival underflow).
pub fn run_projection(
    data: &GutsData, spec: ModelSpec, params: &[f64], external_sample: Option<&[f64]>,
) -> GutsResult<ProjectionOutcome> {
    match (spec.family, spec.distribution) {
        (TdFamily::IndividualTolerance, ThresholdDistribution::Lognormal) => {
            let mut projector =
                FastProjector::new(&data.exposure, &data.timeline, data.svr(), ItCdf::lognormal());
            projector.model.set_parameters(&mut projector.solver, params)?;
            run_fast(projector, &data.observed)
        }
        (TdFamily::IndividualTolerance, ThresholdDistribution::Loglogistic) => {
            let mut projector = FastProjector::new(
                &data.exposure,
                &data.timeline,
                data.svr(),
                ItCdf::loglogistic(),
            );
            projector.model.set_parameters(&mut projector.solver, params)?;
            run_fast(projector, &data.observed)
        }
        (TdFamily::IndividualTolerance, ThresholdDistribution::External) => {
            let sample = require_sample(external_sample)?;
            let mut model = ItExternal::new();
            model.set_sample(sample);
            let mut projector =
                FastProjector::new(&data.exposure, &data.timeline, data.svr(), model);
            projector.model.set_parameters(&mut projector.solver, params)?;
            run_fast(projector, &data.observed)
        }
        (TdFamily::IndividualTolerance, ThresholdDistribution::Delta) => {
            Err(GutsError::UnsupportedVariant {
                family: spec.family.name(),
                distribution: spec.distribution.name(),
            })
        }
        (TdFamily::StochasticDeath, _) => {
            let (steps, dtau) = require_grid(data)?;
            let mut projector = DenseProjector::new(
                &data.exposure,
                &data.timeline,
                data.svr(),
                steps,
                StochasticDeath::new(dtau),
            );
            projector.model.set_parameters(&mut projector.solver, params)?;
            run_dense(projector, &data.observed)
        }
        (TdFamily::Proper, ThresholdDistribution::Lognormal) => {
            let (steps, dtau) = require_grid(data)?;
            let sample_size = data.sample_size().ok_or(GutsError::MissingSampleSize)?;
            let model = ProperModel::lognormal(sample_size, dtau);
            run_proper(data, steps, model, params)
        }
        (TdFamily::Proper, ThresholdDistribution::Loglogistic) => {
            let (steps, dtau) = require_grid(data)?;
            let sample_size = data.sample_size().ok_or(GutsError::MissingSampleSize)?;
            let model = ProperModel::loglogistic(sample_size, dtau);
            run_proper(data, steps, model, params)
        }
        (TdFamily::Proper, ThresholdDistribution::Delta) => {
            let (steps, dtau) = require_grid(data)?;
            run_proper(data, steps, ProperModel::delta(dtau), params)
        }
        (TdFamily::Proper, ThresholdDistribution::External) => {
            let (steps, dtau) = require_grid(data)?;
            let sample = require_sample(external_sample)?;
            let mut model = ProperModel::external(dtau);
            model.set_sample(sample);
            run_proper(data, steps, model, params)
        }
    }
}

fn require_grid(data: &GutsData) -> GutsResult<(usize, f64)> {
    let steps = data.time_steps().ok_or(GutsError::MissingTimeSteps)?;
    let dtau = data.dtau().ok_or(GutsError::MissingTimeSteps)?;
    Ok((steps, dtau))
}

fn require_sample(external_sample: Option<&[f64]>) -> GutsResult<ExternalSample> {
    let variates = external_sample.ok_or(GutsError::MissingExternalSample)?;
    if variates.is_empty() {
        return Err(GutsError::MissingExternalSample);
    }
    Ok(ExternalSample::new(variates.to_vec()))
}

fn run_proper(
    data: &GutsData, steps: usize, model: ProperModel, params: &[f64],
) -> GutsResult<ProjectionOutcome> {
    let mut projector =
        DenseProjector::new(&data.exposure, &data.timeline, data.svr(), steps, model);
    projector.model.set_parameters(&mut projector.solver, params)?;
    run_dense(projector, &data.observed)
}

fn run_dense<T: Toxicodynamics>(
    mut projector: DenseProjector<'_, T>, observed: &ObservedSurvivors,
) -> GutsResult<ProjectionOutcome> {
    let survival = projector.project()?;
    let damage = projector.damage().to_vec();
    let damage_time = projector.damage_time();
    Ok(score(survival, damage, damage_time, observed))
}

fn run_fast<T: MaximumDriven>(
    mut projector: FastProjector<'_, T>, observed: &ObservedSurvivors,
) -> GutsResult<ProjectionOutcome> {
    let survival = projector.project()?;
    let damage = projector.damage().to_vec();
    let damage_time = projector.damage_time().to_vec();
    Ok(score(survival, damage, damage_time, observed))
}

fn score(
    survival: Array1<f64>, damage: Vec<f64>, damage_time: Vec<f64>, observed: &ObservedSurvivors,
) -> ProjectionOutcome {
    let log_likelihood = scoring::log_likelihood(survival.view(), observed.counts());
    let sppe = scoring::sppe(survival.view(), observed.counts());
    let sum_of_squares = scoring::sum_of_squares(survival.view(), observed.counts());
    ProjectionOutcome { survival, damage, damage_time, log_likelihood, sppe, sum_of_squares }
}
