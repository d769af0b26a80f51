//! Survival projection strategies.
//!
//! Purpose
//! -------
//! Drive a [`DamageSolver`] and a [`Toxicodynamics`] model across the
//! survival timeline and read off the survival-probability curve. Both
//! strategies share one outer loop ([`run_survival_loop`]): evaluate
//! survival at time 0, divide every later value through by it, stop early
//! once survival reaches 0, and pin the first entry to exactly 1.
//!
//! Key behaviors
//! -------------
//! - [`DenseProjector`]: walks a grid of `steps` equal sub-intervals of
//!   width `dtau` across the whole projection horizon, feeding every
//!   damage evaluation to the model. Works for any model; required for
//!   the path-dependent SD and Proper families.
//! - [`FastProjector`]: only admits [`MaximumDriven`] models and
//!   evaluates damage solely at exposure breakpoints, interior maxima,
//!   and observation times — the only places the running maximum can
//!   change. The recorded trajectory is sparse; reading it through
//!   [`FastProjector::damage`] / [`FastProjector::damage_time`] lazily
//!   densifies it with [`DENSIFY_STEPS`] extra evaluations per exposure
//!   interval, exactly once per projection run.
//!
//! Invariants
//! ----------
//! - `project` fully resets solver, model, and trajectory state; a
//!   projector can run repeatedly with different parameters.
//! - A survival at time 0 that is not strictly positive (zero, negative,
//!   or NaN) is fatal ([`GutsError::SurvivalUnderflow`]): the curve cannot
//!   be normalized.
//! - Once the curve hits 0 the remaining entries stay 0 (the output is
//!   pre-filled with zeros and the loop exits early).
use crate::projection::core::damage::DamageSolver;
use crate::projection::core::data::{ExposureSeries, SurvivalTimeline};
use crate::projection::errors::{GutsError, GutsResult};
use crate::projection::models::{MaximumDriven, Toxicodynamics};
use ndarray::Array1;

/// Sub-steps per exposure interval when densifying a sparse trajectory.
pub const DENSIFY_STEPS: f64 = 10.0;

/// Shared outer survival loop over the observation timeline.
///
/// `gather_until` advances model (and solver) state up to the given
/// observation time; this loop owns normalization, early exit, and the
/// final `p[0] = 1` pin.
fn run_survival_loop<T: Toxicodynamics>(
    timeline: &SurvivalTimeline, model: &mut T, mut gather_until: impl FnMut(&mut T, f64),
) -> GutsResult<Array1<f64>> {
    let n = timeline.len();
    let mut survival = Array1::zeros(n);
    survival[0] = model.current_survival(0.0);
    // NaN must fail this guard too, so compare through the negation.
    if !(survival[0] > 0.0) {
        return Err(GutsError::SurvivalUnderflow { value: survival[0] });
    }
    let normalizer = survival[0];

    let mut pos = 1;
    while pos < n && survival[pos - 1] > 0.0 {
        model.update_to_next_survival_measurement();
        gather_until(model, timeline.time_at(pos));
        survival[pos] = model.current_survival(timeline.time_at(pos)) / normalizer;
        pos += 1;
    }
    survival[0] = 1.0;
    Ok(survival)
}

/// Dense-grid projection: `steps` equal sub-intervals across the horizon.
///
/// `solver` and `model` are public so the engine can apply parameter
/// vectors across both before projecting.
#[derive(Debug, Clone)]
pub struct DenseProjector<'a, T: Toxicodynamics> {
    pub solver: DamageSolver<'a>,
    pub model: T,
    exposure: &'a ExposureSeries,
    timeline: &'a SurvivalTimeline,
    steps: usize,
    dtau: f64,
    damage: Vec<f64>,
    step_index: usize,
    interval: usize,
}

impl<'a, T: Toxicodynamics> DenseProjector<'a, T> {
    pub fn new(
        exposure: &'a ExposureSeries, timeline: &'a SurvivalTimeline, svr: f64, steps: usize,
        model: T,
    ) -> Self {
        DenseProjector {
            solver: DamageSolver::new(exposure, svr),
            model,
            exposure,
            timeline,
            steps,
            dtau: timeline.duration() / steps as f64,
            damage: Vec::new(),
            step_index: 0,
            interval: 0,
        }
    }

    /// Step width of the dense grid.
    pub fn dtau(&self) -> f64 {
        self.dtau
    }

    /// Project the survival curve for the current parameters.
    ///
    /// # Errors
    /// - Start-condition failures of the model (distribution domain
    ///   errors).
    /// - [`GutsError::SurvivalUnderflow`] when survival at time 0 is not
    ///   positive.
    pub fn project(&mut self) -> GutsResult<Array1<f64>> {
        self.model.set_start_conditions()?;
        self.solver.set_start_conditions();
        self.step_index = 0;
        self.interval = 0;
        self.damage.clear();
        self.damage.resize(self.steps, f64::NAN);

        let DenseProjector {
            solver, model, exposure, timeline, steps, dtau, damage, step_index, interval,
        } = self;
        run_survival_loop(timeline, model, |model, yt| {
            let mut tau = *dtau * *step_index as f64;
            while *step_index < *steps && tau < yt && model.is_still_gathering() {
                let evaluated = solver.calculate_damage(*interval, tau);
                damage[*step_index] = evaluated;
                model.gather_effect(evaluated);
                *step_index += 1;
                tau = *dtau * *step_index as f64;
                if tau > exposure.time_at(*interval + 1) {
                    *interval += 1;
                    solver.update_to_next_concentration_measurement();
                }
            }
        })
    }

    /// Damage trajectory of the last run, one entry per grid step; entries
    /// past the early-exit point stay NaN.
    pub fn damage(&self) -> &[f64] {
        &self.damage
    }

    /// Grid times matching [`DenseProjector::damage`].
    pub fn damage_time(&self) -> Vec<f64> {
        let mut times = vec![f64::NAN; self.steps];
        times[0] = 0.0;
        for i in 1..self.step_index {
            times[i] = times[i - 1] + self.dtau;
        }
        times
    }
}

/// Extremum-driven projection for maximum-driven models.
///
/// Evaluates damage only where the running maximum can change. The
/// trajectory it records is sparse until a caller reads it, at which point
/// it is densified once.
#[derive(Debug, Clone)]
pub struct FastProjector<'a, T: MaximumDriven> {
    pub solver: DamageSolver<'a>,
    pub model: T,
    exposure: &'a ExposureSeries,
    timeline: &'a SurvivalTimeline,
    damage: Vec<f64>,
    damage_time: Vec<f64>,
    interval: usize,
    /// Evaluations pushed since the last start-conditions reset; 0 means
    /// the trajectory is densified (or untouched).
    fresh_points: usize,
}

impl<'a, T: MaximumDriven> FastProjector<'a, T> {
    pub fn new(
        exposure: &'a ExposureSeries, timeline: &'a SurvivalTimeline, svr: f64, model: T,
    ) -> Self {
        FastProjector {
            solver: DamageSolver::new(exposure, svr),
            model,
            exposure,
            timeline,
            damage: Vec::new(),
            damage_time: Vec::new(),
            interval: 0,
            fresh_points: 0,
        }
    }

    /// Project the survival curve for the current parameters.
    ///
    /// # Errors
    /// - Start-condition failures of the model (distribution domain
    ///   errors).
    /// - [`GutsError::SurvivalUnderflow`] when survival at time 0 is not
    ///   positive.
    pub fn project(&mut self) -> GutsResult<Array1<f64>> {
        self.model.set_start_conditions()?;
        self.solver.set_start_conditions();
        self.interval = 0;
        self.fresh_points = 0;
        self.damage.clear();
        self.damage.push(0.0);
        self.damage_time.clear();
        self.damage_time.push(0.0);

        let FastProjector {
            solver, model, exposure, timeline, damage, damage_time, interval, fresh_points,
        } = self;
        run_survival_loop(timeline, model, |model, yt| {
            let gap_start = *fresh_points;
            while exposure.time_at(*interval + 1) < yt && model.is_still_gathering() {
                if solver.is_maximum_damage(*interval) {
                    let te = solver.time_of_extreme_damage(*interval);
                    if te < yt && te < exposure.time_at(*interval + 1) {
                        damage_time.push(te);
                        damage.push(solver.calculate_damage(*interval, te));
                        *fresh_points += 1;
                    }
                }
                let boundary = exposure.time_at(*interval + 1);
                damage_time.push(boundary);
                damage.push(solver.calculate_damage(*interval, boundary));
                *fresh_points += 1;
                *interval += 1;
                solver.update_to_next_concentration_measurement();
            }
            damage_time.push(yt);
            damage.push(solver.calculate_damage(*interval, yt));
            *fresh_points += 1;

            let gap_max =
                damage[gap_start..].iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            model.gather_effect(gap_max);
        })
    }

    /// Damage trajectory of the last run, densified on first read.
    pub fn damage(&mut self) -> &[f64] {
        self.densify();
        &self.damage
    }

    /// Evaluation times matching [`FastProjector::damage`], densified on
    /// first read.
    pub fn damage_time(&mut self) -> &[f64] {
        self.densify();
        &self.damage_time
    }

    /// Append [`DENSIFY_STEPS`] interior evaluations per exposure interval
    /// up to the last projected time. Runs at most once per projection:
    /// `fresh_points == 0` marks an already-densified trajectory.
    fn densify(&mut self) {
        if self.fresh_points == 0 {
            return;
        }
        self.solver.set_start_conditions();
        let last_time =
            self.damage_time.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        let mut k = 0;
        while self.exposure.time_at(k) < last_time {
            let boundary = self.exposure.time_at(k + 1);
            let step = (boundary - self.exposure.time_at(k)) / DENSIFY_STEPS;
            let mut current = self.exposure.time_at(k) + step;
            loop {
                self.damage_time.push(current);
                self.damage.push(self.solver.calculate_damage(k, current));
                current += step;
                if !(current < boundary && current < last_time) {
                    break;
                }
            }
            self.solver.calculate_damage(k, boundary);
            self.solver.update_to_next_concentration_measurement();
            k += 1;
        }
        self.fresh_points = 0;
    }
}
