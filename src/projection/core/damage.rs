//! Closed-form toxicokinetic damage solver.
//!
//! Purpose
//! -------
//! Evaluate scaled damage `D(t)` under the reduced one-compartment
//! toxicokinetic ODE
//!
//! ```text
//! dD/dt = ke * SVR * (C(t) - D),    D(0) = 0,
//! ```
//!
//! where `C(t)` linearly interpolates the exposure record. On each
//! exposure interval the ODE has a closed form; [`DamageSolver`] evaluates
//! it directly instead of stepping an integrator.
//!
//! Key behaviors
//! -------------
//! - [`DamageSolver::calculate_damage`] evaluates `D(t)` for a time inside
//!   interval `k`, caching the result.
//! - [`DamageSolver::update_to_next_concentration_measurement`] commits the
//!   cached value as the start condition of the next interval; callers
//!   advance intervals in order.
//! - Interior extrema: [`DamageSolver::is_maximum_damage`] tests whether
//!   interval `k` contains a damage maximum, and
//!   [`DamageSolver::time_of_extreme_damage`] locates it. Both are
//!   meaningful only for a strictly positive elimination rate.
//!
//! Invariants
//! ----------
//! - `set_dominant_rate_constant` must be called before any evaluation;
//!   `set_start_conditions` must open every projection run.
//! - Evaluations within one interval must precede the commit to the next;
//!   the solver does not re-derive start conditions.
//! - With a zero rate the damage stays at its start condition and no
//!   extremum search is performed.
use crate::projection::core::data::ExposureSeries;

/// Closed-form evaluator for the reduced damage ODE over an exposure
/// record.
///
/// Holds the current interval's start condition (`interval_start_damage`)
/// and the most recent evaluation (`damage`); both are plain `f64` state
/// reset by [`DamageSolver::set_start_conditions`].
#[derive(Debug, Clone)]
pub struct DamageSolver<'a> {
    exposure: &'a ExposureSeries,
    svr: f64,
    dominant_rate_constant: f64,
    /// Effective elimination rate `ke * SVR`.
    rate: f64,
    /// Most recent evaluation `D(t)`.
    damage: f64,
    /// Damage at the start of the current interval, `D(Ct[k])`.
    interval_start_damage: f64,
}

impl<'a> DamageSolver<'a> {
    /// Solver over `exposure` with the given surface-volume ratio; the
    /// dominant rate constant starts unset (NaN) and must be supplied via
    /// [`DamageSolver::set_dominant_rate_constant`].
    pub fn new(exposure: &'a ExposureSeries, svr: f64) -> Self {
        DamageSolver {
            exposure,
            svr,
            dominant_rate_constant: f64::NAN,
            rate: f64::NAN,
            damage: 0.0,
            interval_start_damage: 0.0,
        }
    }

    /// Set the dominant rate constant `ke`; the effective rate becomes
    /// `ke * SVR`.
    pub fn set_dominant_rate_constant(&mut self, ke: f64) {
        self.dominant_rate_constant = ke;
        self.rate = ke * self.svr;
    }

    pub fn dominant_rate_constant(&self) -> f64 {
        self.dominant_rate_constant
    }

    /// Reset to the start of a projection run: zero damage, first interval.
    pub fn set_start_conditions(&mut self) {
        self.damage = 0.0;
        self.interval_start_damage = 0.0;
    }

    /// Evaluate `D(t)` for `t` within the exposure interval starting at
    /// `Ct[k]`, caching the result.
    pub fn calculate_damage(&mut self, k: usize, t: f64) -> f64 {
        let start_time = self.exposure.time_at(k);
        let concentration = self.exposure.concentration_at(k);
        let decay = (-self.rate * (t - start_time)).exp();
        let drift = if self.rate > 0.0 {
            (t - start_time - (1.0 - decay) / self.rate) * self.exposure.slope_at(k)
        } else {
            0.0
        };
        self.damage = decay * (self.interval_start_damage - concentration) + concentration + drift;
        self.damage
    }

    /// Whether interval `k` contains an interior damage maximum, judged
    /// from the interval's start condition. Requires a positive rate.
    pub fn is_maximum_damage(&self, k: usize) -> bool {
        self.rate > 0.0
            && self.interval_start_damage
                < self.exposure.concentration_at(k) - self.exposure.slope_at(k) / self.rate
    }

    /// Time of the interior extremum in interval `k` (where `dD/dt = 0`).
    ///
    /// Only meaningful when [`DamageSolver::is_maximum_damage`] holds; for
    /// a flat interval the expression degenerates to NaN, which callers
    /// treat as "no extremum" through their time comparisons.
    pub fn time_of_extreme_damage(&self, k: usize) -> f64 {
        let concentration = self.exposure.concentration_at(k);
        let slope = self.exposure.slope_at(k);
        ((self.interval_start_damage - concentration) * self.rate / slope + 1.0).ln() / self.rate
            + self.exposure.time_at(k)
    }

    /// Damage at the extremum time `te` in interval `k`. At an extremum
    /// the ODE right-hand side vanishes, so damage equals the interpolated
    /// concentration there.
    pub fn extreme_damage(&self, te: f64, k: usize) -> f64 {
        self.exposure.slope_at(k) * (te - self.exposure.time_at(k))
            + self.exposure.concentration_at(k)
    }

    /// Commit the cached evaluation as the start condition of the next
    /// interval.
    pub fn update_to_next_concentration_measurement(&mut self) {
        self.interval_start_damage = self.damage;
    }

    /// Most recent evaluation.
    pub fn damage(&self) -> f64 {
        self.damage
    }
}
