//! Stochastic-death toxicodynamics.
//!
//! A single threshold `z` and killing rate `kk`: damage above the
//! threshold contributes hazard proportional to the exceedance, damage
//! below it contributes nothing. The effect integral is accumulated in
//! discrete dense steps, so the model folds the step width `dtau` into the
//! killing rate once.
use crate::projection::core::damage::DamageSolver;
use crate::projection::errors::{GutsError, GutsResult};
use crate::projection::models::Toxicodynamics;
use ndarray::{array, Array1};

/// Stochastic-death model: hazard `kk * max(D - z, 0)` on top of
/// background mortality.
///
/// `effect` holds the (non-positive) sum of `z - D` over all gathered
/// steps with `D > z`; survival is `exp(kk * dtau * effect - hb * yt)`.
#[derive(Debug, Clone)]
pub struct StochasticDeath {
    background_mortality: f64,
    killing_rate: f64,
    /// Killing rate folded with the dense step width.
    killing_rate_dtau: f64,
    dtau: f64,
    threshold: f64,
    effect: f64,
}

impl StochasticDeath {
    /// Model for a dense grid of step width `dtau`; parameters unset.
    pub fn new(dtau: f64) -> Self {
        StochasticDeath {
            background_mortality: f64::NAN,
            killing_rate: f64::NAN,
            killing_rate_dtau: f64::NAN,
            dtau,
            threshold: f64::NAN,
            effect: 0.0,
        }
    }

    pub fn set_killing_rate(&mut self, kk: f64) {
        self.killing_rate = kk;
        self.killing_rate_dtau = kk * self.dtau;
    }

    pub fn killing_rate(&self) -> f64 {
        self.killing_rate
    }

    pub fn set_threshold(&mut self, z: f64) {
        self.threshold = z;
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Apply the `[hb, kd, kk, z]` parameter vector across model and
    /// solver.
    ///
    /// # Errors
    /// - [`GutsError::ParameterCountMismatch`] unless exactly 4 values.
    pub fn set_parameters(
        &mut self, solver: &mut DamageSolver<'_>, params: &[f64],
    ) -> GutsResult<()> {
        if params.len() != 4 {
            return Err(GutsError::ParameterCountMismatch {
                variant: "SD",
                expected: 4,
                actual: params.len(),
            });
        }
        self.set_background_mortality(params[0]);
        solver.set_dominant_rate_constant(params[1]);
        self.set_killing_rate(params[2]);
        self.set_threshold(params[3]);
        Ok(())
    }

    /// Read back the `[hb, kd, kk, z]` parameter vector.
    pub fn parameters(&self, solver: &DamageSolver<'_>) -> Array1<f64> {
        array![
            self.background_mortality,
            solver.dominant_rate_constant(),
            self.killing_rate,
            self.threshold,
        ]
    }
}

impl Toxicodynamics for StochasticDeath {
    fn set_start_conditions(&mut self) -> GutsResult<()> {
        self.effect = 0.0;
        Ok(())
    }

    fn gather_effect(&mut self, damage: f64) {
        if damage > self.threshold {
            self.effect += self.threshold - damage;
        }
    }

    fn is_still_gathering(&self) -> bool {
        true
    }

    fn current_survival(&self, yt: f64) -> f64 {
        (self.killing_rate_dtau * self.effect - self.background_mortality * yt).exp()
    }

    fn background_mortality(&self) -> f64 {
        self.background_mortality
    }

    fn set_background_mortality(&mut self, hb: f64) {
        self.background_mortality = hb;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::core::data::ExposureSeries;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Damage below the threshold accumulates no effect: survival is pure
    // background mortality.
    //
    // Given
    // -----
    // - Threshold 2, gathered damage 1.5 and 1.9, hb = 0.1.
    //
    // Expect
    // ------
    // - `current_survival(3) == exp(-0.1 * 3)`.
    fn sub_threshold_damage_leaves_background_survival() {
        // Arrange
        let mut model = StochasticDeath::new(0.5);
        model.set_background_mortality(0.1);
        model.set_killing_rate(0.8);
        model.set_threshold(2.0);
        model.set_start_conditions().unwrap();

        // Act
        model.gather_effect(1.5);
        model.gather_effect(1.9);

        // Assert
        let expected = (-0.1f64 * 3.0).exp();
        assert!((model.current_survival(3.0) - expected).abs() < 1e-15);
    }

    #[test]
    // Purpose
    // -------
    // Damage above the threshold accumulates the exceedance, scaled by
    // kk * dtau in the survival probability.
    //
    // Given
    // -----
    // - Threshold 2, one gathered damage of 3.5, kk = 0.8, dtau = 0.5,
    //   hb = 0.
    //
    // Expect
    // ------
    // - `current_survival(t) == exp(0.8 * 0.5 * (2 - 3.5))`.
    fn exceedance_accumulates_scaled_hazard() {
        // Arrange
        let mut model = StochasticDeath::new(0.5);
        model.set_background_mortality(0.0);
        model.set_killing_rate(0.8);
        model.set_threshold(2.0);
        model.set_start_conditions().unwrap();

        // Act
        model.gather_effect(3.5);

        // Assert
        let expected = (0.8f64 * 0.5 * (2.0 - 3.5)).exp();
        assert!((model.current_survival(1.0) - expected).abs() < 1e-15);
        assert!(model.is_still_gathering());
    }

    #[test]
    // Purpose
    // -------
    // `set_parameters` / `parameters` round-trip the `[hb, kd, kk, z]`
    // layout across model and solver, and refuse a wrong-length vector.
    //
    // Given
    // -----
    // - Parameters [0.05, 0.7, 1.2, 2.5].
    //
    // Expect
    // ------
    // - Read-back equals the input; a 3-vector errors with the expected
    //   count.
    fn parameters_round_trip_through_model_and_solver() {
        // Arrange
        let exposure = ExposureSeries::new(array![0.0, 1.0], array![1.0, 1.0]).unwrap();
        let mut solver = DamageSolver::new(&exposure, 2.0);
        let mut model = StochasticDeath::new(0.25);
        let params = [0.05, 0.7, 1.2, 2.5];

        // Act
        model.set_parameters(&mut solver, &params).unwrap();

        // Assert
        assert_eq!(model.parameters(&solver), array![0.05, 0.7, 1.2, 2.5]);
        assert_eq!(
            model.set_parameters(&mut solver, &[0.05, 0.7, 1.2]),
            Err(GutsError::ParameterCountMismatch { variant: "SD", expected: 4, actual: 3 })
        );
    }
}
