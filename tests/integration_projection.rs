//! Integration tests for GUTS-RED projection and scoring.
//!
//! Purpose
//! -------
//! - Validate the end-to-end pipeline: from validated exposure and
//!   survival records, through variant dispatch and projection, to the
//!   scored outcome.
//! - Exercise realistic exposure profiles (pulsed, rising/falling
//!   concentrations) and parameter regimes rather than toy edge cases
//!   only.
//!
//! Coverage
//! --------
//! - `projection::core::data`:
//!   - Container construction and the cross-checks the engine relies on.
//! - `projection::engine::run_projection`:
//!   - Every buildable `(family, distribution)` combination.
//! - Cross-model identities:
//!   - Proper-delta degenerates to SD on the same grid.
//!   - The fast extremum-driven projection agrees with a fine dense grid
//!     for the same individual-tolerance model.
//!   - The importance-quadrature IT rendition converges to the exact-CDF
//!     one for a large sample.
//! - Scoring consistency between the outcome fields and the standalone
//!   scoring functions.
//!
//! Exclusions
//! ----------
//! - Fine-grained validation of low-level building blocks (validators,
//!   samplers, the damage solver's closed form) — these are covered by
//!   unit tests next to each module.
//! - Parameter estimation — out of scope for the crate.
use guts_red::projection::core::data::{
    ExposureSeries, GutsData, ObservedSurvivors, SurvivalTimeline,
};
use guts_red::projection::models::it::ItQuadrature;
use guts_red::projection::projector::FastProjector;
use guts_red::scoring;
use guts_red::{GutsError, ModelSpec, TdFamily, ThresholdDistribution};
use ndarray::array;

/// Purpose
/// -------
/// Construct the standard pulsed-exposure data set used across these
/// tests: a concentration pulse rising to its peak at day 2 and washing
/// out by day 6, observed survivor counts declining over four counts.
///
/// Returns
/// -------
/// - A `GutsData` with exposure `[0, 6, 0]` at days `[0, 2, 6]`, survivor
///   counts `[20, 16, 11, 9]` at days `[0, 2, 4, 6]`, and a
///   surface-volume ratio of 2. Grid settings are left unset so each test
///   declares what it needs.
fn pulsed_data() -> GutsData {
    let exposure = ExposureSeries::new(array![0.0, 2.0, 6.0], array![0.0, 6.0, 0.0])
        .expect("pulse record is well-formed");
    let timeline =
        SurvivalTimeline::new(array![0.0, 2.0, 4.0, 6.0]).expect("timeline is well-formed");
    let observed =
        ObservedSurvivors::new(array![20, 16, 11, 9]).expect("counts are non-increasing");
    GutsData::new(exposure, timeline, observed, 2.0).expect("records are mutually consistent")
}

fn spec(family: TdFamily, distribution: ThresholdDistribution) -> ModelSpec {
    ModelSpec { family, distribution }
}

#[test]
// Purpose
// -------
// Every buildable variant produces a normalized probability curve: first
// entry exactly 1, every entry within [0, 1], matching the observation
// count.
//
// Given
// -----
// - The pulsed data set with M = 200 and N = 101 where needed, and an
//   external sample for the external variants.
//
// Expect
// ------
// - All eight variants succeed and satisfy the curve invariants.
fn every_variant_produces_a_normalized_curve() {
    // Arrange
    let data = pulsed_data().with_time_steps(200).unwrap().with_sample_size(101).unwrap();
    let external = [1.5, 2.5, 3.5, 4.5, 5.5];
    let runs: Vec<(ModelSpec, Vec<f64>, Option<&[f64]>)> = vec![
        (spec(TdFamily::StochasticDeath, ThresholdDistribution::Delta),
         vec![0.01, 0.7, 0.5, 2.0], None),
        (spec(TdFamily::IndividualTolerance, ThresholdDistribution::Lognormal),
         vec![0.01, 0.7, 3.0, 1.5], None),
        (spec(TdFamily::IndividualTolerance, ThresholdDistribution::Loglogistic),
         vec![0.01, 0.7, 3.0, 4.0], None),
        (spec(TdFamily::IndividualTolerance, ThresholdDistribution::External),
         vec![0.01, 0.7], Some(&external)),
        (spec(TdFamily::Proper, ThresholdDistribution::Lognormal),
         vec![0.01, 0.7, 0.5, 3.0, 1.5], None),
        (spec(TdFamily::Proper, ThresholdDistribution::Loglogistic),
         vec![0.01, 0.7, 0.5, 3.0, 4.0], None),
        (spec(TdFamily::Proper, ThresholdDistribution::Delta),
         vec![0.01, 0.7, 0.5, 2.0], None),
        (spec(TdFamily::Proper, ThresholdDistribution::External),
         vec![0.01, 0.7, 0.5], Some(&external)),
    ];

    for (model_spec, params, sample) in runs {
        // Act
        let outcome = guts_red::projection::engine::run_projection(
            &data,
            model_spec,
            &params,
            sample,
        )
        .unwrap_or_else(|err| panic!("{model_spec:?} failed: {err}"));

        // Assert
        assert_eq!(outcome.survival.len(), 4, "{model_spec:?}");
        assert_eq!(outcome.survival[0], 1.0, "{model_spec:?}");
        assert!(
            outcome.survival.iter().all(|&p| (0.0..=1.0).contains(&p)),
            "{model_spec:?}: curve left [0, 1]: {:?}",
            outcome.survival
        );
    }
}

#[test]
// Purpose
// -------
// The single-threshold delta sample collapses the Proper mixture onto
// plain stochastic death: both engine variants produce the same curve and
// scores on the same grid.
//
// Given
// -----
// - The pulsed data set, M = 300, shared parameters [hb, kd, kk, z].
//
// Expect
// ------
// - Survival curves and scores agree within 1e-9 (the two models
//   accumulate the same sum in different orders).
fn proper_delta_degenerates_to_stochastic_death() {
    // Arrange
    let data = pulsed_data().with_time_steps(300).unwrap();
    let params = [0.02, 0.7, 0.5, 2.0];

    // Act
    let sd = guts_red::projection::engine::run_projection(
        &data,
        spec(TdFamily::StochasticDeath, ThresholdDistribution::Delta),
        &params,
        None,
    )
    .unwrap();
    let proper = guts_red::projection::engine::run_projection(
        &data,
        spec(TdFamily::Proper, ThresholdDistribution::Delta),
        &params,
        None,
    )
    .unwrap();

    // Assert
    for (a, b) in sd.survival.iter().zip(proper.survival.iter()) {
        assert!((a - b).abs() < 1e-9);
    }
    assert!((sd.log_likelihood - proper.log_likelihood).abs() < 1e-9);
    assert!((sd.sppe - proper.sppe).abs() < 1e-9);
    assert!((sd.sum_of_squares - proper.sum_of_squares).abs() < 1e-9);
}

#[test]
// Purpose
// -------
// The extremum-driven fast projection agrees with a fine dense grid for
// the same exact-CDF individual-tolerance model: the fast strategy skips
// evaluations, not accuracy.
//
// Given
// -----
// - The engine's fast IT-lognormal run versus a manual dense projection
//   of the identical model with M = 4000.
//
// Expect
// ------
// - Survival curves agree within 1e-2 at every observation time.
fn fast_projection_agrees_with_dense_grid() {
    use guts_red::projection::models::it::ItCdf;
    use guts_red::projection::projector::DenseProjector;

    // Arrange
    let data = pulsed_data();
    let params = [0.01, 0.7, 3.0, 1.5];
    let fast = guts_red::projection::engine::run_projection(
        &data,
        spec(TdFamily::IndividualTolerance, ThresholdDistribution::Lognormal),
        &params,
        None,
    )
    .unwrap();

    let mut dense = DenseProjector::new(
        &data.exposure,
        &data.timeline,
        data.svr(),
        4000,
        ItCdf::lognormal(),
    );
    dense.model.set_parameters(&mut dense.solver, &params).unwrap();

    // Act
    let dense_curve = dense.project().unwrap();

    // Assert
    for (fast_p, dense_p) in fast.survival.iter().zip(dense_curve.iter()) {
        assert!(
            (fast_p - dense_p).abs() < 1e-2,
            "fast {fast_p} vs dense {dense_p}"
        );
    }
}

#[test]
// Purpose
// -------
// The importance-quadrature IT rendition converges to the exact-CDF one:
// for a large sample the tail-weight ratio approximates the lognormal
// upper tail.
//
// Given
// -----
// - A fast quadrature projection with N = 2001 versus the engine's
//   exact-CDF run, identical parameters.
//
// Expect
// ------
// - Survival curves agree within 1e-2 at every observation time.
fn quadrature_converges_to_exact_cdf() {
    // Arrange
    let data = pulsed_data();
    let params = [0.01, 0.7, 3.0, 1.5];
    let exact = guts_red::projection::engine::run_projection(
        &data,
        spec(TdFamily::IndividualTolerance, ThresholdDistribution::Lognormal),
        &params,
        None,
    )
    .unwrap();

    let mut quadrature = FastProjector::new(
        &data.exposure,
        &data.timeline,
        data.svr(),
        ItQuadrature::lognormal(2001),
    );
    quadrature.model.set_parameters(&mut quadrature.solver, &params).unwrap();

    // Act
    let quadrature_curve = quadrature.project().unwrap();

    // Assert
    for (quad_p, exact_p) in quadrature_curve.iter().zip(exact.survival.iter()) {
        assert!(
            (quad_p - exact_p).abs() < 1e-2,
            "quadrature {quad_p} vs exact {exact_p}"
        );
    }
}

#[test]
// Purpose
// -------
// The outcome's score fields match the standalone scoring functions
// applied to its own curve: the engine adds wiring, not arithmetic.
//
// Given
// -----
// - An SD run on the pulsed data set.
//
// Expect
// ------
// - `log_likelihood`, `sppe`, and `sum_of_squares` equal the directly
//   computed values.
fn outcome_scores_match_standalone_scoring() {
    // Arrange
    let data = pulsed_data().with_time_steps(150).unwrap();
    let outcome = guts_red::projection::engine::run_projection(
        &data,
        spec(TdFamily::StochasticDeath, ThresholdDistribution::Delta),
        &[0.02, 0.7, 0.5, 2.0],
        None,
    )
    .unwrap();
    let counts = data.observed.counts();

    // Act + Assert
    assert_eq!(
        outcome.log_likelihood,
        scoring::log_likelihood(outcome.survival.view(), counts)
    );
    assert_eq!(outcome.sppe, scoring::sppe(outcome.survival.view(), counts));
    assert_eq!(
        outcome.sum_of_squares,
        scoring::sum_of_squares(outcome.survival.view(), counts)
    );
}

#[test]
// Purpose
// -------
// Malformed records are refused at container construction, before any
// projection can run: an exposure record not starting at 0 and a survival
// timeline extending past the exposure record.
//
// Given
// -----
// - Exposure times [1, 2, 3]; a timeline ending after the exposure.
//
// Expect
// ------
// - `FirstValueNotZero` resp. `SurvivalPastExposure`.
fn malformed_records_are_refused_up_front() {
    // Act + Assert: exposure must start at 0.
    let late_start = ExposureSeries::new(array![1.0, 2.0, 3.0], array![1.0, 1.0, 1.0]);
    assert_eq!(
        late_start.err(),
        Some(GutsError::FirstValueNotZero { label: "Ct", value: 1.0 })
    );

    // Act + Assert: survival observations cannot outlive the exposure.
    let exposure = ExposureSeries::new(array![0.0, 2.0, 6.0], array![0.0, 6.0, 0.0]).unwrap();
    let timeline = SurvivalTimeline::new(array![0.0, 4.0, 8.0]).unwrap();
    let observed = ObservedSurvivors::new(array![10, 8, 5]).unwrap();
    assert_eq!(
        GutsData::new(exposure, timeline, observed, 2.0).err(),
        Some(GutsError::SurvivalPastExposure { survival_end: 8.0, exposure_end: 6.0 })
    );
}

#[test]
// Purpose
// -------
// A harsher exposure kills more: scaling the concentration pulse up
// drives the terminal survival down for the same SD parameters.
//
// Given
// -----
// - The pulse at its base height and at three times the height.
//
// Expect
// ------
// - Strictly lower terminal survival under the taller pulse.
fn taller_pulse_kills_more() {
    // Arrange
    let mild = pulsed_data().with_time_steps(200).unwrap();
    let harsh = {
        let exposure =
            ExposureSeries::new(array![0.0, 2.0, 6.0], array![0.0, 18.0, 0.0]).unwrap();
        let timeline = SurvivalTimeline::new(array![0.0, 2.0, 4.0, 6.0]).unwrap();
        let observed = ObservedSurvivors::new(array![20, 16, 11, 9]).unwrap();
        GutsData::new(exposure, timeline, observed, 2.0).unwrap().with_time_steps(200).unwrap()
    };
    let sd_spec = spec(TdFamily::StochasticDeath, ThresholdDistribution::Delta);
    let params = [0.01, 0.7, 0.5, 2.0];

    // Act
    let mild_outcome =
        guts_red::projection::engine::run_projection(&mild, sd_spec, &params, None).unwrap();
    let harsh_outcome =
        guts_red::projection::engine::run_projection(&harsh, sd_spec, &params, None).unwrap();

    // Assert
    let last = mild_outcome.survival.len() - 1;
    assert!(harsh_outcome.survival[last] < mild_outcome.survival[last]);
}
