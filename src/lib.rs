//! GUTS-RED survival projection and likelihood scoring.
//!
//! This crate implements the reduced General Unified Threshold models of
//! Survival (GUTS-RED): survival-probability curves and goodness-of-fit
//! scores for organisms under time-varying toxicant exposure, for a given
//! parameter vector.
//!
//! ## Structure
//! - [`projection`]: the modeling core — validated input containers, the
//!   closed-form toxicokinetic damage solver, threshold-distribution
//!   samplers, the toxicodynamic death models (SD / IT / Proper), the two
//!   projection strategies, and the variant-dispatching engine.
//! - [`scoring`]: log-likelihood, survival-probability prediction error
//!   (SPPE), and sum-of-squares over a projected curve and observed
//!   survivor counts.
//! - [`utils`]: small shared sequence helpers.
//!
//! ## Typical usage
//! Build a [`projection::core::data::GutsData`] from exposure and survival
//! observations, pick a [`projection::engine::ModelSpec`], and call
//! [`projection::engine::run_projection`] with the variant's parameter
//! vector. The returned [`projection::engine::ProjectionOutcome`] carries
//! the survival curve, the damage trajectory, and all three scores.
//!
//! Parameter estimation is out of scope: the crate evaluates models, it
//! does not fit them.
pub mod projection;
pub mod scoring;
pub mod utils;

pub use projection::engine::{ModelSpec, ProjectionOutcome, TdFamily, ThresholdDistribution};
pub use projection::errors::{DistError, DistResult, GutsError, GutsResult};
