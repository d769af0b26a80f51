//! GUTS-RED modeling core.
//!
//! Layout mirrors the flow of a projection run:
//! - [`core`]: validated input containers, the toxicokinetic damage solver,
//!   threshold-distribution samplers and exact CDF evaluators.
//! - [`models`]: the toxicodynamic death models behind the
//!   [`models::Toxicodynamics`] seam.
//! - [`projector`]: the dense and extremum-driven projection strategies.
//! - [`engine`]: runtime variant dispatch producing a scored outcome.
//! - [`errors`]: structured error enums and result aliases.
pub mod core;
pub mod engine;
pub mod errors;
pub mod models;
pub mod projector;
