//! Input containers, the toxicokinetic solver, and threshold samplers.
pub mod damage;
pub mod data;
pub mod distributions;
pub mod samplers;
pub mod validation;
