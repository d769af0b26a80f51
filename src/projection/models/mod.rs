//! Toxicodynamic death models behind the [`Toxicodynamics`] seam.
//!
//! A projector drives any model through the same protocol: reset with
//! [`Toxicodynamics::set_start_conditions`], feed damage evaluations
//! through [`Toxicodynamics::gather_effect`] until the next survival
//! observation time, and read the survival probability with
//! [`Toxicodynamics::current_survival`]. Models whose effect depends only
//! on the running damage *maximum* additionally carry the
//! [`MaximumDriven`] marker, which admits them to the extremum-driven fast
//! projector.
use crate::projection::errors::GutsResult;

pub mod it;
pub mod proper;
pub mod sd;

/// Protocol between a projector and a toxicodynamic death model.
pub trait Toxicodynamics {
    /// Reset all accumulated effect state for a fresh projection run.
    /// Regenerates derived quantities (importance samples, CDF
    /// evaluators) from the current parameters, surfacing domain errors.
    fn set_start_conditions(&mut self) -> GutsResult<()>;

    /// Fold one damage evaluation into the accumulated effect.
    fn gather_effect(&mut self, damage: f64);

    /// Whether further damage input can still change the survival
    /// probability. Projectors stop stepping early when this turns false.
    fn is_still_gathering(&self) -> bool;

    /// Hook invoked when the projector crosses a survival observation
    /// time. Most models carry no per-observation state.
    fn update_to_next_survival_measurement(&mut self) {}

    /// Survival probability at observation time `yt`, including background
    /// mortality `exp(-hb * yt)`.
    fn current_survival(&self, yt: f64) -> f64;

    fn background_mortality(&self) -> f64;

    fn set_background_mortality(&mut self, hb: f64);
}

/// Marker for models whose accumulated effect is a function of the running
/// damage maximum alone. Only these may run on the fast projector, which
/// skips every damage evaluation that cannot be an interval maximum.
pub trait MaximumDriven: Toxicodynamics {}
