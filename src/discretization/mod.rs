//! Discretization of continuous time systems.

mod rk4;

pub use rk4::Rk4;

use crate::continuous::ContinuousSystem;
use crate::ss::StateSpace;

/// A discrete state space system obtained by integrating a continuous one
/// over a fixed sampling time.
pub trait Discretizer: StateSpace {
    fn sampling_time(&self) -> f64;

    /// The continuous system being integrated.
    fn continuous_system(&self) -> &dyn ContinuousSystem;
}
