//! Core discrete-time system interfaces.
//!
//! A [`DiscreteSystem`] is anything that can be stepped with an input vector
//! `u(k)` and produces an output vector `y(k)` while keeping its own internal
//! state. [`SisoSystem`] narrows this to scalar input and output.

use crate::error::{SystemError, SystemResult};
use crate::types::Vector;

/// A discrete time system with internal state.
pub trait DiscreteSystem: Send + Sync {
    /// Advance one step with input `u(k)` and return `y(k)`.
    ///
    /// The internal state is updated.
    fn apply(&mut self, u_k: &Vector) -> SystemResult<&Vector>;

    /// Set the internal state to zero.
    fn reset(&mut self);

    fn size_input(&self) -> usize;

    fn size_output(&self) -> usize;

    /// Human readable dump of the system and its state.
    fn describe(&self) -> String;

    fn clone_system(&self) -> Box<dyn DiscreteSystem>;
}

impl Clone for Box<dyn DiscreteSystem> {
    fn clone(&self) -> Self {
        self.clone_system()
    }
}

/// A discrete time system with scalar input and output.
pub trait SisoSystem: DiscreteSystem {
    /// Advance one step with the scalar input `u(k)` and return `y(k)`.
    fn apply_scalar(&mut self, u_k: f64) -> f64;

    /// Output produced by the last call to `apply_scalar`.
    fn last_output(&self) -> f64;

    fn clone_siso(&self) -> Box<dyn SisoSystem>;
}

impl Clone for Box<dyn SisoSystem> {
    fn clone(&self) -> Self {
        self.clone_siso()
    }
}

/// Validate that a vector input to a SISO system is scalar and return it.
pub(crate) fn scalar_input(context: &'static str, u_k: &Vector) -> SystemResult<f64> {
    if u_k.len() != 1 {
        return Err(SystemError::DimensionMismatch {
            context,
            expected: 1,
            actual: u_k.len(),
        });
    }
    Ok(u_k[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::vector;

    #[test]
    fn test_scalar_input() {
        assert_eq!(scalar_input("test", &vector(&[2.5])), Ok(2.5));
        assert!(scalar_input("test", &vector(&[1.0, 2.0])).is_err());
        assert!(scalar_input("test", &vector(&[])).is_err());
    }
}
