//! Observer view over a state space system that already takes `[u; y]`.
//!
//! The typical use is a continuous observer discretized with RK4: the
//! result is a plain [`StateSpace`] whose input happens to contain the
//! measures, and this wrapper gives it the [`Observer`] interface.

use std::fmt;

use crate::error::{SystemError, SystemResult};
use crate::observers::Observer;
use crate::ss::StateSpace;
use crate::system::DiscreteSystem;
use crate::types::{Matrix, Vector};

#[derive(Clone)]
pub struct SsObserver {
    system: Box<dyn StateSpace>,
}

impl SsObserver {
    /// `system` input must be `[u; y]` with `y` the size of its output.
    pub fn new(system: &dyn StateSpace) -> SystemResult<Self> {
        if system.size_input() < system.size_output() {
            return Err(SystemError::invalid_dimensions(
                "Observer_SS_Incapsuler",
                format!(
                    "input of size {} cannot hold a measure of size {}",
                    system.size_input(),
                    system.size_output()
                ),
            ));
        }
        Ok(Self {
            system: system.clone_state_space(),
        })
    }

    pub fn inner(&self) -> &dyn StateSpace {
        self.system.as_ref()
    }

    fn without_measure(&self, u_k: &Vector) -> SystemResult<Vector> {
        self.build_full_input(u_k, &Vector::zeros(self.size_output()))
    }
}

impl fmt::Debug for SsObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SsObserver")
            .field("state", &self.system.state().as_slice())
            .finish_non_exhaustive()
    }
}

impl DiscreteSystem for SsObserver {
    fn apply(&mut self, u_k: &Vector) -> SystemResult<&Vector> {
        self.system.apply(u_k)
    }

    fn reset(&mut self) {
        self.system.reset();
    }

    fn size_input(&self) -> usize {
        self.system.size_input()
    }

    fn size_output(&self) -> usize {
        self.system.size_output()
    }

    fn describe(&self) -> String {
        format!("Observer_SS:\n{}", self.system.describe())
    }

    fn clone_system(&self) -> Box<dyn DiscreteSystem> {
        Box::new(self.clone())
    }
}

impl StateSpace for SsObserver {
    fn state(&self) -> &Vector {
        self.system.state()
    }

    fn set_state(&mut self, state: &Vector) -> SystemResult<()> {
        self.system.set_state(state)
    }

    fn output(&self) -> &Vector {
        self.system.output()
    }

    fn size_state(&self) -> usize {
        self.system.size_state()
    }

    fn state_fcn(&self, x_k_1: &Vector, u_k: &Vector) -> SystemResult<Vector> {
        self.system.state_fcn(x_k_1, u_k)
    }

    fn output_fcn(&self, x_k: &Vector, u_k: &Vector) -> SystemResult<Vector> {
        self.system.output_fcn(x_k, u_k)
    }

    fn jacob_state_fcn(&self, x_k_1: &Vector, u_k: &Vector) -> SystemResult<Matrix> {
        self.system.jacob_state_fcn(x_k_1, u_k)
    }

    fn jacob_output_fcn(&self, x_k: &Vector, u_k: &Vector) -> SystemResult<Matrix> {
        self.system.jacob_output_fcn(x_k, u_k)
    }

    fn clone_state_space(&self) -> Box<dyn StateSpace> {
        Box::new(self.clone())
    }
}

impl Observer for SsObserver {
    fn obs_state_fcn(&self, x_k_1: &Vector, u_k: &Vector, y_k: &Vector) -> SystemResult<Vector> {
        let full = self.build_full_input(u_k, y_k)?;
        self.system.state_fcn(x_k_1, &full)
    }

    /// The output does not depend on the measure, it is evaluated with `y = 0`.
    fn obs_output_fcn(&self, x_k: &Vector, u_k: &Vector) -> SystemResult<Vector> {
        let full = self.without_measure(u_k)?;
        self.system.output_fcn(x_k, &full)
    }

    fn obs_jacob_state_fcn(&self, x_k_1: &Vector, u_k: &Vector, y_k: &Vector) -> SystemResult<Matrix> {
        let full = self.build_full_input(u_k, y_k)?;
        self.system.jacob_state_fcn(x_k_1, &full)
    }

    fn obs_jacob_output_fcn(&self, x_k: &Vector, u_k: &Vector) -> SystemResult<Matrix> {
        let full = self.without_measure(u_k)?;
        self.system.jacob_output_fcn(x_k, &full)
    }

    fn obs_apply(&mut self, u_k: &Vector, y_k: &Vector) -> SystemResult<&Vector> {
        let full = self.build_full_input(u_k, y_k)?;
        self.system.apply(&full)
    }

    fn clone_observer(&self) -> Box<dyn Observer> {
        Box::new(self.clone())
    }
}
