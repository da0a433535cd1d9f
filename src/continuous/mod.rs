//! Continuous time state space systems.
//!
//! ```text
//! dx/dt = f(x, u)
//! y     = h(x, u)
//! ```
//!
//! These cannot be stepped directly. Wrap them in a discretizer such as
//! [`crate::discretization::Rk4`] to obtain a [`crate::ss::StateSpace`].

mod observer;

pub use observer::{ContinuousLuenberger, ContinuousObserver};

use std::fmt;

use crate::error::{SystemError, SystemResult};
use crate::ss::{SsFcn, SsJacobFcn};
use crate::types::{Matrix, Vector, check_len};

pub trait ContinuousSystem: Send + Sync {
    /// State derivative `dx/dt = f(x, u)`.
    fn state_fcn(&self, x: &Vector, u: &Vector) -> SystemResult<Vector>;

    fn output_fcn(&self, x: &Vector, u: &Vector) -> SystemResult<Vector>;

    fn jacob_state_fcn(&self, x: &Vector, u: &Vector) -> SystemResult<Matrix>;

    fn jacob_output_fcn(&self, x: &Vector, u: &Vector) -> SystemResult<Matrix>;

    fn size_input(&self) -> usize;

    fn size_output(&self) -> usize;

    fn size_state(&self) -> usize;

    fn describe(&self) -> String;

    fn clone_continuous(&self) -> Box<dyn ContinuousSystem>;
}

impl Clone for Box<dyn ContinuousSystem> {
    fn clone(&self) -> Self {
        self.clone_continuous()
    }
}

/// Continuous system whose functions are provided at run time.
#[derive(Clone)]
pub struct FnContinuousSystem {
    dim_state: usize,
    dim_output: usize,
    dim_input: usize,
    state_fcn: SsFcn,
    output_fcn: SsFcn,
    jacob_state_fcn: Option<SsJacobFcn>,
    jacob_output_fcn: Option<SsJacobFcn>,
}

impl FnContinuousSystem {
    pub fn new(
        dim_state: usize,
        dim_output: usize,
        dim_input: usize,
        state_fcn: SsFcn,
        output_fcn: SsFcn,
    ) -> Self {
        Self {
            dim_state,
            dim_output,
            dim_input,
            state_fcn,
            output_fcn,
            jacob_state_fcn: None,
            jacob_output_fcn: None,
        }
    }

    pub fn with_jacobians(mut self, jacob_state_fcn: SsJacobFcn, jacob_output_fcn: SsJacobFcn) -> Self {
        self.jacob_state_fcn = Some(jacob_state_fcn);
        self.jacob_output_fcn = Some(jacob_output_fcn);
        self
    }
}

impl fmt::Debug for FnContinuousSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnContinuousSystem")
            .field("dim_state", &self.dim_state)
            .field("dim_input", &self.dim_input)
            .field("dim_output", &self.dim_output)
            .finish_non_exhaustive()
    }
}

impl ContinuousSystem for FnContinuousSystem {
    fn state_fcn(&self, x: &Vector, u: &Vector) -> SystemResult<Vector> {
        let x_dot = (self.state_fcn)(x, u);
        check_len("Continuous_System::state_fcn(result)", &x_dot, self.dim_state)?;
        Ok(x_dot)
    }

    fn output_fcn(&self, x: &Vector, u: &Vector) -> SystemResult<Vector> {
        let y = (self.output_fcn)(x, u);
        check_len("Continuous_System::output_fcn(result)", &y, self.dim_output)?;
        Ok(y)
    }

    fn jacob_state_fcn(&self, x: &Vector, u: &Vector) -> SystemResult<Matrix> {
        match &self.jacob_state_fcn {
            Some(jacob) => Ok(jacob(x, u)),
            None => Err(SystemError::MissingJacobian {
                context: "Continuous_System",
                function: "state",
            }),
        }
    }

    fn jacob_output_fcn(&self, x: &Vector, u: &Vector) -> SystemResult<Matrix> {
        match &self.jacob_output_fcn {
            Some(jacob) => Ok(jacob(x, u)),
            None => Err(SystemError::MissingJacobian {
                context: "Continuous_System",
                function: "output",
            }),
        }
    }

    fn size_input(&self) -> usize {
        self.dim_input
    }

    fn size_output(&self) -> usize {
        self.dim_output
    }

    fn size_state(&self) -> usize {
        self.dim_state
    }

    fn describe(&self) -> String {
        format!(
            "Continuous_System: {} states, {} inputs, {} outputs (functions defined run-time)",
            self.dim_state, self.dim_input, self.dim_output
        )
    }

    fn clone_continuous(&self) -> Box<dyn ContinuousSystem> {
        Box::new(self.clone())
    }
}
