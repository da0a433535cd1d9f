//! State space system defined by closures.

use std::fmt;
use std::sync::Arc;

use crate::error::{SystemError, SystemResult};
use crate::ss::{StateSpace, assign_state, ss_step};
use crate::system::DiscreteSystem;
use crate::types::{Matrix, Vector, check_len, format_vector};

/// `(x, u) -> vector`, used for state transition and output functions.
pub type SsFcn = Arc<dyn Fn(&Vector, &Vector) -> Vector + Send + Sync>;

/// `(x, u) -> matrix`, used for jacobians.
pub type SsJacobFcn = Arc<dyn Fn(&Vector, &Vector) -> Matrix + Send + Sync>;

/// Generic state space system whose functions are provided at run time.
///
/// Jacobians are optional; asking for a missing one is an error rather than
/// a panic so that observers needing them fail cleanly.
#[derive(Clone)]
pub struct Ss {
    state_fcn: SsFcn,
    output_fcn: SsFcn,
    jacob_state_fcn: Option<SsJacobFcn>,
    jacob_output_fcn: Option<SsJacobFcn>,
    dim_input: usize,
    dim_output: usize,
    state: Vector,
    output: Vector,
}

impl Ss {
    pub fn new(
        dim_state: usize,
        dim_output: usize,
        dim_input: usize,
        state_fcn: SsFcn,
        output_fcn: SsFcn,
    ) -> Self {
        Self {
            state_fcn,
            output_fcn,
            jacob_state_fcn: None,
            jacob_output_fcn: None,
            dim_input,
            dim_output,
            state: Vector::zeros(dim_state),
            output: Vector::zeros(dim_output),
        }
    }

    pub fn with_jacobians(mut self, jacob_state_fcn: SsJacobFcn, jacob_output_fcn: SsJacobFcn) -> Self {
        self.jacob_state_fcn = Some(jacob_state_fcn);
        self.jacob_output_fcn = Some(jacob_output_fcn);
        self
    }

    pub fn has_jacobians(&self) -> bool {
        self.jacob_state_fcn.is_some() && self.jacob_output_fcn.is_some()
    }
}

impl fmt::Debug for Ss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ss")
            .field("dim_state", &self.state.len())
            .field("dim_input", &self.dim_input)
            .field("dim_output", &self.dim_output)
            .field("has_jacobians", &self.has_jacobians())
            .finish_non_exhaustive()
    }
}

impl DiscreteSystem for Ss {
    fn apply(&mut self, u_k: &Vector) -> SystemResult<&Vector> {
        let (x_k, y_k) = ss_step(self, u_k)?;
        self.state = x_k;
        self.output = y_k;
        Ok(&self.output)
    }

    fn reset(&mut self) {
        self.state.fill(0.0);
        self.output.fill(0.0);
    }

    fn size_input(&self) -> usize {
        self.dim_input
    }

    fn size_output(&self) -> usize {
        self.dim_output
    }

    fn describe(&self) -> String {
        format!(
            "SS:\nFunctions are defined run-time\nstate: {}\nSS [END]",
            format_vector(&self.state)
        )
    }

    fn clone_system(&self) -> Box<dyn DiscreteSystem> {
        Box::new(self.clone())
    }
}

impl StateSpace for Ss {
    fn state(&self) -> &Vector {
        &self.state
    }

    fn set_state(&mut self, state: &Vector) -> SystemResult<()> {
        assign_state("SS::set_state", &mut self.state, state)
    }

    fn output(&self) -> &Vector {
        &self.output
    }

    fn size_state(&self) -> usize {
        self.state.len()
    }

    fn state_fcn(&self, x_k_1: &Vector, u_k: &Vector) -> SystemResult<Vector> {
        let x_k = (self.state_fcn)(x_k_1, u_k);
        check_len("SS::state_fcn(result)", &x_k, self.state.len())?;
        Ok(x_k)
    }

    fn output_fcn(&self, x_k: &Vector, u_k: &Vector) -> SystemResult<Vector> {
        let y_k = (self.output_fcn)(x_k, u_k);
        check_len("SS::output_fcn(result)", &y_k, self.dim_output)?;
        Ok(y_k)
    }

    fn jacob_state_fcn(&self, x_k_1: &Vector, u_k: &Vector) -> SystemResult<Matrix> {
        let jacob = self.jacob_state_fcn.as_ref().ok_or(SystemError::MissingJacobian {
            context: "SS",
            function: "state",
        })?;
        Ok(jacob(x_k_1, u_k))
    }

    fn jacob_output_fcn(&self, x_k: &Vector, u_k: &Vector) -> SystemResult<Matrix> {
        let jacob = self.jacob_output_fcn.as_ref().ok_or(SystemError::MissingJacobian {
            context: "SS",
            function: "output",
        })?;
        Ok(jacob(x_k, u_k))
    }

    fn clone_state_space(&self) -> Box<dyn StateSpace> {
        Box::new(self.clone())
    }
}
