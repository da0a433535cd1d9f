//! Discrete time state space systems.
//!
//! ```text
//! x(k) = f(x(k-1), u(k))
//! y(k) = h(x(k), u(k))
//! ```
//!
//! [`StateSpace`] extends [`DiscreteSystem`] with access to the state and
//! the transition/output functions and their jacobians. Implementors keep
//! `state` and `output` themselves and step through [`ss_step`].

mod linear;
mod nonlinear;

pub use linear::SsLinear;
pub use nonlinear::{Ss, SsFcn, SsJacobFcn};

use crate::error::SystemResult;
use crate::system::DiscreteSystem;
use crate::types::{Matrix, Vector, check_len};

pub trait StateSpace: DiscreteSystem {
    fn state(&self) -> &Vector;

    /// Overwrite the state. The length must match `size_state()`.
    fn set_state(&mut self, state: &Vector) -> SystemResult<()>;

    /// Output computed by the last `apply`.
    fn output(&self) -> &Vector;

    fn size_state(&self) -> usize;

    /// `x(k) = f(x(k-1), u(k))`
    fn state_fcn(&self, x_k_1: &Vector, u_k: &Vector) -> SystemResult<Vector>;

    /// `y(k) = h(x(k), u(k))`
    fn output_fcn(&self, x_k: &Vector, u_k: &Vector) -> SystemResult<Vector>;

    /// `F = df/dx (x(k-1), u(k))`
    fn jacob_state_fcn(&self, x_k_1: &Vector, u_k: &Vector) -> SystemResult<Matrix>;

    /// `H = dh/dx (x(k), u(k))`
    fn jacob_output_fcn(&self, x_k: &Vector, u_k: &Vector) -> SystemResult<Matrix>;

    fn clone_state_space(&self) -> Box<dyn StateSpace>;
}

impl Clone for Box<dyn StateSpace> {
    fn clone(&self) -> Self {
        self.clone_state_space()
    }
}

/// One step of the standard state space recursion.
///
/// Returns the new state and output without storing them, so the caller
/// only commits them when both functions succeeded.
pub fn ss_step<S: StateSpace + ?Sized>(system: &S, u_k: &Vector) -> SystemResult<(Vector, Vector)> {
    check_len("SS_Interface::apply", u_k, system.size_input())?;
    let x_k = system.state_fcn(system.state(), u_k)?;
    let y_k = system.output_fcn(&x_k, u_k)?;
    Ok((x_k, y_k))
}

/// Shared `set_state` body: length check then copy.
pub(crate) fn assign_state(
    context: &'static str,
    target: &mut Vector,
    state: &Vector,
) -> SystemResult<()> {
    check_len(context, state, target.len())?;
    target.copy_from(state);
    Ok(())
}
