//! Fourth order Runge-Kutta discretization.

use std::fmt;

use tracing::debug;

use crate::continuous::ContinuousSystem;
use crate::discretization::Discretizer;
use crate::error::{SystemError, SystemResult};
use crate::ss::{StateSpace, assign_state};
use crate::system::DiscreteSystem;
use crate::types::{Matrix, Vector, check_len, format_vector};

/// Classic RK4 over one sampling period.
///
/// The input inside the period is interpolated linearly between `u(n-1)`
/// and `u(n)`:
///
/// ```text
/// u12 = (u(n) + u(n-1)) / 2
/// k1  = f(x(n-1),             u(n-1))
/// k2  = f(x(n-1) + Ts/2 k1,   u12)
/// k3  = f(x(n-1) + Ts/2 k2,   u12)
/// k4  = f(x(n-1) + Ts k3,     u(n))
/// x(n) = x(n-1) + Ts/6 (k1 + 2 k2 + 2 k3 + k4)
/// ```
///
/// `apply` always uses the stored previous input. The stateless
/// `state_fcn(x, u)` assumes `u(n-1) = u(n)` unless
/// `use_previous_input_everywhere` is set.
#[derive(Clone)]
pub struct Rk4 {
    system: Box<dyn ContinuousSystem>,
    ts: f64,
    use_previous_input_everywhere: bool,
    u_n_1: Vector,
    state: Vector,
    output: Vector,
}

impl Rk4 {
    pub fn new(
        system: &dyn ContinuousSystem,
        ts: f64,
        use_previous_input_everywhere: bool,
    ) -> SystemResult<Self> {
        if ts.is_nan() || ts <= 0.0 {
            return Err(SystemError::Numeric {
                context: "RK4",
                reason: format!("sampling time must be positive, got {ts}"),
            });
        }
        debug!(
            "RK4 created: Ts = {ts}, {} states, previous input everywhere = {use_previous_input_everywhere}",
            system.size_state()
        );
        Ok(Self {
            ts,
            use_previous_input_everywhere,
            u_n_1: Vector::zeros(system.size_input()),
            state: Vector::zeros(system.size_state()),
            output: Vector::zeros(system.size_output()),
            system: system.clone_continuous(),
        })
    }

    /// Linear interpolation of the input at mid period.
    pub fn estimate_mean_inputs(u_n: &Vector, u_n_1: &Vector) -> Vector {
        (u_n + u_n_1) / 2.0
    }

    /// Stored `u(n-1)`.
    pub fn previous_input(&self) -> &Vector {
        &self.u_n_1
    }

    fn check_inputs(&self, x_n_1: &Vector, u_n: &Vector, u_n_1: &Vector) -> SystemResult<()> {
        check_len("RK4(x)", x_n_1, self.system.size_state())?;
        check_len("RK4(u_n)", u_n, self.system.size_input())?;
        check_len("RK4(u_n_1)", u_n_1, self.system.size_input())
    }

    /// RK4 step with an explicit previous input.
    pub fn state_fcn_with_previous(
        &self,
        x_n_1: &Vector,
        u_n: &Vector,
        u_n_1: &Vector,
    ) -> SystemResult<Vector> {
        self.check_inputs(x_n_1, u_n, u_n_1)?;
        let ts_2 = self.ts / 2.0;
        let u_n_12 = Self::estimate_mean_inputs(u_n, u_n_1);

        let k1 = self.system.state_fcn(x_n_1, u_n_1)?;
        let k2 = self.system.state_fcn(&(x_n_1 + &k1 * ts_2), &u_n_12)?;
        let k3 = self.system.state_fcn(&(x_n_1 + &k2 * ts_2), &u_n_12)?;
        let k4 = self.system.state_fcn(&(x_n_1 + &k3 * self.ts), u_n)?;

        Ok(x_n_1 + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (self.ts / 6.0))
    }

    /// Jacobian of [`Self::state_fcn_with_previous`] w.r.t. `x(n-1)`,
    /// propagated through every stage.
    pub fn jacob_state_fcn_with_previous(
        &self,
        x_n_1: &Vector,
        u_n: &Vector,
        u_n_1: &Vector,
    ) -> SystemResult<Matrix> {
        self.check_inputs(x_n_1, u_n, u_n_1)?;
        let n = self.system.size_state();
        let identity = Matrix::identity(n, n);
        let ts_2 = self.ts / 2.0;
        let u_n_12 = Self::estimate_mean_inputs(u_n, u_n_1);

        let x2 = x_n_1 + self.system.state_fcn(x_n_1, u_n_1)? * ts_2;
        let x3 = x_n_1 + self.system.state_fcn(&x2, &u_n_12)? * ts_2;
        let x4 = x_n_1 + self.system.state_fcn(&x3, &u_n_12)? * self.ts;

        let jacobian_at = |x: &Vector, u: &Vector| -> SystemResult<Matrix> {
            let j = self.system.jacob_state_fcn(x, u)?;
            if j.shape() != (n, n) {
                return Err(SystemError::invalid_dimensions(
                    "RK4",
                    format!("state jacobian is {}x{}, expected {n}x{n}", j.nrows(), j.ncols()),
                ));
            }
            Ok(j)
        };

        let jac_k1 = jacobian_at(x_n_1, u_n_1)?;
        let jac_k2 = jacobian_at(&x2, &u_n_12)? * (&identity + &jac_k1 * ts_2);
        let jac_k3 = jacobian_at(&x3, &u_n_12)? * (&identity + &jac_k2 * ts_2);
        let jac_k4 = jacobian_at(&x4, u_n)? * (&identity + &jac_k3 * self.ts);

        Ok(identity + (jac_k1 + jac_k2 * 2.0 + jac_k3 * 2.0 + jac_k4) * (self.ts / 6.0))
    }

    fn stage_previous_input<'a>(&'a self, u_k: &'a Vector) -> &'a Vector {
        if self.use_previous_input_everywhere {
            &self.u_n_1
        } else {
            u_k
        }
    }
}

impl fmt::Debug for Rk4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rk4")
            .field("ts", &self.ts)
            .field("use_previous_input_everywhere", &self.use_previous_input_everywhere)
            .field("state", &self.state.as_slice())
            .finish_non_exhaustive()
    }
}

impl DiscreteSystem for Rk4 {
    fn apply(&mut self, u_k: &Vector) -> SystemResult<&Vector> {
        let x_k = self.state_fcn_with_previous(&self.state, u_k, &self.u_n_1)?;
        let y_k = self.system.output_fcn(&x_k, u_k)?;
        self.state = x_k;
        self.u_n_1.copy_from(u_k);
        self.output = y_k;
        Ok(&self.output)
    }

    fn reset(&mut self) {
        self.state.fill(0.0);
        self.output.fill(0.0);
        self.u_n_1.fill(0.0);
    }

    fn size_input(&self) -> usize {
        self.system.size_input()
    }

    fn size_output(&self) -> usize {
        self.system.size_output()
    }

    fn describe(&self) -> String {
        format!(
            "RK4:\n   Ts: {}\n   state: {}\n   u(n-1): {}\n{}",
            self.ts,
            format_vector(&self.state),
            format_vector(&self.u_n_1),
            self.system.describe()
        )
    }

    fn clone_system(&self) -> Box<dyn DiscreteSystem> {
        Box::new(self.clone())
    }
}

impl StateSpace for Rk4 {
    fn state(&self) -> &Vector {
        &self.state
    }

    fn set_state(&mut self, state: &Vector) -> SystemResult<()> {
        assign_state("RK4::set_state", &mut self.state, state)
    }

    fn output(&self) -> &Vector {
        &self.output
    }

    fn size_state(&self) -> usize {
        self.system.size_state()
    }

    fn state_fcn(&self, x_k_1: &Vector, u_k: &Vector) -> SystemResult<Vector> {
        self.state_fcn_with_previous(x_k_1, u_k, self.stage_previous_input(u_k))
    }

    fn output_fcn(&self, x_k: &Vector, u_k: &Vector) -> SystemResult<Vector> {
        self.system.output_fcn(x_k, u_k)
    }

    fn jacob_state_fcn(&self, x_k_1: &Vector, u_k: &Vector) -> SystemResult<Matrix> {
        self.jacob_state_fcn_with_previous(x_k_1, u_k, self.stage_previous_input(u_k))
    }

    fn jacob_output_fcn(&self, x_k: &Vector, u_k: &Vector) -> SystemResult<Matrix> {
        self.system.jacob_output_fcn(x_k, u_k)
    }

    fn clone_state_space(&self) -> Box<dyn StateSpace> {
        Box::new(self.clone())
    }
}

impl Discretizer for Rk4 {
    fn sampling_time(&self) -> f64 {
        self.ts
    }

    fn continuous_system(&self) -> &dyn ContinuousSystem {
        self.system.as_ref()
    }
}
