//! Discrete Luenberger observer.

use std::fmt;

use tracing::debug;

use crate::error::SystemResult;
use crate::observers::{Observer, obs_step};
use crate::ss::{StateSpace, assign_state};
use crate::system::DiscreteSystem;
use crate::types::{Matrix, Vector, check_len, check_shape, format_vector};

/// ```text
/// x_hat(k) = f(x_hat(k-1), u(k)) + L (y(k) - h(x_hat(k-1), u(k)))
/// y_hat(k) = h(x_hat(k), u(k))
/// ```
#[derive(Clone)]
pub struct LuenbergerObserver {
    system: Box<dyn StateSpace>,
    l: Matrix,
    state: Vector,
    output: Vector,
}

impl LuenbergerObserver {
    /// The estimate starts from the current state of `system`.
    pub fn new(system: &dyn StateSpace, l: Matrix) -> SystemResult<Self> {
        check_shape(
            "Luenberger_Observer",
            "L",
            &l,
            system.size_state(),
            system.size_output(),
        )?;
        debug!(
            "Luenberger observer created: {} states, {} outputs",
            system.size_state(),
            system.size_output()
        );
        Ok(Self {
            state: system.state().clone(),
            output: Vector::zeros(system.size_output()),
            system: system.clone_state_space(),
            l,
        })
    }

    pub fn gain(&self) -> &Matrix {
        &self.l
    }
}

impl fmt::Debug for LuenbergerObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LuenbergerObserver")
            .field("l", &self.l)
            .field("state", &self.state.as_slice())
            .finish_non_exhaustive()
    }
}

impl DiscreteSystem for LuenbergerObserver {
    /// `u_k` is the stacked `[u; y]`.
    fn apply(&mut self, u_k: &Vector) -> SystemResult<&Vector> {
        let (u, y) = self.split_full_input(u_k)?;
        self.obs_apply(&u, &y)
    }

    fn reset(&mut self) {
        self.state.fill(0.0);
        self.output.fill(0.0);
    }

    fn size_input(&self) -> usize {
        self.system.size_input() + self.system.size_output()
    }

    fn size_output(&self) -> usize {
        self.system.size_output()
    }

    fn describe(&self) -> String {
        format!(
            "Luenberger_Observer:\nL:{}x_hat: {}\n{}",
            self.l,
            format_vector(&self.state),
            self.system.describe()
        )
    }

    fn clone_system(&self) -> Box<dyn DiscreteSystem> {
        Box::new(self.clone())
    }
}

impl StateSpace for LuenbergerObserver {
    fn state(&self) -> &Vector {
        &self.state
    }

    fn set_state(&mut self, state: &Vector) -> SystemResult<()> {
        assign_state("Luenberger_Observer::set_state", &mut self.state, state)
    }

    fn output(&self) -> &Vector {
        &self.output
    }

    fn size_state(&self) -> usize {
        self.system.size_state()
    }

    fn state_fcn(&self, x_k_1: &Vector, u_k: &Vector) -> SystemResult<Vector> {
        let (u, y) = self.split_full_input(u_k)?;
        self.obs_state_fcn(x_k_1, &u, &y)
    }

    fn output_fcn(&self, x_k: &Vector, u_k: &Vector) -> SystemResult<Vector> {
        let (u, _) = self.split_full_input(u_k)?;
        self.obs_output_fcn(x_k, &u)
    }

    fn jacob_state_fcn(&self, x_k_1: &Vector, u_k: &Vector) -> SystemResult<Matrix> {
        let (u, y) = self.split_full_input(u_k)?;
        self.obs_jacob_state_fcn(x_k_1, &u, &y)
    }

    fn jacob_output_fcn(&self, x_k: &Vector, u_k: &Vector) -> SystemResult<Matrix> {
        let (u, _) = self.split_full_input(u_k)?;
        self.obs_jacob_output_fcn(x_k, &u)
    }

    fn clone_state_space(&self) -> Box<dyn StateSpace> {
        Box::new(self.clone())
    }
}

impl Observer for LuenbergerObserver {
    fn obs_state_fcn(&self, x_k_1: &Vector, u_k: &Vector, y_k: &Vector) -> SystemResult<Vector> {
        check_len("Luenberger_Observer::obs_state_fcn(y)", y_k, self.size_output())?;
        let innovation = y_k - self.system.output_fcn(x_k_1, u_k)?;
        Ok(self.system.state_fcn(x_k_1, u_k)? + &self.l * innovation)
    }

    fn obs_output_fcn(&self, x_k: &Vector, u_k: &Vector) -> SystemResult<Vector> {
        self.system.output_fcn(x_k, u_k)
    }

    fn obs_jacob_state_fcn(&self, x_k_1: &Vector, u_k: &Vector, _y_k: &Vector) -> SystemResult<Matrix> {
        let n = self.size_state();
        let jf = self.system.jacob_state_fcn(x_k_1, u_k)?;
        let jh = self.system.jacob_output_fcn(x_k_1, u_k)?;
        check_shape("Luenberger_Observer", "jacob_state", &jf, n, n)?;
        check_shape("Luenberger_Observer", "jacob_output", &jh, self.size_output(), n)?;
        Ok(jf - &self.l * jh)
    }

    fn obs_jacob_output_fcn(&self, x_k: &Vector, u_k: &Vector) -> SystemResult<Matrix> {
        self.system.jacob_output_fcn(x_k, u_k)
    }

    fn obs_apply(&mut self, u_k: &Vector, y_k: &Vector) -> SystemResult<&Vector> {
        let (x_k, y_hat) = obs_step(self, u_k, y_k)?;
        self.state = x_k;
        self.output = y_hat;
        Ok(&self.output)
    }

    fn clone_observer(&self) -> Box<dyn Observer> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SystemError;
    use crate::ss::SsLinear;
    use crate::types::{concat, vector};

    /// x(k) = 0.5 x(k-1) + u(k), y(k) = x(k)
    fn plant() -> SsLinear {
        SsLinear::without_feedthrough(
            Matrix::from_element(1, 1, 0.5),
            Matrix::from_element(1, 1, 1.0),
            Matrix::from_element(1, 1, 1.0),
        )
        .unwrap()
    }

    #[test]
    fn test_gain_shape_checked() {
        let err = LuenbergerObserver::new(&plant(), Matrix::zeros(1, 2)).unwrap_err();
        assert!(matches!(err, SystemError::InvalidDimensions { .. }));
    }

    #[test]
    fn test_initial_estimate_is_system_state() {
        let sys = plant().with_initial_state(&vector(&[4.0])).unwrap();
        let obs = LuenbergerObserver::new(&sys, Matrix::from_element(1, 1, 0.3)).unwrap();
        assert_eq!(obs.state()[0], 4.0);
        assert_eq!(obs.size_input(), 2);
        assert_eq!(obs.size_real_input(), 1);
    }

    #[test]
    fn test_error_contracts_with_a_minus_lc() {
        let mut truth = plant().with_initial_state(&vector(&[1.0])).unwrap();
        let mut obs = LuenbergerObserver::new(&plant(), Matrix::from_element(1, 1, 0.3)).unwrap();
        let u = vector(&[0.0]);

        let mut error = 1.0;
        for _ in 0..5 {
            let y = truth.state().clone();
            truth.apply(&u).unwrap();
            obs.obs_apply(&u, &y).unwrap();
            let next = truth.state()[0] - obs.state()[0];
            assert!((next - 0.2 * error).abs() < 1e-12);
            error = next;
        }
    }

    #[test]
    fn test_apply_with_full_input_matches_obs_apply() {
        let mut a = LuenbergerObserver::new(&plant(), Matrix::from_element(1, 1, 0.3)).unwrap();
        let mut b = a.clone();
        let u = vector(&[1.0]);
        let y = vector(&[2.0]);
        let ya = a.obs_apply(&u, &y).unwrap().clone();
        let yb = b.apply(&concat(&u, &y)).unwrap().clone();
        assert_eq!(ya, yb);
        assert!(b.apply(&u).is_err());
    }

    #[test]
    fn test_jacobian() {
        let obs = LuenbergerObserver::new(&plant(), Matrix::from_element(1, 1, 0.3)).unwrap();
        let j = obs
            .obs_jacob_state_fcn(&vector(&[0.0]), &vector(&[0.0]), &vector(&[0.0]))
            .unwrap();
        assert!((j[(0, 0)] - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_build_full_input_checks_parts() {
        let obs = LuenbergerObserver::new(&plant(), Matrix::from_element(1, 1, 0.3)).unwrap();
        assert!(obs.build_full_input(&vector(&[1.0, 2.0]), &vector(&[0.0])).is_err());
        let full = obs.build_full_input(&vector(&[1.0]), &vector(&[2.0])).unwrap();
        assert_eq!(full.as_slice(), &[1.0, 2.0]);
    }
}
