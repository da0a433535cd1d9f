//! Extended Kalman filter.

use std::fmt;

use tracing::{debug, trace};

use crate::error::{SystemError, SystemResult};
use crate::observers::Observer;
use crate::ss::{StateSpace, assign_state};
use crate::system::DiscreteSystem;
use crate::types::{Matrix, Vector, check_len, check_shape, format_vector};

/// Singular values below `max * PINV_CONDITION` are dropped when inverting
/// the innovation covariance.
const PINV_CONDITION: f64 = 1e-9;

/// Extended Kalman filter on a discrete state space model.
///
/// `W` is the process noise covariance and `V` the measure noise
/// covariance. The model must provide both jacobians.
///
/// ```text
/// x-  = f(x(k-1), u(k))          F = Jf(x(k-1), u(k))
/// P-  = F P F' + W
/// y~  = y(k) - h(x-, u(k))       H = Jh(x-, u(k))
/// S   = H P- H' + V
/// K   = P- H' S^+
/// x(k) = x- + K y~
/// P    = (I - K H) P-
/// ```
#[derive(Clone)]
pub struct KalmanFilter {
    system: Box<dyn StateSpace>,
    w: Matrix,
    v: Matrix,
    p: Matrix,
    state: Vector,
    output: Vector,
}

impl KalmanFilter {
    /// Starts from the current state of `system` with `P = W`.
    pub fn new(system: &dyn StateSpace, w: Matrix, v: Matrix) -> SystemResult<Self> {
        let n = system.size_state();
        let m = system.size_output();
        check_shape("Kalman_Filter", "W", &w, n, n)?;
        check_shape("Kalman_Filter", "V", &v, m, m)?;
        debug!("Kalman filter created: {n} states, {m} outputs");
        Ok(Self {
            p: w.clone(),
            state: system.state().clone(),
            output: Vector::zeros(m),
            system: system.clone_state_space(),
            w,
            v,
        })
    }

    pub fn covariance(&self) -> &Matrix {
        &self.p
    }

    pub fn w(&self) -> &Matrix {
        &self.w
    }

    pub fn v(&self) -> &Matrix {
        &self.v
    }

    pub fn set_w(&mut self, w: Matrix) -> SystemResult<()> {
        let n = self.size_state();
        check_shape("Kalman_Filter::set_w", "W", &w, n, n)?;
        self.w = w;
        Ok(())
    }

    pub fn set_v(&mut self, v: Matrix) -> SystemResult<()> {
        let m = self.size_output();
        check_shape("Kalman_Filter::set_v", "V", &v, m, m)?;
        self.v = v;
        Ok(())
    }

    /// Replace the noise covariances, then step.
    pub fn kf_apply(&mut self, u_k: &Vector, y_k: &Vector, w: Matrix, v: Matrix) -> SystemResult<&Vector> {
        self.set_w(w)?;
        self.set_v(v)?;
        self.obs_apply(u_k, y_k)
    }

    fn predict_and_update(&self, u_k: &Vector, y_k: &Vector) -> SystemResult<(Vector, Matrix, Vector)> {
        let n = self.size_state();
        let m = self.size_output();

        let x_pred = self.system.state_fcn(&self.state, u_k)?;
        let f = self.system.jacob_state_fcn(&self.state, u_k)?;
        check_shape("Kalman_Filter", "jacob_state", &f, n, n)?;
        let p_pred = &f * &self.p * f.transpose() + &self.w;

        let innovation = y_k - self.system.output_fcn(&x_pred, u_k)?;
        let h = self.system.jacob_output_fcn(&x_pred, u_k)?;
        check_shape("Kalman_Filter", "jacob_output", &h, m, n)?;
        let s = &h * &p_pred * h.transpose() + &self.v;
        let k = &p_pred * h.transpose() * pseudo_inverse(s)?;

        let x_k = x_pred + &k * innovation;
        let p_k = (Matrix::identity(n, n) - &k * &h) * p_pred;
        let y_hat = self.system.output_fcn(&x_k, u_k)?;
        Ok((x_k, p_k, y_hat))
    }
}

fn pseudo_inverse(s: Matrix) -> SystemResult<Matrix> {
    let svd = s.svd(true, true);
    let eps = svd.singular_values.max() * PINV_CONDITION;
    svd.pseudo_inverse(eps).map_err(|reason| SystemError::Numeric {
        context: "Kalman_Filter",
        reason: reason.to_string(),
    })
}

impl fmt::Debug for KalmanFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KalmanFilter")
            .field("p", &self.p)
            .field("state", &self.state.as_slice())
            .finish_non_exhaustive()
    }
}

impl DiscreteSystem for KalmanFilter {
    /// `u_k` is the stacked `[u; y]`.
    fn apply(&mut self, u_k: &Vector) -> SystemResult<&Vector> {
        let (u, y) = self.split_full_input(u_k)?;
        self.obs_apply(&u, &y)
    }

    fn reset(&mut self) {
        self.state.fill(0.0);
        self.output.fill(0.0);
        self.system.reset();
        self.p = self.w.clone();
    }

    fn size_input(&self) -> usize {
        self.system.size_input() + self.system.size_output()
    }

    fn size_output(&self) -> usize {
        self.system.size_output()
    }

    fn describe(&self) -> String {
        format!(
            "Kalman_Filter:\nW:{}V:{}P:{}x_hat: {}\n{}",
            self.w,
            self.v,
            self.p,
            format_vector(&self.state),
            self.system.describe()
        )
    }

    fn clone_system(&self) -> Box<dyn DiscreteSystem> {
        Box::new(self.clone())
    }
}

impl StateSpace for KalmanFilter {
    fn state(&self) -> &Vector {
        &self.state
    }

    fn set_state(&mut self, state: &Vector) -> SystemResult<()> {
        assign_state("Kalman_Filter::set_state", &mut self.state, state)
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

// The filter update depends on P, so it has no stateless form.
impl Observer for KalmanFilter {
    fn obs_state_fcn(&self, _x_k_1: &Vector, _u_k: &Vector, _y_k: &Vector) -> SystemResult<Vector> {
        Err(SystemError::unsupported("Kalman_Filter", "obs_state_fcn"))
    }

    fn obs_output_fcn(&self, _x_k: &Vector, _u_k: &Vector) -> SystemResult<Vector> {
        Err(SystemError::unsupported("Kalman_Filter", "obs_output_fcn"))
    }

    fn obs_jacob_state_fcn(&self, _x_k_1: &Vector, _u_k: &Vector, _y_k: &Vector) -> SystemResult<Matrix> {
        Err(SystemError::unsupported("Kalman_Filter", "obs_jacob_state_fcn"))
    }

    fn obs_jacob_output_fcn(&self, _x_k: &Vector, _u_k: &Vector) -> SystemResult<Matrix> {
        Err(SystemError::unsupported("Kalman_Filter", "obs_jacob_output_fcn"))
    }

    fn obs_apply(&mut self, u_k: &Vector, y_k: &Vector) -> SystemResult<&Vector> {
        check_len("Kalman_Filter::obs_apply(u)", u_k, self.size_real_input())?;
        check_len("Kalman_Filter::obs_apply(y)", y_k, self.size_output())?;
        let (x_k, p_k, y_hat) = self.predict_and_update(u_k, y_k)?;
        trace!("Kalman update: x_hat = {}", format_vector(&x_k));
        self.state = x_k;
        self.p = p_k;
        self.output = y_hat;
        Ok(&self.output)
    }

    fn clone_observer(&self) -> Box<dyn Observer> {
        Box::new(self.clone())
    }
}
