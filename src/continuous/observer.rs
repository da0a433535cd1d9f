//! Continuous time observers.
//!
//! An observer is itself a continuous system whose input is the stacked
//! vector `[u; y]` of the observed system input and measured output. The
//! `obs_*` methods take `u` and `y` separately.

use std::fmt;

use tracing::debug;

use crate::continuous::ContinuousSystem;
use crate::error::SystemResult;
use crate::types::{Matrix, Vector, check_len, check_shape, split};

pub trait ContinuousObserver: ContinuousSystem {
    /// Estimated state derivative.
    fn obs_state_fcn(&self, x_hat: &Vector, u: &Vector, y: &Vector) -> SystemResult<Vector>;

    /// Estimated output.
    fn obs_output_fcn(&self, x_hat: &Vector, u: &Vector) -> SystemResult<Vector>;

    fn obs_jacob_state_fcn(&self, x_hat: &Vector, u: &Vector, y: &Vector) -> SystemResult<Matrix>;

    fn obs_jacob_output_fcn(&self, x_hat: &Vector, u: &Vector) -> SystemResult<Matrix>;

    /// Size of the observed system input `u`.
    fn size_real_input(&self) -> usize {
        self.size_input() - self.size_output()
    }

    /// Split `[u; y]`.
    fn split_full_input(&self, full: &Vector) -> SystemResult<(Vector, Vector)> {
        check_len("Continuous_Observer::split_full_input", full, self.size_input())?;
        split("Continuous_Observer::split_full_input", full, self.size_real_input())
    }
}

/// ```text
/// dx_hat/dt = f(x_hat, u) + L (y - h(x_hat, u))
/// y_hat     = h(x_hat, u)
/// ```
#[derive(Clone)]
pub struct ContinuousLuenberger {
    system: Box<dyn ContinuousSystem>,
    l: Matrix,
}

impl ContinuousLuenberger {
    /// `l` must be `size_state x size_output` of the observed system.
    pub fn new(system: &dyn ContinuousSystem, l: Matrix) -> SystemResult<Self> {
        check_shape(
            "Continuous_Luenberger_Observer",
            "L",
            &l,
            system.size_state(),
            system.size_output(),
        )?;
        debug!(
            "Continuous Luenberger observer created: {} states, {} outputs",
            system.size_state(),
            system.size_output()
        );
        Ok(Self {
            system: system.clone_continuous(),
            l,
        })
    }

    pub fn gain(&self) -> &Matrix {
        &self.l
    }
}

impl ContinuousSystem for ContinuousLuenberger {
    fn state_fcn(&self, x: &Vector, u: &Vector) -> SystemResult<Vector> {
        let (u, y) = self.split_full_input(u)?;
        self.obs_state_fcn(x, &u, &y)
    }

    fn output_fcn(&self, x: &Vector, u: &Vector) -> SystemResult<Vector> {
        let (u, _) = self.split_full_input(u)?;
        self.obs_output_fcn(x, &u)
    }

    fn jacob_state_fcn(&self, x: &Vector, u: &Vector) -> SystemResult<Matrix> {
        let (u, y) = self.split_full_input(u)?;
        self.obs_jacob_state_fcn(x, &u, &y)
    }

    fn jacob_output_fcn(&self, x: &Vector, u: &Vector) -> SystemResult<Matrix> {
        let (u, _) = self.split_full_input(u)?;
        self.obs_jacob_output_fcn(x, &u)
    }

    fn size_input(&self) -> usize {
        self.system.size_input() + self.system.size_output()
    }

    fn size_output(&self) -> usize {
        self.system.size_output()
    }

    fn size_state(&self) -> usize {
        self.system.size_state()
    }

    fn describe(&self) -> String {
        format!(
            "Continuous_Luenberger_Observer:\nL:{}System:\n{}",
            self.l,
            self.system.describe()
        )
    }

    fn clone_continuous(&self) -> Box<dyn ContinuousSystem> {
        Box::new(self.clone())
    }
}

impl ContinuousObserver for ContinuousLuenberger {
    fn obs_state_fcn(&self, x_hat: &Vector, u: &Vector, y: &Vector) -> SystemResult<Vector> {
        check_len("Continuous_Luenberger_Observer::obs_state_fcn(y)", y, self.size_output())?;
        let innovation = y - self.system.output_fcn(x_hat, u)?;
        Ok(self.system.state_fcn(x_hat, u)? + &self.l * innovation)
    }

    fn obs_output_fcn(&self, x_hat: &Vector, u: &Vector) -> SystemResult<Vector> {
        self.system.output_fcn(x_hat, u)
    }

    fn obs_jacob_state_fcn(&self, x_hat: &Vector, u: &Vector, _y: &Vector) -> SystemResult<Matrix> {
        let jf = self.system.jacob_state_fcn(x_hat, u)?;
        let jh = self.system.jacob_output_fcn(x_hat, u)?;
        let n = self.size_state();
        check_shape("Continuous_Luenberger_Observer", "jacob_state", &jf, n, n)?;
        check_shape("Continuous_Luenberger_Observer", "jacob_output", &jh, self.size_output(), n)?;
        Ok(jf - &self.l * jh)
    }

    fn obs_jacob_output_fcn(&self, x_hat: &Vector, u: &Vector) -> SystemResult<Matrix> {
        self.system.jacob_output_fcn(x_hat, u)
    }

    fn size_real_input(&self) -> usize {
        self.system.size_input()
    }
}

impl fmt::Debug for ContinuousLuenberger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContinuousLuenberger")
            .field("l", &self.l)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::continuous::FnContinuousSystem;
    use crate::error::SystemError;
    use crate::types::{concat, matrix_from_rows, vector};
    use std::sync::Arc;

    /// dx/dt = -x + u, y = x
    fn first_order() -> FnContinuousSystem {
        FnContinuousSystem::new(
            1,
            1,
            1,
            Arc::new(|x: &Vector, u: &Vector| vector(&[-x[0] + u[0]])),
            Arc::new(|x: &Vector, _u: &Vector| vector(&[x[0]])),
        )
        .with_jacobians(
            Arc::new(|_x: &Vector, _u: &Vector| Matrix::from_element(1, 1, -1.0)),
            Arc::new(|_x: &Vector, _u: &Vector| Matrix::from_element(1, 1, 1.0)),
        )
    }

    #[test]
    fn test_gain_shape_checked() {
        let sys = first_order();
        let err = ContinuousLuenberger::new(&sys, Matrix::zeros(2, 1)).unwrap_err();
        assert!(matches!(err, SystemError::InvalidDimensions { .. }));
        assert!(ContinuousLuenberger::new(&sys, matrix_from_rows(1, 1, &[2.0]).unwrap()).is_ok());
    }

    #[test]
    fn test_sizes() {
        let obs = ContinuousLuenberger::new(&first_order(), Matrix::from_element(1, 1, 2.0)).unwrap();
        assert_eq!(obs.size_input(), 2);
        assert_eq!(obs.size_output(), 1);
        assert_eq!(obs.size_state(), 1);
        assert_eq!(obs.size_real_input(), 1);
    }

    #[test]
    fn test_debug_shows_gain() {
        let obs = ContinuousLuenberger::new(&first_order(), Matrix::from_element(1, 1, 2.0)).unwrap();
        let text = format!("{obs:?}");
        assert!(text.starts_with("ContinuousLuenberger { l: "), "{text}");
        assert!(text.ends_with(".. }"), "{text}");
    }

    #[test]
    fn test_obs_state_fcn_adds_correction() {
        let obs = ContinuousLuenberger::new(&first_order(), Matrix::from_element(1, 1, 2.0)).unwrap();
        let x_hat = vector(&[1.0]);
        let u = vector(&[0.5]);
        let y = vector(&[3.0]);
        // -1 + 0.5 + 2 * (3 - 1) = 3.5
        let x_dot = obs.obs_state_fcn(&x_hat, &u, &y).unwrap();
        assert_eq!(x_dot[0], 3.5);

        // Same through the stacked input
        let x_dot = obs.state_fcn(&x_hat, &concat(&u, &y)).unwrap();
        assert_eq!(x_dot[0], 3.5);
    }

    #[test]
    fn test_jacobian() {
        let obs = ContinuousLuenberger::new(&first_order(), Matrix::from_element(1, 1, 2.0)).unwrap();
        let x_hat = vector(&[0.0]);
        let full = vector(&[0.0, 0.0]);
        // -1 - 2 * 1
        assert_eq!(obs.jacob_state_fcn(&x_hat, &full).unwrap()[(0, 0)], -3.0);
        assert_eq!(obs.jacob_output_fcn(&x_hat, &full).unwrap()[(0, 0)], 1.0);
    }

    #[test]
    fn test_full_input_length_checked() {
        let obs = ContinuousLuenberger::new(&first_order(), Matrix::from_element(1, 1, 2.0)).unwrap();
        assert!(obs.state_fcn(&vector(&[0.0]), &vector(&[0.0])).is_err());
    }
}
