//! Discrete time state observers.
//!
//! An observer is a state space system whose input is the stacked vector
//! `[u; y]`: the observed system input followed by its measured output.
//! The `obs_*` methods take the two parts separately; `obs_apply` is the
//! usual entry point.

mod kalman;
mod luenberger;
mod ss_observer;

pub use kalman::KalmanFilter;
pub use luenberger::LuenbergerObserver;
pub use ss_observer::SsObserver;

use crate::error::SystemResult;
use crate::ss::StateSpace;
use crate::types::{Matrix, Vector, check_len, concat, split};

pub trait Observer: StateSpace {
    /// `x_hat(k) = f_obs(x_hat(k-1), u(k), y(k))`
    fn obs_state_fcn(&self, x_k_1: &Vector, u_k: &Vector, y_k: &Vector) -> SystemResult<Vector>;

    /// `y_hat(k) = h_obs(x_hat(k), u(k))`
    fn obs_output_fcn(&self, x_k: &Vector, u_k: &Vector) -> SystemResult<Vector>;

    fn obs_jacob_state_fcn(&self, x_k_1: &Vector, u_k: &Vector, y_k: &Vector) -> SystemResult<Matrix>;

    fn obs_jacob_output_fcn(&self, x_k: &Vector, u_k: &Vector) -> SystemResult<Matrix>;

    /// Update the estimate with input `u(k)` and measure `y(k)`, return the
    /// estimated output.
    fn obs_apply(&mut self, u_k: &Vector, y_k: &Vector) -> SystemResult<&Vector>;

    fn clone_observer(&self) -> Box<dyn Observer>;

    /// Size of the observed system input `u`. Zero when the input is too
    /// short to hold a measure, so `build_full_input` reports the mismatch.
    fn size_real_input(&self) -> usize {
        self.size_input().saturating_sub(self.size_output())
    }

    /// Stack `[u; y]`, checking both parts.
    fn build_full_input(&self, u_k: &Vector, y_k: &Vector) -> SystemResult<Vector> {
        check_len("Observer::build_full_input(u)", u_k, self.size_real_input())?;
        check_len("Observer::build_full_input(y)", y_k, self.size_output())?;
        Ok(concat(u_k, y_k))
    }

    /// Split `[u; y]`.
    fn split_full_input(&self, full: &Vector) -> SystemResult<(Vector, Vector)> {
        check_len("Observer::split_full_input", full, self.size_input())?;
        split("Observer::split_full_input", full, self.size_real_input())
    }
}

impl Clone for Box<dyn Observer> {
    fn clone(&self) -> Self {
        self.clone_observer()
    }
}

/// One observer step through the `obs_*` functions. Nothing is stored.
pub(crate) fn obs_step<O: Observer + ?Sized>(
    observer: &O,
    u_k: &Vector,
    y_k: &Vector,
) -> SystemResult<(Vector, Vector)> {
    check_len("Observer::obs_apply(u)", u_k, observer.size_real_input())?;
    check_len("Observer::obs_apply(y)", y_k, observer.size_output())?;
    let x_k = observer.obs_state_fcn(observer.state(), u_k, y_k)?;
    let y_hat = observer.obs_output_fcn(&x_k, u_k)?;
    Ok((x_k, y_hat))
}
