//! Band-limited discrete differentiator.

use crate::error::{SystemError, SystemResult};
use crate::system::{DiscreteSystem, SisoSystem, scalar_input};
use crate::tf::TfSiso;
use crate::types::Vector;

/// Differentiator `s / (tau s + 1)^2` discretized with Tustin.
///
/// ```text
///          2Ts - 2Ts z^-2
/// D(z) = -----------------------------------------------------
///        (Ts+2tau)^2 + 2(Ts^2-4tau^2) z^-1 + (Ts-2tau)^2 z^-2
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TfDifferentiator {
    tf: TfSiso,
    tau: f64,
    gain: f64,
}

impl TfDifferentiator {
    pub fn two_poles(ts: f64, tau: f64, gain: f64) -> SystemResult<Self> {
        if ts.is_nan() || tau.is_nan() || ts <= 0.0 || tau <= 0.0 {
            return Err(SystemError::Numeric {
                context: "TF_DIFFERENTIATOR",
                reason: format!("Ts ({ts}) and tau ({tau}) must be positive"),
            });
        }
        let num = [2.0 * ts, 0.0, -2.0 * ts];
        let den = [
            (ts + 2.0 * tau).powi(2),
            2.0 * (ts.powi(2) - 4.0 * tau.powi(2)),
            (ts - 2.0 * tau).powi(2),
        ];
        let tf = TfSiso::new(&num, &den, Some(ts))?;
        Ok(Self { tf, tau, gain })
    }

    pub fn tau(&self) -> f64 {
        self.tau
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    pub fn ts(&self) -> Option<f64> {
        self.tf.ts()
    }

    pub fn set_ts(&mut self, _ts: f64) -> SystemResult<()> {
        Err(SystemError::unsupported("TF_DIFFERENTIATOR", "set_ts"))
    }

    pub fn transfer_function(&self) -> &TfSiso {
        &self.tf
    }
}

impl DiscreteSystem for TfDifferentiator {
    fn apply(&mut self, u_k: &Vector) -> SystemResult<&Vector> {
        let u = scalar_input("TF_DIFFERENTIATOR::apply", u_k)?;
        self.apply_scalar(u);
        Ok(self.tf.output_vector())
    }

    fn reset(&mut self) {
        self.tf.reset();
    }

    fn size_input(&self) -> usize {
        1
    }

    fn size_output(&self) -> usize {
        1
    }

    fn describe(&self) -> String {
        format!(
            "TF_DIFFERENTIATOR_2POLES:\n   Ts: {:?}\n   tau: {}\n   gain: {}\n{}",
            self.tf.ts(),
            self.tau,
            self.gain,
            self.tf.describe()
        )
    }

    fn clone_system(&self) -> Box<dyn DiscreteSystem> {
        Box::new(self.clone())
    }
}

impl SisoSystem for TfDifferentiator {
    fn apply_scalar(&mut self, u_k: f64) -> f64 {
        self.tf.apply_scalar(self.gain * u_k)
    }

    fn last_output(&self) -> f64 {
        self.tf.last_output()
    }

    fn clone_siso(&self) -> Box<dyn SisoSystem> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orders() {
        let d = TfDifferentiator::two_poles(0.01, 0.05, 1.0).unwrap();
        assert_eq!(d.transfer_function().numerator_order(), 2);
        assert_eq!(d.transfer_function().denominator_order(), 2);
        assert_eq!(d.tau(), 0.05);
    }

    #[test]
    fn test_ramp_derivative_converges_to_slope() {
        let ts = 0.001;
        let mut d = TfDifferentiator::two_poles(ts, 0.01, 1.0).unwrap();
        let slope = 3.0;
        let mut y = 0.0;
        for k in 0..2000 {
            y = d.apply_scalar(slope * ts * k as f64);
        }
        assert!((y - slope).abs() < 1e-6, "derivative {y} != {slope}");
    }

    #[test]
    fn test_constant_input_derivative_vanishes() {
        let mut d = TfDifferentiator::two_poles(0.001, 0.01, 2.0).unwrap();
        let mut y = 1.0;
        for _ in 0..2000 {
            y = d.apply_scalar(5.0);
        }
        assert!(y.abs() < 1e-6);
    }

    #[test]
    fn test_set_ts_is_unsupported() {
        let mut d = TfDifferentiator::two_poles(0.01, 0.05, 1.0).unwrap();
        assert!(d.set_ts(0.1).is_err());
    }

    #[test]
    fn test_rejects_non_positive_parameters() {
        for (ts, tau) in [
            (0.0, 0.05),
            (-1.0, 0.05),
            (f64::NAN, 0.05),
            (0.01, 0.0),
            (0.01, -0.05),
            (0.01, f64::NAN),
        ] {
            assert!(
                matches!(
                    TfDifferentiator::two_poles(ts, tau, 1.0),
                    Err(SystemError::Numeric { .. })
                ),
                "ts = {ts}, tau = {tau}"
            );
        }
    }
}
