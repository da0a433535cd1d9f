//! First order low-pass filter discretized with Tustin.

use std::f64::consts::PI;

use crate::error::{SystemError, SystemResult};
use crate::system::{DiscreteSystem, SisoSystem, scalar_input};
use crate::tf::TfSiso;
use crate::types::Vector;

#[derive(Debug, Clone, PartialEq)]
pub struct TfFirstOrderFilter {
    tf: TfSiso,
    cut_freq: f64,
    gain: f64,
    output: Vector,
}

fn alpha(cut_freq: f64, ts: f64) -> f64 {
    let tau = 1.0 / (2.0 * PI * cut_freq);
    2.0 * tau / ts
}

impl TfFirstOrderFilter {
    /// Numerator `[1, 1] / (1 + alpha)` with `alpha = 2 tau / Ts`.
    pub fn num_coeff(cut_freq: f64, ts: f64) -> [f64; 2] {
        let b = 1.0 / (1.0 + alpha(cut_freq, ts));
        [b, b]
    }

    /// Denominator `[1, (1 - alpha) / (1 + alpha)]`.
    pub fn den_coeff(cut_freq: f64, ts: f64) -> [f64; 2] {
        let a = alpha(cut_freq, ts);
        [1.0, (1.0 - a) / (1.0 + a)]
    }

    /// `cut_freq` in Hz, `ts` in seconds.
    pub fn new(cut_freq: f64, ts: f64, gain: f64) -> SystemResult<Self> {
        if cut_freq.is_nan() || ts.is_nan() || cut_freq <= 0.0 || ts <= 0.0 {
            return Err(SystemError::Numeric {
                context: "TF_FIRST_ORDER_FILTER",
                reason: format!("cut frequency ({cut_freq}) and Ts ({ts}) must be positive"),
            });
        }
        let tf = TfSiso::new(
            &Self::num_coeff(cut_freq, ts),
            &Self::den_coeff(cut_freq, ts),
            Some(ts),
        )?;
        Ok(Self {
            tf,
            cut_freq,
            gain,
            output: Vector::zeros(1),
        })
    }

    pub fn cut_frequency(&self) -> f64 {
        self.cut_freq
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    pub fn ts(&self) -> Option<f64> {
        self.tf.ts()
    }

    pub fn set_ts(&mut self, _ts: f64) -> SystemResult<()> {
        Err(SystemError::unsupported("TF_FIRST_ORDER_FILTER", "set_ts"))
    }

    /// Put the filter in the steady state that produces `output`.
    ///
    /// With a zero gain the output is always zero and the history is cleared.
    pub fn set_output(&mut self, output: f64) -> SystemResult<()> {
        let internal = if self.gain != 0.0 {
            output / self.gain
        } else {
            0.0
        };
        self.tf.set_history(&[internal, internal], &[internal], internal)?;
        self.output[0] = self.gain * internal;
        Ok(())
    }

    pub fn transfer_function(&self) -> &TfSiso {
        &self.tf
    }
}

impl DiscreteSystem for TfFirstOrderFilter {
    fn apply(&mut self, u_k: &Vector) -> SystemResult<&Vector> {
        let u = scalar_input("TF_FIRST_ORDER_FILTER::apply", u_k)?;
        self.apply_scalar(u);
        Ok(&self.output)
    }

    fn reset(&mut self) {
        self.tf.reset();
        self.output[0] = 0.0;
    }

    fn size_input(&self) -> usize {
        1
    }

    fn size_output(&self) -> usize {
        1
    }

    fn describe(&self) -> String {
        format!(
            "TF_FIRST_ORDER_FILTER:\n   Ts: {:?}\n   cut_freq: {}\n   gain: {}",
            self.tf.ts(),
            self.cut_freq,
            self.gain
        )
    }

    fn clone_system(&self) -> Box<dyn DiscreteSystem> {
        Box::new(self.clone())
    }
}

impl SisoSystem for TfFirstOrderFilter {
    fn apply_scalar(&mut self, u_k: f64) -> f64 {
        self.output[0] = self.gain * self.tf.apply_scalar(u_k);
        self.output[0]
    }

    fn last_output(&self) -> f64 {
        self.output[0]
    }

    fn clone_siso(&self) -> Box<dyn SisoSystem> {
        Box::new(self.clone())
    }
}
