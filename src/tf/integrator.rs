//! Discrete integrator (Tustin).

use crate::error::{SystemError, SystemResult};
use crate::system::{DiscreteSystem, SisoSystem, scalar_input};
use crate::tf::TfSiso;
use crate::types::Vector;

/// `gain * (Ts/2) (1 + z^-1) / (1 - z^-1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TfIntegrator {
    tf: TfSiso,
    gain: f64,
}

impl TfIntegrator {
    pub fn new(ts: f64, gain: f64) -> SystemResult<Self> {
        if ts.is_nan() || ts <= 0.0 {
            return Err(SystemError::Numeric {
                context: "TF_INTEGRATOR",
                reason: format!("Ts ({ts}) must be positive"),
            });
        }
        let half = ts / 2.0;
        let tf = TfSiso::new(&[half, half], &[1.0, -1.0], Some(ts))?;
        Ok(Self { tf, gain })
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    pub fn ts(&self) -> Option<f64> {
        self.tf.ts()
    }

    /// The sampling time is baked into the coefficients and cannot change.
    pub fn set_ts(&mut self, _ts: f64) -> SystemResult<()> {
        Err(SystemError::unsupported("TF_INTEGRATOR", "set_ts"))
    }

    /// Force the integrator output, as if the integral had reached `output`
    /// with zero input.
    pub fn set_output(&mut self, output: f64) -> SystemResult<()> {
        self.tf.set_history(&[0.0, 0.0], &[output], output)
    }

    pub fn transfer_function(&self) -> &TfSiso {
        &self.tf
    }
}

impl DiscreteSystem for TfIntegrator {
    fn apply(&mut self, u_k: &Vector) -> SystemResult<&Vector> {
        let u = scalar_input("TF_INTEGRATOR::apply", u_k)?;
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
            "TF_INTEGRATOR:\n   Ts: {:?}\n   gain: {}",
            self.tf.ts(),
            self.gain
        )
    }

    fn clone_system(&self) -> Box<dyn DiscreteSystem> {
        Box::new(self.clone())
    }
}

impl SisoSystem for TfIntegrator {
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
