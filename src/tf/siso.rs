//! Generic discrete time SISO transfer function.
//!
//! ```text
//!         b0 + b1 z^-1 + ... + bn z^-n
//! Y(z) = ------------------------------ U(z)
//!         a0 + a1 z^-1 + ... + am z^-m
//!
//! y(k) = b_vec . [u(k) .. u(k-n)] - a_vec . [y(k-1) .. y(k-m)]
//! b_vec = [b0 .. bn] / a0     (n+1 elements)
//! a_vec = [a1 .. am] / a0     (m elements)
//! ```

use tracing::debug;

use crate::error::{SystemError, SystemResult};
use crate::system::{DiscreteSystem, SisoSystem, scalar_input};
use crate::types::Vector;

/// Length of `coeffs` once trailing zeros are dropped, never less than 1.
fn effective_len(coeffs: &[f64]) -> usize {
    let mut len = coeffs.len();
    while len > 1 && coeffs[len - 1] == 0.0 {
        len -= 1;
    }
    len
}

fn leading_coefficient(context: &'static str, den: &[f64]) -> SystemResult<f64> {
    match den.first() {
        None => Err(SystemError::EmptyCoefficients { context }),
        Some(&a0) if a0 == 0.0 => Err(SystemError::DivisionByZero { context }),
        Some(&a0) => Ok(a0),
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TfSiso {
    ts: Option<f64>,
    b_vec: Vec<f64>,
    a_vec: Vec<f64>,
    u_vec: Vec<f64>,
    y_vec: Vec<f64>,
    y_k: Vector,
}

impl TfSiso {
    /// Turn `[b0 .. bn 0 .. 0]` into `[b0 .. bn] / a0`.
    ///
    /// An empty numerator is treated as `[0]`.
    pub fn simplify_numerator(num: &[f64], den: &[f64]) -> SystemResult<Vec<f64>> {
        let a0 = leading_coefficient("TF_SISO::simplify_numerator", den)?;
        if num.is_empty() {
            return Ok(vec![0.0]);
        }
        let len = effective_len(num);
        Ok(num[..len].iter().map(|b| b / a0).collect())
    }

    /// Turn `[a0 a1 .. am 0 .. 0]` into `[a1 .. am] / a0`.
    ///
    /// A pure gain denominator reduces to an empty vector.
    pub fn simplify_and_reduce_denominator(den: &[f64]) -> SystemResult<Vec<f64>> {
        let a0 = leading_coefficient("TF_SISO::simplify_and_reduce_denominator", den)?;
        let len = effective_len(den);
        Ok(den[1..len].iter().map(|a| a / a0).collect())
    }

    /// Build a transfer function from raw numerator and denominator
    /// coefficients. `ts` is stored only, it does not change the dynamics.
    pub fn new(num: &[f64], den: &[f64], ts: Option<f64>) -> SystemResult<Self> {
        let b_vec = Self::simplify_numerator(num, den)?;
        let a_vec = Self::simplify_and_reduce_denominator(den)?;
        debug!(
            "TF_SISO created: numerator order {}, denominator order {}",
            b_vec.len() - 1,
            a_vec.len()
        );
        Ok(Self {
            ts,
            u_vec: vec![0.0; b_vec.len()],
            y_vec: vec![0.0; a_vec.len()],
            b_vec,
            a_vec,
            y_k: Vector::zeros(1),
        })
    }

    /// The zero transfer function `0 / 1`.
    pub fn zero(ts: Option<f64>) -> Self {
        Self {
            ts,
            b_vec: vec![0.0],
            a_vec: Vec::new(),
            u_vec: vec![0.0],
            y_vec: Vec::new(),
            y_k: Vector::zeros(1),
        }
    }

    pub fn numerator_order(&self) -> usize {
        self.b_vec.len() - 1
    }

    pub fn denominator_order(&self) -> usize {
        self.a_vec.len()
    }

    /// Normalised numerator `[b0 .. bn] / a0`.
    pub fn numerator(&self) -> &[f64] {
        &self.b_vec
    }

    /// Normalised and reduced denominator `[a1 .. am] / a0`.
    pub fn denominator(&self) -> &[f64] {
        &self.a_vec
    }

    pub fn ts(&self) -> Option<f64> {
        self.ts
    }

    pub fn set_ts(&mut self, ts: Option<f64>) {
        self.ts = ts;
    }

    /// Overwrite the input history `[u(k) .. u(k-n)]`, the output history
    /// `[y(k-1) .. y(k-m)]` and the last output.
    pub fn set_history(
        &mut self,
        inputs: &[f64],
        outputs: &[f64],
        last_output: f64,
    ) -> SystemResult<()> {
        if inputs.len() != self.u_vec.len() {
            return Err(SystemError::DimensionMismatch {
                context: "TF_SISO::set_history(inputs)",
                expected: self.u_vec.len(),
                actual: inputs.len(),
            });
        }
        if outputs.len() != self.y_vec.len() {
            return Err(SystemError::DimensionMismatch {
                context: "TF_SISO::set_history(outputs)",
                expected: self.y_vec.len(),
                actual: outputs.len(),
            });
        }
        self.u_vec.copy_from_slice(inputs);
        self.y_vec.copy_from_slice(outputs);
        self.y_k[0] = last_output;
        Ok(())
    }

    pub(crate) fn output_vector(&self) -> &Vector {
        &self.y_k
    }
}

impl DiscreteSystem for TfSiso {
    fn apply(&mut self, u_k: &Vector) -> SystemResult<&Vector> {
        let u = scalar_input("TF_SISO::apply", u_k)?;
        self.apply_scalar(u);
        Ok(&self.y_k)
    }

    fn reset(&mut self) {
        self.u_vec.fill(0.0);
        self.y_vec.fill(0.0);
        self.y_k[0] = 0.0;
    }

    fn size_input(&self) -> usize {
        1
    }

    fn size_output(&self) -> usize {
        1
    }

    fn describe(&self) -> String {
        format!(
            "TF_SISO:\n   Num_Coeff= {:?}\n   Den_Coeff= 1.0 {:?}\n   State\n   u_vec= {:?}\n   y_vec= {:?}\n   y_k= {}",
            self.b_vec, self.a_vec, self.u_vec, self.y_vec, self.y_k[0]
        )
    }

    fn clone_system(&self) -> Box<dyn DiscreteSystem> {
        Box::new(self.clone())
    }
}

impl SisoSystem for TfSiso {
    fn apply_scalar(&mut self, u_k: f64) -> f64 {
        self.u_vec.rotate_right(1);
        self.u_vec[0] = u_k;

        if self.y_vec.is_empty() {
            self.y_k[0] = dot(&self.b_vec, &self.u_vec);
            return self.y_k[0];
        }

        self.y_vec.rotate_right(1);
        self.y_vec[0] = self.y_k[0];
        self.y_k[0] = dot(&self.b_vec, &self.u_vec) - dot(&self.a_vec, &self.y_vec);
        self.y_k[0]
    }

    fn last_output(&self) -> f64 {
        self.y_k[0]
    }

    fn clone_siso(&self) -> Box<dyn SisoSystem> {
        Box::new(self.clone())
    }
}
