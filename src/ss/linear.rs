//! Linear time invariant state space system.

use tracing::debug;

use crate::error::{SystemError, SystemResult};
use crate::ss::{StateSpace, assign_state, ss_step};
use crate::system::DiscreteSystem;
use crate::types::{Matrix, Vector, check_len, format_vector};

/// ```text
/// x(k) = A x(k-1) + B u(k)
/// y(k) = C x(k)   + D u(k)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SsLinear {
    a: Matrix,
    b: Matrix,
    c: Matrix,
    d: Matrix,
    state: Vector,
    output: Vector,
}

fn check_dimensions(a: &Matrix, b: &Matrix, c: &Matrix, d: &Matrix) -> SystemResult<()> {
    let fail = |reason: String| Err(SystemError::invalid_dimensions("SS_LINEAR", reason));
    if a.nrows() != a.ncols() {
        return fail(format!("A must be square, got {}x{}", a.nrows(), a.ncols()));
    }
    if a.nrows() != b.nrows() {
        return fail(format!("A has {} rows but B has {}", a.nrows(), b.nrows()));
    }
    if a.ncols() != c.ncols() {
        return fail(format!("A has {} columns but C has {}", a.ncols(), c.ncols()));
    }
    if b.ncols() != d.ncols() {
        return fail(format!("B has {} columns but D has {}", b.ncols(), d.ncols()));
    }
    if c.nrows() != d.nrows() {
        return fail(format!("C has {} rows but D has {}", c.nrows(), d.nrows()));
    }
    Ok(())
}

impl SsLinear {
    pub fn new(a: Matrix, b: Matrix, c: Matrix, d: Matrix) -> SystemResult<Self> {
        check_dimensions(&a, &b, &c, &d)?;
        debug!(
            "SS_LINEAR created: {} states, {} inputs, {} outputs",
            a.nrows(),
            b.ncols(),
            c.nrows()
        );
        Ok(Self {
            state: Vector::zeros(a.nrows()),
            output: Vector::zeros(c.nrows()),
            a,
            b,
            c,
            d,
        })
    }

    /// System with `D = 0`.
    pub fn without_feedthrough(a: Matrix, b: Matrix, c: Matrix) -> SystemResult<Self> {
        let d = Matrix::zeros(c.nrows(), b.ncols());
        Self::new(a, b, c, d)
    }

    pub fn with_initial_state(mut self, x0: &Vector) -> SystemResult<Self> {
        self.set_state(x0)?;
        Ok(self)
    }

    pub fn a(&self) -> &Matrix {
        &self.a
    }

    pub fn b(&self) -> &Matrix {
        &self.b
    }

    pub fn c(&self) -> &Matrix {
        &self.c
    }

    pub fn d(&self) -> &Matrix {
        &self.d
    }

    pub fn set_a(&mut self, a: Matrix) -> SystemResult<()> {
        check_dimensions(&a, &self.b, &self.c, &self.d)?;
        self.a = a;
        Ok(())
    }

    pub fn set_b(&mut self, b: Matrix) -> SystemResult<()> {
        check_dimensions(&self.a, &b, &self.c, &self.d)?;
        self.b = b;
        Ok(())
    }

    pub fn set_c(&mut self, c: Matrix) -> SystemResult<()> {
        check_dimensions(&self.a, &self.b, &c, &self.d)?;
        self.c = c;
        Ok(())
    }

    pub fn set_d(&mut self, d: Matrix) -> SystemResult<()> {
        check_dimensions(&self.a, &self.b, &self.c, &d)?;
        self.d = d;
        Ok(())
    }
}

impl DiscreteSystem for SsLinear {
    fn apply(&mut self, u_k: &Vector) -> SystemResult<&Vector> {
        let (x_k, y_k) = ss_step(self, u_k)?;
        self.state = x_k;
        self.output = y_k;
        Ok(&self.output)
    }

    fn reset(&mut self) {
        self.state.fill(0.0);
        self.output.fill(0.0);
    }

    fn size_input(&self) -> usize {
        self.b.ncols()
    }

    fn size_output(&self) -> usize {
        self.c.nrows()
    }

    fn describe(&self) -> String {
        format!(
            "SS_LINEAR:\nA:{}B:{}C:{}D:{}state: {}\nSS_LINEAR [END]",
            self.a,
            self.b,
            self.c,
            self.d,
            format_vector(&self.state)
        )
    }

    fn clone_system(&self) -> Box<dyn DiscreteSystem> {
        Box::new(self.clone())
    }
}

impl StateSpace for SsLinear {
    fn state(&self) -> &Vector {
        &self.state
    }

    fn set_state(&mut self, state: &Vector) -> SystemResult<()> {
        assign_state("SS_LINEAR::set_state", &mut self.state, state)
    }

    fn output(&self) -> &Vector {
        &self.output
    }

    fn size_state(&self) -> usize {
        self.a.nrows()
    }

    fn state_fcn(&self, x_k_1: &Vector, u_k: &Vector) -> SystemResult<Vector> {
        check_len("SS_LINEAR::state_fcn(x)", x_k_1, self.a.ncols())?;
        check_len("SS_LINEAR::state_fcn(u)", u_k, self.b.ncols())?;
        Ok(&self.a * x_k_1 + &self.b * u_k)
    }

    fn output_fcn(&self, x_k: &Vector, u_k: &Vector) -> SystemResult<Vector> {
        check_len("SS_LINEAR::output_fcn(x)", x_k, self.c.ncols())?;
        check_len("SS_LINEAR::output_fcn(u)", u_k, self.d.ncols())?;
        Ok(&self.c * x_k + &self.d * u_k)
    }

    fn jacob_state_fcn(&self, _x_k_1: &Vector, _u_k: &Vector) -> SystemResult<Matrix> {
        Ok(self.a.clone())
    }

    fn jacob_output_fcn(&self, _x_k: &Vector, _u_k: &Vector) -> SystemResult<Matrix> {
        Ok(self.c.clone())
    }

    fn clone_state_space(&self) -> Box<dyn StateSpace> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{matrix_from_rows, vector};

    fn double_integrator(ts: f64) -> SsLinear {
        let a = matrix_from_rows(2, 2, &[1.0, ts, 0.0, 1.0]).unwrap();
        let b = matrix_from_rows(2, 1, &[0.0, ts]).unwrap();
        let c = matrix_from_rows(1, 2, &[1.0, 0.0]).unwrap();
        SsLinear::without_feedthrough(a, b, c).unwrap()
    }

    #[test]
    fn test_dimension_checks() {
        let a = Matrix::identity(2, 2);
        let b = Matrix::zeros(2, 1);
        let c = Matrix::zeros(1, 2);
        assert!(SsLinear::new(a.clone(), b.clone(), c.clone(), Matrix::zeros(1, 1)).is_ok());

        let err = SsLinear::new(Matrix::zeros(2, 3), b.clone(), c.clone(), Matrix::zeros(1, 1))
            .unwrap_err();
        assert!(matches!(err, SystemError::InvalidDimensions { .. }));
        assert!(SsLinear::new(a.clone(), Matrix::zeros(3, 1), c.clone(), Matrix::zeros(1, 1)).is_err());
        assert!(SsLinear::new(a.clone(), b.clone(), Matrix::zeros(1, 3), Matrix::zeros(1, 1)).is_err());
        assert!(SsLinear::new(a.clone(), b.clone(), c.clone(), Matrix::zeros(1, 2)).is_err());
        assert!(SsLinear::new(a, b, c, Matrix::zeros(2, 1)).is_err());
    }

    #[test]
    fn test_sizes() {
        let ss = double_integrator(0.1);
        assert_eq!(ss.size_state(), 2);
        assert_eq!(ss.size_input(), 1);
        assert_eq!(ss.size_output(), 1);
        assert_eq!(ss.d(), &Matrix::zeros(1, 1));
    }

    #[test]
    fn test_apply_uses_updated_state() {
        let mut ss = double_integrator(1.0);
        // x1 = [0, 1], y1 = 0
        assert_eq!(ss.apply(&vector(&[1.0])).unwrap()[0], 0.0);
        // x2 = [1, 2], y2 = 1
        assert_eq!(ss.apply(&vector(&[1.0])).unwrap()[0], 1.0);
        assert_eq!(ss.state().as_slice(), &[1.0, 2.0]);
    }

    #[test]
    fn test_feedthrough() {
        let ss = SsLinear::new(
            Matrix::identity(1, 1),
            Matrix::zeros(1, 1),
            Matrix::identity(1, 1),
            matrix_from_rows(1, 1, &[2.0]).unwrap(),
        )
        .unwrap();
        let mut ss = ss.with_initial_state(&vector(&[1.0])).unwrap();
        assert_eq!(ss.apply(&vector(&[3.0])).unwrap()[0], 7.0);
    }

    #[test]
    fn test_set_state_and_reset() {
        let mut ss = double_integrator(1.0);
        assert!(ss.set_state(&vector(&[1.0])).is_err());
        ss.set_state(&vector(&[1.0, 1.0])).unwrap();
        ss.apply(&vector(&[0.0])).unwrap();
        assert_eq!(ss.output()[0], 2.0);

        ss.reset();
        assert_eq!(ss.state().as_slice(), &[0.0, 0.0]);
        assert_eq!(ss.output().as_slice(), &[0.0]);
    }

    #[test]
    fn test_input_length_checked() {
        let mut ss = double_integrator(1.0);
        let err = ss.apply(&vector(&[1.0, 1.0])).unwrap_err();
        assert!(matches!(err, SystemError::DimensionMismatch { .. }));
        // State untouched after a failed step
        assert_eq!(ss.state().as_slice(), &[0.0, 0.0]);
    }

    #[test]
    fn test_setters_keep_dimensions_consistent() {
        let mut ss = double_integrator(1.0);
        assert!(ss.set_a(Matrix::identity(3, 3)).is_err());
        assert!(ss.set_b(Matrix::zeros(2, 2)).is_err());
        assert!(ss.set_c(Matrix::zeros(2, 2)).is_err());
        assert!(ss.set_d(Matrix::zeros(1, 2)).is_err());
        ss.set_c(matrix_from_rows(1, 2, &[0.0, 1.0]).unwrap()).unwrap();
        assert_eq!(ss.jacob_output_fcn(&vector(&[0.0, 0.0]), &vector(&[0.0])).unwrap()[(0, 1)], 1.0);
    }
}
