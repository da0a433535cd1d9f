//! Square MIMO system with transfer functions only on the diagonal.

use crate::error::{SystemError, SystemResult};
use crate::system::{DiscreteSystem, SisoSystem};
use crate::tf::TfMimo;
use crate::types::{Vector, check_len};

/// `y_i(k) = TF_ii(u_i(k))`. Off-diagonal entries stay zero and are never
/// evaluated.
#[derive(Debug, Clone)]
pub struct TfMimoDiagonal {
    mimo: TfMimo,
}

impl TfMimoDiagonal {
    pub fn new(dim: usize) -> Self {
        Self {
            mimo: TfMimo::new(dim, dim),
        }
    }

    /// Every diagonal entry is a copy of `siso`.
    pub fn with_diagonal(dim: usize, siso: &dyn SisoSystem) -> Self {
        let mut diagonal = Self::new(dim);
        for i in 0..dim {
            *diagonal.mimo.siso_mut_unchecked(i, i) = siso.clone_siso();
        }
        diagonal
    }

    pub fn dim(&self) -> usize {
        self.mimo.size_input()
    }

    /// Only diagonal positions are accepted.
    pub fn set_siso(&mut self, row: usize, col: usize, siso: &dyn SisoSystem) -> SystemResult<()> {
        if row != col {
            return Err(SystemError::OffDiagonal { row, col });
        }
        self.mimo.set_siso(row, col, siso)
    }

    pub fn set_diagonal(&mut self, index: usize, siso: &dyn SisoSystem) -> SystemResult<()> {
        self.mimo.set_siso(index, index, siso)
    }

    pub fn siso(&self, index: usize) -> SystemResult<&dyn SisoSystem> {
        self.mimo.siso(index, index)
    }
}

impl DiscreteSystem for TfMimoDiagonal {
    fn apply(&mut self, u_k: &Vector) -> SystemResult<&Vector> {
        let dim = self.dim();
        check_len("TF_MIMO_DIAGONAL::apply", u_k, dim)?;
        for i in 0..dim {
            let y = self.mimo.siso_mut_unchecked(i, i).apply_scalar(u_k[i]);
            self.mimo.output_mut()[i] = y;
        }
        Ok(self.mimo.output())
    }

    fn reset(&mut self) {
        self.mimo.reset();
    }

    fn size_input(&self) -> usize {
        self.dim()
    }

    fn size_output(&self) -> usize {
        self.dim()
    }

    fn describe(&self) -> String {
        let mut out = format!("TF_MIMO_DIAGONAL {0}x{0}:\n", self.dim());
        for i in 0..self.dim() {
            out.push_str(&format!("Position [{i}][{i}]\n"));
            if let Ok(siso) = self.siso(i) {
                out.push_str(&siso.describe());
            }
            out.push_str("\n-----------------------------------\n");
        }
        out.push_str("TF_MIMO_DIAGONAL [END]");
        out
    }

    fn clone_system(&self) -> Box<dyn DiscreteSystem> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tf::{TfIntegrator, TfSiso};
    use crate::types::vector;

    #[test]
    fn test_rejects_off_diagonal() {
        let mut diag = TfMimoDiagonal::new(3);
        let tf = TfSiso::new(&[2.0], &[1.0], None).unwrap();
        assert_eq!(
            diag.set_siso(0, 1, &tf),
            Err(SystemError::OffDiagonal { row: 0, col: 1 })
        );
        assert!(diag.set_siso(1, 1, &tf).is_ok());
        assert!(diag.set_diagonal(3, &tf).is_err());
    }

    #[test]
    fn test_applies_elementwise() {
        let mut diag = TfMimoDiagonal::new(2);
        diag.set_diagonal(0, &TfSiso::new(&[2.0], &[1.0], None).unwrap())
            .unwrap();
        diag.set_diagonal(1, &TfSiso::new(&[-1.0], &[1.0], None).unwrap())
            .unwrap();
        let y = diag.apply(&vector(&[3.0, 4.0])).unwrap();
        assert_eq!(y.as_slice(), &[6.0, -4.0]);
    }

    #[test]
    fn test_with_diagonal_copies_are_independent() {
        let integrator = TfIntegrator::new(1.0, 1.0).unwrap();
        let mut diag = TfMimoDiagonal::with_diagonal(2, &integrator);
        diag.apply(&vector(&[1.0, 0.0])).unwrap();
        let y = diag.apply(&vector(&[1.0, 0.0])).unwrap();
        assert_eq!(y.as_slice(), &[1.5, 0.0]);
    }

    #[test]
    fn test_input_length_checked() {
        let mut diag = TfMimoDiagonal::new(2);
        assert!(diag.apply(&vector(&[1.0, 2.0, 3.0])).is_err());
    }
}
