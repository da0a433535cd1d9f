//! MIMO systems built from a grid of SISO transfer functions.

use std::fmt;

use tracing::debug;

use crate::error::{SystemError, SystemResult};
use crate::system::{DiscreteSystem, SisoSystem};
use crate::tf::TfSiso;
use crate::types::{Vector, check_len};

/// `y_i(k) = sum_j TF_ij(u_j(k))`.
///
/// Entries are stored row-major: entry `(row, col)` lives at
/// `row * dim_input + col`. New entries are zero transfer functions.
#[derive(Clone)]
pub struct TfMimo {
    dim_input: usize,
    dim_output: usize,
    sisos: Vec<Box<dyn SisoSystem>>,
    y_k: Vector,
}

impl TfMimo {
    pub fn new(dim_input: usize, dim_output: usize) -> Self {
        let sisos = (0..dim_input * dim_output)
            .map(|_| Box::new(TfSiso::zero(None)) as Box<dyn SisoSystem>)
            .collect();
        debug!("TF_MIMO created: {dim_output}x{dim_input}");
        Self {
            dim_input,
            dim_output,
            sisos,
            y_k: Vector::zeros(dim_output),
        }
    }

    fn index(&self, context: &'static str, row: usize, col: usize) -> SystemResult<usize> {
        if row >= self.dim_output || col >= self.dim_input {
            return Err(SystemError::IndexOutOfRange {
                context,
                row,
                col,
                rows: self.dim_output,
                cols: self.dim_input,
            });
        }
        Ok(row * self.dim_input + col)
    }

    /// Store a copy of `siso` at `(row, col)`.
    pub fn set_siso(&mut self, row: usize, col: usize, siso: &dyn SisoSystem) -> SystemResult<()> {
        let idx = self.index("TF_MIMO::set_siso", row, col)?;
        self.sisos[idx] = siso.clone_siso();
        Ok(())
    }

    pub fn siso(&self, row: usize, col: usize) -> SystemResult<&dyn SisoSystem> {
        let idx = self.index("TF_MIMO::siso", row, col)?;
        Ok(self.sisos[idx].as_ref())
    }

    pub(super) fn siso_mut_unchecked(&mut self, row: usize, col: usize) -> &mut Box<dyn SisoSystem> {
        &mut self.sisos[row * self.dim_input + col]
    }

    pub(super) fn output_mut(&mut self) -> &mut Vector {
        &mut self.y_k
    }

    pub(super) fn output(&self) -> &Vector {
        &self.y_k
    }
}

impl fmt::Debug for TfMimo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TfMimo")
            .field("dim_input", &self.dim_input)
            .field("dim_output", &self.dim_output)
            .field("y_k", &self.y_k.as_slice())
            .finish_non_exhaustive()
    }
}

impl DiscreteSystem for TfMimo {
    fn apply(&mut self, u_k: &Vector) -> SystemResult<&Vector> {
        check_len("TF_MIMO::apply", u_k, self.dim_input)?;
        self.y_k.fill(0.0);
        for i in 0..self.dim_output {
            for j in 0..self.dim_input {
                self.y_k[i] += self.sisos[i * self.dim_input + j].apply_scalar(u_k[j]);
            }
        }
        Ok(&self.y_k)
    }

    fn reset(&mut self) {
        self.y_k.fill(0.0);
        for siso in &mut self.sisos {
            siso.reset();
        }
    }

    fn size_input(&self) -> usize {
        self.dim_input
    }

    fn size_output(&self) -> usize {
        self.dim_output
    }

    fn describe(&self) -> String {
        let mut out = format!("TF_MIMO {}x{}:\n", self.dim_output, self.dim_input);
        for i in 0..self.dim_output {
            for j in 0..self.dim_input {
                out.push_str(&format!("Position [{i}][{j}]\n"));
                out.push_str(&self.sisos[i * self.dim_input + j].describe());
                out.push_str("\n-----------------------------------\n");
            }
        }
        out.push_str("TF_MIMO [END]");
        out
    }

    fn clone_system(&self) -> Box<dyn DiscreteSystem> {
        Box::new(self.clone())
    }
}
