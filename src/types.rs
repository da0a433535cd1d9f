//! Shared numeric aliases and dimension helpers.
//!
//! Every system in the crate works on dynamically sized nalgebra vectors and
//! matrices. nalgebra panics on mismatched shapes, so callers run the checks
//! in this module before doing arithmetic on user supplied data.

use nalgebra::{DMatrix, DVector};

use crate::error::{SystemError, SystemResult};

pub type Vector = DVector<f64>;
pub type Matrix = DMatrix<f64>;

/// Build a vector from a slice.
pub fn vector(values: &[f64]) -> Vector {
    DVector::from_column_slice(values)
}

/// Build a matrix from row-major data.
///
/// Returns `InvalidDimensions` when `data` does not hold exactly
/// `rows * cols` elements.
pub fn matrix_from_rows(rows: usize, cols: usize, data: &[f64]) -> SystemResult<Matrix> {
    if data.len() != rows * cols {
        return Err(SystemError::invalid_dimensions(
            "matrix",
            format!("{rows}x{cols} needs {} values, got {}", rows * cols, data.len()),
        ));
    }
    Ok(DMatrix::from_row_slice(rows, cols, data))
}

/// Build a matrix from nested rows. All rows must have the same length.
pub fn matrix_from_nested(rows: &[Vec<f64>]) -> SystemResult<Matrix> {
    let n_rows = rows.len();
    let n_cols = rows.first().map_or(0, Vec::len);
    if let Some(bad) = rows.iter().find(|row| row.len() != n_cols) {
        return Err(SystemError::invalid_dimensions(
            "matrix",
            format!("ragged rows: expected {n_cols} columns, found {}", bad.len()),
        ));
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    matrix_from_rows(n_rows, n_cols, &flat)
}

/// Fail with `DimensionMismatch` unless `v` has `expected` elements.
pub fn check_len(context: &'static str, v: &Vector, expected: usize) -> SystemResult<()> {
    if v.len() != expected {
        return Err(SystemError::DimensionMismatch {
            context,
            expected,
            actual: v.len(),
        });
    }
    Ok(())
}

/// Fail with `InvalidDimensions` unless `m` is `rows x cols`.
pub fn check_shape(
    context: &'static str,
    name: &str,
    m: &Matrix,
    rows: usize,
    cols: usize,
) -> SystemResult<()> {
    if m.shape() != (rows, cols) {
        return Err(SystemError::invalid_dimensions(
            context,
            format!(
                "{name} is {}x{}, expected {rows}x{cols}",
                m.nrows(),
                m.ncols()
            ),
        ));
    }
    Ok(())
}

/// Stack `[u; y]` into a single vector.
pub fn concat(u: &Vector, y: &Vector) -> Vector {
    let mut full = Vector::zeros(u.len() + y.len());
    full.rows_mut(0, u.len()).copy_from(u);
    full.rows_mut(u.len(), y.len()).copy_from(y);
    full
}

/// Split `full` into its first `head` elements and the remainder.
pub fn split(context: &'static str, full: &Vector, head: usize) -> SystemResult<(Vector, Vector)> {
    if head > full.len() {
        return Err(SystemError::DimensionMismatch {
            context,
            expected: head,
            actual: full.len(),
        });
    }
    let tail = full.len() - head;
    Ok((
        full.rows(0, head).into_owned(),
        full.rows(head, tail).into_owned(),
    ))
}

/// Render a vector as `[a, b, c]`.
pub fn format_vector(v: &Vector) -> String {
    let items: Vec<String> = v.iter().map(|x| format!("{x}")).collect();
    format!("[{}]", items.join(", "))
}
