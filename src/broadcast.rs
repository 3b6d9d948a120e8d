use ndarray::{ArrayD, Axis};

use crate::error::{MultinomialError, Result};

/// Right-aligns two shapes and combines them dimension by dimension.
///
/// Each aligned pair must be equal or contain a 1; the missing leading
/// dimensions of the shorter shape count as 1.
pub fn broadcast_shapes(lhs: &[usize], rhs: &[usize]) -> Result<Vec<usize>> {
    let ndim = lhs.len().max(rhs.len());
    let mut out = vec![1; ndim];

    for i in 0..ndim {
        let l = dim_from_end(lhs, ndim - 1 - i);
        let r = dim_from_end(rhs, ndim - 1 - i);
        out[i] = match (l, r) {
            (l, r) if l == r => l,
            (1, r) => r,
            (l, 1) => l,
            _ => {
                return Err(MultinomialError::IncompatibleShapes {
                    lhs: lhs.to_vec(),
                    rhs: rhs.to_vec(),
                });
            }
        };
    }

    Ok(out)
}

fn dim_from_end(shape: &[usize], back: usize) -> usize {
    if back < shape.len() {
        shape[shape.len() - 1 - back]
    } else {
        1
    }
}

/// Sums an array computed on a broadcast grid back onto one operand's shape.
///
/// `shape` must broadcast to `grid.shape()`.
pub fn reduce_to_shape(grid: ArrayD<f64>, shape: &[usize]) -> ArrayD<f64> {
    let mut out = grid;

    while out.ndim() > shape.len() {
        out = out.sum_axis(Axis(0));
    }

    for (axis, &extent) in shape.iter().enumerate() {
        if extent == 1 && out.shape()[axis] != 1 {
            out = out.sum_axis(Axis(axis)).insert_axis(Axis(axis));
        }
    }

    out
}
