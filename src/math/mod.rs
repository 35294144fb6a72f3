// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Some helper mathematics.


use ndarray::prelude::*;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum InterpError {
    #[error("Cubic interpolation needs at least 4 samples, but only {0} were given")]
    TooFewSamples(usize),

    #[error("Sample coordinates must be strictly increasing (index {0} isn't)")]
    NotIncreasing(usize),

    #[error("Got {xs} sample coordinates but {ys} sample values")]
    LengthMismatch { xs: usize, ys: usize },

    #[error("Cannot evaluate at {x}; the samples only span {min} to {max}")]
    OutOfRange { x: f64, min: f64, max: f64 },

    #[error("The spline system is singular")]
    Singular,
}

/// A cubic spline with "not-a-knot" end conditions (the third derivative is
/// continuous across the second and second-last knots).
///
/// The spline is linear in its sample values, so rather than storing
/// coefficients for one set of values, this stores the matrix `K` mapping
/// sample values to the spline's second derivatives at the knots. This allows
/// many sets of values sharing the same coordinates (e.g. every pixel of a beam
/// map) to be interpolated with a single matrix product.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    x: Vec<f64>,
    second_derivs: Array2<f64>,
}

impl CubicSpline {
    pub fn new(x: &[f64]) -> Result<CubicSpline, InterpError> {
        let n = x.len();
        if n < 4 {
            return Err(InterpError::TooFewSamples(n));
        }
        if let Some(i) = x.windows(2).position(|w| w[1] <= w[0] || !w[1].is_finite()) {
            return Err(InterpError::NotIncreasing(i + 1));
        }

        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
        let mut a = Array2::zeros((n, n));
        let mut d = Array2::zeros((n, n));

        // Not-a-knot at x[1].
        a[(0, 0)] = -h[1];
        a[(0, 1)] = h[0] + h[1];
        a[(0, 2)] = -h[0];
        for i in 1..n - 1 {
            a[(i, i - 1)] = h[i - 1];
            a[(i, i)] = 2.0 * (h[i - 1] + h[i]);
            a[(i, i + 1)] = h[i];
            d[(i, i - 1)] = 6.0 / h[i - 1];
            d[(i, i)] = -6.0 / h[i - 1] - 6.0 / h[i];
            d[(i, i + 1)] = 6.0 / h[i];
        }
        // Not-a-knot at x[n - 2].
        a[(n - 1, n - 3)] = -h[n - 2];
        a[(n - 1, n - 2)] = h[n - 3] + h[n - 2];
        a[(n - 1, n - 1)] = -h[n - 3];

        let second_derivs = solve(a, d).ok_or(InterpError::Singular)?;
        Ok(CubicSpline {
            x: x.to_vec(),
            second_derivs,
        })
    }

    /// Get the weights to apply to the sample values to evaluate the spline
    /// at `x`.
    pub fn weights(&self, x: f64) -> Result<Array1<f64>, InterpError> {
        let n = self.x.len();
        let (min, max) = (self.x[0], self.x[n - 1]);
        if !(min..=max).contains(&x) {
            return Err(InterpError::OutOfRange { x, min, max });
        }

        // The segment containing x; the last knot belongs to the last
        // segment.
        let i = match self.x.partition_point(|&knot| knot <= x) {
            0 => 0,
            p => (p - 1).min(n - 2),
        };
        let h = self.x[i + 1] - self.x[i];
        let b = x - self.x[i];
        let a = self.x[i + 1] - x;

        let ca = a * a * a / (6.0 * h) - h * a / 6.0;
        let cb = b * b * b / (6.0 * h) - h * b / 6.0;
        let mut w = &self.second_derivs.row(i) * ca + &self.second_derivs.row(i + 1) * cb;
        w[i] += a / h;
        w[i + 1] += b / h;
        Ok(w)
    }

    /// Get a `(new_x.len(), num_samples)` matrix which maps sample values to
    /// spline values at `new_x`.
    pub fn weight_matrix(&self, new_x: &[f64]) -> Result<Array2<f64>, InterpError> {
        let mut m = Array2::zeros((new_x.len(), self.x.len()));
        for (mut row, &x) in m.outer_iter_mut().zip(new_x) {
            row.assign(&self.weights(x)?);
        }
        Ok(m)
    }

    /// Evaluate the spline through `y` at `x`.
    pub fn evaluate(&self, y: &[f64], x: f64) -> Result<f64, InterpError> {
        if y.len() != self.x.len() {
            return Err(InterpError::LengthMismatch {
                xs: self.x.len(),
                ys: y.len(),
            });
        }
        Ok(self.weights(x)?.dot(&ArrayView1::from(y)))
    }
}

/// Cubic-spline interpolate the columns of `values` (i.e. along axis 1),
/// sampled at `x`, onto `new_x`.
pub fn interp_cubic_axis1(
    values: ArrayView2<f64>,
    x: &[f64],
    new_x: &[f64],
) -> Result<Array2<f64>, InterpError> {
    if values.len_of(Axis(1)) != x.len() {
        return Err(InterpError::LengthMismatch {
            xs: x.len(),
            ys: values.len_of(Axis(1)),
        });
    }
    let spline = CubicSpline::new(x)?;
    let w = spline.weight_matrix(new_x)?;
    Ok(values.dot(&w.t()))
}

/// Solve `a x = b` for `x` with Gaussian elimination and partial pivoting.
/// `b` may have multiple columns. Returns `None` if `a` is singular.
fn solve(mut a: Array2<f64>, mut b: Array2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[(i, col)].abs().total_cmp(&a[(j, col)].abs()))?;
        if a[(pivot, col)].abs() < f64::EPSILON * 1e-3 {
            return None;
        }
        if pivot != col {
            for k in 0..n {
                a.swap((pivot, k), (col, k));
            }
            for k in 0..b.ncols() {
                b.swap((pivot, k), (col, k));
            }
        }

        for row in col + 1..n {
            let factor = a[(row, col)] / a[(col, col)];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[(row, k)] -= factor * a[(col, k)];
            }
            for k in 0..b.ncols() {
                b[(row, k)] -= factor * b[(col, k)];
            }
        }
    }

    for col in (0..n).rev() {
        for k in 0..b.ncols() {
            let mut sum = b[(col, k)];
            for j in col + 1..n {
                sum -= a[(col, j)] * b[(j, k)];
            }
            b[(col, k)] = sum / a[(col, col)];
        }
    }
    Some(b)
}

/// Get the indices that would sort `values` in ascending order. The sort is
/// stable, so equal values keep their original order.
pub fn argsort(values: &[f64]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..values.len()).collect();
    indices.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    indices
}
