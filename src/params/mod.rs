// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parameters for Tsky simulations.
//!
//! The code here is kind of "mirroring" the code within the `cli` module; the
//! idea is that `cli` is unparsed, user-facing code, whereas parameters have
//! been parsed and validated and are ready to be used directly.

mod sweep;
#[cfg(test)]
mod tests;
mod tsky;

pub use sweep::{sweep_output_filename, SweepParams};
pub use tsky::{beam_weighted_mean, TskyError, TskyParams, TskyResult};

use vec1::Vec1;

/// Get evenly spaced bin centres from `start` to `end`, `res` wide, i.e.
/// `start + res/2, start + 3res/2, ...`, stopping before `end`.
pub fn freq_grid(start: f64, end: f64, res: f64) -> Result<Vec1<f64>, TskyError> {
    arange(start + res / 2.0, end, res).ok_or(TskyError::BadFreqGrid { start, end, res })
}

/// Get times of day `0, res, 2res, ...`, stopping before 24 hours.
pub fn hour_grid(res: f64) -> Result<Vec1<f64>, TskyError> {
    arange(0.0, 24.0, res).ok_or(TskyError::BadTimeRes(res))
}

/// Values `start + i * step` less than `stop`. `None` if there would be no
/// values or the inputs aren't usable.
fn arange(start: f64, stop: f64, step: f64) -> Option<Vec1<f64>> {
    if !(start.is_finite() && stop.is_finite() && step.is_finite() && step > 0.0) {
        return None;
    }
    let n = ((stop - start) / step).ceil();
    if n < 1.0 {
        return None;
    }
    let values = (0..n as usize).map(|i| start + i as f64 * step).collect();
    Vec1::try_from_vec(values).ok()
}
