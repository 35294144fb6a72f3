// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Diffuse sky brightness-temperature models.
//!
//! The model is a precomputed 4D array (frequency, time of day, row, column)
//! of sky temperatures, already projected onto the same orthographic grid
//! the beam is projected onto.

mod error;

pub use error::SkyError;

use std::path::Path;

use log::{debug, warn};
use ndarray::prelude::*;

use crate::{constants::SKY_ARRAY_NAME, io::npz::read_npz_array};

#[derive(Debug, Clone)]
pub struct SkyModel {
    temps: Array4<f64>,
}

impl SkyModel {
    pub fn new(temps: Array4<f64>) -> SkyModel {
        SkyModel { temps }
    }

    /// Read the sky model from the `sky` array of a `.npz` file.
    pub fn read_npz(file: &Path) -> Result<SkyModel, SkyError> {
        debug!("Reading sky model {}", file.display());
        let temps = read_npz_array::<Ix4>(file, SKY_ARRAY_NAME)?;
        debug!("Sky model shape: {:?}", temps.dim());
        Ok(SkyModel { temps })
    }

    /// Check that this model covers `num_freqs` frequencies and `num_times`
    /// times of day. Extra frequencies or times are tolerated (only the
    /// leading entries are used), but are reported.
    pub fn validate(&self, num_freqs: usize, num_times: usize) -> Result<(), SkyError> {
        let (sky_freqs, sky_times, rows, cols) = self.temps.dim();
        if rows == 0 || cols == 0 {
            return Err(SkyError::EmptyGrid { rows, cols });
        }
        for (axis, got, needed) in [
            ("frequencies", sky_freqs, num_freqs),
            ("times", sky_times, num_times),
        ] {
            if got < needed {
                return Err(SkyError::TooSmall { axis, got, needed });
            }
            if got > needed {
                warn!("The sky model has {got} {axis}, but only the first {needed} are used");
            }
        }
        Ok(())
    }

    /// The number of rows and columns of the projected grid.
    pub fn grid_dim(&self) -> (usize, usize) {
        let (_, _, rows, cols) = self.temps.dim();
        (rows, cols)
    }

    pub fn slice(&self, freq_index: usize, time_index: usize) -> ArrayView2<f64> {
        self.temps.slice(s![freq_index, time_index, .., ..])
    }

    pub fn temps(&self) -> ArrayView4<f64> {
        self.temps.view()
    }
}
