// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with beam maps.

use std::path::PathBuf;

use thiserror::Error;

use crate::{healpix::HealpixError, io::FitsError, math::InterpError};

#[derive(Error, Debug)]
pub enum BeamError {
    #[error("{file}: HDU '{hdu}' should be 2-dimensional, but has shape {shape:?}")]
    Not2D {
        file: PathBuf,
        hdu: String,
        shape: Vec<usize>,
    },

    #[error("The beam has {got} frequencies, but {expected} were expected")]
    FreqCountMismatch { got: usize, expected: usize },

    #[error("Beam frequencies must be strictly increasing, but {prev} MHz is followed by {next} MHz")]
    FreqsNotSorted { prev: f64, next: f64 },

    #[error("Cannot interpolate the beam to {freq} MHz; the beam only covers {min} to {max} MHz")]
    FreqOutsideBeam { freq: f64, min: f64, max: f64 },

    #[error("Beam interpolation needs at least 4 beam frequencies, but only {0} are available")]
    TooFewFreqs(usize),

    #[error("Gaussian beam width must be positive and finite, but got {0}°")]
    BadWidth(f64),

    #[error(transparent)]
    Healpix(#[from] HealpixError),

    #[error(transparent)]
    Interp(#[from] InterpError),

    #[error(transparent)]
    Fits(#[from] FitsError),
}
