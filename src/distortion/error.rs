// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::healpix::HealpixError;

#[derive(Error, Debug)]
pub enum DistortionError {
    #[error("Couldn't parse beam distortion '{0}'; expected one of 'none', 'noise=<sigma>', 'narrow=<frac>', 'widen=<frac>', 'scale-lobes=<frac>'")]
    Parse(String),

    #[error("Unknown beam distortion kind '{0}'; expected one of 'narrow', 'widen', 'noise', 'scale-lobes'")]
    UnknownKind(String),

    #[error("Beam distortion {name} must be finite, but got {value}")]
    NotFinite { name: &'static str, value: f64 },

    #[error("The beam-noise standard deviation must not be negative, but got {0}")]
    NegativeSigma(f64),

    #[error(transparent)]
    Healpix(#[from] HealpixError),
}
