// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HealpixError {
    #[error("A map with {0} pixels is not a HEALPix map (npix must be 12 * nside^2)")]
    InvalidNpix(usize),

    #[error("Got a map with {got} pixels, but expected {expected}")]
    MapSizeMismatch { got: usize, expected: usize },
}
