// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::io::NpzError;

#[derive(Error, Debug)]
pub enum SkyError {
    #[error("The sky model has {got} {axis}, but {needed} are needed")]
    TooSmall {
        axis: &'static str,
        got: usize,
        needed: usize,
    },

    #[error("The sky model's projected grid is empty ({rows}x{cols})")]
    EmptyGrid { rows: usize, cols: usize },

    #[error(transparent)]
    Npz(#[from] NpzError),
}
