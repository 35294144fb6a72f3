// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NpzError {
    #[error("Couldn't read array '{name}' from {file}: {err}")]
    Read {
        file: PathBuf,
        name: String,
        err: ndarray_npy::ReadNpzError,
    },

    #[error("Couldn't write to {file}: {err}")]
    Write {
        file: PathBuf,
        err: ndarray_npy::WriteNpzError,
    },

    #[error("{file} has no array named '{name}'; available arrays: {available}")]
    MissingArray {
        file: PathBuf,
        name: String,
        available: String,
    },

    #[error("{file}: {err}")]
    IO { file: PathBuf, err: std::io::Error },
}
