// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reading and writing numpy `.npz` archives.

mod error;

pub use error::NpzError;

use std::{fs::File, path::Path};

use itertools::Itertools;
use log::trace;
use ndarray::{prelude::*, Dimension, OwnedRepr};
use ndarray_npy::{NpzReader, NpzWriter};

/// Read the array called `name` out of the `.npz` file at `file`. numpy stores
/// arrays as `<name>.npy` inside the zip, so either form of the name is found.
/// Single-precision arrays are promoted to double precision.
pub(crate) fn read_npz_array<D: Dimension>(
    file: &Path,
    name: &str,
) -> Result<Array<f64, D>, NpzError> {
    let handle = File::open(file).map_err(|err| NpzError::IO {
        file: file.to_path_buf(),
        err,
    })?;
    let read_err = |err| NpzError::Read {
        file: file.to_path_buf(),
        name: name.to_string(),
        err,
    };
    let mut npz = NpzReader::new(handle).map_err(read_err)?;
    let names = npz.names().map_err(read_err)?;
    let with_ext = format!("{name}.npy");
    let stored_name = match names
        .iter()
        .find(|n| n.as_str() == name || n.as_str() == with_ext) {
        Some(n) => n.clone(),
        None => {
            return Err(NpzError::MissingArray {
                file: file.to_path_buf(),
                name: name.to_string(),
                available: names.iter().join(", "),
            })
        }
    };
    trace!("Reading '{stored_name}' from {}", file.display());

    match npz.by_name::<OwnedRepr<f64>, D>(&stored_name) {
        Ok(a) => Ok(a),
        Err(f64_err) => match npz.by_name::<OwnedRepr<f32>, D>(&stored_name) {
            Ok(a) => {
                trace!("'{stored_name}' is single precision; promoting");
                Ok(a.mapv(f64::from))
            }
            // Report the double-precision failure; it's the more useful one.
            Err(_) => Err(read_err(f64_err)),
        },
    }
}

/// A compressed `.npz` archive being written.
pub(crate) struct NpzOutput<'a> {
    file: &'a Path,
    writer: NpzWriter<File>,
}

impl<'a> NpzOutput<'a> {
    pub(crate) fn create(file: &'a Path) -> Result<NpzOutput<'a>, NpzError> {
        let handle = File::create(file).map_err(|err| NpzError::IO {
            file: file.to_path_buf(),
            err,
        })?;
        Ok(NpzOutput {
            file,
            writer: NpzWriter::new_compressed(handle),
        })
    }

    pub(crate) fn add<D: Dimension>(
        &mut self,
        name: &str,
        array: ArrayView<f64, D>,
    ) -> Result<(), NpzError> {
        self.writer
            .add_array(name, &array)
            .map_err(|err| NpzError::Write {
                file: self.file.to_path_buf(),
                err,
            })
    }

    pub(crate) fn finish(self) -> Result<(), NpzError> {
        let file = self.file;
        self.writer.finish().map_err(|err| NpzError::Write {
            file: file.to_path_buf(),
            err,
        })?;
        Ok(())
    }
}
