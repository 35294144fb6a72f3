// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Helper functions for reading and writing FITS files.

mod error;

pub use error::FitsError;

use std::{fmt::Display, path::Path};

use fitsio::{
    hdu::{DescribesHdu, FitsHdu, HduInfo},
    images::{ImageDescription, ImageType},
    FitsFile,
};

/// Open a fits file.
#[track_caller]
pub(crate) fn fits_open<P: AsRef<Path>>(file: P) -> Result<FitsFile, FitsError> {
    FitsFile::open(file.as_ref()).map_err(|e| {
        let caller = std::panic::Location::caller();
        FitsError::Open {
            fits_error: Box::new(e),
            fits_filename: file.as_ref().to_path_buf().into_boxed_path(),
            source_file: caller.file(),
            source_line: caller.line(),
            source_column: caller.column(),
        }
    })
}

/// Create a new fits file, clobbering anything that's already there.
#[track_caller]
pub(crate) fn fits_create<P: AsRef<Path>>(file: P) -> Result<FitsFile, FitsError> {
    FitsFile::create(file.as_ref())
        .overwrite()
        .open()
        .map_err(|e| {
            let caller = std::panic::Location::caller();
            FitsError::Open {
                fits_error: Box::new(e),
                fits_filename: file.as_ref().to_path_buf().into_boxed_path(),
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            }
        })
}

/// Open a fits file's HDU.
#[track_caller]
pub(crate) fn fits_open_hdu<T: DescribesHdu + Display + Copy>(
    fits_fptr: &mut FitsFile,
    hdu_description: T,
) -> Result<FitsHdu, FitsError> {
    fits_fptr.hdu(hdu_description).map_err(|e| {
        let caller = std::panic::Location::caller();
        FitsError::Fitsio {
            fits_error: Box::new(e),
            fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
            hdu_description: format!("{hdu_description}").into_boxed_str(),
            source_file: caller.file(),
            source_line: caller.line(),
            source_column: caller.column(),
        }
    })
}

/// Given a FITS file pointer and an image HDU, read the whole image as double
/// precision floats, along with its shape. The shape is in row-major order,
/// i.e. the last dimension varies fastest.
#[track_caller]
pub(crate) fn fits_read_image_f64(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
) -> Result<(Vec<f64>, Vec<usize>), FitsError> {
    let caller = std::panic::Location::caller();
    let shape = match &hdu.info {
        HduInfo::ImageInfo { shape, .. } => shape.clone(),
        _ => {
            return Err(FitsError::NotImage {
                fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                hdu_num: hdu.number + 1,
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            })
        }
    };
    let data: Vec<f64> = hdu.read_image(fits_fptr).map_err(|e| FitsError::Fitsio {
        fits_error: Box::new(e),
        fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
        hdu_description: format!("{}", hdu.number + 1).into_boxed_str(),
        source_file: caller.file(),
        source_line: caller.line(),
        source_column: caller.column(),
    })?;
    Ok((data, shape))
}

/// Create a new image HDU named `extname` with the (row-major) `shape`, and
/// write `data` into it.
#[track_caller]
pub(crate) fn fits_write_image_f64(
    fits_fptr: &mut FitsFile,
    extname: &str,
    shape: &[usize],
    data: &[f64],
) -> Result<(), FitsError> {
    let caller = std::panic::Location::caller();
    let map_err = |e: fitsio::errors::Error, filename: &Path| FitsError::Fitsio {
        fits_error: Box::new(e),
        fits_filename: filename.to_path_buf().into_boxed_path(),
        hdu_description: extname.to_string().into_boxed_str(),
        source_file: caller.file(),
        source_line: caller.line(),
        source_column: caller.column(),
    };

    let description = ImageDescription {
        data_type: ImageType::Double,
        dimensions: shape,
    };
    let filename = fits_fptr.file_path().to_path_buf();
    let hdu = fits_fptr
        .create_image(extname, &description)
        .map_err(|e| map_err(e, &filename))?;
    hdu.write_image(fits_fptr, data)
        .map_err(|e| map_err(e, &filename))
}
