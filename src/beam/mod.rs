// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! HEALPix beam maps.
//!
//! A beam file holds the power response of a single (X) dipole as a HEALPix
//! RING map per frequency, in the image HDU `BEAM_X` (shape `[npix, nfreq]`),
//! alongside the frequencies of those maps in `FREQS_X` \[MHz\]. The Y response
//! is never read; it's approximated by rotating the X map by 90 degrees (see
//! [`Pol::rotation`]).

mod error;

pub use error::BeamError;

use std::path::Path;

use log::{debug, trace};
use ndarray::prelude::*;
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    constants::{BEAM_HDU_PREFIX, FRAC_PI_2, FREQS_HDU_PREFIX},
    healpix::{npix2nside, Healpix},
    io::fits::{
        fits_create, fits_open, fits_open_hdu, fits_read_image_f64, fits_write_image_f64,
    },
    math::interp_cubic_axis1,
};

/// Instrumental polarisations.
#[derive(Debug, Display, EnumIter, EnumString, Clone, Copy, PartialEq, Eq, Hash)]
#[strum(ascii_case_insensitive)]
pub enum Pol {
    X,
    Y,
}

impl Pol {
    /// The extra azimuthal rotation applied to the X beam map to get this
    /// polarisation's response \[radians\].
    pub fn rotation(self) -> f64 {
        match self {
            Pol::X => 0.0,
            Pol::Y => FRAC_PI_2,
        }
    }
}

/// A beam's power response as HEALPix maps over a set of frequencies.
#[derive(Debug, Clone)]
pub struct BeamMap {
    healpix: Healpix,

    /// \[MHz\]
    freqs_mhz: Vec<f64>,

    /// The beam values. The first dimension is HEALPix pixel, the second is
    /// frequency.
    values: Array2<f64>,
}

impl BeamMap {
    pub fn new(values: Array2<f64>, freqs_mhz: Vec<f64>) -> Result<BeamMap, BeamError> {
        let (npix, num_freqs) = values.dim();
        let healpix = Healpix::from_npix(npix)?;
        if num_freqs != freqs_mhz.len() {
            return Err(BeamError::FreqCountMismatch {
                got: num_freqs,
                expected: freqs_mhz.len(),
            });
        }
        if let Some(w) = freqs_mhz.windows(2).find(|w| w[1] <= w[0] || w[1].is_nan()) {
            return Err(BeamError::FreqsNotSorted {
                prev: w[0],
                next: w[1],
            });
        }
        Ok(BeamMap {
            healpix,
            freqs_mhz,
            values,
        })
    }

    /// Read the X-polarisation beam maps and their frequencies from a beam
    /// FITS file.
    pub fn read_fits(file: &Path) -> Result<BeamMap, BeamError> {
        debug!("Reading beam file {}", file.display());
        let mut fptr = fits_open(file)?;

        let beam_hdu_name = format!("{BEAM_HDU_PREFIX}{}", Pol::X);
        let hdu = fits_open_hdu(&mut fptr, beam_hdu_name.as_str())?;
        let (data, shape) = fits_read_image_f64(&mut fptr, &hdu)?;
        let freqs_hdu_name = format!("{FREQS_HDU_PREFIX}{}", Pol::X);
        let hdu = fits_open_hdu(&mut fptr, freqs_hdu_name.as_str())?;
        let (freqs_mhz, _) = fits_read_image_f64(&mut fptr, &hdu)?;
        trace!(
            "{beam_hdu_name} shape: {shape:?}, {} frequencies",
            freqs_mhz.len()
        );

        let (rows, cols) = match shape.as_slice() {
            [rows, cols] => (*rows, *cols),
            _ => {
                return Err(BeamError::Not2D {
                    file: file.to_path_buf(),
                    hdu: beam_hdu_name,
                    shape,
                })
            }
        };
        // The map should be [npix, nfreq], but accept the transpose, as long
        // as it's unambiguous.
        let values = Array2::from_shape_vec((rows, cols), data)
            .map_err(|_| BeamError::Not2D {
                file: file.to_path_buf(),
                hdu: beam_hdu_name.clone(),
                shape: shape.clone(),
            })?;
        let values = if cols != freqs_mhz.len()
            && rows == freqs_mhz.len()
            && npix2nside(cols).is_ok()
        {
            debug!("{beam_hdu_name} is [nfreq, npix]; transposing");
            values.reversed_axes().as_standard_layout().into_owned()
        } else {
            values
        };

        BeamMap::new(values, freqs_mhz)
    }

    /// Write these beam maps to a beam FITS file, in the same layout that
    /// [`BeamMap::read_fits`] expects.
    pub fn write_fits(&self, file: &Path) -> Result<(), BeamError> {
        let mut fptr = fits_create(file)?;
        let (npix, num_freqs) = self.values.dim();
        // Iteration is in logical (row-major) order.
        let values: Vec<f64> = self.values.iter().copied().collect();
        fits_write_image_f64(
            &mut fptr,
            &format!("{BEAM_HDU_PREFIX}{}", Pol::X),
            &[npix, num_freqs],
            &values,
        )?;
        fits_write_image_f64(
            &mut fptr,
            &format!("{FREQS_HDU_PREFIX}{}", Pol::X),
            &[num_freqs],
            &self.freqs_mhz,
        )?;
        Ok(())
    }

    /// Make an achromatic, circular Gaussian beam centred on zenith, with a
    /// standard deviation of `sigma_deg`. Below the horizon the beam is zero.
    pub fn gaussian(
        nside: usize,
        sigma_deg: f64,
        freqs_mhz: Vec<f64>,
    ) -> Result<BeamMap, BeamError> {
        if !(sigma_deg.is_finite() && sigma_deg > 0.0) {
            return Err(BeamError::BadWidth(sigma_deg));
        }
        let healpix = Healpix::new(nside);
        let map: Vec<f64> = (0..healpix.npix())
            .map(|pix| {
                let (theta, _) = healpix.pix2ang(pix);
                if theta <= FRAC_PI_2 {
                    (-theta.to_degrees().powi(2) / (2.0 * sigma_deg.powi(2))).exp()
                } else {
                    0.0
                }
            })
            .collect();
        let values =
            Array2::from_shape_fn((healpix.npix(), freqs_mhz.len()), |(pix, _)| map[pix]);
        BeamMap::new(values, freqs_mhz)
    }

    /// Cubic-spline interpolate the beam maps onto new frequencies. All of the
    /// new frequencies must lie within the range of the current frequencies.
    pub fn interpolate_to(&self, freqs_mhz: &[f64]) -> Result<BeamMap, BeamError> {
        let num_freqs = self.freqs_mhz.len();
        if num_freqs < 4 {
            return Err(BeamError::TooFewFreqs(num_freqs));
        }
        let (min, max) = (self.freqs_mhz[0], self.freqs_mhz[num_freqs - 1]);
        if let Some(&freq) = freqs_mhz.iter().find(|f| !(min..=max).contains(*f)) {
            return Err(BeamError::FreqOutsideBeam { freq, min, max });
        }

        debug!(
            "Interpolating beam from {num_freqs} frequencies ({min} to {max} MHz) onto {} frequencies",
            freqs_mhz.len()
        );
        let values = interp_cubic_axis1(self.values.view(), &self.freqs_mhz, freqs_mhz)?;
        BeamMap::new(values, freqs_mhz.to_vec())
    }

    pub fn healpix(&self) -> Healpix {
        self.healpix
    }

    pub fn freqs_mhz(&self) -> &[f64] {
        &self.freqs_mhz
    }

    pub fn values(&self) -> ArrayView2<f64> {
        self.values.view()
    }

    /// Get the beam map for the frequency with index `freq_index`.
    pub fn map(&self, freq_index: usize) -> ArrayView1<f64> {
        self.values.column(freq_index)
    }
}
