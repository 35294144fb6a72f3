// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use clap::Parser;
use itertools::Itertools;
use log::info;

use super::common::{ArgsError, InfoPrinter};
use crate::{beam::BeamMap, HeraTskyError};

/// Write an achromatic Gaussian beam file, usable as the beam of `simulate`
/// and `sweep`.
#[derive(Parser, Debug)]
pub struct GaussianBeamArgs {
    /// The HEALPix nside of the beam maps.
    #[clap(short, long, default_value = "64")]
    nside: usize,

    /// The standard deviation of the beam about zenith [degrees].
    #[clap(short, long, default_value = "10.0")]
    sigma: f64,

    /// The frequencies of the beam maps [MHz]. At least 4 are needed to
    /// interpolate the beam.
    #[clap(
        short,
        long,
        multiple_values(true),
        default_values = &["90", "120", "150", "180", "210"]
    )]
    freqs: Vec<f64>,

    /// The FITS file to write the beam to.
    #[clap(short, long, default_value = "gaussian_beam.fits")]
    output: PathBuf,
}

impl GaussianBeamArgs {
    pub(super) fn run(&self, dry_run: bool) -> Result<(), HeraTskyError> {
        if self.nside == 0 {
            return Err(ArgsError::BadNside(self.nside).into());
        }
        if self.freqs.is_empty() {
            return Err(ArgsError::NoBeamFreqs.into());
        }

        let mut printer = InfoPrinter::new("Gaussian beam".into());
        printer.push_block(vec![
            format!("nside: {}", self.nside).into(),
            format!("sigma: {}°", self.sigma).into(),
        ]);
        printer.push_line(format!("Frequencies [MHz]: {}", self.freqs.iter().join(", ")).into());
        printer.push_line(format!("Output: {}", self.output.display()).into());
        printer.display();

        let beam = BeamMap::gaussian(self.nside, self.sigma, self.freqs.clone())?;
        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        beam.write_fits(&self.output)?;
        info!("Wrote {}", self.output.display());
        Ok(())
    }
}
