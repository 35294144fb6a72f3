// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Simulate the beam-weighted sky temperature as a function of frequency and
//! LST.

use std::path::Path;

use hifitime::Duration;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use itertools::Itertools;
use log::{debug, info, trace};
use marlu::LatLngHeight;
use ndarray::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use thiserror::Error;
use vec1::Vec1;

use crate::{
    beam::{BeamError, BeamMap, Pol},
    constants::{FREQS_ARRAY_NAME, LSTS_ARRAY_NAME, TSKY_ARRAY_NAME},
    distortion::{BeamDistortion, DistortionError},
    io::npz::{NpzError, NpzOutput},
    math::argsort,
    projection::OrthographicProjector,
    sky::{SkyError, SkyModel},
    time::{civil_epoch, lst_hours, CivilDate, TimeError},
    PROGRESS_BARS,
};

/// Parameters needed to simulate Tsky.
pub struct TskyParams {
    /// The beam, already interpolated to `freqs_mhz`.
    pub(crate) beam: BeamMap,

    pub(crate) sky: SkyModel,

    /// \[MHz\]
    pub(crate) freqs_mhz: Vec1<f64>,

    /// Times of day on `date` \[hours\].
    pub(crate) hours: Vec1<f64>,

    pub(crate) date: CivilDate,

    /// The LSTs corresponding to `hours` \[hours\].
    pub(crate) lsts: Vec1<f64>,

    pub(crate) pols: Vec1<Pol>,

    /// The Earth position of the instrument.
    pub(crate) array_position: LatLngHeight,

    /// UT1 - UTC.
    pub(crate) dut1: Duration,

    /// If set, the seed used for random beam distortions. Otherwise, a new
    /// random seed is used every run.
    pub(crate) seed: Option<u64>,
}

impl TskyParams {
    /// Validate everything and get the beam onto the simulation frequencies.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        beam: &BeamMap,
        sky: SkyModel,
        freqs_mhz: Vec1<f64>,
        hours: Vec1<f64>,
        date: CivilDate,
        pols: Vec1<Pol>,
        array_position: LatLngHeight,
        dut1: Duration,
        seed: Option<u64>,
    ) -> Result<TskyParams, TskyError> {
        sky.validate(freqs_mhz.len(), hours.len())?;

        let lsts = hours.try_mapped_ref(|&hour| -> Result<f64, TimeError> {
            let epoch = civil_epoch(date, hour)?;
            Ok(lst_hours(epoch, array_position.longitude_rad, dut1))
        })?;
        trace!("LSTs: {:?}", lsts.as_slice());

        let beam = beam.interpolate_to(&freqs_mhz)?;

        Ok(TskyParams {
            beam,
            sky,
            freqs_mhz,
            hours,
            date,
            lsts,
            pols,
            array_position,
            dut1,
            seed,
        })
    }

    pub fn freqs_mhz(&self) -> &[f64] {
        &self.freqs_mhz
    }

    pub fn hours(&self) -> &[f64] {
        &self.hours
    }

    pub fn date(&self) -> CivilDate {
        self.date
    }

    /// The LSTs of each time of day, in the same (civil) order \[hours\].
    pub fn lsts(&self) -> &[f64] {
        &self.lsts
    }

    pub fn pols(&self) -> &[Pol] {
        &self.pols
    }

    pub fn array_position(&self) -> LatLngHeight {
        self.array_position
    }

    pub fn dut1(&self) -> Duration {
        self.dut1
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn beam(&self) -> &BeamMap {
        &self.beam
    }

    pub fn sky(&self) -> &SkyModel {
        &self.sky
    }

    /// Simulate Tsky with the beam distorted by `distortion`. The result is
    /// sorted by LST.
    pub fn run(&self, distortion: BeamDistortion) -> Result<TskyResult, TskyError> {
        distortion.validate()?;
        info!("Forming HERA Tsky with beam distortion '{distortion}'");

        let healpix = self.beam.healpix();
        let (rows, cols) = self.sky.grid_dim();
        let num_pols = self.pols.len();
        let num_freqs = self.freqs_mhz.len();
        let num_times = self.hours.len();

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let projectors = self
            .pols
            .iter()
            .map(|pol| OrthographicProjector::new(healpix, rows, cols, pol.rotation()))
            .collect::<Vec<_>>();
        debug!("Projecting the beam onto a {rows}x{cols} grid");

        let progress = ProgressBar::with_draw_target(
            Some((num_pols * num_freqs) as _),
            if PROGRESS_BARS.load() {
                ProgressDrawTarget::stdout()
            } else {
                ProgressDrawTarget::hidden()
            },
        )
        .with_style(
            ProgressStyle::default_bar()
                .template(
                    "{msg:17}: [{wide_bar:.blue}] {pos:3}/{len:3} beam maps ({elapsed_precise}<{eta_precise})",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        )
        .with_position(0)
        .with_message("Forming Tsky");

        let mut tsky = Array3::from_elem((num_pols, num_freqs, num_times), f64::NAN);
        for (freq_index, &freq) in self.freqs_mhz.iter().enumerate() {
            trace!("Forming HERA Tsky for frequency {freq} MHz");
            let beam_map = self.beam.map(freq_index);
            // Random distortions are drawn separately for every polarisation.
            let shared_beam = if distortion.is_random() {
                None
            } else {
                Some(distortion.apply(beam_map, healpix, &mut rng)?)
            };

            for (pol_index, projector) in projectors.iter().enumerate() {
                let grid = match &shared_beam {
                    Some(b) => projector.project(b.view()),
                    None => {
                        let b = distortion.apply(beam_map, healpix, &mut rng)?;
                        projector.project(b.view())
                    }
                };
                for time_index in 0..num_times {
                    tsky[(pol_index, freq_index, time_index)] =
                        beam_weighted_mean(grid.view(), self.sky.slice(freq_index, time_index));
                }
                progress.inc(1);
            }
        }
        progress.abandon_with_message("Finished forming Tsky");

        Ok(TskyResult {
            tsky,
            freqs_mhz: self.freqs_mhz.to_vec(),
            lsts: self.lsts.to_vec(),
            pols: self.pols.to_vec(),
        }
        .sorted_by_lst())
    }
}

/// The beam-weighted mean of `sky`, i.e. `sum(beam * sky) / sum(beam)`, using
/// only cells where both the beam and sky are finite. NaN if there are no
/// such cells, or the beam sums to zero.
pub fn beam_weighted_mean(beam: ArrayView2<f64>, sky: ArrayView2<f64>) -> f64 {
    let (weighted_sum, beam_sum, count) = beam
        .iter()
        .zip(sky.iter())
        .filter(|(b, s)| b.is_finite() && s.is_finite())
        .fold((0.0, 0.0, 0_usize), |(ws, bs, n), (b, s)| {
            (ws + b * s, bs + b, n + 1)
        });
    if count == 0 || beam_sum == 0.0 {
        f64::NAN
    } else {
        weighted_sum / beam_sum
    }
}

/// Simulated Tsky values.
#[derive(Debug, Clone, PartialEq)]
pub struct TskyResult {
    /// Dimensions are polarisation, frequency, time.
    pub tsky: Array3<f64>,

    /// \[MHz\]
    pub freqs_mhz: Vec<f64>,

    /// The LST of each time \[hours\].
    pub lsts: Vec<f64>,

    pub pols: Vec<Pol>,
}

impl TskyResult {
    /// Reorder the time axis so that LSTs are ascending. Equal LSTs keep their
    /// order.
    pub fn sorted_by_lst(self) -> TskyResult {
        let indices = argsort(&self.lsts);
        TskyResult {
            tsky: self.tsky.select(Axis(2), &indices),
            lsts: indices.iter().map(|&i| self.lsts[i]).collect(),
            ..self
        }
    }

    /// Write the result to a compressed `.npz` file, with arrays `HERA_Tsky`
    /// (polarisation, frequency, time), `freqs` \[MHz\] and `lsts` \[hours\].
    pub fn write_npz(&self, file: &Path) -> Result<(), NpzError> {
        debug!(
            "Writing Tsky for pols [{}] to {}",
            self.pols.iter().join(", "),
            file.display()
        );
        let mut out = NpzOutput::create(file)?;
        out.add(TSKY_ARRAY_NAME, self.tsky.view())?;
        out.add(FREQS_ARRAY_NAME, ArrayView1::from(&self.freqs_mhz))?;
        out.add(LSTS_ARRAY_NAME, ArrayView1::from(&self.lsts))?;
        out.finish()
    }
}

#[derive(Error, Debug)]
pub enum TskyError {
    #[error("Frequency grid from {start} to {end} MHz with resolution {res} MHz is empty or invalid")]
    BadFreqGrid { start: f64, end: f64, res: f64 },

    #[error("Time resolution {0} hours doesn't make a valid grid of times of day")]
    BadTimeRes(f64),

    #[error(transparent)]
    Beam(#[from] BeamError),

    #[error(transparent)]
    Sky(#[from] SkyError),

    #[error(transparent)]
    Distortion(#[from] DistortionError),

    #[error(transparent)]
    Time(#[from] TimeError),

    #[error(transparent)]
    Npz(#[from] NpzError),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
