// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Common arguments for command-line interfaces. Here, we abstract many aspects
//! of `hera_tsky`, e.g. the `simulate` and `sweep` subcommands both need a
//! beam, a sky model and time/frequency grids, so the same arguments are
//! shared between them.

mod printers;

pub(super) use printers::InfoPrinter;
pub(crate) use printers::{display_warnings, Warn};

use std::{path::PathBuf, str::FromStr};

use clap::Parser;
use console::style;
use hifitime::Duration;
use itertools::Itertools;
use log::debug;
use marlu::LatLngHeight;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;
use vec1::Vec1;

use super::HeraTskyError;
use crate::{
    beam::{BeamMap, Pol},
    constants::{
        DEFAULT_DATE, DEFAULT_FREQ_END_MHZ, DEFAULT_FREQ_RES_MHZ, DEFAULT_FREQ_START_MHZ,
        DEFAULT_TIME_RES_HOURS, HERA_HEIGHT_M, HERA_LAT_DEG, HERA_LONG_DEG,
    },
    params::{freq_grid, hour_grid, TskyParams},
    sky::SkyModel,
    time::CivilDate,
};

lazy_static::lazy_static! {
    pub(super) static ref ARG_FILE_TYPES_COMMA_SEPARATED: String = ArgFileTypes::iter().join(", ");

    pub(super) static ref ARG_FILE_HELP: String =
        format!("All arguments may be specified in a file. Any CLI arguments override arguments set in the file. Supported formats: {}", *ARG_FILE_TYPES_COMMA_SEPARATED);

    pub(super) static ref ARRAY_POSITION_HELP: String =
        format!("The Earth longitude, latitude, and height of the instrumental array [degrees, degrees, meters]. Default (HERA): ({HERA_LONG_DEG}°, {HERA_LAT_DEG}°, {HERA_HEIGHT_M}m)");

    static ref FREQ_START_HELP: String =
        format!("The lower edge of the simulated frequency band [MHz]. Default: {DEFAULT_FREQ_START_MHZ}");

    static ref FREQ_END_HELP: String =
        format!("The upper edge of the simulated frequency band [MHz]. Default: {DEFAULT_FREQ_END_MHZ}");

    static ref FREQ_RES_HELP: String =
        format!("The width of each simulated frequency channel [MHz]. Frequencies are channel centres. Default: {DEFAULT_FREQ_RES_MHZ}");

    static ref TIME_RES_HELP: String =
        format!("The spacing of the simulated times of day [hours]. The sky model must have at least this many times. Default: {DEFAULT_TIME_RES_HOURS}");

    static ref DATE_HELP: String =
        format!("The UTC date of the simulated times of day (YYYY-MM-DD). Default: {DEFAULT_DATE}");

    static ref POLS_HELP: String =
        format!("The instrumental polarisations to simulate. Supported: {}. Default: all", Pol::iter().join(", "));
}

#[derive(Debug, Display, EnumIter, EnumString)]
pub(super) enum ArgFileTypes {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

macro_rules! unpack_arg_file {
    ($arg_file:expr) => ({
        use std::{fs::File, io::Read, str::FromStr};

        use crate::cli::common::{ArgFileTypes, ARG_FILE_TYPES_COMMA_SEPARATED};

        debug!("Attempting to parse argument file {}", $arg_file.display());

        let mut contents = String::new();
        let arg_file_type = $arg_file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| ArgFileTypes::from_str(&e).ok());

        match arg_file_type {
            Some(ArgFileTypes::Toml) => {
                debug!("Parsing toml file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match toml::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(HeraTskyError::ArgFile(format!(
                            "Couldn't decode toml structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }
            Some(ArgFileTypes::Json) => {
                debug!("Parsing json file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match serde_json::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(HeraTskyError::ArgFile(format!(
                            "Couldn't decode json structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }

            _ => {
                return Err(HeraTskyError::ArgFile(format!(
                    "Argument file '{:?}' doesn't have a recognised file extension! Valid extensions are: {}", $arg_file, *ARG_FILE_TYPES_COMMA_SEPARATED)
                ))
            }
        }
    });
}

/// Arguments describing a Tsky simulation: the inputs, the site and the
/// frequency/time grids.
#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct TskyArgs {
    /// Path to the beam FITS file. It must contain the HEALPix X-dipole power
    /// maps in a "BEAM_X" HDU and their frequencies [MHz] in "FREQS_X".
    #[clap(short, long, parse(from_str), help_heading = "INPUT FILES")]
    pub(super) beam_file: Option<PathBuf>,

    /// Path to the sky model .npz file. It must contain an array "sky" with
    /// dimensions [frequency, time, row, column] [K].
    #[clap(short, long, parse(from_str), help_heading = "INPUT FILES")]
    pub(super) sky_file: Option<PathBuf>,

    #[clap(
        long, help = ARRAY_POSITION_HELP.as_str(), help_heading = "OBSERVATION PARAMETERS",
        number_of_values = 3,
        allow_hyphen_values = true,
        value_names = &["LONG_DEG", "LAT_DEG", "HEIGHT_M"]
    )]
    pub(super) array_position: Option<Vec<f64>>,

    #[clap(long, help = FREQ_START_HELP.as_str(), help_heading = "OBSERVATION PARAMETERS")]
    pub(super) freq_start: Option<f64>,

    #[clap(long, help = FREQ_END_HELP.as_str(), help_heading = "OBSERVATION PARAMETERS")]
    pub(super) freq_end: Option<f64>,

    #[clap(short, long, help = FREQ_RES_HELP.as_str(), help_heading = "OBSERVATION PARAMETERS")]
    pub(super) freq_res: Option<f64>,

    #[clap(short, long, help = TIME_RES_HELP.as_str(), help_heading = "OBSERVATION PARAMETERS")]
    pub(super) time_res: Option<f64>,

    #[clap(short, long, help = DATE_HELP.as_str(), help_heading = "OBSERVATION PARAMETERS")]
    pub(super) date: Option<String>,

    /// Use this value as the DUT1 [seconds]. Default: 0
    #[clap(long, allow_hyphen_values = true, help_heading = "OBSERVATION PARAMETERS")]
    pub(super) dut1: Option<f64>,

    #[clap(long, multiple_values(true), help = POLS_HELP.as_str(), help_heading = "OBSERVATION PARAMETERS")]
    pub(super) pols: Option<Vec<String>>,

    /// The seed of the random-number generator used for noisy beam
    /// distortions. If not given, every run is different.
    #[clap(long, help_heading = "BEAM DISTORTION")]
    pub(super) seed: Option<u64>,
}

impl TskyArgs {
    /// Merge two sets of arguments, preferring `self` (the CLI arguments) over
    /// `other` (the argument file).
    pub(super) fn merge(self, other: Self) -> Self {
        Self {
            beam_file: self.beam_file.or(other.beam_file),
            sky_file: self.sky_file.or(other.sky_file),
            array_position: self.array_position.or(other.array_position),
            freq_start: self.freq_start.or(other.freq_start),
            freq_end: self.freq_end.or(other.freq_end),
            freq_res: self.freq_res.or(other.freq_res),
            time_res: self.time_res.or(other.time_res),
            date: self.date.or(other.date),
            dut1: self.dut1.or(other.dut1),
            pols: self.pols.or(other.pols),
            seed: self.seed.or(other.seed),
        }
    }

    /// Read the input files and check everything. Information on the
    /// simulation is printed along the way.
    pub(super) fn parse(self) -> Result<TskyParams, HeraTskyError> {
        debug!("{:#?}", self);

        let TskyArgs {
            beam_file,
            sky_file,
            array_position,
            freq_start,
            freq_end,
            freq_res,
            time_res,
            date,
            dut1,
            pols,
            seed,
        } = self;

        let beam_file = beam_file.ok_or(ArgsError::NoBeamFile)?;
        let sky_file = sky_file.ok_or(ArgsError::NoSkyFile)?;

        // Parse the cheap things before reading any files.
        let array_position = match array_position {
            Some(v) => {
                if v.len() != 3 {
                    return Err(ArgsError::BadArrayPosition { pos: v }.into());
                }
                LatLngHeight {
                    longitude_rad: v[0].to_radians(),
                    latitude_rad: v[1].to_radians(),
                    height_metres: v[2],
                }
            }
            None => LatLngHeight {
                longitude_rad: HERA_LONG_DEG.to_radians(),
                latitude_rad: HERA_LAT_DEG.to_radians(),
                height_metres: HERA_HEIGHT_M,
            },
        };
        let pols = match pols {
            Some(pols) => {
                let mut parsed = Vec::with_capacity(pols.len());
                for p in pols {
                    let pol = Pol::from_str(&p).map_err(|_| ArgsError::BadPol(p.clone()))?;
                    if parsed.contains(&pol) {
                        format!("Polarisation {pol} was specified more than once; ignoring")
                            .warn();
                    } else {
                        parsed.push(pol);
                    }
                }
                Vec1::try_from_vec(parsed).map_err(|_| ArgsError::NoPols)?
            }
            None => Vec1::try_from_vec(Pol::iter().collect()).map_err(|_| ArgsError::NoPols)?,
        };
        let date = CivilDate::from_str(date.as_deref().unwrap_or(DEFAULT_DATE))?;
        let freqs_mhz = freq_grid(
            freq_start.unwrap_or(DEFAULT_FREQ_START_MHZ),
            freq_end.unwrap_or(DEFAULT_FREQ_END_MHZ),
            freq_res.unwrap_or(DEFAULT_FREQ_RES_MHZ),
        )?;
        let time_res = time_res.unwrap_or(DEFAULT_TIME_RES_HOURS);
        let hours = hour_grid(time_res)?;
        if (24.0 / time_res).fract().abs() > 1e-9 {
            format!("A time resolution of {time_res} hours doesn't evenly divide a day").warn();
        }
        let dut1 = Duration::from_seconds(dut1.unwrap_or_default());

        let beam = BeamMap::read_fits(&beam_file)?;
        let mut beam_printer = InfoPrinter::new("Beam info".into());
        beam_printer.push_line(format!("File: {}", beam_file.display()).into());
        beam_printer.push_block(vec![
            format!(
                "HEALPix nside {} ({} pixels)",
                beam.healpix().nside(),
                beam.healpix().npix()
            )
            .into(),
            format!(
                "{} maps from {:.3} to {:.3} MHz",
                beam.freqs_mhz().len(),
                beam.freqs_mhz().first().copied().unwrap_or(f64::NAN),
                beam.freqs_mhz().last().copied().unwrap_or(f64::NAN),
            )
            .into(),
        ]);
        beam_printer.display();

        let sky = SkyModel::read_npz(&sky_file)?;
        let (num_sky_freqs, num_sky_times, rows, cols) = sky.temps().dim();
        let mut sky_printer = InfoPrinter::new("Sky model info".into());
        sky_printer.push_line(format!("File: {}", sky_file.display()).into());
        sky_printer.push_block(vec![
            format!("{num_sky_freqs} frequencies, {num_sky_times} times").into(),
            format!("Projected grid: {rows}x{cols}").into(),
        ]);
        sky_printer.display();

        let mut obs_printer = InfoPrinter::new("Observation info".into());
        obs_printer.push_block(vec![
            style("                   Long       Lat").bold().to_string().into(),
            format!(
                "Array position:    {:>8.4}° {:>8.4}° {:.4}m",
                array_position.longitude_rad.to_degrees(),
                array_position.latitude_rad.to_degrees(),
                array_position.height_metres
            )
            .into(),
        ]);
        obs_printer.push_block(vec![
            format!("Number of frequencies: {}", freqs_mhz.len()).into(),
            format!("First frequency: {:.4} MHz", freqs_mhz.first()).into(),
            format!("Last frequency:  {:.4} MHz", freqs_mhz.last()).into(),
        ]);
        obs_printer.push_block(vec![
            format!("Date: {date}").into(),
            format!("Number of times: {} ({time_res} h apart)", hours.len()).into(),
            format!("DUT1: {:.10} s", dut1.to_seconds()).into(),
        ]);
        obs_printer.push_line(format!("Polarisations: {}", pols.iter().join(", ")).into());
        if let Some(seed) = seed {
            obs_printer.push_line(format!("Random seed: {seed}").into());
        }
        obs_printer.display();

        let params = TskyParams::new(
            &beam,
            sky,
            freqs_mhz,
            hours,
            date,
            pols,
            array_position,
            dut1,
            seed,
        )?;
        debug!(
            "LSTs [hours]: first {:.4}, last {:.4}",
            params.lsts()[0],
            params.lsts()[params.lsts().len() - 1]
        );
        Ok(params)
    }
}

/// Errors when making sense of command-line arguments.
#[derive(Error, Debug)]
pub(super) enum ArgsError {
    #[error("No beam file was supplied")]
    NoBeamFile,

    #[error("No sky model file was supplied")]
    NoSkyFile,

    #[error("Array position specified as {pos:?}, not [<Longitude>, <Latitude>, <Height>]")]
    BadArrayPosition { pos: Vec<f64> },

    #[error("Unrecognised polarisation '{0}'; supported polarisations: {}", Pol::iter().join(", "))]
    BadPol(String),

    #[error("No polarisations were specified")]
    NoPols,

    #[error("No distortion fractions were specified for the sweep")]
    NoFracs,

    #[error("A HEALPix nside must be positive, but got {0}")]
    BadNside(usize),

    #[error("No beam frequencies were specified")]
    NoBeamFreqs,
}
