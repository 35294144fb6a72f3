// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all hera_tsky-related errors. This should be the *only*
//! error enum that is publicly visible.

use thiserror::Error;

use super::common::ArgsError;
use crate::{
    beam::BeamError,
    distortion::DistortionError,
    healpix::HealpixError,
    io::{FitsError, NpzError},
    params::TskyError,
    sky::SkyError,
    time::TimeError,
};

/// The *only* publicly visible error from hera_tsky. Messages are grouped by
/// topic, with a hint where one helps.
#[derive(Error, Debug)]
pub enum HeraTskyError {
    /// An error related to the beam file or beam maps.
    #[error("{0}\n\nThe beam file must have HEALPix maps in a 'BEAM_X' image HDU and their frequencies [MHz] in 'FREQS_X'.")]
    Beam(String),

    /// An error related to the sky model.
    #[error("{0}\n\nThe sky model file must be an .npz with a 4D array 'sky' [frequency, time, row, column].")]
    Sky(String),

    /// An error related to beam distortions.
    #[error("{0}\n\nDistortions are specified like 'none', 'narrow=0.1', 'widen=0.1', 'noise=0.05' or 'scale-lobes=0.5'.")]
    Distortion(String),

    /// An error related to command-line arguments.
    #[error("{0}")]
    Args(String),

    /// An error related to argument files.
    #[error("{0}\n\nArgument files use the same names as the long command-line arguments, with dashes replaced by underscores.")]
    ArgFile(String),

    /// A cfitsio error. Because these are usually quite spartan, some
    /// suggestions are provided here.
    #[error("cfitsio error: {0}\n\nIf you don't know what this means, try turning up verbosity (-v or -vv) and maybe disabling progress bars.")]
    Cfitsio(String),

    /// An error reading or writing .npz files.
    #[error("{0}")]
    Npz(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<ArgsError> for HeraTskyError {
    fn from(e: ArgsError) -> Self {
        let s = e.to_string();
        match e {
            ArgsError::NoBeamFile | ArgsError::NoBeamFreqs | ArgsError::BadNside(_) => {
                Self::Beam(s)
            }
            ArgsError::NoSkyFile => Self::Sky(s),
            ArgsError::NoFracs => Self::Distortion(s),
            ArgsError::BadArrayPosition { .. } | ArgsError::BadPol(_) | ArgsError::NoPols => {
                Self::Args(s)
            }
        }
    }
}

impl From<TskyError> for HeraTskyError {
    fn from(e: TskyError) -> Self {
        let s = e.to_string();
        match e {
            TskyError::BadFreqGrid { .. } | TskyError::BadTimeRes(_) => Self::Args(s),
            TskyError::Beam(e) => Self::from(e),
            TskyError::Sky(e) => Self::from(e),
            TskyError::Distortion(e) => Self::from(e),
            TskyError::Time(e) => Self::from(e),
            TskyError::Npz(e) => Self::from(e),
            TskyError::IO(e) => Self::from(e),
        }
    }
}

impl From<BeamError> for HeraTskyError {
    fn from(e: BeamError) -> Self {
        let s = e.to_string();
        match e {
            BeamError::Fits(e) => Self::from(e),
            BeamError::Not2D { .. }
            | BeamError::FreqCountMismatch { .. }
            | BeamError::FreqsNotSorted { .. }
            | BeamError::FreqOutsideBeam { .. }
            | BeamError::TooFewFreqs(_)
            | BeamError::BadWidth(_)
            | BeamError::Healpix(_)
            | BeamError::Interp(_) => Self::Beam(s),
        }
    }
}

impl From<SkyError> for HeraTskyError {
    fn from(e: SkyError) -> Self {
        let s = e.to_string();
        match e {
            SkyError::Npz(NpzError::MissingArray { .. })
            | SkyError::TooSmall { .. }
            | SkyError::EmptyGrid { .. } => Self::Sky(s),
            SkyError::Npz(e) => Self::from(e),
        }
    }
}

impl From<DistortionError> for HeraTskyError {
    fn from(e: DistortionError) -> Self {
        let s = e.to_string();
        match e {
            DistortionError::Healpix(e) => Self::from(e),
            DistortionError::Parse(_)
            | DistortionError::UnknownKind(_)
            | DistortionError::NotFinite { .. }
            | DistortionError::NegativeSigma(_) => Self::Distortion(s),
        }
    }
}

impl From<TimeError> for HeraTskyError {
    fn from(e: TimeError) -> Self {
        Self::Args(e.to_string())
    }
}

impl From<HealpixError> for HeraTskyError {
    fn from(e: HealpixError) -> Self {
        Self::Beam(e.to_string())
    }
}

impl From<FitsError> for HeraTskyError {
    fn from(e: FitsError) -> Self {
        Self::Cfitsio(e.to_string())
    }
}

impl From<NpzError> for HeraTskyError {
    fn from(e: NpzError) -> Self {
        Self::Npz(e.to_string())
    }
}

impl From<std::io::Error> for HeraTskyError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
