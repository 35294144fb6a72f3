// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Perturbations of beam maps.
//!
//! These are used to see how sensitive the simulated sky temperature is to
//! errors in the beam. Each distortion acts on one frequency's beam map at a
//! time.

mod error;

pub use error::DistortionError;

use std::str::FromStr;

use log::{trace, warn};
use ndarray::prelude::*;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    constants::{NOISE_SMOOTHING_FWHM_DEG, PI, SIDELOBE_THRESHOLD},
    healpix::{Healpix, HealpixError},
};

/// A perturbation of a beam map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BeamDistortion {
    /// Leave the beam alone.
    None,

    /// Add smoothed, multiplicative Gaussian noise with standard deviation
    /// `sigma`.
    AddNoise { sigma: f64 },

    /// Shift the beam towards zenith by `frac` of its half-power angle.
    Narrow { frac: f64 },

    /// Shift the beam away from zenith by `frac` of its half-power angle.
    Widen { frac: f64 },

    /// Multiply the sidelobes (values below [`SIDELOBE_THRESHOLD`]) by `frac`.
    ScaleLobes { frac: f64 },
}

/// The kinds of [`BeamDistortion`] that take a parameter.
#[derive(Debug, Display, EnumIter, EnumString, Clone, Copy, PartialEq, Eq)]
pub enum DistortionKind {
    #[strum(serialize = "narrow")]
    Narrow,

    #[strum(serialize = "widen")]
    Widen,

    #[strum(serialize = "noise")]
    Noise,

    #[strum(serialize = "scale-lobes")]
    ScaleLobes,
}

impl DistortionKind {
    /// Make a distortion of this kind with parameter `param`.
    pub fn with_param(self, param: f64) -> BeamDistortion {
        match self {
            DistortionKind::Narrow => BeamDistortion::Narrow { frac: param },
            DistortionKind::Widen => BeamDistortion::Widen { frac: param },
            DistortionKind::Noise => BeamDistortion::AddNoise { sigma: param },
            DistortionKind::ScaleLobes => BeamDistortion::ScaleLobes { frac: param },
        }
    }
}

impl FromStr for BeamDistortion {
    type Err = DistortionError;

    fn from_str(s: &str) -> Result<BeamDistortion, DistortionError> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("none") {
            return Ok(BeamDistortion::None);
        }

        let (kind, param) = s
            .split_once('=')
            .ok_or_else(|| DistortionError::Parse(s.to_string()))?;
        let kind = DistortionKind::from_str(&kind.trim().to_lowercase())
            .map_err(|_| DistortionError::Parse(s.to_string()))?;
        let param: f64 = param
            .trim()
            .parse()
            .map_err(|_| DistortionError::Parse(s.to_string()))?;
        let d = kind.with_param(param);
        d.validate()?;
        Ok(d)
    }
}

impl std::fmt::Display for BeamDistortion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BeamDistortion::None => write!(f, "none"),
            BeamDistortion::AddNoise { sigma } => write!(f, "noise={sigma}"),
            BeamDistortion::Narrow { frac } => write!(f, "narrow={frac}"),
            BeamDistortion::Widen { frac } => write!(f, "widen={frac}"),
            BeamDistortion::ScaleLobes { frac } => write!(f, "scale-lobes={frac}"),
        }
    }
}

impl BeamDistortion {
    /// Check that the distortion's parameter is usable.
    pub fn validate(&self) -> Result<(), DistortionError> {
        let (name, value) = match *self {
            BeamDistortion::None => return Ok(()),
            BeamDistortion::AddNoise { sigma } => {
                if sigma < 0.0 {
                    return Err(DistortionError::NegativeSigma(sigma));
                }
                ("sigma", sigma)
            }
            BeamDistortion::Narrow { frac }
            | BeamDistortion::Widen { frac }
            | BeamDistortion::ScaleLobes { frac } => ("fraction", frac),
        };
        if !value.is_finite() {
            return Err(DistortionError::NotFinite { name, value });
        }
        Ok(())
    }

    /// Does applying this distortion use random numbers?
    pub fn is_random(&self) -> bool {
        matches!(self, BeamDistortion::AddNoise { .. })
    }

    /// Apply this distortion to a single beam map, returning the distorted
    /// map. `rng` is only drawn from when adding noise.
    pub fn apply<R: Rng + ?Sized>(
        &self,
        beam: ArrayView1<f64>,
        healpix: Healpix,
        rng: &mut R,
    ) -> Result<Array1<f64>, DistortionError> {
        if beam.len() != healpix.npix() {
            return Err(HealpixError::MapSizeMismatch {
                got: beam.len(),
                expected: healpix.npix(),
            }
            .into());
        }
        self.validate()?;

        // Beam maps are usually a strided column out of a bigger array; get a
        // contiguous copy.
        let beam = beam.to_vec();
        let distorted = match *self {
            BeamDistortion::None => beam,
            BeamDistortion::AddNoise { sigma } => add_noise(&beam, healpix, sigma, rng)?,
            BeamDistortion::Narrow { frac } => narrow(&beam, healpix, frac),
            BeamDistortion::Widen { frac } => widen(&beam, healpix, frac),
            BeamDistortion::ScaleLobes { frac } => beam
                .into_iter()
                .map(|v| if v < SIDELOBE_THRESHOLD { v * frac } else { v })
                .collect(),
        };
        Ok(Array1::from(distorted))
    }
}

fn add_noise<R: Rng + ?Sized>(
    beam: &[f64],
    healpix: Healpix,
    sigma: f64,
    rng: &mut R,
) -> Result<Vec<f64>, DistortionError> {
    let normal = Normal::new(0.0, sigma).map_err(|_| DistortionError::NegativeSigma(sigma))?;
    let noise: Vec<f64> = beam.iter().map(|&b| b * normal.sample(rng)).collect();
    let noise = healpix.smooth_gaussian(&noise, NOISE_SMOOTHING_FWHM_DEG.to_radians())?;
    Ok(beam.iter().zip(noise).map(|(b, n)| b + n).collect())
}

/// The colatitude of the pixel closest to half of the beam's peak. If several
/// pixels are equally close, the first is used.
fn half_power_angle(beam: &[f64], healpix: Healpix) -> f64 {
    let half_max = peak(beam) / 2.0;
    let mut best = (0, f64::INFINITY);
    for (pix, &v) in beam.iter().enumerate() {
        let diff = (v - half_max).abs();
        if diff < best.1 {
            best = (pix, diff);
        }
    }
    healpix.pix2ang(best.0).0
}

/// The biggest value, ignoring NaNs.
fn peak(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn narrow(beam: &[f64], healpix: Healpix, frac: f64) -> Vec<f64> {
    let h_max = half_power_angle(beam, healpix);
    let shift = h_max * (1.0 + frac) - h_max;
    trace!("Narrowing beam: half-power angle {h_max} rad, shift {shift} rad");
    if shift == 0.0 {
        return beam.to_vec();
    }

    let mut resampled: Vec<f64> = (0..healpix.npix())
        .map(|pix| {
            let (theta, phi) = healpix.pix2ang(pix);
            healpix.interpolate(beam, (theta + shift).min(PI), phi + shift / 2.0)
        })
        .collect();

    let orig_max = peak(beam);
    let new_max = peak(&resampled);
    if new_max > 0.0 && new_max.is_finite() {
        let scale = orig_max / new_max;
        resampled.iter_mut().for_each(|v| *v *= scale);
    } else {
        warn!("Narrowed beam has no positive peak ({new_max}); not renormalising");
    }
    resampled
}

fn widen(beam: &[f64], healpix: Healpix, frac: f64) -> Vec<f64> {
    let h_max = half_power_angle(beam, healpix);
    let shift = h_max * (1.0 + frac) - h_max;
    trace!("Widening beam: half-power angle {h_max} rad, shift {shift} rad");

    (0..healpix.npix())
        .map(|pix| {
            let (theta, phi) = healpix.pix2ang(pix);
            healpix.interpolate(beam, (theta - shift).max(0.0), (phi - shift).max(0.0))
        })
        .collect()
}
