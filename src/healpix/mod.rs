// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! HEALPix pixelisation in the RING ordering scheme.
//!
//! Beam maps are stored as HEALPix maps; only the handful of operations needed
//! to distort and project a beam are here: pixel <-> angle conversion,
//! bilinear interpolation between pixel centres and Gaussian smoothing.
//! Finding the pixel containing a direction is done by `cdshealpix`; the ring
//! tables here drive pixel centres and interpolation.
//!
//! Angles follow the HEALPix convention: `theta` is the colatitude (0 at the
//! north pole, which is zenith for a beam map) and `phi` the longitude, both
//! in radians.

mod error;

pub use error::HealpixError;

use rayon::prelude::*;

use crate::constants::{FRAC_PI_2, PI, TAU};

/// Get the number of pixels in a map with this `nside`.
pub fn nside2npix(nside: usize) -> usize {
    12 * nside * nside
}

/// Get the `nside` of a map with `npix` pixels. Fails if `npix` isn't a valid
/// HEALPix map size.
pub fn npix2nside(npix: usize) -> Result<usize, HealpixError> {
    let nside = isqrt(npix / 12);
    if nside == 0 || nside2npix(nside) != npix {
        return Err(HealpixError::InvalidNpix(npix));
    }
    Ok(nside)
}

fn isqrt(v: usize) -> usize {
    let mut r = (v as f64).sqrt() as usize;
    // Correct any float error.
    while r * r > v {
        r -= 1;
    }
    while (r + 1) * (r + 1) <= v {
        r += 1;
    }
    r
}

/// Information on a single iso-latitude ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RingInfo {
    /// The index of the first pixel in the ring.
    pub(crate) start_pix: usize,

    /// The number of pixels in the ring.
    pub(crate) num_pix: usize,

    /// The colatitude of the ring \[radians\].
    pub(crate) theta: f64,

    /// Are the pixel centres shifted by half a pixel from `phi = 0`?
    pub(crate) shifted: bool,
}

impl RingInfo {
    /// The longitude of the `j`th pixel in this ring \[radians\].
    pub(crate) fn phi(&self, j: usize) -> f64 {
        let offset = if self.shifted { 0.5 } else { 0.0 };
        (j as f64 + offset) * TAU / self.num_pix as f64
    }
}

/// A HEALPix RING-ordered pixelisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Healpix {
    nside: usize,
}

impl Healpix {
    pub fn new(nside: usize) -> Healpix {
        Healpix { nside }
    }

    /// Get the pixelisation appropriate for a map with `npix` pixels.
    pub fn from_npix(npix: usize) -> Result<Healpix, HealpixError> {
        npix2nside(npix).map(Healpix::new)
    }

    pub fn nside(&self) -> usize {
        self.nside
    }

    pub fn npix(&self) -> usize {
        nside2npix(self.nside)
    }

    /// The number of iso-latitude rings.
    pub(crate) fn num_rings(&self) -> usize {
        4 * self.nside - 1
    }

    /// Number of pixels in the north polar cap.
    fn ncap(&self) -> usize {
        2 * self.nside * (self.nside - 1)
    }

    /// Get information on the (1-indexed) ring `ring`.
    pub(crate) fn ring_info(&self, ring: usize) -> RingInfo {
        let nside = self.nside;
        let npix = self.npix();
        let north_ring = if ring > 2 * nside {
            4 * nside - ring
        } else {
            ring
        };

        let (mut theta, num_pix, shifted, mut start_pix) = if north_ring < nside {
            let tmp = (north_ring * north_ring) as f64 * 4.0 / npix as f64;
            let cos_theta = 1.0 - tmp;
            let sin_theta = (tmp * (2.0 - tmp)).sqrt();
            (
                sin_theta.atan2(cos_theta),
                4 * north_ring,
                true,
                2 * north_ring * (north_ring - 1),
            )
        } else {
            let z = (2 * nside) as f64 - north_ring as f64;
            let z = z * 8.0 * nside as f64 / npix as f64;
            (
                z.acos(),
                4 * nside,
                (north_ring - nside) % 2 == 0,
                self.ncap() + (north_ring - nside) * 4 * nside,
            )
        };

        if north_ring != ring {
            theta = PI - theta;
            start_pix = npix - start_pix - num_pix;
        }

        RingInfo {
            start_pix,
            num_pix,
            theta,
            shifted,
        }
    }

    /// Get the (1-indexed) ring that the pixel `pix` belongs to.
    pub(crate) fn pix2ring(&self, pix: usize) -> usize {
        let nside = self.nside;
        let npix = self.npix();
        let ncap = self.ncap();
        if pix < ncap {
            (1 + isqrt(1 + 2 * pix)) / 2
        } else if pix < npix - ncap {
            (pix - ncap) / (4 * nside) + nside
        } else {
            4 * nside - (1 + isqrt(2 * (npix - pix) - 1)) / 2
        }
    }

    /// Get the (theta, phi) of the centre of pixel `pix` \[radians\].
    pub fn pix2ang(&self, pix: usize) -> (f64, f64) {
        let ring = self.ring_info(self.pix2ring(pix));
        (ring.theta, ring.phi(pix - ring.start_pix))
    }

    /// Get the pixel containing the direction (theta, phi) \[radians\].
    /// `phi` may be any real number; `theta` is clamped to `[0, pi]`.
    pub fn ang2pix(&self, theta: f64, phi: f64) -> usize {
        let lat = FRAC_PI_2 - theta.clamp(0.0, PI);
        cdshealpix::ring::hash(self.nside as u32, phi, lat) as usize
    }

    /// Get the ring immediately north of (or on) `z = cos(theta)`. 0 means
    /// there is no ring to the north.
    fn ring_above(&self, z: f64) -> usize {
        let nside = self.nside as f64;
        let az = z.abs();
        if az <= 2.0 / 3.0 {
            return (nside * (2.0 - 1.5 * z)) as usize;
        }
        let iring = (nside * (3.0 * (1.0 - az)).sqrt()) as usize;
        if z > 0.0 {
            iring
        } else {
            4 * self.nside - iring - 1
        }
    }

    /// Get the two pixels in `ring` straddling `phi`, and the weight of each.
    fn ring_neighbours(&self, ring: usize, phi: f64) -> ([usize; 2], [f64; 2], f64) {
        let info = self.ring_info(ring);
        let num_pix = info.num_pix as i64;
        let dphi = TAU / info.num_pix as f64;
        let shift = if info.shifted { 0.5 } else { 0.0 };
        let tmp = phi / dphi - shift;
        let mut i1 = tmp.floor() as i64;
        let w1 = (phi - (i1 as f64 + shift) * dphi) / dphi;
        let mut i2 = i1 + 1;
        if i1 < 0 {
            i1 += num_pix;
        }
        if i2 >= num_pix {
            i2 -= num_pix;
        }
        (
            [info.start_pix + i1 as usize, info.start_pix + i2 as usize],
            [1.0 - w1, w1],
            info.theta,
        )
    }

    /// Get the 4 pixels and weights needed for bilinear interpolation at
    /// (theta, phi). `theta` is clamped to `[0, pi]` and `phi` wrapped to
    /// `[0, 2pi)`.
    pub fn get_interpol(&self, theta: f64, phi: f64) -> ([usize; 4], [f64; 4]) {
        let theta = theta.clamp(0.0, PI);
        let phi = phi.rem_euclid(TAU);
        let npix = self.npix();
        let num_rings = self.num_rings();

        let ir1 = self.ring_above(theta.cos());
        let ir2 = ir1 + 1;
        let mut pix = [0; 4];
        let mut wgt = [0.0; 4];
        let mut theta1 = 0.0;
        let mut theta2 = 0.0;

        if ir1 > 0 {
            let (p, w, t) = self.ring_neighbours(ir1, phi);
            pix[0] = p[0];
            pix[1] = p[1];
            wgt[0] = w[0];
            wgt[1] = w[1];
            theta1 = t;
        }
        if ir2 <= num_rings {
            let (p, w, t) = self.ring_neighbours(ir2, phi);
            pix[2] = p[0];
            pix[3] = p[1];
            wgt[2] = w[0];
            wgt[3] = w[1];
            theta2 = t;
        }

        if ir1 == 0 {
            // Between the north pole and the first ring.
            let wtheta = theta / theta2;
            wgt[2] *= wtheta;
            wgt[3] *= wtheta;
            let fac = (1.0 - wtheta) * 0.25;
            wgt[0] = fac;
            wgt[1] = fac;
            wgt[2] += fac;
            wgt[3] += fac;
            pix[0] = (pix[2] + 2) & 3;
            pix[1] = (pix[3] + 2) & 3;
        } else if ir2 > num_rings {
            // Between the last ring and the south pole.
            let wtheta = (theta - theta1) / (PI - theta1);
            wgt[0] *= 1.0 - wtheta;
            wgt[1] *= 1.0 - wtheta;
            let fac = wtheta * 0.25;
            wgt[0] += fac;
            wgt[1] += fac;
            wgt[2] = fac;
            wgt[3] = fac;
            pix[2] = ((pix[0] + 2) & 3) + npix - 4;
            pix[3] = ((pix[1] + 2) & 3) + npix - 4;
        } else {
            let wtheta = (theta - theta1) / (theta2 - theta1);
            wgt[0] *= 1.0 - wtheta;
            wgt[1] *= 1.0 - wtheta;
            wgt[2] *= wtheta;
            wgt[3] *= wtheta;
        }

        (pix, wgt)
    }

    /// Bilinearly interpolate `map` at (theta, phi).
    pub fn interpolate(&self, map: &[f64], theta: f64, phi: f64) -> f64 {
        let (pix, wgt) = self.get_interpol(theta, phi);
        pix.iter().zip(wgt).map(|(&p, w)| map[p] * w).sum()
    }

    /// Get all of the pixels whose centres are within `radius` radians of
    /// (theta, phi), along with their angular distances.
    pub(crate) fn query_disc(&self, theta: f64, phi: f64, radius: f64) -> Vec<(usize, f64)> {
        let num_rings = self.num_rings();
        let (sin_theta0, cos_theta0) = theta.sin_cos();
        let cos_radius = radius.cos();

        let first_ring = self.ring_above((theta - radius).max(0.0).cos()).max(1);
        let last_ring = (self.ring_above((theta + radius).min(PI).cos()) + 1).min(num_rings);

        let mut pixels = vec![];
        for ring in first_ring..=last_ring {
            let info = self.ring_info(ring);
            let (sin_theta, cos_theta) = info.theta.sin_cos();
            let denom = sin_theta0 * sin_theta;
            let ratio = if denom.abs() < f64::EPSILON {
                // One of the two is a pole; either the whole ring is in the
                // disc, or none of it.
                if cos_theta0 * cos_theta >= cos_radius {
                    -1.0
                } else {
                    2.0
                }
            } else {
                (cos_radius - cos_theta0 * cos_theta) / denom
            };
            if ratio > 1.0 {
                continue;
            }

            let candidates: Box<dyn Iterator<Item = usize>> = if ratio <= -1.0 {
                Box::new(0..info.num_pix)
            } else {
                let dphi = ratio.acos();
                let pix_width = TAU / info.num_pix as f64;
                let offset = if info.shifted { 0.5 } else { 0.0 };
                let lo = ((phi - dphi) / pix_width - offset).floor() as i64;
                let hi = ((phi + dphi) / pix_width - offset).ceil() as i64;
                if (hi - lo + 1) as usize >= info.num_pix {
                    Box::new(0..info.num_pix)
                } else {
                    let n = info.num_pix as i64;
                    Box::new((lo..=hi).map(move |j| j.rem_euclid(n) as usize))
                }
            };

            for j in candidates {
                let sin_dphi_half = ((info.phi(j) - phi) / 2.0).sin();
                // Haversine distance; well-behaved for small separations.
                let sin_dtheta_half = ((info.theta - theta) / 2.0).sin();
                let h = sin_dtheta_half * sin_dtheta_half
                    + sin_theta0 * sin_theta * sin_dphi_half * sin_dphi_half;
                let dist = 2.0 * h.sqrt().min(1.0).asin();
                if dist <= radius {
                    pixels.push((info.start_pix + j, dist));
                }
            }
        }
        pixels
    }

    /// Smooth `map` with a circular Gaussian kernel of full-width half-maximum
    /// `fwhm` \[radians\]. The kernel is truncated at 3 sigma and normalised
    /// over the pixels it covers, so a constant map is unchanged.
    pub fn smooth_gaussian(&self, map: &[f64], fwhm: f64) -> Result<Vec<f64>, HealpixError> {
        if map.len() != self.npix() {
            return Err(HealpixError::MapSizeMismatch {
                got: map.len(),
                expected: self.npix(),
            });
        }
        if fwhm <= 0.0 {
            return Ok(map.to_vec());
        }

        let sigma = fwhm / (8.0 * 2.0_f64.ln()).sqrt();
        let radius = (3.0 * sigma).min(PI);
        let inv_two_sigma_sq = 1.0 / (2.0 * sigma * sigma);

        let smoothed = (0..self.npix())
            .into_par_iter()
            .map(|pix| {
                let (theta, phi) = self.pix2ang(pix);
                let (sum, weight) = self.query_disc(theta, phi, radius).into_iter().fold(
                    (0.0, 0.0),
                    |(sum, weight), (p, dist)| {
                        let w = (-dist * dist * inv_two_sigma_sq).exp();
                        (sum + w * map[p], weight + w)
                    },
                );
                sum / weight
            })
            .collect();
        Ok(smoothed)
    }
}
