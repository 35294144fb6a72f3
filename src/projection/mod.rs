// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Projection of HEALPix maps onto a flat orthographic (SIN) grid centred on
//! zenith.
//!
//! Grid cell centres span `[-1, 1]` in both projection-plane coordinates; rows
//! follow `y` and columns follow `x`, both increasing. Cells outside the unit
//! circle can't see the sky and are NaN.


use log::trace;
use mapproj::{zenithal::sin::Sin, CenteredProjection, LonLat, ProjXY, Projection};
use ndarray::{prelude::*, Zip};

use crate::{constants::FRAC_PI_2, healpix::Healpix};

/// Maps the cells of an orthographic grid to HEALPix pixels. Making this is
/// the expensive part of a projection, so it should be reused for all maps
/// with the same pixelisation, grid and rotation.
#[derive(Debug, Clone)]
pub struct OrthographicProjector {
    /// The HEALPix pixel containing each grid cell centre, if the cell is on
    /// the sky.
    pixels: Array2<Option<usize>>,
}

impl OrthographicProjector {
    /// Set up a `rows` x `cols` grid. `rotation` \[radians\] is added to the
    /// azimuth of every cell before its pixel is found, i.e. the map
    /// is rotated by `-rotation` about zenith.
    pub fn new(
        healpix: Healpix,
        rows: usize,
        cols: usize,
        rotation: f64,
    ) -> OrthographicProjector {
        let mut proj = CenteredProjection::new(Sin::default());
        proj.set_proj_center_from_lonlat(&LonLat::new(0.0, FRAC_PI_2));

        let mut pixels = Array2::from_elem((rows, cols), None);
        Zip::indexed(&mut pixels).par_for_each(|(row, col), pixel| {
            let xy = ProjXY::new(cell_centre(col, cols), cell_centre(row, rows));
            *pixel = proj.unproj_lonlat(&xy).map(|lonlat| {
                let theta = FRAC_PI_2 - lonlat.lat();
                healpix.ang2pix(theta, lonlat.lon() + rotation)
            });
        });
        trace!(
            "Orthographic grid {rows}x{cols}: {} cells on the sky",
            pixels.iter().filter(|p| p.is_some()).count()
        );

        OrthographicProjector { pixels }
    }

    pub fn dim(&self) -> (usize, usize) {
        self.pixels.dim()
    }

    /// Project a HEALPix map onto the grid. Off-sky cells, and cells whose
    /// pixel value is infinite, are NaN.
    pub fn project(&self, map: ArrayView1<f64>) -> Array2<f64> {
        let mut grid = Array2::from_elem(self.pixels.dim(), f64::NAN);
        Zip::from(&mut grid)
            .and(&self.pixels)
            .par_for_each(|cell, pixel| {
                if let Some(v) = pixel.map(|p| map[p]).filter(|v| !v.is_infinite()) {
                    *cell = v;
                }
            });
        grid
    }
}

/// The coordinate of the centre of cell `i` of `n` along an axis spanning
/// `[-1, 1]`.
fn cell_centre(i: usize, n: usize) -> f64 {
    -1.0 + (2 * i + 1) as f64 / n as f64
}
