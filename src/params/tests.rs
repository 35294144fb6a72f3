// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::str::FromStr;

use approx::assert_abs_diff_eq;
use hifitime::{Duration, Unit};
use marlu::LatLngHeight;
use ndarray::prelude::*;
use tempfile::TempDir;
use vec1::{vec1, Vec1};

use super::*;
use crate::{
    beam::{BeamMap, Pol},
    constants::{HERA_HEIGHT_M, HERA_LAT_DEG, HERA_LONG_DEG},
    distortion::{BeamDistortion, DistortionKind},
    io::npz::read_npz_array,
    projection::OrthographicProjector,
    sky::{SkyError, SkyModel},
    time::{CivilDate, TimeError},
};

const GRID: usize = 20;

fn hera() -> LatLngHeight {
    LatLngHeight {
        longitude_rad: HERA_LONG_DEG.to_radians(),
        latitude_rad: HERA_LAT_DEG.to_radians(),
        height_metres: HERA_HEIGHT_M,
    }
}

fn gaussian_beam() -> BeamMap {
    BeamMap::gaussian(8, 15.0, vec![90.0, 110.0, 130.0, 150.0, 170.0, 190.0, 210.0]).unwrap()
}

fn params_with(
    sky: SkyModel,
    freqs: Vec1<f64>,
    hours: Vec1<f64>,
) -> Result<TskyParams, TskyError> {
    TskyParams::new(
        &gaussian_beam(),
        sky,
        freqs,
        hours,
        CivilDate::from_str("2013-01-01").unwrap(),
        vec1![Pol::X, Pol::Y],
        hera(),
        Duration::from_f64(0.0, Unit::Second),
        Some(1),
    )
}

#[test]
fn test_freq_grid() {
    let freqs = freq_grid(100.0, 200.0, 1.5625).unwrap();
    assert_eq!(freqs.len(), 64);
    assert_abs_diff_eq!(freqs[0], 100.78125);
    assert_abs_diff_eq!(freqs[1], 102.34375);
    assert_abs_diff_eq!(*freqs.last(), 199.21875);

    assert!(matches!(
        freq_grid(200.0, 100.0, 1.5625),
        Err(TskyError::BadFreqGrid { .. })
    ));
    assert!(freq_grid(100.0, 200.0, 0.0).is_err());
    assert!(freq_grid(100.0, 200.0, f64::NAN).is_err());
}

#[test]
fn test_hour_grid() {
    let hours = hour_grid(0.5).unwrap();
    assert_eq!(hours.len(), 48);
    assert_abs_diff_eq!(hours[0], 0.0);
    assert_abs_diff_eq!(*hours.last(), 23.5);

    let hours = hour_grid(7.0).unwrap();
    assert_eq!(hours.as_slice(), &[0.0, 7.0, 14.0, 21.0]);

    assert!(matches!(hour_grid(-1.0), Err(TskyError::BadTimeRes(_))));
}

#[test]
fn test_beam_weighted_mean() {
    let sky = array![[1.0, 2.0], [3.0, f64::NAN]];

    // A uniform beam gives the plain mean over valid cells.
    let beam = Array2::ones((2, 2));
    assert_abs_diff_eq!(beam_weighted_mean(beam.view(), sky.view()), 2.0);

    let beam = array![[f64::NAN, 1.0], [3.0, 100.0]];
    assert_abs_diff_eq!(
        beam_weighted_mean(beam.view(), sky.view()),
        (2.0 + 9.0) / 4.0
    );

    let beam = Array2::from_elem((2, 2), f64::NAN);
    assert!(beam_weighted_mean(beam.view(), sky.view()).is_nan());

    let beam = array![[1.0, -1.0], [0.0, 0.0]];
    assert!(beam_weighted_mean(beam.view(), sky.view()).is_nan());
}

#[test]
fn test_sorted_by_lst() {
    let tsky = Array3::from_shape_fn((2, 3, 4), |(p, f, t)| (p * 100 + f * 10 + t) as f64);
    let result = TskyResult {
        tsky: tsky.clone(),
        freqs_mhz: vec![100.0, 110.0, 120.0],
        lsts: vec![23.0, 0.5, 12.0, 0.5],
        pols: vec![Pol::X, Pol::Y],
    }
    .sorted_by_lst();

    assert_eq!(result.lsts, vec![0.5, 0.5, 12.0, 23.0]);
    // Each value keeps the LST it was computed for; ties keep their order.
    let order = [1, 3, 2, 0];
    for p in 0..2 {
        for f in 0..3 {
            for (t, &orig_t) in order.iter().enumerate() {
                assert_eq!(result.tsky[(p, f, t)], tsky[(p, f, orig_t)]);
            }
        }
    }
}

#[test]
fn test_uniform_sky_gives_sky_temperature() {
    let t0 = 250.0;
    let sky = SkyModel::new(Array4::from_elem((2, 3, GRID, GRID), t0));
    let params = params_with(sky, vec1![100.78125, 150.0], vec1![0.0, 0.5, 1.0]).unwrap();
    let result = params.run(BeamDistortion::None).unwrap();

    assert_eq!(result.tsky.dim(), (2, 2, 3));
    assert_eq!(result.freqs_mhz, vec![100.78125, 150.0]);
    for &v in &result.tsky {
        assert_abs_diff_eq!(v, t0, epsilon = 1e-9);
    }
    assert!(result.lsts.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_uniform_beam_gives_mean_sky() {
    let healpix = gaussian_beam().healpix();
    let native_freqs = vec![90.0, 110.0, 130.0, 150.0, 170.0];
    let beam = BeamMap::new(
        Array2::ones((healpix.npix(), native_freqs.len())),
        native_freqs,
    )
    .unwrap();
    let sky = Array4::from_shape_fn((1, 1, GRID, GRID), |(_, _, r, c)| (r * GRID + c) as f64);
    let params = TskyParams::new(
        &beam,
        SkyModel::new(sky.clone()),
        vec1![120.0],
        vec1![3.0],
        CivilDate::from_str("2013-01-01").unwrap(),
        vec1![Pol::X],
        hera(),
        Duration::from_f64(0.0, Unit::Second),
        None,
    )
    .unwrap();
    let result = params.run(BeamDistortion::None).unwrap();

    // Only cells that see the sky count.
    let mask = OrthographicProjector::new(healpix, GRID, GRID, 0.0)
        .project(Array1::ones(healpix.npix()).view());
    let (sum, count) = mask
        .iter()
        .zip(sky.iter())
        .filter(|(m, _)| m.is_finite())
        .fold((0.0, 0.0), |(sum, count), (_, s)| (sum + s, count + 1.0));
    assert_abs_diff_eq!(result.tsky[(0, 0, 0)], sum / count, epsilon = 1e-9);
}

#[test]
fn test_results_are_sorted_by_lst() {
    // These times straddle LST = 0h at HERA on this date.
    let hours = vec1![15.0, 16.0, 17.0];
    let sky = SkyModel::new(Array4::from_shape_fn((1, 3, GRID, GRID), |(_, t, _, _)| {
        100.0 + t as f64
    }));
    let params = params_with(sky, vec1![150.0], hours).unwrap();
    assert!(params.lsts()[0] > params.lsts()[1]);

    let result = params.run(BeamDistortion::None).unwrap();
    assert!(result.lsts.windows(2).all(|w| w[0] <= w[1]));
    assert_abs_diff_eq!(result.lsts[0], params.lsts()[1]);
    for p in 0..2 {
        assert_abs_diff_eq!(result.tsky[(p, 0, 0)], 101.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.tsky[(p, 0, 1)], 102.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.tsky[(p, 0, 2)], 100.0, epsilon = 1e-9);
    }
}

#[test]
fn test_runs_are_repeatable() {
    let sky = SkyModel::new(Array4::from_shape_fn((2, 2, GRID, GRID), |(f, t, r, c)| {
        (f + t) as f64 * 10.0 + (r * c) as f64
    }));
    let params = params_with(sky, vec1![120.0, 140.0], vec1![0.0, 12.0]).unwrap();

    for distortion in [
        BeamDistortion::None,
        BeamDistortion::Narrow { frac: 0.1 },
        BeamDistortion::Widen { frac: 0.1 },
        BeamDistortion::ScaleLobes { frac: 2.0 },
        BeamDistortion::AddNoise { sigma: 0.05 },
    ] {
        let a = params.run(distortion).unwrap();
        let b = params.run(distortion).unwrap();
        assert_eq!(a.tsky, b.tsky, "{distortion}");
    }

    let none = params.run(BeamDistortion::None).unwrap();
    let narrow = params.run(BeamDistortion::Narrow { frac: 0.2 }).unwrap();
    assert_ne!(none.tsky, narrow.tsky);
}

#[test]
fn test_write_npz() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("tsky.npz");
    let result = TskyResult {
        tsky: Array3::from_shape_fn((2, 2, 3), |(p, f, t)| (p + f + t) as f64),
        freqs_mhz: vec![100.0, 110.0],
        lsts: vec![1.0, 2.0, 3.0],
        pols: vec![Pol::X, Pol::Y],
    };
    result.write_npz(&file).unwrap();

    let tsky: Array3<f64> = read_npz_array(&file, "HERA_Tsky").unwrap();
    let freqs: Array1<f64> = read_npz_array(&file, "freqs").unwrap();
    let lsts: Array1<f64> = read_npz_array(&file, "lsts").unwrap();
    assert_eq!(tsky, result.tsky);
    assert_eq!(freqs.to_vec(), result.freqs_mhz);
    assert_eq!(lsts.to_vec(), result.lsts);
}

#[test]
fn test_validation() {
    let sky = || SkyModel::new(Array4::zeros((2, 3, GRID, GRID)));

    let result = params_with(sky(), vec1![100.0, 120.0, 140.0], vec1![0.0, 1.0, 2.0]);
    assert!(matches!(
        result,
        Err(TskyError::Sky(SkyError::TooSmall { .. }))
    ));

    let result = params_with(sky(), vec1![100.0, 120.0], vec1![0.0, 1.0, 24.0]);
    assert!(matches!(
        result,
        Err(TskyError::Time(TimeError::HourOutOfRange(_)))
    ));

    let result = params_with(sky(), vec1![100.0, 250.0], vec1![0.0, 1.0, 2.0]);
    assert!(matches!(result, Err(TskyError::Beam(_))));

    let params = params_with(sky(), vec1![100.0, 120.0], vec1![0.0, 1.0, 2.0]).unwrap();
    assert!(matches!(
        params.run(BeamDistortion::Narrow { frac: f64::NAN }),
        Err(TskyError::Distortion(_))
    ));
}

#[test]
fn test_sweep_output_filename() {
    assert_eq!(
        sweep_output_filename(DistortionKind::Narrow, 0.1),
        "HERA_Tsky_narrow_10_percent.npz"
    );
    assert_eq!(
        sweep_output_filename(DistortionKind::Narrow, 0.15),
        "HERA_Tsky_narrow_15_percent.npz"
    );
    assert_eq!(
        sweep_output_filename(DistortionKind::ScaleLobes, 0.25),
        "HERA_Tsky_scale-lobes_25_percent.npz"
    );
}

#[test]
fn test_sweep_writes_every_run() {
    let dir = TempDir::new().unwrap();
    let sky = SkyModel::new(Array4::from_elem((1, 2, GRID, GRID), 300.0));
    let sweep = SweepParams {
        tsky_params: params_with(sky, vec1![150.0], vec1![0.0, 6.0]).unwrap(),
        kind: DistortionKind::Narrow,
        params: vec1![0.1, 0.2],
        output_dir: dir.path().join("sweep"),
    };
    let written = sweep.run().unwrap();
    assert_eq!(written.len(), 2);
    for (file, name) in written.iter().zip([
        "HERA_Tsky_narrow_10_percent.npz",
        "HERA_Tsky_narrow_20_percent.npz",
    ]) {
        assert_eq!(file, &sweep.output_dir().join(name));
        let tsky: Array3<f64> = read_npz_array(file, "HERA_Tsky").unwrap();
        assert_eq!(tsky.dim(), (2, 1, 2));
        for &v in &tsky {
            assert_abs_diff_eq!(v, 300.0, epsilon = 1e-9);
        }
    }
}
