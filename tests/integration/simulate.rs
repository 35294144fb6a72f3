// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests of the "simulate" command-line interface.

use approx::assert_abs_diff_eq;
use tempfile::TempDir;

use crate::{get_cmd_output, hera_tsky, make_inputs, read_output, Files, GRID_ARGS, SKY_TEMP};

#[test]
fn test_simulate_dry_run() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Files { beam, sky } = make_inputs(tmp_dir.path());
    let output = tmp_dir.path().join("tsky.npz");

    #[rustfmt::skip]
    let cmd = hera_tsky()
        .args([
            "simulate",
            "--beam-file", &beam,
            "--sky-file", &sky,
            "--output", &output.display().to_string(),
            "--dry-run",
        ])
        .args(GRID_ARGS)
        .ok();
    assert!(cmd.is_ok(), "{}", get_cmd_output(cmd).1);
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Dry run"), "{stdout}");
    assert!(!output.exists());
}

#[test]
fn test_simulate_uniform_sky() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Files { beam, sky } = make_inputs(tmp_dir.path());
    let output = tmp_dir.path().join("tsky.npz");

    #[rustfmt::skip]
    let cmd = hera_tsky()
        .args([
            "simulate",
            "--beam-file", &beam,
            "--sky-file", &sky,
            "--output", &output.display().to_string(),
            "--pols", "x",
            "--distortion", "narrow=0.15",
            "--no-progress-bars",
        ])
        .args(GRID_ARGS)
        .ok();
    assert!(cmd.is_ok(), "{}", get_cmd_output(cmd).1);

    let (tsky, freqs, lsts) = read_output(&output);
    assert_eq!(tsky.dim(), (1, 4, 6));
    assert_abs_diff_eq!(
        freqs.as_slice().unwrap(),
        [142.5, 147.5, 152.5, 157.5].as_slice()
    );
    assert_eq!(lsts.len(), 6);
    assert!(lsts.iter().all(|&l| (0.0..24.0).contains(&l)));
    assert!(lsts.windows(2).into_iter().all(|w| w[0] <= w[1]));
    for &t in tsky.iter() {
        assert_abs_diff_eq!(t, SKY_TEMP, epsilon = 1e-9);
    }
}

#[test]
fn test_simulate_bad_distortion() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Files { beam, sky } = make_inputs(tmp_dir.path());

    #[rustfmt::skip]
    let cmd = hera_tsky()
        .args([
            "simulate",
            "--beam-file", &beam,
            "--sky-file", &sky,
            "--distortion", "narrow=lots",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.starts_with("Error: "), "{stderr}");
    assert!(stderr.contains("narrow=lots"), "{stderr}");
}

#[test]
fn test_simulate_missing_beam() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Files { sky, .. } = make_inputs(tmp_dir.path());
    let missing = tmp_dir.path().join("missing.fits");

    #[rustfmt::skip]
    let cmd = hera_tsky()
        .args([
            "simulate",
            "--beam-file", &missing.display().to_string(),
            "--sky-file", &sky,
        ])
        .args(GRID_ARGS)
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.starts_with("Error: "), "{stderr}");
}

#[test]
fn test_simulate_freqs_outside_beam() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Files { beam, sky } = make_inputs(tmp_dir.path());

    // The beam stops at 180 MHz.
    #[rustfmt::skip]
    let cmd = hera_tsky()
        .args([
            "simulate",
            "--beam-file", &beam,
            "--sky-file", &sky,
            "--freq-start", "170",
            "--freq-end", "190",
            "--freq-res", "5",
            "--time-res", "4",
            "--dry-run",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("MHz"), "{stderr}");
}
