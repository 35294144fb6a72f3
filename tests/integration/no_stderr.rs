// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests that successful commands don't write to stderr.

use tempfile::TempDir;

use crate::{get_cmd_output, hera_tsky, make_inputs, Files, GRID_ARGS};

#[test]
fn test_help_has_no_stderr() {
    for sub in ["simulate", "sweep", "gaussian-beam"] {
        let cmd = hera_tsky().args([sub, "--help"]).ok();
        assert!(cmd.is_ok(), "{}", get_cmd_output(cmd).1);
        let (stdout, stderr) = get_cmd_output(cmd);
        assert!(stdout.contains("USAGE"), "{stdout}");
        assert!(stderr.is_empty(), "stderr not empty: {stderr}");
    }
}

#[test]
fn test_simulate_has_no_stderr() {
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
            "--no-progress-bars",
        ])
        .args(GRID_ARGS)
        .ok();
    assert!(cmd.is_ok(), "{}", get_cmd_output(cmd).1);
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr not empty: {stderr}");
}

#[test]
fn test_gaussian_beam_has_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("beam.fits");

    #[rustfmt::skip]
    let cmd = hera_tsky()
        .args([
            "gaussian-beam",
            "--nside", "2",
            "--output", &output.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "{}", get_cmd_output(cmd).1);
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr not empty: {stderr}");
}
