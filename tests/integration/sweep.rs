// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests of the "sweep" command-line interface.

use approx::assert_abs_diff_eq;
use tempfile::TempDir;

use crate::{get_cmd_output, hera_tsky, make_inputs, read_output, Files, GRID_ARGS, SKY_TEMP};

#[test]
fn test_default_sweep_names() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Files { beam, sky } = make_inputs(tmp_dir.path());
    let output_dir = tmp_dir.path().join("sweep");

    #[rustfmt::skip]
    let cmd = hera_tsky()
        .args([
            "sweep",
            "--beam-file", &beam,
            "--sky-file", &sky,
            "--output-dir", &output_dir.display().to_string(),
            "--no-progress-bars",
        ])
        .args(GRID_ARGS)
        .ok();
    assert!(cmd.is_ok(), "{}", get_cmd_output(cmd).1);

    for percent in [10, 15, 20, 25] {
        let file = output_dir.join(format!("HERA_Tsky_narrow_{percent}_percent.npz"));
        assert!(file.exists(), "{} is missing", file.display());
        let (tsky, _, _) = read_output(&file);
        assert_eq!(tsky.dim(), (2, 4, 6));
        for &t in tsky.iter() {
            assert_abs_diff_eq!(t, SKY_TEMP, epsilon = 1e-9);
        }
    }
}

#[test]
fn test_noise_sweep_is_reproducible() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Files { beam, sky } = make_inputs(tmp_dir.path());

    let run = |dir: &std::path::Path| {
        #[rustfmt::skip]
        let cmd = hera_tsky()
            .args([
                "sweep",
                "--beam-file", &beam,
                "--sky-file", &sky,
                "--kind", "noise",
                "--fracs", "0.05",
                "--seed", "7",
                "--output-dir", &dir.display().to_string(),
            ])
            .args(GRID_ARGS)
            .ok();
        assert!(cmd.is_ok(), "{}", get_cmd_output(cmd).1);
        read_output(&dir.join("HERA_Tsky_noise_5_percent.npz"))
    };
    let first = run(&tmp_dir.path().join("a"));
    let second = run(&tmp_dir.path().join("b"));
    assert_eq!(first, second);
}
