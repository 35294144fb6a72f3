// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests of the "gaussian-beam" command-line interface.

use tempfile::TempDir;

use hera_tsky::BeamMap;

use crate::{get_cmd_output, hera_tsky};

#[test]
fn test_gaussian_beam_is_readable() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("beam.fits");

    #[rustfmt::skip]
    let cmd = hera_tsky()
        .args([
            "gaussian-beam",
            "--nside", "4",
            "--sigma", "20",
            "--freqs", "100", "150", "200", "250",
            "--output", &output.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "{}", get_cmd_output(cmd).1);

    let beam = BeamMap::read_fits(&output).unwrap();
    assert_eq!(beam.healpix().npix(), 192);
    assert_eq!(beam.freqs_mhz(), &[100.0, 150.0, 200.0, 250.0]);
    // The pixels nearest zenith have the biggest response and the southern
    // hemisphere has none.
    let values = beam.values();
    assert!(values[(0, 0)] > 0.5);
    assert!(values.iter().all(|&v| (0.0..=1.0).contains(&v)));
    assert!(values[(191, 0)].abs() < f64::EPSILON);
}
