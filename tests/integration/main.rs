// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod arg_files;
mod gaussian_beam;
mod no_stderr;
mod simulate;
mod sweep;

use std::{
    fs::File,
    path::Path,
    process::Output,
    str::from_utf8,
};

use assert_cmd::{output::OutputError, Command};
use ndarray::prelude::*;
use ndarray_npy::{NpzReader, NpzWriter};

use hera_tsky::BeamMap;

/// The temperature of the uniform sky written by [`make_inputs`] \[K\].
const SKY_TEMP: f64 = 250.0;

fn hera_tsky() -> Command {
    Command::cargo_bin("hera_tsky").unwrap()
}

fn get_cmd_output(result: Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o,
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

struct Files {
    beam: String,
    sky: String,
}

/// Write a Gaussian beam covering 120 to 180 MHz and a uniform sky model with
/// 4 frequencies and 6 times of day into `dir`.
fn make_inputs(dir: &Path) -> Files {
    let beam = dir.join("beam.fits");
    BeamMap::gaussian(8, 12.0, vec![120.0, 135.0, 150.0, 165.0, 180.0])
        .unwrap()
        .write_fits(&beam)
        .unwrap();

    let sky = dir.join("sky.npz");
    let mut npz = NpzWriter::new(File::create(&sky).unwrap());
    npz.add_array("sky", &Array4::from_elem((4, 6, 16, 16), SKY_TEMP))
        .unwrap();
    npz.finish().unwrap();

    Files {
        beam: beam.display().to_string(),
        sky: sky.display().to_string(),
    }
}

/// Grid arguments matching the inputs from [`make_inputs`].
const GRID_ARGS: [&str; 8] = [
    "--freq-start",
    "140",
    "--freq-end",
    "160",
    "--freq-res",
    "5",
    "--time-res",
    "4",
];

/// Read the Tsky, frequencies and LSTs from an output file.
fn read_output(file: &Path) -> (Array3<f64>, Array1<f64>, Array1<f64>) {
    let mut npz = NpzReader::new(File::open(file).unwrap()).unwrap();
    let names = npz.names().unwrap();
    // Arrays are stored with a ".npy" suffix.
    let stored_name = |name: &str| {
        names
            .iter()
            .find(|n| n.as_str() == name || n.as_str() == format!("{name}.npy"))
            .unwrap_or_else(|| panic!("{name} not in {names:?}"))
            .clone()
    };
    let tsky: Array3<f64> = npz.by_name(&stored_name("HERA_Tsky")).unwrap();
    let freqs: Array1<f64> = npz.by_name(&stored_name("freqs")).unwrap();
    let lsts: Array1<f64> = npz.by_name(&stored_name("lsts")).unwrap();
    (tsky, freqs, lsts)
}
