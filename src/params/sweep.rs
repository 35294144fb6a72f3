// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Run Tsky simulations for one kind of beam distortion at several strengths.

use std::path::{Path, PathBuf};

use log::info;
use vec1::Vec1;

use super::{TskyError, TskyParams};
use crate::distortion::DistortionKind;

/// Parameters for a sweep over beam-distortion strengths. The beam and sky
/// are shared by every run.
pub struct SweepParams {
    pub tsky_params: TskyParams,

    pub kind: DistortionKind,

    /// The distortion parameter of each run (a fraction for most kinds, a
    /// standard deviation for noise).
    pub params: Vec1<f64>,

    /// Where each run's `.npz` file is written.
    pub output_dir: PathBuf,
}

impl SweepParams {
    /// Run every simulation in the sweep, writing each result as soon as it's
    /// ready. Returns the files written.
    pub fn run(&self) -> Result<Vec<PathBuf>, TskyError> {
        // Check all the distortions before doing any work.
        for &param in &self.params {
            self.kind.with_param(param).validate()?;
        }
        std::fs::create_dir_all(&self.output_dir)?;

        let mut written = Vec::with_capacity(self.params.len());
        for &param in &self.params {
            let result = self.tsky_params.run(self.kind.with_param(param))?;
            let file = self.output_dir.join(sweep_output_filename(self.kind, param));
            result.write_npz(&file)?;
            info!("Wrote {}", file.display());
            written.push(file);
        }
        Ok(written)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

/// The name of the file holding the result of the sweep run with parameter
/// `param`, e.g. `HERA_Tsky_narrow_15_percent.npz`. The percentage is
/// truncated towards zero.
pub fn sweep_output_filename(kind: DistortionKind, param: f64) -> String {
    format!("HERA_Tsky_{kind}_{}_percent.npz", (param * 100.0).trunc() as i64)
}
