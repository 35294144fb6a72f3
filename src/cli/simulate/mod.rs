// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Simulate Tsky once, with a single (optional) beam distortion.


use std::{path::PathBuf, str::FromStr};

use clap::Parser;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use super::common::{display_warnings, InfoPrinter, TskyArgs, Warn, ARG_FILE_HELP};
use crate::{distortion::BeamDistortion, params::TskyParams, HeraTskyError};

const DEFAULT_OUTPUT_FILENAME: &str = "HERA_Tsky.npz";

lazy_static::lazy_static! {
    static ref OUTPUT_HELP: String =
        format!("Path to the output .npz file. Default: {DEFAULT_OUTPUT_FILENAME}");
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct SimulateCliArgs {
    /// The distortion applied to the beam before it is projected, e.g.
    /// "narrow=0.1", "widen=0.1", "noise=0.05" or "scale-lobes=0.5". Default:
    /// none
    #[clap(long, help_heading = "BEAM DISTORTION")]
    pub(super) distortion: Option<String>,

    #[clap(short, long, help = OUTPUT_HELP.as_str(), help_heading = "OUTPUT FILES")]
    pub(super) output: Option<PathBuf>,
}

impl SimulateCliArgs {
    fn merge(self, other: Self) -> Self {
        Self {
            distortion: self.distortion.or(other.distortion),
            output: self.output.or(other.output),
        }
    }
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct SimulateArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    #[clap(flatten)]
    #[serde(rename = "tsky")]
    #[serde(default)]
    pub(super) tsky_args: TskyArgs,

    #[clap(flatten)]
    #[serde(rename = "simulate")]
    #[serde(default)]
    pub(super) simulate_args: SimulateCliArgs,
}

/// Everything needed to do a single simulation.
struct SimulateParams {
    tsky_params: TskyParams,
    distortion: BeamDistortion,
    output: PathBuf,
}

impl SimulateArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified into
    /// a single struct. Where applicable, it will prefer CLI parameters over
    /// those in the file.
    ///
    /// This function should only ever merge arguments, and not try to make
    /// sense of them.
    pub(super) fn merge(self) -> Result<SimulateArgs, HeraTskyError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            // Read in the file arguments. Ensure all of the file args are
            // accounted for by pattern matching.
            let SimulateArgs {
                args_file: _,
                tsky_args,
                simulate_args,
            } = unpack_arg_file!(arg_file);

            // Merge all the arguments, preferring the CLI args when available.
            Ok(SimulateArgs {
                args_file: None,
                tsky_args: cli_args.tsky_args.merge(tsky_args),
                simulate_args: cli_args.simulate_args.merge(simulate_args),
            })
        } else {
            Ok(cli_args)
        }
    }

    fn parse(self) -> Result<SimulateParams, HeraTskyError> {
        let SimulateArgs {
            args_file: _,
            tsky_args,
            simulate_args: SimulateCliArgs { distortion, output },
        } = self;

        // Check the cheap things before reading the inputs.
        let distortion = match distortion {
            Some(d) => BeamDistortion::from_str(&d)?,
            None => BeamDistortion::None,
        };
        let output = output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILENAME));
        if output.extension().and_then(|e| e.to_str()) != Some("npz") {
            format!(
                "Output file {} doesn't end in .npz, but it will be an npz file",
                output.display()
            )
            .warn();
        }

        let tsky_params = tsky_args.parse()?;

        let mut printer = InfoPrinter::new("Simulation".into());
        printer.push_line(format!("Beam distortion: {distortion}").into());
        if distortion.is_random() && tsky_params.seed().is_none() {
            "Noise is added to the beam without a seed; this run can't be reproduced".warn();
        }
        printer.push_line(format!("Output: {}", output.display()).into());
        printer.display();
        display_warnings();

        Ok(SimulateParams {
            tsky_params,
            distortion,
            output,
        })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), HeraTskyError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let SimulateParams {
            tsky_params,
            distortion,
            output,
        } = self.parse()?;

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        let result = tsky_params.run(distortion)?;
        result.write_npz(&output)?;
        info!("Wrote {}", output.display());
        Ok(())
    }
}
