// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Simulate Tsky for one kind of beam distortion at several strengths.


use std::{borrow::Cow, path::PathBuf, str::FromStr};

use clap::Parser;
use itertools::Itertools;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use vec1::Vec1;

use super::common::{display_warnings, ArgsError, InfoPrinter, TskyArgs, Warn, ARG_FILE_HELP};
use crate::{
    constants::DEFAULT_SWEEP_FRACS,
    distortion::{DistortionError, DistortionKind},
    params::{sweep_output_filename, SweepParams},
    HeraTskyError,
};

const DEFAULT_KIND: DistortionKind = DistortionKind::Narrow;

lazy_static::lazy_static! {
    static ref KIND_HELP: String =
        format!("The kind of beam distortion to sweep over. Supported: {}. Default: {DEFAULT_KIND}", DistortionKind::iter().join(", "));

    static ref FRACS_HELP: String =
        format!("The strengths of the distortion; a fraction of the half-power angle for narrow and widen, a multiplier for scale-lobes and a standard deviation for noise. Default: {}", DEFAULT_SWEEP_FRACS.iter().join(" "));
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct SweepCliArgs {
    #[clap(short, long, help = KIND_HELP.as_str(), help_heading = "BEAM DISTORTION")]
    pub(super) kind: Option<String>,

    #[clap(long, multiple_values(true), help = FRACS_HELP.as_str(), help_heading = "BEAM DISTORTION")]
    pub(super) fracs: Option<Vec<f64>>,

    /// The directory to write each run's .npz file into. Files are named like
    /// "HERA_Tsky_<kind>_<percent>_percent.npz". Default: the current
    /// directory
    #[clap(short, long, help_heading = "OUTPUT FILES")]
    pub(super) output_dir: Option<PathBuf>,
}

impl SweepCliArgs {
    fn merge(self, other: Self) -> Self {
        Self {
            kind: self.kind.or(other.kind),
            fracs: self.fracs.or(other.fracs),
            output_dir: self.output_dir.or(other.output_dir),
        }
    }
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct SweepArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    #[clap(flatten)]
    #[serde(rename = "tsky")]
    #[serde(default)]
    pub(super) tsky_args: TskyArgs,

    #[clap(flatten)]
    #[serde(rename = "sweep")]
    #[serde(default)]
    pub(super) sweep_args: SweepCliArgs,
}

impl SweepArgs {
    /// Consolidate the command-line arguments with those in the argument file
    /// (if any), preferring the command-line arguments.
    pub(super) fn merge(self) -> Result<SweepArgs, HeraTskyError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            let SweepArgs {
                args_file: _,
                tsky_args,
                sweep_args,
            } = unpack_arg_file!(arg_file);

            Ok(SweepArgs {
                args_file: None,
                tsky_args: cli_args.tsky_args.merge(tsky_args),
                sweep_args: cli_args.sweep_args.merge(sweep_args),
            })
        } else {
            Ok(cli_args)
        }
    }

    fn parse(self) -> Result<SweepParams, HeraTskyError> {
        let SweepArgs {
            args_file: _,
            tsky_args,
            sweep_args:
                SweepCliArgs {
                    kind,
                    fracs,
                    output_dir,
                },
        } = self;

        let kind = match kind {
            Some(k) => DistortionKind::from_str(&k.trim().to_lowercase())
                .map_err(|_| DistortionError::UnknownKind(k))?,
            None => DEFAULT_KIND,
        };
        let params = match fracs {
            Some(f) => Vec1::try_from_vec(f).map_err(|_| ArgsError::NoFracs)?,
            None => Vec1::try_from_vec(DEFAULT_SWEEP_FRACS.to_vec())
                .map_err(|_| ArgsError::NoFracs)?,
        };
        for &param in &params {
            kind.with_param(param).validate()?;
        }
        // Runs with the same truncated percentage would overwrite each other.
        let filenames = params
            .iter()
            .map(|&p| sweep_output_filename(kind, p))
            .collect::<Vec<_>>();
        for dup in filenames.iter().duplicates() {
            format!("More than one run would be written to {dup}; only the last will be kept")
                .warn();
        }
        let output_dir = output_dir.unwrap_or_else(|| PathBuf::from("."));

        let tsky_params = tsky_args.parse()?;

        let mut printer = InfoPrinter::new(format!("Sweeping beam distortion '{kind}'").into());
        printer.push_line(format!("Strengths: {}", params.iter().join(", ")).into());
        let mut block: Vec<Cow<'static, str>> =
            vec![format!("Output directory: {}", output_dir.display()).into()];
        block.extend(filenames.into_iter().map(Cow::from));
        printer.push_block(block);
        printer.display();
        display_warnings();

        Ok(SweepParams {
            tsky_params,
            kind,
            params,
            output_dir,
        })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), HeraTskyError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let params = self.parse()?;

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        let files = params.run()?;
        info!(
            "Wrote {} files to {}",
            files.len(),
            params.output_dir().display()
        );
        Ok(())
    }
}
