// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Simulated sky-noise temperature (Tsky) against local sidereal time for the
Hydrogen Epoch of Reionization Array (HERA), with tools to study how errors in
the beam change the result.
 */

pub mod beam;
mod cli;
pub mod constants;
pub mod distortion;
pub mod healpix;
pub(crate) mod io;
pub mod math;
pub mod params;
pub mod projection;
pub mod sky;
pub mod time;

use crossbeam_utils::atomic::AtomicCell;

/// Should progress bars be drawn? Set by the command-line interface; library
/// users draw nothing unless this is set.
pub(crate) static PROGRESS_BARS: AtomicCell<bool> = AtomicCell::new(false);

// Re-exports.
pub use beam::{BeamMap, Pol};
pub use cli::{HeraTsky, HeraTskyError};
pub use distortion::{BeamDistortion, DistortionKind};
pub use io::{FitsError, NpzError};
pub use params::{SweepParams, TskyParams, TskyResult};
pub use sky::SkyModel;
