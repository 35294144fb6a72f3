// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision.
 */

pub use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// HERA latitude \[degrees\].
pub const HERA_LAT_DEG: f64 = -30.7224;

/// HERA longitude \[degrees\].
pub const HERA_LONG_DEG: f64 = 21.4278;

/// HERA height above sea level \[metres\].
pub const HERA_HEIGHT_M: f64 = 1100.0;

/// The lower edge of the simulated band \[MHz\].
pub const DEFAULT_FREQ_START_MHZ: f64 = 100.0;

/// The upper edge of the simulated band \[MHz\].
pub const DEFAULT_FREQ_END_MHZ: f64 = 200.0;

/// 100 MHz over 64 averaged channels \[MHz\].
pub const DEFAULT_FREQ_RES_MHZ: f64 = 1.5625;

/// The spacing of the simulated times of day \[hours\].
pub const DEFAULT_TIME_RES_HOURS: f64 = 0.5;

/// The (UTC) date that simulated times of day belong to.
pub const DEFAULT_DATE: &str = "2013-01-01";

/// Beam values below this are considered to be sidelobes.
pub const SIDELOBE_THRESHOLD: f64 = 0.006;

/// The FWHM of the kernel used to smooth beam noise \[degrees\]. This is a 1
/// degree sigma multiplied by a sigma-to-FWHM factor of 2.4.
pub const NOISE_SMOOTHING_FWHM_DEG: f64 = 1.0 * 2.4;

/// The default beam-narrowing fractions used in a sweep.
pub const DEFAULT_SWEEP_FRACS: [f64; 4] = [0.1, 0.15, 0.2, 0.25];

/// The name of the beam HDU in a beam file. The polarisation is appended.
pub const BEAM_HDU_PREFIX: &str = "BEAM_";

/// The name of the frequencies HDU in a beam file. The polarisation is
/// appended.
pub const FREQS_HDU_PREFIX: &str = "FREQS_";

/// The name of the sky-temperature array inside a sky `.npz` file.
pub const SKY_ARRAY_NAME: &str = "sky";

/// Names of arrays written to output `.npz` files.
pub const TSKY_ARRAY_NAME: &str = "HERA_Tsky";
pub const FREQS_ARRAY_NAME: &str = "freqs";
pub const LSTS_ARRAY_NAME: &str = "lsts";
