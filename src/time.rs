// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Helper functions around time.

use std::str::FromStr;

use erfa::{constants::ERFA_DJM0, time::gst06a};
use hifitime::{Duration, Epoch};
use thiserror::Error;

use crate::constants::TAU;

#[derive(Error, Debug, PartialEq)]
pub enum TimeError {
    #[error("Couldn't parse '{0}' as a date; expected YYYY-MM-DD")]
    BadDate(String),

    #[error("Time of day {0} hours is not within [0, 24)")]
    HourOutOfRange(f64),
}

/// A (UTC) calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilDate {
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

impl FromStr for CivilDate {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<CivilDate, TimeError> {
        let bad = || TimeError::BadDate(s.to_string());
        let mut parts = s.trim().splitn(3, '-');
        let year = parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)?;
        let month = parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)?;
        let day = parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)?;
        // Let hifitime reject things like the 31st of February.
        Epoch::maybe_from_gregorian_utc(year, month, day, 0, 0, 0, 0).map_err(|_| bad())?;
        Ok(CivilDate { year, month, day })
    }
}

impl std::fmt::Display for CivilDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Get the UTC epoch `hour` hours into `date`. The hour, minute and second
/// are each truncated to whole numbers.
pub fn civil_epoch(date: CivilDate, hour: f64) -> Result<Epoch, TimeError> {
    if !(0.0..24.0).contains(&hour) {
        return Err(TimeError::HourOutOfRange(hour));
    }
    let h = hour.floor();
    let minutes = 60.0 * hour;
    let m = (60.0 * (hour - h)).floor();
    let s = (60.0 * (minutes - minutes.floor())).floor();
    Epoch::maybe_from_gregorian_utc(
        date.year,
        date.month,
        date.day,
        h as u8,
        m as u8,
        s as u8,
        0,
    )
    .map_err(|_| TimeError::HourOutOfRange(hour))
}

/// Get the local apparent sidereal time \[hours, in `[0, 24)`\] at (UTC)
/// `epoch` for a site at `longitude_rad`. `dut1` is UT1 - UTC.
pub fn lst_hours(epoch: Epoch, longitude_rad: f64, dut1: Duration) -> f64 {
    // Two-part Julian dates, split as MJD zero point + MJD.
    let ut1_mjd = (epoch + dut1).to_mjd_utc_days();
    let tt_mjd = epoch.to_mjd_tt_days();
    let gast = gst06a(ERFA_DJM0, ut1_mjd, ERFA_DJM0, tt_mjd);
    let lst_rad = (gast + longitude_rad).rem_euclid(TAU);
    let hours = lst_rad / TAU * 24.0;
    // rem_euclid can round up to exactly TAU.
    if hours >= 24.0 {
        0.0
    } else {
        hours
    }
}
