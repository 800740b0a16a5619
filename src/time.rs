use crate::error::Error;

use hifitime::{Epoch, TimeScale, Unit};

use std::fmt;
use std::str::FromStr;

/// Nanoseconds in one calendar day.
pub(crate) const NANOS_PER_DAY: i64 = 86_400_000_000_000;

/// One GPST calendar day, the partitioning and caching key of the
/// orbit store. Formats as year + zero padded day of year ("2020042").
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GpsDay {
    year: i32,
    doy: u16,
}

impl GpsDay {
    /// Builds [GpsDay] from year and 1-based day of year.
    pub fn new(year: i32, doy: u16) -> Result<Self, Error> {
        if doy == 0 || doy > 366 {
            return Err(Error::InvalidDay(format!("{:04}{:03}", year, doy)));
        }
        Ok(Self { year, doy })
    }

    /// Day containing this gregorian (GPST) date.
    pub fn from_ymd(year: i32, month: u8, day: u8) -> Self {
        let midnight = Epoch::from_gregorian_at_midnight(year, month, day, TimeScale::GPST);
        let jan_1st = Epoch::from_gregorian_at_midnight(year, 1, 1, TimeScale::GPST);
        let doy = (midnight - jan_1st).to_unit(Unit::Day).round() as u16 + 1;
        Self { year, doy }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// 1-based day of year.
    pub fn doy(&self) -> u16 {
        self.doy
    }

    /// 00:00:00 GPST of this day.
    pub fn start_epoch(&self) -> Epoch {
        Epoch::from_gregorian_at_midnight(self.year, 1, 1, TimeScale::GPST)
            + ((self.doy - 1) as f64) * Unit::Day
    }

    /// GPS week number and day of week (0 is Sunday), as used by
    /// product archive paths.
    pub fn gps_week(&self) -> (u32, u8) {
        let (week, nanos) = self.start_epoch().to_time_of_week();
        (week, (nanos / NANOS_PER_DAY as u64) as u8)
    }

    /// Whole days from `base` to this day (negative when earlier).
    pub fn days_since(&self, base: GpsDay) -> i64 {
        (self.start_epoch() - base.start_epoch())
            .to_unit(Unit::Day)
            .round() as i64
    }
}

impl fmt::Display for GpsDay {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04}{:03}", self.year, self.doy)
    }
}

impl FromStr for GpsDay {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < 5 || !s.is_ascii() {
            return Err(Error::InvalidDay(s.to_string()));
        }
        let year = i32::from_str(&s[..4]).or(Err(Error::InvalidDay(s.to_string())))?;
        let doy = u16::from_str(&s[4..]).or(Err(Error::InvalidDay(s.to_string())))?;
        Self::new(year, doy)
    }
}

fn year_start(year: i32) -> Epoch {
    Epoch::from_gregorian_at_midnight(year, 1, 1, TimeScale::GPST)
}

/// Splits a GPST instant into its calendar day and nanoseconds of day.
pub fn day_and_offset(t: Epoch) -> (GpsDay, i64) {
    let t = t.to_time_scale(TimeScale::GPST);

    let mut year =
        1980 + ((t - year_start(1980)).to_unit(Unit::Day) / 365.25).floor() as i32;
    // settle the estimate on year boundaries
    while t < year_start(year) {
        year -= 1;
    }
    while t >= year_start(year + 1) {
        year += 1;
    }

    let elapsed = (t - year_start(year)).total_nanoseconds() as i64;
    let day = GpsDay {
        year,
        doy: (elapsed / NANOS_PER_DAY) as u16 + 1,
    };
    (day, elapsed % NANOS_PER_DAY)
}
