use crate::error::{RecurError, Result};
use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

use std::fmt;
use std::str::FromStr;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DATETIME_SEPARATORS: &[char] = &['-', '/', ':', ' '];
const DATETIME_WIDTH: usize = 14;
const DATE_WIDTH: usize = 8;

/// Seconds since the unix epoch, interpreted in the local time zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EpochSeconds(i64);

impl EpochSeconds {
    pub fn secs(self) -> i64 {
        self.0
    }

    fn naive_in<Tz: TimeZone>(self, tz: &Tz) -> Result<NaiveDateTime> {
        tz.timestamp_opt(self.0, 0)
            .single()
            .map(|dt| dt.naive_local())
            .ok_or_else(|| RecurError::DateRange(format!("{} seconds since epoch", self.0)))
    }

    /// Ambiguous wall-clock times take the earlier instant, times skipped by a
    /// DST jump move forward by an hour.
    fn from_naive_in<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Result<Self> {
        tz.from_local_datetime(&naive)
            .earliest()
            .or_else(|| {
                naive
                    .checked_add_signed(Duration::hours(1))
                    .and_then(|shifted| tz.from_local_datetime(&shifted).earliest())
            })
            .map(|dt| EpochSeconds(dt.timestamp()))
            .ok_or_else(|| RecurError::DateRange(naive.to_string()))
    }
}

/// Parses a date or date/time string into local epoch seconds.
///
/// Separators (`-`, `/`, `:`, space) are dropped and what remains must read as
/// `YYYYMMDD[HHMMSS]`, so month and day take two digits each. Missing time
/// components are zero.
pub fn parse_date(text: &str) -> Result<EpochSeconds> {
    parse_date_in(&Local, text)
}

fn parse_date_in<Tz: TimeZone>(tz: &Tz, text: &str) -> Result<EpochSeconds> {
    EpochSeconds::from_naive_in(tz, parse_naive(text)?)
}

fn parse_naive(text: &str) -> Result<NaiveDateTime> {
    let bad = || RecurError::parse(format!("bad date/time string: \"{}\"", text));

    let digits: String = text
        .chars()
        .filter(|c| !DATETIME_SEPARATORS.contains(c))
        .collect();
    if digits.len() < DATE_WIDTH
        || digits.len() > DATETIME_WIDTH
        || !digits.chars().all(|c| c.is_ascii_digit())
    {
        return Err(bad());
    }

    let padded = format!("{:0<width$}", digits, width = DATETIME_WIDTH);
    NaiveDateTime::parse_from_str(&padded, "%Y%m%d%H%M%S").map_err(|_| bad())
}

/// Renders `YYYY-MM-DD` in local time.
pub fn format_date(at: EpochSeconds) -> Result<String> {
    format_date_in(&Local, at)
}

fn format_date_in<Tz: TimeZone>(tz: &Tz, at: EpochSeconds) -> Result<String> {
    Ok(at.naive_in(tz)?.format(DATE_FORMAT).to_string())
}

/// Start of the current local day.
pub fn today() -> Result<EpochSeconds> {
    parse_date(&format_date(EpochSeconds(Local::now().timestamp()))?)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeriodUnit {
    Year,
    Month,
    Week,
    Day,
}

impl PeriodUnit {
    pub fn as_char(self) -> char {
        match self {
            PeriodUnit::Year => 'y',
            PeriodUnit::Month => 'm',
            PeriodUnit::Week => 'w',
            PeriodUnit::Day => 'd',
        }
    }
}

impl TryFrom<char> for PeriodUnit {
    type Error = RecurError;

    fn try_from(unit: char) -> Result<Self> {
        match unit {
            'y' => Ok(PeriodUnit::Year),
            'm' => Ok(PeriodUnit::Month),
            'w' => Ok(PeriodUnit::Week),
            'd' => Ok(PeriodUnit::Day),
            // Dates are stored without a time of day, an hourly step would not
            // survive rewriting the config.
            'h' => Err(RecurError::parse("hour periods are not supported")),
            _ => Err(RecurError::parse(format!("bad period unit: \"{}\"", unit))),
        }
    }
}

/// Recurrence interval, written as `<count><unit>`, e.g. `3m` or `2y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Period {
    pub count: u32,
    pub unit: PeriodUnit,
}

impl FromStr for Period {
    type Err = RecurError;

    fn from_str(text: &str) -> Result<Self> {
        let bad = || RecurError::parse(format!("bad period string: \"{}\"", text));
        let split = text
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(bad)?;
        let (count, unit) = text.split_at(split);
        if count.is_empty() {
            return Err(bad());
        }

        let mut unit = unit.chars();
        let unit = match (unit.next(), unit.next()) {
            (Some(c), None) => PeriodUnit::try_from(c)?,
            _ => return Err(bad()),
        };

        Ok(Period {
            count: count.parse().map_err(|_| bad())?,
            unit,
        })
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.count, self.unit.as_char())
    }
}

/// Advances `at` by `period`.
///
/// Month and year steps work on the local calendar date and land on local
/// midnight. Days at or past the 29th are clamped to the 28th before a month
/// step, Feb 29 becomes Feb 28 before a year step. Day and week steps move the
/// local wall clock, so a DST change never shifts the date. A zero count
/// returns the date unchanged.
pub fn add_period(at: EpochSeconds, period: Period) -> Result<EpochSeconds> {
    add_period_in(&Local, at, period)
}

fn add_period_in<Tz: TimeZone>(tz: &Tz, at: EpochSeconds, period: Period) -> Result<EpochSeconds> {
    let count = i64::from(period.count);
    match period.unit {
        PeriodUnit::Year => add_years(tz, at, count),
        PeriodUnit::Month => add_months(tz, at, count),
        PeriodUnit::Week => shift_wall_clock(tz, at, Duration::weeks(count)),
        PeriodUnit::Day => shift_wall_clock(tz, at, Duration::days(count)),
    }
}

fn shift_wall_clock<Tz: TimeZone>(tz: &Tz, at: EpochSeconds, delta: Duration) -> Result<EpochSeconds> {
    let local = at.naive_in(tz)?;
    let shifted = local
        .checked_add_signed(delta)
        .ok_or_else(|| RecurError::DateRange(format!("{} + {}", local, delta)))?;
    EpochSeconds::from_naive_in(tz, shifted)
}

fn midnight_in<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Result<EpochSeconds> {
    EpochSeconds::from_naive_in(tz, date.and_time(NaiveTime::MIN))
}

fn add_years<Tz: TimeZone>(tz: &Tz, at: EpochSeconds, count: i64) -> Result<EpochSeconds> {
    let mut date = at.naive_in(tz)?.date();
    if count == 0 {
        return midnight_in(tz, date);
    }

    if date.month() == 2 && date.day() == 29 {
        date = date.with_day(28).unwrap_or(date);
    }
    let out_of_range = || RecurError::DateRange(format!("{} + {}y", date, count));
    let year = i32::try_from(i64::from(date.year()) + count).map_err(|_| out_of_range())?;
    midnight_in(tz, date.with_year(year).ok_or_else(out_of_range)?)
}

fn add_months<Tz: TimeZone>(tz: &Tz, at: EpochSeconds, count: i64) -> Result<EpochSeconds> {
    let mut date = at.naive_in(tz)?.date();
    if count == 0 {
        return midnight_in(tz, date);
    }

    if date.day() >= 29 {
        date = date.with_day(28).unwrap_or(date);
    }
    let out_of_range = || RecurError::DateRange(format!("{} + {}m", date, count));
    let months = i64::from(date.month0()) + count;
    let year = i32::try_from(i64::from(date.year()) + months / 12).map_err(|_| out_of_range())?;
    let month = (months % 12) as u32 + 1;
    midnight_in(tz, NaiveDate::from_ymd_opt(year, month, date.day()).ok_or_else(out_of_range)?)
}
