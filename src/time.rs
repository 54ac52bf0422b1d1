//! # Time handling
//!
//! Dates throughout the crate are [`hifitime::Epoch`] values on the UTC scale. This module
//! provides the string conversions used by the catalog files and the CLI, the sidereal time
//! needed to locate the zenith, and the [`Nite`] calendar label that identifies an observing
//! night.
//!
//! ## Date strings
//!
//! [`parse_date`] accepts the two layouts found in survey files:
//!
//! ```text
//! 2016/2/11 05:20:28        (slash separated, optional fractional seconds)
//! 2016-02-11T05:20:28.250   (ISO 8601, optional trailing "Z" or " UTC")
//! 2016-02-11                (midnight)
//! ```
//!
//! [`format_date`] always writes `YYYY/MM/DD HH:MM:SS.sss`.
//!
//! ## Nites
//!
//! A *nite* is the calendar date (UTC) of the local mean noon preceding the observations.
//! All exposures taken during one night share the same nite even though they straddle UTC
//! midnight at most sites.
use std::fmt;
use std::str::FromStr;

use hifitime::{Duration, Epoch};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, i32 as parse_i32, one_of, u8 as parse_u8},
    combinator::{all_consuming, opt},
    number::complete::double,
    sequence::preceded,
    IResult, Parser,
};

use crate::constants::{
    Degree, Hour, Minute, Second, DPI, HOUR_TO_DEG, SECONDS_PER_HOUR, SECONDS_PER_MINUTE, T2000,
};
use crate::scheduler_errors::SchedulerError;

/// Calendar and clock components of a date string.
type DateParts = (i32, u8, u8, Option<(u8, u8, Option<f64>)>);

fn date_parts(input: &str) -> IResult<&str, DateParts> {
    let (input, year) = parse_i32(input)?;
    let (input, _) = one_of("-/").parse(input)?;
    let (input, month) = parse_u8(input)?;
    let (input, _) = one_of("-/").parse(input)?;
    let (input, day) = parse_u8(input)?;

    let (input, clock) = opt(preceded(
        one_of(" T"),
        (
            parse_u8,
            preceded(char(':'), parse_u8),
            opt(preceded(char(':'), double)),
        ),
    ))
    .parse(input)?;

    let (input, _) = opt(alt((tag(" UTC"), tag("Z")))).parse(input)?;
    Ok((input, (year, month, day, clock)))
}

/// Parse a UTC date string into an [`Epoch`].
///
/// Arguments
/// ---------
/// * `date`: a date in one of the layouts listed in the module documentation
///
/// Return
/// ------
/// * the corresponding [`Epoch`] (UTC), or [`SchedulerError::InvalidDate`]
pub fn parse_date(date: &str) -> Result<Epoch, SchedulerError> {
    let invalid = || SchedulerError::InvalidDate(date.to_string());

    let (_, (year, month, day, clock)) = all_consuming(date_parts)
        .parse(date.trim())
        .map_err(|_| invalid())?;

    let (hour, minute, seconds) = match clock {
        Some((h, m, s)) => (h, m, s.unwrap_or(0.0)),
        None => (0, 0, 0.0),
    };
    if !(0.0..60.0).contains(&seconds) {
        return Err(invalid());
    }

    let whole = seconds.trunc();
    let nanos = ((seconds - whole) * 1e9).round().min(999_999_999.0) as u32;

    Epoch::maybe_from_gregorian_utc(year, month, day, hour, minute, whole as u8, nanos)
        .map_err(|_| invalid())
}

/// Render an [`Epoch`] as `YYYY/MM/DD HH:MM:SS.sss` (UTC).
pub fn format_date(epoch: &Epoch) -> String {
    let (y, m, d, hh, mm, ss, ns) = epoch.to_gregorian_utc();
    format!(
        "{y:04}/{m:02}/{d:02} {hh:02}:{mm:02}:{ss:02}.{:03}",
        ns / 1_000_000
    )
}

/// A [`Duration`] of `s` seconds.
pub fn seconds(s: Second) -> Duration {
    Duration::from_seconds(s)
}

/// A [`Duration`] of `m` minutes.
pub fn minutes(m: Minute) -> Duration {
    Duration::from_seconds(m * SECONDS_PER_MINUTE)
}

/// A [`Duration`] of `h` hours.
pub fn hours(h: Hour) -> Duration {
    Duration::from_seconds(h * SECONDS_PER_HOUR)
}

/// Compute the Greenwich Mean Sidereal Time (GMST) in radians
/// for a given Modified Julian Date (UT1 time scale).
///
/// The mean sidereal time at 0h UT1 comes from the IAU 1982 cubic polynomial; the fraction
/// of the day is then added, scaled by the ratio of the sidereal to the solar day.
///
/// Arguments
/// ---------
/// * `tjm`: Modified Julian Date (UT1; UTC is used as a stand-in by the scheduler)
///
/// Return
/// ------
/// * GMST angle in radians, normalized to `[0, 2π)`
pub fn gmst(tjm: f64) -> f64 {
    const C0: f64 = 24110.54841;
    const C1: f64 = 8640184.812866;
    const C2: f64 = 9.3104e-2;
    const C3: f64 = -6.2e-6;
    const RAP: f64 = 1.00273790934;

    let t = (tjm.floor() - T2000) / 36525.0;
    let gmst0 = (((C3 * t + C2) * t + C1) * t + C0) * DPI / 86400.0;

    (gmst0 + tjm.fract() * DPI * RAP).rem_euclid(DPI)
}

/// Local mean sidereal time in degrees, for a site at `longitude` (degrees, east positive).
///
/// This is the right ascension currently crossing the local meridian, i.e. the right
/// ascension of the zenith.
pub fn local_sidereal_time(epoch: &Epoch, longitude: Degree) -> Degree {
    (gmst(epoch.to_mjd_utc_days()).to_degrees() + longitude).rem_euclid(360.0)
}

/// Calendar label of an observing night.
///
/// A nite is the UTC calendar date of the local mean noon preceding the observations: with
/// the site at longitude `λ`, an instant `t` belongs to the nite whose date is that of
/// `t + λ/15 h - 12 h`. Ordering is chronological; [`fmt::Display`] renders `YYYYMMDD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Nite {
    year: i32,
    month: u8,
    day: u8,
}

impl Nite {
    /// Build a nite from its calendar components, rejecting impossible dates.
    pub fn new(year: i32, month: u8, day: u8) -> Result<Self, SchedulerError> {
        Epoch::maybe_from_gregorian_utc(year, month, day, 12, 0, 0, 0)
            .map_err(|_| SchedulerError::InvalidNite(format!("{year:04}{month:02}{day:02}")))?;
        Ok(Nite { year, month, day })
    }

    /// The nite an instant belongs to, for a site at `longitude` (degrees, east positive).
    pub fn from_epoch(epoch: &Epoch, longitude: Degree) -> Self {
        let shifted = *epoch + hours(longitude / HOUR_TO_DEG - 12.0);
        let (year, month, day, ..) = shifted.to_gregorian_utc();
        Nite { year, month, day }
    }

    /// Local mean noon opening this nite, as a UTC instant.
    pub fn local_noon(&self, longitude: Degree) -> Epoch {
        Epoch::from_gregorian_utc_at_noon(self.year, self.month, self.day)
            - hours(longitude / HOUR_TO_DEG)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }
}

impl fmt::Display for Nite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for Nite {
    type Err = SchedulerError;

    /// Accepts `YYYYMMDD`, `YYYY/MM/DD` or `YYYY-MM-DD`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || SchedulerError::InvalidNite(s.to_string());

        if s.len() == 8 && s.chars().all(|c| c.is_ascii_digit()) {
            let year = s[0..4].parse().map_err(|_| invalid())?;
            let month = s[4..6].parse().map_err(|_| invalid())?;
            let day = s[6..8].parse().map_err(|_| invalid())?;
            return Nite::new(year, month, day);
        }

        let (_, (year, month, day, clock)) =
            all_consuming(date_parts).parse(s).map_err(|_| invalid())?;
        if clock.is_some() {
            return Err(invalid());
        }
        Nite::new(year, month, day).map_err(|_| invalid())
    }
}

#[cfg(test)]
mod time_test {
    use super::*;
    use crate::constants::{DPI, T2000};
    use approx::assert_relative_eq;

    const LON_CTIO: f64 = -70.806525;

    #[test]
    fn test_parse_date_layouts() {
        let a = parse_date("2016/2/11 05:20:28").unwrap();
        let b = parse_date("2016-02-11T05:20:28").unwrap();
        let c = parse_date("2016-02-11T05:20:28Z").unwrap();
        let d = parse_date("2016-02-11 05:20:28 UTC").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a, d);
        assert_eq!(a.to_gregorian_utc(), (2016, 2, 11, 5, 20, 28, 0));

        let midnight = parse_date("2016/02/11").unwrap();
        assert_eq!(midnight.to_gregorian_utc(), (2016, 2, 11, 0, 0, 0, 0));

        let no_seconds = parse_date("2016/02/11 03:00").unwrap();
        assert_eq!(no_seconds.to_gregorian_utc(), (2016, 2, 11, 3, 0, 0, 0));

        let frac = parse_date("2016/02/11 03:00:01.25").unwrap();
        assert_eq!(frac.to_gregorian_utc(), (2016, 2, 11, 3, 0, 1, 250_000_000));
    }

    #[test]
    fn test_parse_date_invalid() {
        assert_eq!(
            parse_date("2016/13/11 05:20:28"),
            Err(SchedulerError::InvalidDate("2016/13/11 05:20:28".into()))
        );
        assert!(parse_date("yesterday").is_err());
        assert!(parse_date("2016/02/11 05:20:61").is_err());
        assert!(parse_date("2016/02/11 05:20:28 trailing").is_err());
    }

    #[test]
    fn test_format_date() {
        let epoch = parse_date("2016/2/11 05:20:28.5").unwrap();
        assert_eq!(format_date(&epoch), "2016/02/11 05:20:28.500");
        assert_eq!(parse_date(&format_date(&epoch)).unwrap(), epoch);
    }

    #[test]
    fn test_gmst() {
        assert_relative_eq!(gmst(57028.478514610404), 4.851925725092499, epsilon = 1e-9);
        assert_relative_eq!(gmst(T2000), 4.894961212789145, epsilon = 1e-9);
        let g = gmst(60000.123);
        assert!((0.0..DPI).contains(&g));
    }

    #[test]
    fn test_local_sidereal_time_moves_with_longitude() {
        let epoch = parse_date("2016/02/11 05:00:00").unwrap();
        let greenwich = local_sidereal_time(&epoch, 0.0);
        let ctio = local_sidereal_time(&epoch, LON_CTIO);
        assert_relative_eq!(
            (greenwich + LON_CTIO).rem_euclid(360.0),
            ctio,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_nite_from_epoch() {
        // Early-morning UTC exposures belong to the previous nite at CTIO
        let late = parse_date("2016/02/11 05:20:28").unwrap();
        assert_eq!(Nite::from_epoch(&late, LON_CTIO), Nite::new(2016, 2, 10).unwrap());

        // Evening twilight, still before UTC midnight
        let early = parse_date("2016/02/10 23:50:00").unwrap();
        assert_eq!(Nite::from_epoch(&early, LON_CTIO), Nite::new(2016, 2, 10).unwrap());

        // After local noon the next nite begins
        let afternoon = parse_date("2016/02/11 18:00:00").unwrap();
        assert_eq!(
            Nite::from_epoch(&afternoon, LON_CTIO),
            Nite::new(2016, 2, 11).unwrap()
        );
    }

    #[test]
    fn test_nite_local_noon() {
        let nite = Nite::new(2016, 2, 10).unwrap();
        let noon = nite.local_noon(LON_CTIO);
        let (y, m, d, hh, mm, ..) = noon.to_gregorian_utc();
        assert_eq!((y, m, d, hh, mm), (2016, 2, 10, 16, 43));
        assert_eq!(Nite::from_epoch(&(noon + minutes(1.0)), LON_CTIO), nite);
        assert_eq!(
            Nite::from_epoch(&(noon - minutes(1.0)), LON_CTIO),
            Nite::new(2016, 2, 9).unwrap()
        );
    }

    #[test]
    fn test_nite_parse_and_display() {
        let nite: Nite = "20160210".parse().unwrap();
        assert_eq!(nite.to_string(), "20160210");
        assert_eq!("2016/2/10".parse::<Nite>().unwrap(), nite);
        assert_eq!("2016-02-10".parse::<Nite>().unwrap(), nite);
        assert_eq!(
            "20161310".parse::<Nite>(),
            Err(SchedulerError::InvalidNite("20161310".into()))
        );
        assert!("2016/02/10 12:00".parse::<Nite>().is_err());
        assert!(Nite::new(2016, 2, 9).unwrap() < nite);
    }
}
