use nom::{
    character::complete::{one_of, space0},
    combinator::{all_consuming, opt},
    number::complete::double,
    sequence::preceded,
    IResult, Parser,
};

use crate::constants::{Degree, Hour, HOUR_TO_DEG};
use crate::scheduler_errors::SchedulerError;

/// Sign and the three sexagesimal components, missing components are zero.
type Sexagesimal = (f64, f64, f64, f64);

fn parse_components(input: &str) -> IResult<&str, Sexagesimal> {
    let (input, sign) = opt(one_of("+-")).parse(input)?;
    let (input, major) = double(input)?;
    let (input, minutes) = opt(preceded(one_of(": "), double)).parse(input)?;
    let (input, seconds) = opt(preceded(one_of(": "), double)).parse(input)?;
    let (input, _) = space0(input)?;

    let sign = if sign == Some('-') { -1.0 } else { 1.0 };
    Ok((
        input,
        (sign, major, minutes.unwrap_or(0.0), seconds.unwrap_or(0.0)),
    ))
}

/// Parse a sexagesimal string into its decimal value.
///
/// The major component is kept in its own unit (hours or degrees), minutes and seconds are
/// folded in as `1/60` and `1/3600` of it. The sign applies to the whole value so that
/// `"-00:30:00"` reads as `-0.5`.
///
/// Arguments
/// ---------
/// * `value`: a string like `"-70:48:23.49"`, `"5:15"`, `"05 15 00"` or `"12.5"`
///
/// Return
/// ------
/// * the decimal value, or [`SchedulerError::InvalidSexagesimal`] if the string is malformed
pub fn parse_sexagesimal(value: &str) -> Result<f64, SchedulerError> {
    let trimmed = value.trim();
    let (_, (sign, major, minutes, seconds)) = all_consuming(parse_components)
        .parse(trimmed)
        .map_err(|_| SchedulerError::InvalidSexagesimal(value.to_string()))?;

    if !(0.0..60.0).contains(&minutes) || !(0.0..60.0).contains(&seconds) || major < 0.0 {
        return Err(SchedulerError::InvalidSexagesimal(value.to_string()));
    }

    Ok(sign * (major + minutes / 60.0 + seconds / 3600.0))
}

/// Parse an hour angle or right ascension given in sexagesimal hours.
///
/// Return
/// ------
/// * the angle in hours
pub fn parse_hours(value: &str) -> Result<Hour, SchedulerError> {
    parse_sexagesimal(value)
}

/// Parse sexagesimal hours and convert them to degrees (`1h = 15°`).
pub fn hms_to_deg(value: &str) -> Result<Degree, SchedulerError> {
    Ok(parse_hours(value)? * HOUR_TO_DEG)
}

/// Parse sexagesimal degrees (`±DD:MM:SS.SS`).
pub fn dms_to_deg(value: &str) -> Result<Degree, SchedulerError> {
    parse_sexagesimal(value)
}

/// Render an angle in degrees as `±DD:MM:SS.s`.
pub fn deg_to_dms(value: Degree) -> String {
    let sign = if value < 0.0 { '-' } else { '+' };
    let total = (value.abs() * 36000.0).round() as u64; // tenths of arcsec
    let deg = total / 36000;
    let min = (total / 600) % 60;
    let tenths = total % 600;
    format!("{sign}{deg:02}:{min:02}:{:02}.{}", tenths / 10, tenths % 10)
}

#[cfg(test)]
mod conversion_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_sexagesimal() {
        assert_relative_eq!(
            dms_to_deg("-70:48:23.49").unwrap(),
            -70.80652500000001,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            dms_to_deg("-30:10:10.78").unwrap(),
            -30.169661111111111,
            epsilon = 1e-12
        );
        assert_relative_eq!(parse_sexagesimal("-00:30:00").unwrap(), -0.5);
        assert_relative_eq!(
            parse_sexagesimal("+13 55 42.7").unwrap(),
            13.928527777777777,
            epsilon = 1e-12
        );
        assert_relative_eq!(parse_sexagesimal("12.5").unwrap(), 12.5);
    }

    #[test]
    fn test_hms_to_deg() {
        assert_relative_eq!(hms_to_deg("5:15").unwrap(), 78.75);
        assert_relative_eq!(hms_to_deg("05:15:00").unwrap(), 78.75);
        assert_relative_eq!(hms_to_deg("4:00:36").unwrap(), 60.15, epsilon = 1e-10);
    }

    #[test]
    fn test_invalid_sexagesimal() {
        assert_eq!(
            parse_sexagesimal("5:75"),
            Err(SchedulerError::InvalidSexagesimal("5:75".into()))
        );
        assert!(parse_sexagesimal("abc").is_err());
        assert!(parse_sexagesimal("1:2:3:4").is_err());
        assert!(parse_sexagesimal("").is_err());
    }

    #[test]
    fn test_deg_to_dms() {
        assert_eq!(deg_to_dms(-30.169661111111111), "-30:10:10.8");
        assert_eq!(deg_to_dms(0.5), "+00:30:00.0");
    }
}
