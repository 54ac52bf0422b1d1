//! Low-precision solar coordinates (Astronomical Almanac, section C).
//!
//! Accuracy is about 0.01° between 1950 and 2050, far below anything the scheduler cares
//! about (the Sun is only used to find twilight boundaries).
use crate::constants::{Degree, MJD, T2000};
use crate::projector::ecliptic_to_equatorial;

/// Mean obliquity of the ecliptic at `mjd`, in degrees.
pub fn obliquity(mjd: MJD) -> Degree {
    23.439 - 0.0000004 * (mjd - T2000)
}

/// Apparent geocentric ecliptic longitude of the Sun, in degrees within `[0, 360)`.
pub fn sun_ecliptic_longitude(mjd: MJD) -> Degree {
    let n = mjd - T2000;
    let mean_longitude = 280.460 + 0.9856474 * n;
    let mean_anomaly = (357.528 + 0.9856003 * n).to_radians();

    (mean_longitude + 1.915 * mean_anomaly.sin() + 0.020 * (2.0 * mean_anomaly).sin())
        .rem_euclid(360.0)
}

/// Geocentric equatorial `(ra, dec)` of the Sun, in degrees.
pub fn sun_ra_dec(mjd: MJD) -> (Degree, Degree) {
    ecliptic_to_equatorial(sun_ecliptic_longitude(mjd), 0.0, obliquity(mjd))
}

#[cfg(test)]
mod solar_test {
    use super::*;
    use crate::time::parse_date;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_sun_at_equinox_and_solstice() {
        let equinox = parse_date("2016/03/20 04:30:00").unwrap().to_mjd_utc_days();
        let (ra, dec) = sun_ra_dec(equinox);
        assert!(!(0.05..359.95).contains(&ra));
        assert_abs_diff_eq!(dec, 0.0, epsilon = 0.05);

        let solstice = parse_date("2016/06/20 22:34:00").unwrap().to_mjd_utc_days();
        let (ra, dec) = sun_ra_dec(solstice);
        assert_relative_eq!(ra, 90.0, epsilon = 0.05);
        assert_relative_eq!(dec, 23.437, epsilon = 0.01);
    }
}
