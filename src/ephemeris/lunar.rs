//! Low-precision lunar coordinates.
//!
//! Truncated series of the Moon's geocentric ecliptic longitude and latitude (six and four
//! periodic terms), good to roughly 0.3°. Topocentric parallax (up to ~1°) is neglected.
use crate::constants::{Degree, MJD, T2000};
use crate::projector::{angsep, ecliptic_to_equatorial};

use super::solar::{obliquity, sun_ra_dec};

/// `(amplitude, phase, rate)` of a periodic term, the argument being `phase + rate * T`
/// with `T` in Julian centuries from J2000.
type Term = (f64, f64, f64);

const LONGITUDE_TERMS: [Term; 6] = [
    (6.29, 135.0, 477198.87),
    (-1.27, 259.3, -413335.36),
    (0.66, 235.7, 890534.22),
    (0.21, 269.9, 954397.74),
    (-0.19, 357.5, 35999.05),
    (-0.11, 186.5, 966404.03),
];

const LATITUDE_TERMS: [Term; 4] = [
    (5.13, 93.3, 483202.02),
    (0.28, 228.2, 960400.89),
    (-0.28, 318.3, 6003.15),
    (-0.17, 217.6, -407332.21),
];

fn series(terms: &[Term], t: f64) -> f64 {
    terms
        .iter()
        .map(|(amplitude, phase, rate)| amplitude * (phase + rate * t).to_radians().sin())
        .sum()
}

/// Geocentric ecliptic `(longitude, latitude)` of the Moon, in degrees.
pub fn moon_ecliptic(mjd: MJD) -> (Degree, Degree) {
    let t = (mjd - T2000) / 36525.0;
    let longitude = 218.32 + 481267.881 * t + series(&LONGITUDE_TERMS, t);
    (longitude.rem_euclid(360.0), series(&LATITUDE_TERMS, t))
}

/// Geocentric equatorial `(ra, dec)` of the Moon, in degrees.
pub fn moon_ra_dec(mjd: MJD) -> (Degree, Degree) {
    let (longitude, latitude) = moon_ecliptic(mjd);
    ecliptic_to_equatorial(longitude, latitude, obliquity(mjd))
}

/// Illuminated fraction of the lunar disk, from the Sun–Moon elongation `ψ`: `(1 - cos ψ) / 2`.
pub fn moon_illumination(mjd: MJD) -> f64 {
    let (sun_ra, sun_dec) = sun_ra_dec(mjd);
    let (moon_ra, moon_dec) = moon_ra_dec(mjd);
    let elongation = angsep(sun_ra, sun_dec, moon_ra, moon_dec);
    0.5 * (1.0 - elongation.to_radians().cos())
}
