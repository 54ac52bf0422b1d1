//! # Ephemeris capability
//!
//! The scheduler never computes astronomy itself: it asks an [`Ephemeris`] for
//!
//! - the zenith right ascension and declination of the site at a given instant,
//! - the Moon position and illuminated fraction,
//! - the next sunrise and sunset after a given instant.
//!
//! All angles are in **degrees**, all instants are UTC [`Epoch`]s.
//!
//! [`LowPrecisionEphemeris`] implements the trait analytically (mean sidereal time,
//! Astronomical Almanac low-precision Sun, truncated lunar series). Its accuracy (≈0.01° for the
//! Sun, ≈0.3° for the Moon, a few seconds on rise/set) is well within what field selection needs.
//! Tests and simulations can plug in any other implementation.
//!
//! ## Rise and set search
//!
//! Sun events are found by stepping the Sun's altitude forward in
//! [`EVENT_SCAN_STEP`] increments until it crosses [`SUN_HORIZON`], then bisecting the
//! bracketing interval down to one second. The search gives up after [`EVENT_SEARCH_SPAN`],
//! returning [`SchedulerError::NoSunEvent`] (polar day or night).
pub mod lunar;
pub mod solar;

use hifitime::Epoch;

use crate::constants::{Degree, Minute, SUN_HORIZON};
use crate::observatory::Observatory;
use crate::scheduler_errors::SchedulerError;
use crate::time::{format_date, local_sidereal_time, minutes, seconds};

/// Step of the coarse Sun altitude scan.
pub const EVENT_SCAN_STEP: Minute = 10.0;

/// How far ahead a Sun event is searched for.
pub const EVENT_SEARCH_SPAN: Minute = 2.0 * 24.0 * 60.0;

/// Astronomical quantities consumed by the scheduler.
pub trait Ephemeris {
    /// Right ascension and declination of the site's zenith at `date`.
    fn zenith_ra_dec(&self, site: &Observatory, date: &Epoch) -> (Degree, Degree);

    /// Moon right ascension, declination and illuminated fraction (`0` new, `1` full) at `date`.
    fn moon_ra_dec_phase(&self, date: &Epoch) -> (Degree, Degree, f64);

    /// First sunrise at `site` strictly after `after`.
    fn next_sunrise(&self, site: &Observatory, after: &Epoch) -> Result<Epoch, SchedulerError>;

    /// First sunset at `site` strictly after `after`.
    fn next_sunset(&self, site: &Observatory, after: &Epoch) -> Result<Epoch, SchedulerError>;
}

/// Analytic, dependency-free ephemeris.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowPrecisionEphemeris;

impl LowPrecisionEphemeris {
    pub fn new() -> Self {
        LowPrecisionEphemeris
    }

    /// Altitude of the Sun's centre above the geometric horizon of `site`, in degrees.
    pub fn sun_altitude(&self, site: &Observatory, date: &Epoch) -> Degree {
        let (ra, dec) = solar::sun_ra_dec(date.to_mjd_utc_days());
        let hour_angle = (local_sidereal_time(date, site.longitude) - ra).to_radians();
        let (lat, dec) = (site.latitude.to_radians(), dec.to_radians());

        (lat.sin() * dec.sin() + lat.cos() * dec.cos() * hour_angle.cos())
            .clamp(-1.0, 1.0)
            .asin()
            .to_degrees()
    }

    /// Scan then bisect for the first crossing of [`SUN_HORIZON`] after `after`.
    ///
    /// `rising` selects upward (sunrise) or downward (sunset) crossings.
    fn sun_event(
        &self,
        site: &Observatory,
        after: &Epoch,
        rising: bool,
    ) -> Result<Epoch, SchedulerError> {
        let above = |t: &Epoch| self.sun_altitude(site, t) >= SUN_HORIZON;
        let crossed = |before: bool, now: bool| if rising { !before && now } else { before && !now };

        let step = minutes(EVENT_SCAN_STEP);
        let n_steps = (EVENT_SEARCH_SPAN / EVENT_SCAN_STEP).ceil() as usize;

        let mut lower = *after;
        let mut lower_above = above(&lower);
        for _ in 0..n_steps {
            let upper = lower + step;
            let upper_above = above(&upper);

            if crossed(lower_above, upper_above) {
                let (mut lo, mut hi) = (lower, upper);
                while hi - lo > seconds(1.0) {
                    let mid = lo + (hi - lo) * 0.5;
                    if above(&mid) == lower_above {
                        lo = mid;
                    } else {
                        hi = mid;
                    }
                }
                return Ok(hi);
            }

            lower = upper;
            lower_above = upper_above;
        }

        Err(SchedulerError::NoSunEvent {
            event: if rising { "sunrise" } else { "sunset" },
            after: format_date(after),
        })
    }
}

impl Ephemeris for LowPrecisionEphemeris {
    fn zenith_ra_dec(&self, site: &Observatory, date: &Epoch) -> (Degree, Degree) {
        (local_sidereal_time(date, site.longitude), site.latitude)
    }

    fn moon_ra_dec_phase(&self, date: &Epoch) -> (Degree, Degree, f64) {
        let mjd = date.to_mjd_utc_days();
        let (ra, dec) = lunar::moon_ra_dec(mjd);
        (ra, dec, lunar::moon_illumination(mjd))
    }

    fn next_sunrise(&self, site: &Observatory, after: &Epoch) -> Result<Epoch, SchedulerError> {
        self.sun_event(site, after, true)
    }

    fn next_sunset(&self, site: &Observatory, after: &Epoch) -> Result<Epoch, SchedulerError> {
        self.sun_event(site, after, false)
    }
}

#[cfg(test)]
mod ephemeris_test {
    use super::*;
    use crate::time::parse_date;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_zenith() {
        let ctio = Observatory::ctio();
        let date = parse_date("2016/02/12 03:00:00").unwrap();
        let (ra, dec) = LowPrecisionEphemeris.zenith_ra_dec(&ctio, &date);
        assert_abs_diff_eq!(ra, 115.805, epsilon = 0.01);
        assert_eq!(dec, ctio.latitude);
    }

    #[test]
    fn test_sunset_sunrise_ctio() {
        let ctio = Observatory::ctio();
        let eph = LowPrecisionEphemeris::new();

        let noon = parse_date("2016/02/11 16:43:14").unwrap();
        let sunset = eph.next_sunset(&ctio, &noon).unwrap();
        let expected = parse_date("2016/02/11 23:34:41").unwrap();
        assert!((sunset - expected).abs() < seconds(10.0));

        let sunrise = eph.next_sunrise(&ctio, &sunset).unwrap();
        let expected = parse_date("2016/02/12 10:20:35").unwrap();
        assert!((sunrise - expected).abs() < seconds(10.0));

        assert_abs_diff_eq!(eph.sun_altitude(&ctio, &sunset), SUN_HORIZON, epsilon = 0.01);
    }

    #[test]
    fn test_polar_night() {
        let pole = Observatory::new(0.0, -89.5, 0.0, None).unwrap();
        let winter = parse_date("2016/06/21 00:00:00").unwrap();
        assert_eq!(
            LowPrecisionEphemeris.next_sunrise(&pole, &winter),
            Err(SchedulerError::NoSunEvent {
                event: "sunrise",
                after: "2016/06/21 00:00:00.000".into()
            })
        );
    }
}
