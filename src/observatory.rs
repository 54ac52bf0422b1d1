//! # Observing site
//!
//! An [`Observatory`] is the geodetic location the scheduler reasons from: its longitude fixes
//! the local sidereal time (hence the zenith right ascension) and the nite boundaries, its
//! latitude is the zenith declination.
//!
//! The default site is the Blanco 4m telescope at Cerro Tololo ([`Observatory::ctio`]).
//!
//! ## Units
//!
//! - Longitude: **degrees**, east positive, in `(-180, 180]`.
//! - Latitude: **degrees**, in `[-90, 90]`.
//! - Elevation: **meters** above sea level.
use std::fmt;

use crate::constants::{Degree, Meter, ELEVATION_CTIO, LAT_CTIO, LON_CTIO};
use crate::conversion::{deg_to_dms, dms_to_deg};
use crate::scheduler_errors::SchedulerError;

#[derive(Debug, Clone, PartialEq)]
pub struct Observatory {
    pub name: Option<String>,
    pub longitude: Degree,
    pub latitude: Degree,
    pub elevation: Meter,
}

impl Observatory {
    /// Create a new observing site.
    ///
    /// Arguments
    /// ---------
    /// * `longitude`: geodetic longitude in degrees (east positive), wrapped into `(-180, 180]`
    /// * `latitude`: geodetic latitude in degrees
    /// * `elevation`: height above sea level in meters
    /// * `name`: optional human-readable name
    ///
    /// Return
    /// ------
    /// * the site, or [`SchedulerError::InvalidParameter`] when the latitude is out of range
    ///   or any coordinate is not finite
    pub fn new(
        longitude: Degree,
        latitude: Degree,
        elevation: Meter,
        name: Option<String>,
    ) -> Result<Self, SchedulerError> {
        if !longitude.is_finite() || !elevation.is_finite() {
            return Err(SchedulerError::InvalidParameter(format!(
                "observatory coordinates must be finite (longitude = {longitude}, elevation = {elevation})"
            )));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(SchedulerError::InvalidParameter(format!(
                "observatory latitude must lie in [-90, 90], got {latitude}"
            )));
        }

        Ok(Observatory {
            name,
            longitude: crate::projector::wrap_180(longitude),
            latitude,
            elevation,
        })
    }

    /// Create a site from sexagesimal longitude and latitude strings (`±DD:MM:SS.ss`).
    pub fn from_sexagesimal(
        longitude: &str,
        latitude: &str,
        elevation: Meter,
        name: Option<String>,
    ) -> Result<Self, SchedulerError> {
        Observatory::new(
            dms_to_deg(longitude)?,
            dms_to_deg(latitude)?,
            elevation,
            name,
        )
    }

    /// The Blanco 4m telescope at Cerro Tololo Inter-American Observatory.
    pub fn ctio() -> Self {
        Observatory::from_sexagesimal(LON_CTIO, LAT_CTIO, ELEVATION_CTIO, Some("CTIO".into()))
            .unwrap_or(Observatory {
                name: Some("CTIO".into()),
                longitude: -70.806525,
                latitude: -30.169661111111111,
                elevation: ELEVATION_CTIO,
            })
    }
}

impl Default for Observatory {
    fn default() -> Self {
        Observatory::ctio()
    }
}

impl fmt::Display for Observatory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (lon: {}, lat: {}, elev: {:.1} m)",
            self.name.as_deref().unwrap_or("Unnamed site"),
            deg_to_dms(self.longitude),
            deg_to_dms(self.latitude),
            self.elevation
        )
    }
}

#[cfg(test)]
mod observatory_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ctio() {
        let ctio = Observatory::ctio();
        assert_relative_eq!(ctio.longitude, -70.806525, epsilon = 1e-9);
        assert_relative_eq!(ctio.latitude, -30.169661111111111, epsilon = 1e-9);
        assert_eq!(ctio.elevation, 2206.8);
        assert_eq!(
            format!("{ctio}"),
            "CTIO (lon: -70:48:23.5, lat: -30:10:10.8, elev: 2206.8 m)"
        );
    }

    #[test]
    fn test_new_observatory() {
        let site = Observatory::new(289.0, -30.0, 100.0, None).unwrap();
        assert_relative_eq!(site.longitude, -71.0);

        assert!(Observatory::new(0.0, 91.0, 0.0, None).is_err());
        assert!(Observatory::new(f64::NAN, 0.0, 0.0, None).is_err());
        assert!(Observatory::from_sexagesimal("abc", "-30:00:00", 0.0, None).is_err());
    }
}
