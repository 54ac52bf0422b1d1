//! Per-candidate geometric quantities at one instant, stored column-wise.
//!
//! Scalar helpers ([`hour_angle`], [`slew_components`]) are the per-candidate contract;
//! [`Geometry::compute`] applies them over the whole catalog.
use crate::constants::Degree;
use crate::field::TargetCatalog;
use crate::projector::{airmass, angsep, wrap_180};

/// Where the sky is at the evaluation instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkySnapshot {
    pub zenith_ra: Degree,
    pub zenith_dec: Degree,
    pub moon_ra: Degree,
    pub moon_dec: Degree,
    /// Illuminated fraction of the Moon
    pub moon_phase: f64,
}

/// Hour angle of a target, `ra - zenith_ra` wrapped into `(-180, 180]`.
#[inline]
pub fn hour_angle(ra: Degree, zenith_ra: Degree) -> Degree {
    wrap_180(ra - zenith_ra)
}

/// Total slew, right ascension component folded into `[0, 180]`, and declination component.
///
/// The RA component is the shorter way around, so a move from 359° to 1° counts as 2° rather
/// than the raw `|Δra|` of 358°.
#[inline]
pub fn slew_components(
    previous: (Degree, Degree),
    ra: Degree,
    dec: Degree,
) -> (Degree, Degree, Degree) {
    let (prev_ra, prev_dec) = previous;
    (
        angsep(prev_ra, prev_dec, ra, dec),
        wrap_180(ra - prev_ra).abs(),
        (dec - prev_dec).abs(),
    )
}

/// Quantities evaluated for every catalog entry, in catalog order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub airmass: Vec<f64>,
    /// Airmass with the zenith advanced by the look-ahead offset
    pub airmass_next: Vec<f64>,
    pub hour_angle: Vec<Degree>,
    pub slew: Vec<Degree>,
    pub slew_ra: Vec<Degree>,
    pub slew_dec: Vec<Degree>,
    pub moon_angle: Vec<Degree>,
}

impl Geometry {
    /// Evaluate the catalog against the sky.
    ///
    /// Arguments
    /// ---------
    /// * `catalog`: the candidates
    /// * `sky`: zenith and Moon positions at the evaluation instant
    /// * `lookahead`: zenith right ascension advance used for `airmass_next`, degrees
    /// * `previous`: last telescope pointing `(ra, dec)`, or `None` when slews are not
    ///   counted (every slew is then zero)
    pub fn compute(
        catalog: &TargetCatalog,
        sky: &SkySnapshot,
        lookahead: Degree,
        previous: Option<(Degree, Degree)>,
    ) -> Self {
        let n = catalog.len();
        let mut geometry = Geometry {
            airmass: Vec::with_capacity(n),
            airmass_next: Vec::with_capacity(n),
            hour_angle: Vec::with_capacity(n),
            slew: Vec::with_capacity(n),
            slew_ra: Vec::with_capacity(n),
            slew_dec: Vec::with_capacity(n),
            moon_angle: Vec::with_capacity(n),
        };
        let next_zenith_ra = (sky.zenith_ra + lookahead).rem_euclid(360.0);

        for (&ra, &dec) in catalog.ra().iter().zip(catalog.dec()) {
            geometry
                .airmass
                .push(airmass(sky.zenith_ra, sky.zenith_dec, ra, dec));
            geometry
                .airmass_next
                .push(airmass(next_zenith_ra, sky.zenith_dec, ra, dec));
            geometry.hour_angle.push(hour_angle(ra, sky.zenith_ra));
            geometry
                .moon_angle
                .push(angsep(sky.moon_ra, sky.moon_dec, ra, dec));

            let (slew, slew_ra, slew_dec) = previous
                .map(|p| slew_components(p, ra, dec))
                .unwrap_or((0.0, 0.0, 0.0));
            geometry.slew.push(slew);
            geometry.slew_ra.push(slew_ra);
            geometry.slew_dec.push(slew_dec);
        }
        geometry
    }
}

#[cfg(test)]
mod geometry_test {
    use super::*;
    use crate::field::Field;
    use approx::assert_relative_eq;

    #[test]
    fn test_hour_angle() {
        assert_eq!(hour_angle(10.0, 350.0), 20.0);
        assert_eq!(hour_angle(350.0, 10.0), -20.0);
        assert_eq!(hour_angle(190.0, 10.0), 180.0);
        assert_eq!(hour_angle(10.0, 190.0), 180.0);
    }

    #[test]
    fn test_slew_components() {
        let (slew, slew_ra, slew_dec) = slew_components((355.0, -60.0), 5.0, -65.0);
        assert_relative_eq!(slew_ra, 10.0, epsilon = 1e-12);
        assert_relative_eq!(slew_dec, 5.0);
        assert!(slew > 5.0 && slew < 11.0);
    }

    #[test]
    fn test_compute() {
        let catalog = TargetCatalog::new(vec![
            Field::new(1, 1, "g", 100.0, -30.0),
            Field::new(2, 1, "g", 100.0, -90.0),
        ]);
        let sky = SkySnapshot {
            zenith_ra: 100.0,
            zenith_dec: -30.0,
            moon_ra: 100.0,
            moon_dec: 0.0,
            moon_phase: 0.5,
        };

        let geometry = Geometry::compute(&catalog, &sky, 15.0, None);
        assert_relative_eq!(geometry.airmass[0], 1.0);
        assert_relative_eq!(geometry.airmass[1], 2.0, epsilon = 1e-10);
        assert!(geometry.airmass_next[0] > 1.0);
        assert_relative_eq!(geometry.airmass_next[1], 2.0, epsilon = 1e-10);
        assert_eq!(geometry.slew, vec![0.0, 0.0]);
        assert_relative_eq!(geometry.moon_angle[0], 30.0, epsilon = 1e-10);

        let geometry = Geometry::compute(&catalog, &sky, 15.0, Some((100.0, -60.0)));
        assert_relative_eq!(geometry.slew[0], 30.0, epsilon = 1e-10);
        assert_relative_eq!(geometry.slew_dec[1], 30.0);
    }
}
