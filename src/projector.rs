//! # Spherical geometry primitives
//!
//! Small, allocation-free helpers on the celestial sphere used by the constraint filter,
//! the scoring engine, the ephemeris and the survey footprint:
//!
//! - [`radec_to_unit`] / [`unit_to_radec`] – equatorial angles ↔ unit vectors
//! - [`angsep`] – great-circle separation
//! - [`airmass`] – plane-parallel airmass (`sec z`) relative to a zenith position
//! - [`cel2gal`] – equatorial J2000 → galactic coordinates
//! - [`ecliptic_to_equatorial`] – ecliptic → equatorial for a given obliquity
//! - [`tangent_offset`] – position offset by a displacement in the tangent plane
//! - [`interp`] – piecewise-linear interpolation with explicit out-of-range fill values
//!
//! All angles are in **degrees**.
use nalgebra::{Matrix3, Rotation3, Vector3};

use crate::constants::{Degree, BELOW_HORIZON_AIRMASS};

/// Rotation from equatorial J2000 to galactic coordinates (IAU 1958 definition, J2000 axes).
const EQU_TO_GAL: [[f64; 3]; 3] = [
    [-0.0548755604, -0.8734370902, -0.4838350155],
    [0.4941094279, -0.4448296300, 0.7469822445],
    [-0.8676661490, -0.1980763734, 0.4559837762],
];

/// Unit vector pointing to `(ra, dec)`.
#[inline]
pub fn radec_to_unit(ra: Degree, dec: Degree) -> Vector3<f64> {
    let (sin_ra, cos_ra) = ra.to_radians().sin_cos();
    let (sin_dec, cos_dec) = dec.to_radians().sin_cos();
    Vector3::new(cos_dec * cos_ra, cos_dec * sin_ra, sin_dec)
}

/// Right ascension in `[0, 360)` and declination of a (not necessarily unit) vector.
#[inline]
pub fn unit_to_radec(v: &Vector3<f64>) -> (Degree, Degree) {
    let ra = v.y.atan2(v.x).to_degrees().rem_euclid(360.0);
    let dec = (v.z / v.norm()).clamp(-1.0, 1.0).asin().to_degrees();
    (ra, dec)
}

/// Great-circle separation between two positions, in degrees within `[0, 180]`.
///
/// Uses the haversine-stable `atan2(|a × b|, a · b)` form so that both tiny and
/// near-antipodal separations keep full precision.
#[inline]
pub fn angsep(ra1: Degree, dec1: Degree, ra2: Degree, dec2: Degree) -> Degree {
    let a = radec_to_unit(ra1, dec1);
    let b = radec_to_unit(ra2, dec2);
    a.cross(&b).norm().atan2(a.dot(&b)).to_degrees()
}

/// Airmass of `(ra, dec)` seen from a site whose zenith sits at `(ra_zenith, dec_zenith)`.
///
/// Plane-parallel approximation `1 / cos z`, `z` being the zenith distance. Targets at or
/// below the horizon get [`BELOW_HORIZON_AIRMASS`] so that every cut rejects them.
#[inline]
pub fn airmass(ra_zenith: Degree, dec_zenith: Degree, ra: Degree, dec: Degree) -> f64 {
    let cos_z = angsep(ra_zenith, dec_zenith, ra, dec).to_radians().cos();
    let value = 1.0 / cos_z;
    if !(1.0..BELOW_HORIZON_AIRMASS).contains(&value) {
        BELOW_HORIZON_AIRMASS
    } else {
        value
    }
}

/// Equatorial J2000 → galactic `(l, b)` in degrees, `l` in `[0, 360)`.
pub fn cel2gal(ra: Degree, dec: Degree) -> (Degree, Degree) {
    let rot = Matrix3::from_row_slice(&EQU_TO_GAL.concat());
    unit_to_radec(&(rot * radec_to_unit(ra, dec)))
}

/// Ecliptic `(lon, lat)` → equatorial `(ra, dec)` for the given obliquity of the ecliptic.
pub fn ecliptic_to_equatorial(lon: Degree, lat: Degree, obliquity: Degree) -> (Degree, Degree) {
    let rot = Rotation3::from_axis_angle(&Vector3::x_axis(), obliquity.to_radians());
    unit_to_radec(&(rot * radec_to_unit(lon, lat)))
}

/// Position reached from `(ra, dec)` by the tangent-plane displacement `(dx, dy)`.
///
/// `dx` points east and `dy` north, both in degrees on the gnomonic plane touching the
/// sphere at `(ra, dec)`.
pub fn tangent_offset(ra: Degree, dec: Degree, dx: Degree, dy: Degree) -> (Degree, Degree) {
    let (sin_ra, cos_ra) = ra.to_radians().sin_cos();
    let (sin_dec, cos_dec) = dec.to_radians().sin_cos();
    let east = Vector3::new(-sin_ra, cos_ra, 0.0);
    let north = Vector3::new(-sin_dec * cos_ra, -sin_dec * sin_ra, cos_dec);
    let point = radec_to_unit(ra, dec) + east * dx.to_radians() + north * dy.to_radians();
    unit_to_radec(&point)
}

/// Wrap an angle difference into `(-180, 180]`.
#[inline]
pub fn wrap_180(angle: Degree) -> Degree {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Piecewise-linear interpolation of `(xp, fp)` at `x`.
///
/// `xp` must be increasing. Points left of `xp[0]` return `left`, points right of the last
/// abscissa return `right`: the curve is never extrapolated.
///
/// Arguments
/// ---------
/// * `x`: abscissa to evaluate
/// * `xp`, `fp`: control points (same length, at least one point)
/// * `left`, `right`: fill values outside `[xp[0], xp[n-1]]`
pub fn interp(x: f64, xp: &[f64], fp: &[f64], left: f64, right: f64) -> f64 {
    debug_assert_eq!(xp.len(), fp.len());
    let (Some(&first), Some(&last)) = (xp.first(), xp.last()) else {
        return left;
    };
    if x.is_nan() {
        return left;
    }
    if x < first {
        return left;
    }
    if x > last {
        return right;
    }

    // First control point strictly greater than x
    let upper = xp.partition_point(|&v| v <= x);
    if upper == 0 {
        return fp[0];
    }
    if upper == xp.len() {
        return fp[xp.len() - 1];
    }
    let lower = upper - 1;
    let t = (x - xp[lower]) / (xp[upper] - xp[lower]);
    fp[lower] + t * (fp[upper] - fp[lower])
}

#[cfg(test)]
mod projector_test {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_angsep() {
        assert_abs_diff_eq!(angsep(10.0, 20.0, 10.0, 20.0), 0.0, epsilon = 1e-12);
        assert_relative_eq!(angsep(0.0, 0.0, 90.0, 0.0), 90.0, epsilon = 1e-10);
        assert_relative_eq!(angsep(0.0, -90.0, 123.0, 90.0), 180.0, epsilon = 1e-10);
        assert_relative_eq!(angsep(359.5, 0.0, 0.5, 0.0), 1.0, epsilon = 1e-10);
        assert_relative_eq!(angsep(0.0, -60.0, 180.0, -60.0), 60.0, epsilon = 1e-10);
    }

    #[test]
    fn test_airmass() {
        assert_relative_eq!(airmass(50.0, -30.0, 50.0, -30.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(airmass(50.0, -30.0, 50.0, -90.0), 2.0, epsilon = 1e-10);
        assert_eq!(airmass(50.0, -30.0, 50.0, 70.0), BELOW_HORIZON_AIRMASS);
        assert_eq!(airmass(50.0, -30.0, 230.0, 30.0), BELOW_HORIZON_AIRMASS);
    }

    #[test]
    fn test_cel2gal() {
        // Galactic centre and north galactic pole
        let (l, b) = cel2gal(266.40499, -28.93617);
        assert_abs_diff_eq!(b, 0.0, epsilon = 1e-3);
        assert!(l < 1e-3 || l > 360.0 - 1e-3);

        let (_, b) = cel2gal(192.85948, 27.12825);
        assert_relative_eq!(b, 90.0, epsilon = 1e-3);

        // LMC sits well below the plane
        let (l, b) = cel2gal(80.8939, -69.7561);
        assert_relative_eq!(l, 280.47, epsilon = 0.05);
        assert_relative_eq!(b, -32.89, epsilon = 0.05);
    }

    #[test]
    fn test_ecliptic_to_equatorial() {
        let (ra, dec) = ecliptic_to_equatorial(90.0, 0.0, 23.439);
        assert_relative_eq!(ra, 90.0, epsilon = 1e-9);
        assert_relative_eq!(dec, 23.439, epsilon = 1e-9);

        let (ra, dec) = ecliptic_to_equatorial(0.0, 0.0, 23.439);
        assert_abs_diff_eq!(ra, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(dec, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_tangent_offset() {
        let (ra, dec) = tangent_offset(10.0, 0.0, 0.0, 0.0);
        assert_relative_eq!(ra, 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(dec, 0.0, epsilon = 1e-12);

        // on the equator, tan of the angle moved equals the plane displacement
        let (ra, dec) = tangent_offset(10.0, 0.0, 1.0, 0.0);
        assert_relative_eq!(ra, 10.0 + 1.0_f64.to_radians().atan().to_degrees(), epsilon = 1e-9);
        assert_abs_diff_eq!(dec, 0.0, epsilon = 1e-12);

        let (ra, dec) = tangent_offset(10.0, -60.0, 0.0, -0.5);
        assert_relative_eq!(ra, 10.0, epsilon = 1e-9);
        assert_relative_eq!(dec, -60.0 - 0.5_f64.to_radians().atan().to_degrees(), epsilon = 1e-9);

        // separation follows the plane distance, independent of declination
        let (ra, dec) = tangent_offset(300.0, -80.0, 0.3, 0.4);
        assert_relative_eq!(
            angsep(300.0, -80.0, ra, dec),
            0.5_f64.to_radians().atan().to_degrees(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_wrap_180() {
        assert_eq!(wrap_180(190.0), -170.0);
        assert_eq!(wrap_180(-190.0), 170.0);
        assert_eq!(wrap_180(180.0), 180.0);
        assert_eq!(wrap_180(-180.0), 180.0);
        assert_eq!(wrap_180(0.0), 0.0);
    }

    #[test]
    fn test_interp() {
        let xp = [0.0, 2.5, 5.0, 10.0];
        let fp = [0.0, 10.0, 30.0, 500.0];
        assert_eq!(interp(0.0, &xp, &fp, -1.0, -2.0), 0.0);
        assert_eq!(interp(2.5, &xp, &fp, -1.0, -2.0), 10.0);
        assert_relative_eq!(interp(7.5, &xp, &fp, -1.0, -2.0), 265.0);
        assert_eq!(interp(10.0, &xp, &fp, -1.0, -2.0), 500.0);
        assert_eq!(interp(-0.1, &xp, &fp, -1.0, -2.0), -1.0);
        assert_eq!(interp(10.1, &xp, &fp, -1.0, -2.0), -2.0);
        assert_eq!(interp(f64::NAN, &xp, &fp, -1.0, -2.0), -1.0);
        assert_eq!(interp(1.0, &[], &[], -1.0, -2.0), -1.0);
    }
}
