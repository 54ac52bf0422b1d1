//! # Constants and type definitions for obsplan
//!
//! This module centralizes the **unit conversions**, the **scheduling constants** and the
//! **common type aliases** used throughout the `obsplan` library.
//!
//! ## Overview
//!
//! - Angle and time conversions (degrees ↔ radians, days ↔ seconds)
//! - Core type aliases shared by the selection and scheduling layers
//! - Default scheduling constants (exposure time, settle penalty, slew reset gap, ...)
//! - The default observatory (Cerro Tololo Inter-American Observatory, Blanco 4m)
//! - Reference positions of the Magellanic Clouds used by the survey footprint
//!
//! Every default listed here can be overridden through
//! [`SchedulerParams`](crate::scheduler::params::SchedulerParams); the constants are the
//! values a scheduler starts with when nothing else is configured.

// -------------------------------------------------------------------------------------------------
// Unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Number of seconds in a day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Number of seconds in a minute
pub const SECONDS_PER_MINUTE: f64 = 60.0;

/// Number of seconds in an hour
pub const SECONDS_PER_HOUR: f64 = 3_600.0;

/// MJD epoch of J2000.0 (2000-01-01 12:00:00)
pub const T2000: f64 = 51544.5;

/// Hours of right ascension → degrees
pub const HOUR_TO_DEG: f64 = 15.0;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Duration or angle in hours
pub type Hour = f64;
/// Duration in seconds
pub type Second = f64;
/// Duration in minutes
pub type Minute = f64;
/// Distance in meters
pub type Meter = f64;
/// Modified Julian Date (days)
pub type MJD = f64;
/// Identifier of a hexagonal sky pointing
pub type HexId = u32;
/// Tiling (dither pass) index, starting at 1
pub type Tiling = u16;

// -------------------------------------------------------------------------------------------------
// Scheduling constants
// -------------------------------------------------------------------------------------------------

/// Exposure time of a single survey exposure, in seconds
pub const EXPTIME: Second = 90.0;

/// Readout and bookkeeping overhead of one exposure, in seconds
pub const OVERHEAD: Second = 30.0;

/// Wall-clock time spent on one exposure, in seconds
pub const FIELDTIME: Second = EXPTIME + OVERHEAD;

/// Cost assigned to a candidate failing any observing cut
pub const SENTINEL_COST: f64 = 9999.0;

/// Airmass reported for targets below the horizon
pub const BELOW_HORIZON_AIRMASS: f64 = 999.0;

/// Hard airmass ceiling, applied regardless of the pointing limit table
pub const AIRMASS_CEILING: f64 = 2.0;

/// Southernmost declination the telescope can point to, in degrees
pub const SOUTHERN_REACH: Degree = -89.0;

/// Mechanical safety margin subtracted from the hour angle limit table, in degrees
pub const HOUR_ANGLE_BUFFER: Degree = 1.25;

/// Slew above which the settle penalty is charged, in degrees
pub const SETTLE_SLEW: Degree = 5.0;

/// Settle time charged once per field group after a long slew, in seconds
pub const SETTLE_PENALTY: Second = 30.0;

/// Idle gap after which the previous pointing is forgotten, in minutes
pub const SLEW_RESET_GAP: Minute = 30.0;

/// Advance of the zenith right ascension used by the look-ahead airmass, in degrees (one hour)
pub const AIRMASS_LOOKAHEAD: Degree = 15.0;

/// Length of a run when no stop time is given, in minutes
pub const DEFAULT_RUN: Minute = 90.0;

/// Length of a scheduling chunk, in minutes
pub const DEFAULT_CHUNK: Minute = 60.0;

/// Altitude of the Sun's centre at rise/set (refraction + semi-diameter), in degrees
pub const SUN_HORIZON: Degree = -0.8333;

/// Bands observed for every pointing, in observing order
pub const BANDS: [&str; 2] = ["g", "r"];

/// DECam CCD footprint (2048 × 4096 pixels at 0.2626"/pixel), in degrees
pub const CCD_X: Degree = 2048.0 * 0.2626 / 3600.0;
pub const CCD_Y: Degree = 4096.0 * 0.2626 / 3600.0;

/// Catalog priority of fields forced in by the SMC northern overdensity selection
pub const SMCNOD_PRIORITY: i32 = 99;

// -------------------------------------------------------------------------------------------------
// Observatory and survey footprint
// -------------------------------------------------------------------------------------------------

/// Cerro Tololo longitude, sexagesimal degrees (east positive)
pub const LON_CTIO: &str = "-70:48:23.49";

/// Cerro Tololo latitude, sexagesimal degrees
pub const LAT_CTIO: &str = "-30:10:10.78";

/// Cerro Tololo elevation in meters
pub const ELEVATION_CTIO: Meter = 2206.8;

/// Large Magellanic Cloud centre (RA, Dec) in degrees
pub const RA_LMC: Degree = 80.8939;
pub const DEC_LMC: Degree = -69.7561;

/// Small Magellanic Cloud centre (RA, Dec) in degrees
pub const RA_SMC: Degree = 13.1867;
pub const DEC_SMC: Degree = -72.8286;
