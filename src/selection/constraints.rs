//! # Observing constraints
//!
//! [`PointingLimits`] holds the telescope's declination-indexed limit curves, and
//! [`ConstraintFilter`] combines them with the hard cuts into an admissibility test.
//!
//! ## Pointing limit tables
//!
//! Plain-text, whitespace separated, one row per declination (increasing):
//!
//! ```text
//! # comment
//! Dec    HA     AirmassLimit
//! -90    5:15   2.00
//! ...
//! ```
//!
//! `HA` is given in sexagesimal hours. Between rows the curves are linearly interpolated;
//! outside the table both limits evaluate to `-1` (minus the buffer for the hour angle) so a
//! declination the telescope cannot reach is never admissible. The hour-angle limit is reduced
//! by a fixed buffer to keep clear of the mechanical stops.
//!
//! ## Cuts
//!
//! A candidate is admissible when all of the following hold:
//!
//! - `|hour angle| < hour_angle_limit(dec)`
//! - `airmass < airmass_limit(dec)`
//! - `airmass < airmass_ceiling`
//! - `dec > southern_reach`
//! - its identity is not already completed
use nom::{
    bytes::complete::take_till1,
    character::complete::{space0, space1},
    combinator::all_consuming,
    number::complete::double,
    sequence::{preceded, terminated},
    IResult, Parser,
};

use crate::constants::{Degree, AIRMASS_CEILING, HOUR_ANGLE_BUFFER, HOUR_TO_DEG, SOUTHERN_REACH};
use crate::conversion::parse_hours;
use crate::field::{CompletedFields, TargetCatalog};
use crate::projector::interp;
use crate::scheduler_errors::SchedulerError;
use crate::selection::geometry::Geometry;

static BLANCO_LIMITS: &str = include_str!("data_limits/blanco_hour_angle_limits.dat");

/// Value returned by both limit curves outside the tabulated declinations.
const OUT_OF_TABLE: f64 = -1.0;

fn parse_row(input: &str) -> IResult<&str, (f64, &str, f64)> {
    (
        preceded(space0, double),
        preceded(space1, take_till1(char::is_whitespace)),
        terminated(preceded(space1, double), space0),
    )
        .parse(input)
}

/// Declination-indexed hour-angle and airmass limits of a telescope mount.
#[derive(Debug, Clone, PartialEq)]
pub struct PointingLimits {
    dec: Vec<Degree>,
    hour_angle: Vec<Degree>,
    airmass: Vec<f64>,
    buffer: Degree,
}

impl PointingLimits {
    /// Parse a limit table.
    ///
    /// Arguments
    /// ---------
    /// * `table`: the text of the table (see module documentation)
    /// * `buffer`: safety margin subtracted from the hour-angle limit, degrees
    ///
    /// Return
    /// ------
    /// * [`SchedulerError::InvalidLimitTable`] if a row is malformed, fewer than two rows are
    ///   given, or declinations are not strictly increasing
    pub fn from_table(table: &str, buffer: Degree) -> Result<Self, SchedulerError> {
        let mut limits = PointingLimits {
            dec: Vec::new(),
            hour_angle: Vec::new(),
            airmass: Vec::new(),
            buffer,
        };

        let rows = table.lines().map(str::trim).filter(|line| {
            !line.is_empty()
                && !line.starts_with('#')
                && !line.starts_with(|c: char| c.is_alphabetic())
        });

        for line in rows {
            let (_, (dec, ha, airmass)) = all_consuming(parse_row)
                .parse(line)
                .map_err(|_| SchedulerError::InvalidLimitTable(line.to_string()))?;
            let ha = parse_hours(ha)
                .map_err(|_| SchedulerError::InvalidLimitTable(line.to_string()))?;

            if limits.dec.last().is_some_and(|&previous| dec <= previous) {
                return Err(SchedulerError::InvalidLimitTable(format!(
                    "declinations must be strictly increasing ({line})"
                )));
            }
            limits.dec.push(dec);
            limits.hour_angle.push(ha * HOUR_TO_DEG);
            limits.airmass.push(airmass);
        }

        if limits.dec.len() < 2 {
            return Err(SchedulerError::InvalidLimitTable(
                "at least two rows are required".into(),
            ));
        }
        Ok(limits)
    }

    /// The Blanco 4m limits shipped with the crate.
    pub fn blanco(buffer: Degree) -> Result<Self, SchedulerError> {
        Self::from_table(BLANCO_LIMITS, buffer)
    }

    pub fn buffer(&self) -> Degree {
        self.buffer
    }

    /// Largest admissible |hour angle| at `dec`, degrees, buffer included.
    pub fn hour_angle_limit(&self, dec: Degree) -> Degree {
        interp(dec, &self.dec, &self.hour_angle, OUT_OF_TABLE, OUT_OF_TABLE) - self.buffer
    }

    /// Largest admissible airmass at `dec`.
    pub fn airmass_limit(&self, dec: Degree) -> f64 {
        interp(dec, &self.dec, &self.airmass, OUT_OF_TABLE, OUT_OF_TABLE)
    }
}

/// Admissibility test combining the pointing limits with the hard cuts.
///
/// The filter is a pure function of its inputs: evaluating it twice on the same snapshot gives
/// the same mask.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintFilter {
    pub limits: PointingLimits,
    pub airmass_ceiling: f64,
    pub southern_reach: Degree,
}

impl ConstraintFilter {
    pub fn new(limits: PointingLimits, airmass_ceiling: f64, southern_reach: Degree) -> Self {
        ConstraintFilter {
            limits,
            airmass_ceiling,
            southern_reach,
        }
    }

    /// Blanco limits with the default buffer and cuts.
    pub fn blanco() -> Result<Self, SchedulerError> {
        Ok(Self::new(
            PointingLimits::blanco(HOUR_ANGLE_BUFFER)?,
            AIRMASS_CEILING,
            SOUTHERN_REACH,
        ))
    }

    /// Admissibility of a single candidate.
    ///
    /// Arguments
    /// ---------
    /// * `dec`: candidate declination, degrees
    /// * `airmass`: candidate airmass at the evaluation instant
    /// * `hour_angle`: candidate hour angle in `(-180, 180]`, degrees
    /// * `completed`: whether the candidate's identity is already observed
    pub fn admits(&self, dec: Degree, airmass: f64, hour_angle: Degree, completed: bool) -> bool {
        hour_angle.abs() < self.limits.hour_angle_limit(dec)
            && airmass < self.limits.airmass_limit(dec)
            && airmass < self.airmass_ceiling
            && dec > self.southern_reach
            && !completed
    }

    /// Admissibility of every catalog entry, in catalog order.
    pub fn mask(
        &self,
        catalog: &TargetCatalog,
        geometry: &Geometry,
        completed: &CompletedFields,
    ) -> Vec<bool> {
        catalog
            .dec()
            .iter()
            .zip(&geometry.airmass)
            .zip(&geometry.hour_angle)
            .zip(catalog.ids())
            .map(|(((&dec, &airmass), &hour_angle), id)| {
                self.admits(dec, airmass, hour_angle, completed.contains(id))
            })
            .collect()
    }
}
