//! # Scoring modes
//!
//! Every candidate gets a scalar cost; the scheduler observes the cheapest admissible one.
//! `tiling` always enters with a positive weight so that later passes over the same sky wait
//! for earlier ones.
//!
//! | mode | cost |
//! |---|---|
//! | `airmass` | `airmass + tiling` |
//! | `ra` | `HA + 360·tiling` |
//! | `slew` | `HA + 360·tiling + slew²` |
//! | `balance` | `HA + 3·360·tiling + slew³ + 100·(airmass−1)³` |
//! | `balance2` | `HA + 360·tiling + slew_ra² + slew_dec + 100·(airmass−1)³` |
//! | `balance3` | `HA + 3·360·tiling + penalty(slew) + 100·(airmass−1)³` |
//! | `airmass2` | `200·(airmass − airmass_next) + 360·tiling + 100·(airmass−1)³ + slew²` |
//!
//! `HA` is the signed hour angle in `(-180, 180]` degrees, so fields still rising in the east
//! are preferred. `penalty` is the piecewise-linear [`slew_penalty`] curve.
//!
//! For an inadmissible candidate, the leading term of its mode is replaced by
//! [`SENTINEL_COST`]; the cost vector stays comparable, but the selection only ever considers
//! admissible entries ([`argmin_admissible`]).
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::constants::{Degree, SENTINEL_COST};
use crate::field::TargetCatalog;
use crate::projector::interp;
use crate::scheduler_errors::SchedulerError;
use crate::selection::geometry::Geometry;

/// Control points of the `balance3` slew penalty, degrees → cost.
const SLEW_PENALTY_X: [f64; 7] = [0.0, 2.5, 5.0, 10.0, 20.0, 50.0, 180.0];
const SLEW_PENALTY_Y: [f64; 7] = [0.0, 10.0, 30.0, 500.0, 1000.0, 5000.0, 5000.0];

/// Selectable cost function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    Airmass,
    Ra,
    Slew,
    #[default]
    Balance,
    Balance2,
    Balance3,
    Airmass2,
}

impl ScoringMode {
    pub const ALL: [ScoringMode; 7] = [
        ScoringMode::Airmass,
        ScoringMode::Ra,
        ScoringMode::Slew,
        ScoringMode::Balance,
        ScoringMode::Balance2,
        ScoringMode::Balance3,
        ScoringMode::Airmass2,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ScoringMode::Airmass => "airmass",
            ScoringMode::Ra => "ra",
            ScoringMode::Slew => "slew",
            ScoringMode::Balance => "balance",
            ScoringMode::Balance2 => "balance2",
            ScoringMode::Balance3 => "balance3",
            ScoringMode::Airmass2 => "airmass2",
        }
    }

    /// Cost of a single candidate.
    pub fn cost(&self, c: &CostInputs) -> f64 {
        let airmass_term = 100.0 * (c.airmass - 1.0).powi(3);
        let lead = |value: f64| if c.admissible { value } else { SENTINEL_COST };

        match self {
            ScoringMode::Airmass => lead(c.airmass) + c.tiling,
            ScoringMode::Ra => lead(c.hour_angle) + 360.0 * c.tiling,
            ScoringMode::Slew => lead(c.hour_angle) + 360.0 * c.tiling + c.slew.powi(2),
            ScoringMode::Balance => {
                lead(c.hour_angle) + 3.0 * 360.0 * c.tiling + c.slew.powi(3) + airmass_term
            }
            ScoringMode::Balance2 => {
                lead(c.hour_angle)
                    + 360.0 * c.tiling
                    + c.slew_ra.powi(2)
                    + c.slew_dec
                    + airmass_term
            }
            ScoringMode::Balance3 => {
                lead(c.hour_angle) + 3.0 * 360.0 * c.tiling + slew_penalty(c.slew) + airmass_term
            }
            ScoringMode::Airmass2 => {
                lead(200.0 * (c.airmass - c.airmass_next))
                    + 360.0 * c.tiling
                    + airmass_term
                    + c.slew.powi(2)
            }
        }
    }

    /// Cost of every catalog entry, in catalog order.
    pub fn costs(&self, catalog: &TargetCatalog, geometry: &Geometry, mask: &[bool]) -> Vec<f64> {
        (0..catalog.len())
            .map(|i| {
                self.cost(&CostInputs {
                    admissible: mask[i],
                    tiling: catalog.tiling()[i],
                    airmass: geometry.airmass[i],
                    airmass_next: geometry.airmass_next[i],
                    hour_angle: geometry.hour_angle[i],
                    slew: geometry.slew[i],
                    slew_ra: geometry.slew_ra[i],
                    slew_dec: geometry.slew_dec[i],
                })
            })
            .collect()
    }
}

impl fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScoringMode {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ScoringMode::ALL
            .into_iter()
            .find(|mode| mode.name() == wanted)
            .ok_or_else(|| SchedulerError::UnknownScoringMode(s.to_string()))
    }
}

/// Everything a cost function looks at for one candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostInputs {
    pub admissible: bool,
    pub tiling: f64,
    pub airmass: f64,
    pub airmass_next: f64,
    pub hour_angle: Degree,
    pub slew: Degree,
    pub slew_ra: Degree,
    pub slew_dec: Degree,
}

/// Slew penalty of the `balance3` mode: piecewise linear, [`SENTINEL_COST`] outside
/// `[0, 180]` degrees.
pub fn slew_penalty(slew: Degree) -> f64 {
    interp(
        slew,
        &SLEW_PENALTY_X,
        &SLEW_PENALTY_Y,
        SENTINEL_COST,
        SENTINEL_COST,
    )
}

/// Index of the cheapest admissible entry; the first one wins ties.
pub fn argmin_admissible(costs: &[f64], mask: &[bool]) -> Option<usize> {
    costs
        .iter()
        .zip(mask)
        .enumerate()
        .filter(|(_, (_, &admissible))| admissible)
        .fold(None, |best: Option<(usize, f64)>, (i, (&cost, _))| match best {
            Some((_, best_cost)) if best_cost <= cost || cost.is_nan() => best,
            _ => Some((i, cost)),
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod scoring_test {
    use super::*;
    use approx::assert_relative_eq;

    fn inputs() -> CostInputs {
        CostInputs {
            admissible: true,
            tiling: 1.0,
            airmass: 1.5,
            airmass_next: 1.4,
            hour_angle: -20.0,
            slew: 4.0,
            slew_ra: 3.0,
            slew_dec: 2.0,
        }
    }

    #[test]
    fn test_mode_costs() {
        let c = inputs();
        assert_relative_eq!(ScoringMode::Airmass.cost(&c), 2.5, epsilon = 1e-9);
        assert_relative_eq!(ScoringMode::Ra.cost(&c), 340.0, epsilon = 1e-9);
        assert_relative_eq!(ScoringMode::Slew.cost(&c), 356.0, epsilon = 1e-9);
        assert_relative_eq!(ScoringMode::Balance.cost(&c), -20.0 + 1080.0 + 64.0 + 12.5, epsilon = 1e-9);
        assert_relative_eq!(ScoringMode::Balance2.cost(&c), -20.0 + 360.0 + 9.0 + 2.0 + 12.5, epsilon = 1e-9);
        assert_relative_eq!(ScoringMode::Balance3.cost(&c), -20.0 + 1080.0 + 22.0 + 12.5, epsilon = 1e-9);
        assert_relative_eq!(
            ScoringMode::Airmass2.cost(&c),
            20.0 + 360.0 + 12.5 + 16.0,
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_inadmissible_lead_term() {
        let c = CostInputs {
            admissible: false,
            ..inputs()
        };
        assert_relative_eq!(ScoringMode::Airmass.cost(&c), SENTINEL_COST + 1.0);
        assert_relative_eq!(
            ScoringMode::Balance.cost(&c),
            SENTINEL_COST + 1080.0 + 64.0 + 12.5
        );
        for mode in ScoringMode::ALL {
            assert!(mode.cost(&c) > mode.cost(&inputs()));
        }
    }

    #[test]
    fn test_slew_penalty() {
        assert_eq!(slew_penalty(0.0), 0.0);
        assert_relative_eq!(slew_penalty(7.5), 265.0, epsilon = 1e-9);
        assert_eq!(slew_penalty(50.0), 5000.0);
        assert_eq!(slew_penalty(120.0), 5000.0);
        assert_eq!(slew_penalty(-1.0), SENTINEL_COST);
        assert_eq!(slew_penalty(181.0), SENTINEL_COST);
    }

    #[test]
    fn test_argmin_admissible() {
        assert_eq!(argmin_admissible(&[3.0, 1.0, 2.0], &[true, true, true]), Some(1));
        assert_eq!(argmin_admissible(&[3.0, 1.0, 2.0], &[true, false, true]), Some(2));
        assert_eq!(argmin_admissible(&[2.0, 1.0, 1.0], &[true, true, true]), Some(1));
        assert_eq!(argmin_admissible(&[3.0, 1.0], &[false, false]), None);
        assert_eq!(argmin_admissible(&[], &[]), None);
    }

    #[test]
    fn test_mode_names() {
        for mode in ScoringMode::ALL {
            assert_eq!(mode.to_string().parse::<ScoringMode>().unwrap(), mode);
        }
        assert_eq!("BALANCE3".parse::<ScoringMode>().unwrap(), ScoringMode::Balance3);
        assert_eq!(
            "greedy".parse::<ScoringMode>(),
            Err(SchedulerError::UnknownScoringMode("greedy".into()))
        );
        assert_eq!(ScoringMode::default(), ScoringMode::Balance);
    }
}
