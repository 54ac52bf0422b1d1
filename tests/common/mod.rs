#![allow(dead_code)]

use hifitime::Epoch;

use obsplan::constants::{Degree, SECONDS_PER_DAY};
use obsplan::ephemeris::Ephemeris;
use obsplan::field::{Field, TargetCatalog};
use obsplan::observatory::Observatory;
use obsplan::scheduler::params::SchedulerParams;
use obsplan::scheduler::Scheduler;
use obsplan::scheduler_errors::SchedulerError;
use obsplan::time::{hours, parse_date, Nite};
use obsplan::windows::{ObservationWindow, ObservationWindows};

pub const REFERENCE_DATE: &str = "2016/02/11 03:00:00";

/// Deterministic sky: zenith at RA 100°, Dec -30° on [`REFERENCE_DATE`], sidereal drift,
/// Moon below the horizon, sunset eight hours after local noon and sunrise ten hours later.
#[derive(Debug, Clone, Copy)]
pub struct SteadySky {
    reference: Epoch,
}

impl SteadySky {
    pub fn new() -> Self {
        SteadySky {
            reference: reference_date(),
        }
    }

    fn first_after(after: &Epoch, longitude: Degree, offset: f64) -> Epoch {
        let nite = Nite::from_epoch(after, longitude);
        let mut event = nite.local_noon(longitude) + hours(8.0 + offset);
        while event <= *after {
            event = event + hours(24.0);
        }
        event
    }
}

impl Ephemeris for SteadySky {
    fn zenith_ra_dec(&self, _site: &Observatory, date: &Epoch) -> (Degree, Degree) {
        let days = (*date - self.reference).to_seconds() / SECONDS_PER_DAY;
        ((100.0 + 360.985_647 * days).rem_euclid(360.0), -30.0)
    }

    fn moon_ra_dec_phase(&self, _date: &Epoch) -> (Degree, Degree, f64) {
        (0.0, 60.0, 0.5)
    }

    fn next_sunrise(&self, site: &Observatory, after: &Epoch) -> Result<Epoch, SchedulerError> {
        Ok(Self::first_after(after, site.longitude, 10.0))
    }

    fn next_sunset(&self, site: &Observatory, after: &Epoch) -> Result<Epoch, SchedulerError> {
        Ok(Self::first_after(after, site.longitude, 0.0))
    }
}

pub fn reference_date() -> Epoch {
    parse_date(REFERENCE_DATE).unwrap()
}

pub fn scheduler_with(
    fields: Vec<Field>,
    windows: Vec<ObservationWindow>,
    params: SchedulerParams,
) -> Scheduler<SteadySky> {
    Scheduler::new(
        TargetCatalog::new(fields),
        ObservationWindows::new(windows).unwrap(),
        Observatory::ctio(),
        SteadySky::new(),
        params,
    )
    .unwrap()
}

/// Two bands per hex on a strip of hexes east and west of the meridian at the reference date.
pub fn strip_catalog(tilings: u16) -> Vec<Field> {
    let mut fields = Vec::new();
    for tiling in 1..=tilings {
        for (k, ra) in (60..=140).step_by(5).enumerate() {
            for (j, dec) in [-40.0, -55.0].into_iter().enumerate() {
                let hex = (k * 2 + j + 1) as u32;
                for band in ["g", "r"] {
                    fields.push(Field::new(hex, tiling, band, ra as f64, dec));
                }
            }
        }
    }
    fields
}
