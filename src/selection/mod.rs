//! # Field selection
//!
//! One greedy step of the scheduler: given the sky at an instant and the previous telescope
//! pointing, pick the next field group and stamp its exposures.
//!
//! ```text
//!   TargetCatalog ──► Geometry::compute ──► ConstraintFilter::mask ──► ScoringMode::costs
//!                                                                          │
//!   FieldArray ◄── time stamping ◄── group expansion ◄── argmin_admissible ┘
//! ```
//!
//! The step is read-only: committing the selected exposures to the history is the caller's job.
//!
//! ## Time stamping
//!
//! The exposures of the winning `(hex, tiling)` group that pass the cuts are taken in catalog
//! order. Exposure `k` starts at `date + k · field_time`; if any of them needs a slew larger
//! than `settle_slew`, every timestamp is delayed once by `settle_penalty`.
pub mod constraints;
pub mod geometry;
pub mod scoring;

use hifitime::Epoch;

use crate::constants::Degree;
use crate::field::{CompletedFields, Exposure, FieldArray, TargetCatalog};
use crate::scheduler::params::SchedulerParams;
use crate::scheduler_errors::SchedulerError;
use crate::time::{format_date, seconds};

use constraints::ConstraintFilter;
use geometry::{Geometry, SkySnapshot};
use scoring::argmin_admissible;

/// Select the next field group.
///
/// Arguments
/// ---------
/// * `catalog`: candidate exposures
/// * `completed`: observing history, excluded from the candidates
/// * `constraints`: admissibility test
/// * `params`: scoring mode and timing parameters
/// * `sky`: zenith and Moon at `date`
/// * `date`: instant of the selection, start of the first exposure
/// * `previous`: current telescope pointing, `None` when slews are not counted
///
/// Return
/// ------
/// * the selected exposures, each carrying its [`Exposure`] record, or
///   [`SchedulerError::NoAdmissibleField`] when every candidate fails a cut
pub fn select_field(
    catalog: &TargetCatalog,
    completed: &CompletedFields,
    constraints: &ConstraintFilter,
    params: &SchedulerParams,
    sky: &SkySnapshot,
    date: Epoch,
    previous: Option<(Degree, Degree)>,
) -> Result<FieldArray, SchedulerError> {
    let geometry = Geometry::compute(catalog, sky, params.airmass_lookahead, previous);
    let mask = constraints.mask(catalog, &geometry, completed);
    let costs = params.mode.costs(catalog, &geometry, &mask);

    let best = argmin_admissible(&costs, &mask).ok_or_else(|| SchedulerError::NoAdmissibleField {
        date: format_date(&date),
    })?;
    let winner = catalog.field(best);
    tracing::debug!(
        "Selected {} (cost {:.2}) among {} admissible candidates",
        winner.id(),
        costs[best],
        mask.iter().filter(|&&m| m).count()
    );

    let members: Vec<usize> = catalog
        .group_members(winner.group())
        .filter(|&i| mask[i])
        .collect();

    let settle = members
        .iter()
        .any(|&i| geometry.slew[i] > params.settle_slew);
    let offset = if settle {
        seconds(params.settle_penalty)
    } else {
        seconds(0.0)
    };

    Ok(members
        .into_iter()
        .enumerate()
        .map(|(k, i)| {
            catalog.field(i).observed(Exposure {
                date: date + offset + seconds(params.field_time * k as f64),
                airmass: geometry.airmass[i],
                slew: geometry.slew[i],
                moon_angle: geometry.moon_angle[i],
                hour_angle: geometry.hour_angle[i],
            })
        })
        .collect())
}
