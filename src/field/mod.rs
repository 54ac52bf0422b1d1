//! # Fields, catalogs and observing history
//!
//! A [`Field`] is one exposure of one sky pointing in one band. Exposures sharing a
//! `(hex, tiling)` pair form a *field group*: all bands of one physical pointing, always
//! scheduled together and back to back.
//!
//! ## Containers
//!
//! | type | role | mutability |
//! |---|---|---|
//! | [`TargetCatalog`] | every candidate exposure, stored column-wise for the selection kernels | immutable |
//! | [`CompletedFields`] | chronological history of observed exposures | append-only |
//! | [`FieldArray`] | a plain list of fields (a scheduled group, a run's output, a file) | free |
//!
//! The catalog keeps a structure-of-arrays copy of the quantities used at every selection step
//! (right ascension, declination, tiling) so that the constraint and cost kernels iterate over
//! contiguous slices.
//!
//! ## Identity
//!
//! An exposure is identified by its [`FieldId`] `(hex, tiling, filter)`, rendered
//! `HEX-TT-FILTER` (for instance `1234-01-g`). [`CompletedFields`] holds at most one record
//! per identity.
//!
//! ## See also
//! ------------
//! * [`io`] – CSV readers and writers.
//! * [`display`] – tabular rendering of a list of fields.
pub mod display;
pub mod io;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use hifitime::Epoch;
use itertools::Itertools;

use crate::constants::{Degree, HexId, Tiling};
use crate::scheduler_errors::SchedulerError;

/// A list of fields, in the order they were produced.
pub type FieldArray = Vec<Field>;

/// Identity of one exposure: pointing, tiling pass and band.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId {
    pub hex: HexId,
    pub tiling: Tiling,
    pub filter: String,
}

impl FieldId {
    pub fn new(hex: HexId, tiling: Tiling, filter: impl Into<String>) -> Self {
        FieldId {
            hex,
            tiling,
            filter: filter.into(),
        }
    }

    /// The `(hex, tiling)` pair shared by all exposures of a field group.
    pub fn group(&self) -> (HexId, Tiling) {
        (self.hex, self.tiling)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}-{}", self.hex, self.tiling, self.filter)
    }
}

impl FromStr for FieldId {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SchedulerError::InvalidParameter(format!("invalid field identifier: {s}"));
        let (hex, tiling, filter) = s.trim().splitn(3, '-').collect_tuple().ok_or_else(invalid)?;
        if filter.is_empty() {
            return Err(invalid());
        }
        Ok(FieldId {
            hex: hex.parse().map_err(|_| invalid())?,
            tiling: tiling.parse().map_err(|_| invalid())?,
            filter: filter.to_string(),
        })
    }
}

/// Conditions recorded when an exposure is scheduled.
#[derive(Debug, Clone, PartialEq)]
pub struct Exposure {
    /// Start of the exposure (UTC)
    pub date: Epoch,
    pub airmass: f64,
    /// Distance from the previous pointing, degrees (0 for the first pointing of a sequence)
    pub slew: Degree,
    /// Distance to the Moon, degrees
    pub moon_angle: Degree,
    /// Hour angle in `(-180, 180]`, degrees
    pub hour_angle: Degree,
}

/// One exposure of one pointing in one band, observed or not.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub hex: HexId,
    pub tiling: Tiling,
    pub filter: String,
    pub ra: Degree,
    pub dec: Degree,
    pub priority: i32,
    pub observation: Option<Exposure>,
}

impl Field {
    /// A not-yet-observed field with priority 1.
    pub fn new(
        hex: HexId,
        tiling: Tiling,
        filter: impl Into<String>,
        ra: Degree,
        dec: Degree,
    ) -> Self {
        Field {
            hex,
            tiling,
            filter: filter.into(),
            ra,
            dec,
            priority: 1,
            observation: None,
        }
    }

    pub fn id(&self) -> FieldId {
        FieldId::new(self.hex, self.tiling, self.filter.clone())
    }

    pub fn group(&self) -> (HexId, Tiling) {
        (self.hex, self.tiling)
    }

    /// Start of the exposure, when observed.
    pub fn date(&self) -> Option<&Epoch> {
        self.observation.as_ref().map(|o| &o.date)
    }

    pub fn is_observed(&self) -> bool {
        self.observation.is_some()
    }

    /// A copy of this field carrying the given observation record.
    pub fn observed(&self, exposure: Exposure) -> Field {
        Field {
            observation: Some(exposure),
            ..self.clone()
        }
    }
}

/// The immutable set of candidate exposures, with columnar copies of the quantities
/// evaluated at every selection step.
#[derive(Debug, Clone, Default)]
pub struct TargetCatalog {
    fields: FieldArray,
    ids: Vec<FieldId>,
    ra: Vec<Degree>,
    dec: Vec<Degree>,
    tiling: Vec<f64>,
}

impl TargetCatalog {
    /// Build the catalog. Observation records carried by the input are dropped: a catalog
    /// only describes targets.
    pub fn new(fields: FieldArray) -> Self {
        let fields: FieldArray = fields
            .into_iter()
            .map(|f| Field {
                observation: None,
                ..f
            })
            .collect();

        let duplicates = fields.iter().map(Field::id).duplicates().count();
        if duplicates > 0 {
            tracing::warn!("Target catalog lists {duplicates} duplicated field identities");
        }

        TargetCatalog {
            ids: fields.iter().map(Field::id).collect(),
            ra: fields.iter().map(|f| f.ra).collect(),
            dec: fields.iter().map(|f| f.dec).collect(),
            tiling: fields.iter().map(|f| f64::from(f.tiling)).collect(),
            fields,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, index: usize) -> &Field {
        &self.fields[index]
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn ids(&self) -> &[FieldId] {
        &self.ids
    }

    pub fn ra(&self) -> &[Degree] {
        &self.ra
    }

    pub fn dec(&self) -> &[Degree] {
        &self.dec
    }

    /// Tiling indices as floating point, ready for the cost kernels.
    pub fn tiling(&self) -> &[f64] {
        &self.tiling
    }

    /// Indices of every exposure of the `(hex, tiling)` group, in catalog order.
    pub fn group_members(&self, group: (HexId, Tiling)) -> impl Iterator<Item = usize> + '_ {
        self.fields
            .iter()
            .enumerate()
            .filter(move |(_, f)| f.group() == group)
            .map(|(i, _)| i)
    }
}

/// Chronological, append-only record of observed exposures.
///
/// The last element is the current telescope pointing used to compute slews. Each
/// [`FieldId`] appears at most once.
#[derive(Debug, Clone, Default)]
pub struct CompletedFields {
    fields: FieldArray,
    ids: HashSet<FieldId>,
}

impl CompletedFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the history from previously observed fields.
    ///
    /// Records without an observation are skipped, repeated identities keep their first
    /// record, and the result is ordered by observation date (stable for equal dates).
    pub fn from_fields(fields: impl IntoIterator<Item = Field>) -> Self {
        let mut ids = HashSet::new();
        let mut kept: FieldArray = Vec::new();
        let mut skipped = 0usize;

        for field in fields {
            if !field.is_observed() {
                skipped += 1;
                continue;
            }
            if ids.insert(field.id()) {
                kept.push(field);
            }
        }
        if skipped > 0 {
            tracing::warn!("Ignoring {skipped} completed records without an observation date");
        }

        kept.sort_by(|a, b| {
            a.date()
                .partial_cmp(&b.date())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        CompletedFields { fields: kept, ids }
    }

    pub fn contains(&self, id: &FieldId) -> bool {
        self.ids.contains(id)
    }

    /// The most recent exposure.
    pub fn last(&self) -> Option<&Field> {
        self.fields.last()
    }

    /// Append newly scheduled exposures.
    ///
    /// Identities already present are not recorded twice; the constraint filter keeps this
    /// from happening during scheduling, so a repeat is logged as a warning.
    pub fn extend(&mut self, fields: impl IntoIterator<Item = Field>) {
        for field in fields {
            if self.ids.insert(field.id()) {
                self.fields.push(field);
            } else {
                tracing::warn!("Field {} already completed, not recorded twice", field.id());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    pub fn as_slice(&self) -> &[Field] {
        &self.fields
    }

    pub fn into_fields(self) -> FieldArray {
        self.fields
    }
}
