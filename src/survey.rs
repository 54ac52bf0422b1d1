//! # Survey preparation
//!
//! Builds the target catalog from a list of hexagonal pointings: every hex is repeated over
//! the dither tilings and the survey bands, then cut to the Magellanic footprint.
//!
//! Hexes listed in an [`SmcnodSelection`] are kept regardless of the footprint for the
//! selected tilings, with priority [`SMCNOD_PRIORITY`].
//!
//! Fields come out tiling-major, then in hex order, then in band order, which is also the
//! catalog order the scheduler relies on when it expands a selected group.
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    Degree, HexId, Tiling, CCD_X, CCD_Y, DEC_LMC, DEC_SMC, RA_LMC, RA_SMC, SMCNOD_PRIORITY,
};
use crate::field::{Field, FieldArray};
use crate::projector::{angsep, cel2gal, tangent_offset};
use crate::scheduler_errors::SchedulerError;

/// Number of passes over each hex.
pub const TILINGS: usize = 4;

/// `(Δra, Δdec)` of each tiling in `SmashDither` mode, degrees on the sky.
const SMASH_OFFSETS: [(Degree, Degree); TILINGS] = [(0.0, 0.0), (1.0, 0.0), (-1.0, 0.0), (0.0, -0.75)];

/// `(Δra, Δdec)` of each tiling in `SmashRotate` mode.
const ROTATE_OFFSETS: [(Degree, Degree); TILINGS] =
    [(0.0, 0.0), (0.75, 0.75), (-0.75, 0.75), (0.0, -0.75)];

/// Tangent-plane `(east, north)` offsets of each tiling in `DecamDither` mode, in CCD units.
const DECAM_OFFSETS: [(f64, f64); TILINGS] =
    [(0.0, 0.0), (8.0 / 3.0, -11.0 / 3.0), (8.0 / 3.0, 8.0 / 3.0), (-8.0 / 3.0, 0.0)];

/// A survey pointing, before tiling and band expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct Hex {
    pub id: HexId,
    pub ra: Degree,
    pub dec: Degree,
}

/// How the tilings of a hex are offset from one another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DitherMode {
    /// All tilings share the hex center.
    None,
    /// Fixed one degree offsets in RA and a 0.75 degree offset to the south.
    #[default]
    SmashDither,
    /// The SMASH pattern turned by 45°: diagonal offsets to the north, one to the south.
    SmashRotate,
    /// Offsets of a few CCDs in the focal plane, so chip gaps of one tiling are covered by
    /// the next.
    DecamDither,
}

impl DitherMode {
    /// Pointing of tiling `index` (0-based) around `(ra, dec)`.
    pub fn dither(&self, ra: Degree, dec: Degree, index: usize) -> (Degree, Degree) {
        match self {
            DitherMode::None => (ra, dec),
            DitherMode::SmashDither => sky_offset(ra, dec, SMASH_OFFSETS[index % TILINGS]),
            DitherMode::SmashRotate => sky_offset(ra, dec, ROTATE_OFFSETS[index % TILINGS]),
            DitherMode::DecamDither => {
                let (nx, ny) = DECAM_OFFSETS[index % TILINGS];
                let (ra, dec) = tangent_offset(ra, dec, nx * CCD_X, ny * CCD_Y);
                (ra.rem_euclid(360.0), dec)
            }
        }
    }
}

/// Offset in degrees on the sky, the RA step stretched by `1 / cos dec`.
fn sky_offset(ra: Degree, dec: Degree, (dx, dy): (Degree, Degree)) -> (Degree, Degree) {
    let ra = (ra + dx / dec.to_radians().cos()).rem_euclid(360.0);
    (ra, dec + dy)
}

impl fmt::Display for DitherMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DitherMode::None => f.write_str("none"),
            DitherMode::SmashDither => f.write_str("smash"),
            DitherMode::SmashRotate => f.write_str("smash_rotate"),
            DitherMode::DecamDither => f.write_str("decam"),
        }
    }
}

impl FromStr for DitherMode {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(DitherMode::None),
            "smash" | "smash_dither" => Ok(DitherMode::SmashDither),
            "smash_rotate" => Ok(DitherMode::SmashRotate),
            "decam" | "decam_dither" => Ok(DitherMode::DecamDither),
            _ => Err(SchedulerError::UnknownDitherMode(s.to_string())),
        }
    }
}

/// Magellanic footprint cut.
///
/// A pointing is kept when it lies more than 10° off the Galactic plane and within 30° of
/// either Cloud with `dec < -55` and `100 < ra < 300`, or when `dec < -65` with `300 < ra < 360`,
/// or when `dec < -80`. Anything at or south of `southern_reach` is always dropped.
pub fn in_footprint(ra: Degree, dec: Degree, southern_reach: Degree) -> bool {
    if dec <= southern_reach {
        return false;
    }
    let (_, b) = cel2gal(ra, dec);
    let near_clouds = angsep(RA_LMC, DEC_LMC, ra, dec) < 30.0 || angsep(RA_SMC, DEC_SMC, ra, dec) < 30.0;

    let magellanic = b.abs() > 10.0 && near_clouds && dec < -55.0 && ra > 100.0 && ra < 300.0;
    let smc_side = dec < -65.0 && ra > 300.0 && ra < 360.0;
    magellanic || smc_side || dec < -80.0
}

/// Hexes observed for the SMC northern overdensity, kept outside the footprint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SmcnodSelection {
    pub hexes: Vec<HexId>,
    /// Tilings the selection applies to; every tiling when empty
    pub tilings: Vec<Tiling>,
}

impl SmcnodSelection {
    pub fn selects(&self, field: &Field) -> bool {
        self.hexes.contains(&field.hex)
            && (self.tilings.is_empty() || self.tilings.contains(&field.tiling))
    }
}

/// Expand hexes into the target catalog.
///
/// Arguments
/// ---------
/// * `hexes`: survey pointings
/// * `dither`: tiling offsets
/// * `bands`: filters observed at every pointing
/// * `southern_reach`: southernmost declination kept
/// * `smcnod`: hexes kept regardless of the footprint
///
/// Return
/// ------
/// * the fields inside the footprint, tilings numbered from 1, priority 1, plus the
///   SMCNOD fields north of `southern_reach` with priority [`SMCNOD_PRIORITY`]
pub fn prepare_fields<S: AsRef<str>>(
    hexes: &[Hex],
    dither: DitherMode,
    bands: &[S],
    southern_reach: Degree,
    smcnod: Option<&SmcnodSelection>,
) -> FieldArray {
    tracing::info!("Number of hexes: {}", hexes.len());
    tracing::info!("Number of tilings: {TILINGS}");
    tracing::info!("Number of filters: {}", bands.len());

    let fields: FieldArray = (0..TILINGS)
        .flat_map(|index| {
            hexes.iter().flat_map(move |hex| {
                let (ra, dec) = dither.dither(hex.ra, hex.dec, index);
                bands
                    .iter()
                    .map(move |band| Field::new(hex.id, (index + 1) as Tiling, band.as_ref(), ra, dec))
            })
        })
        .filter_map(|mut field| {
            if smcnod.is_some_and(|sel| sel.selects(&field)) && field.dec > southern_reach {
                field.priority = SMCNOD_PRIORITY;
                Some(field)
            } else if in_footprint(field.ra, field.dec, southern_reach) {
                Some(field)
            } else {
                None
            }
        })
        .collect();

    if smcnod.is_some() {
        let forced = fields.iter().filter(|f| f.priority == SMCNOD_PRIORITY).count();
        tracing::info!("SMCNOD fields: {forced}");
    }
    tracing::info!("Number of target fields: {}", fields.len());
    fields
}
