//! # CSV input/output
//!
//! Readers and writers for the tabular files exchanged with the rest of the survey tooling:
//!
//! - **field files** (target catalogs, completed and scheduled exposures), columns
//!   `ID,HEX,TILING,FILTER,RA,DEC,PRIORITY,DATE,AIRMASS,SLEW,MOONANGLE,HOURANGLE`;
//!   `ID`, `PRIORITY` and the observation columns are optional on input, an empty `DATE`
//!   marks a field as not observed, extra columns are ignored,
//! - **window files**, a header row then one `start,end` pair per record,
//! - **hex lists** used by survey preparation, columns `ID,RA,DEC`.
//!
//! Dates use the layouts accepted by [`parse_date`] and are written with [`format_date`].
use std::fs::{self, File};
use std::io::{Read, Write};

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::constants::{Degree, HexId, Tiling};
use crate::field::{CompletedFields, Exposure, Field, FieldArray};
use crate::scheduler_errors::SchedulerError;
use crate::survey::Hex;
use crate::time::{format_date, parse_date};
use crate::windows::{ObservationWindow, ObservationWindows};

/// Header of the field files we write, in [`FieldRecord`] order.
const FIELD_COLUMNS: [&str; 12] = [
    "ID", "HEX", "TILING", "FILTER", "RA", "DEC", "PRIORITY", "DATE", "AIRMASS", "SLEW",
    "MOONANGLE", "HOURANGLE",
];

/// Columns every field file must provide.
const REQUIRED_FIELD_COLUMNS: [&str; 5] = ["HEX", "TILING", "FILTER", "RA", "DEC"];

/// Columns every hex list must provide.
const REQUIRED_HEX_COLUMNS: [&str; 3] = ["ID", "RA", "DEC"];

fn default_priority() -> i32 {
    1
}

/// One row of a field file.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
struct FieldRecord {
    #[serde(default)]
    id: Option<String>,
    hex: HexId,
    tiling: Tiling,
    filter: String,
    ra: Degree,
    dec: Degree,
    #[serde(default = "default_priority")]
    priority: i32,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    airmass: Option<f64>,
    #[serde(default)]
    slew: Option<f64>,
    #[serde(default)]
    moonangle: Option<f64>,
    #[serde(default)]
    hourangle: Option<f64>,
}

impl TryFrom<FieldRecord> for Field {
    type Error = SchedulerError;

    fn try_from(record: FieldRecord) -> Result<Self, Self::Error> {
        let observation = match record.date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(date) => Some(Exposure {
                date: parse_date(date)?,
                airmass: record.airmass.unwrap_or(f64::NAN),
                slew: record.slew.unwrap_or(0.0),
                moon_angle: record.moonangle.unwrap_or(f64::NAN),
                hour_angle: record.hourangle.unwrap_or(f64::NAN),
            }),
        };

        Ok(Field {
            hex: record.hex,
            tiling: record.tiling,
            filter: record.filter,
            ra: record.ra,
            dec: record.dec,
            priority: record.priority,
            observation,
        })
    }
}

impl From<&Field> for FieldRecord {
    fn from(field: &Field) -> Self {
        let obs = field.observation.as_ref();
        FieldRecord {
            id: Some(field.id().to_string()),
            hex: field.hex,
            tiling: field.tiling,
            filter: field.filter.clone(),
            ra: field.ra,
            dec: field.dec,
            priority: field.priority,
            date: obs.map(|o| format_date(&o.date)),
            airmass: obs.map(|o| o.airmass),
            slew: obs.map(|o| o.slew),
            moonangle: obs.map(|o| o.moon_angle),
            hourangle: obs.map(|o| o.hour_angle),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
struct HexRecord {
    id: HexId,
    ra: Degree,
    dec: Degree,
}

fn check_columns<R: Read>(
    reader: &mut csv::Reader<R>,
    required: &[&str],
    source: &str,
) -> Result<(), SchedulerError> {
    let headers = reader.headers()?;
    for column in required {
        if !headers.iter().any(|h| h.trim() == *column) {
            return Err(SchedulerError::MissingColumn {
                file: source.to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

/// Read a field file from any reader.
///
/// Arguments
/// ---------
/// * `reader`: CSV content with a header row
/// * `source`: name used in error messages
///
/// Return
/// ------
/// * the fields in file order, or [`SchedulerError::MissingColumn`] / a parse error
pub fn read_fields_from<R: Read>(reader: R, source: &str) -> Result<FieldArray, SchedulerError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    check_columns(&mut csv_reader, &REQUIRED_FIELD_COLUMNS, source)?;

    csv_reader
        .deserialize::<FieldRecord>()
        .map(|record| Field::try_from(record?))
        .collect()
}

/// Read a field file (target catalog, completed or scheduled exposures).
pub fn read_fields(path: &Utf8Path) -> Result<FieldArray, SchedulerError> {
    let fields = read_fields_from(File::open(path)?, path.as_str())?;
    tracing::debug!("Read {} fields from {path}", fields.len());
    Ok(fields)
}

/// Read and merge several completed-field files into one history.
///
/// Records are merged in the order the files are given; a field identity seen twice keeps
/// its first record.
pub fn read_completed(paths: &[Utf8PathBuf]) -> Result<CompletedFields, SchedulerError> {
    let mut merged = FieldArray::new();
    for path in paths {
        merged.extend(read_fields(path)?);
    }
    let completed = CompletedFields::from_fields(merged);
    tracing::info!(
        "Loaded {} completed fields from {} file(s)",
        completed.len(),
        paths.len()
    );
    Ok(completed)
}

/// Write fields as CSV to any writer, header row included even when `fields` is empty.
pub fn write_fields_to<W: Write>(writer: W, fields: &[Field]) -> Result<(), SchedulerError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(FIELD_COLUMNS)?;
    for field in fields {
        csv_writer.serialize(FieldRecord::from(field))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write fields to `path`.
///
/// Arguments
/// ---------
/// * `path`: output file, replaced if it exists
/// * `fields`: the records to write
/// * `write_protect`: make the file read-only once written
///
/// Return
/// ------
/// * [`SchedulerError::WriteProtected`] when `path` exists and is read-only
pub fn write_fields(
    path: &Utf8Path,
    fields: &[Field],
    write_protect: bool,
) -> Result<(), SchedulerError> {
    if let Ok(metadata) = fs::metadata(path) {
        if metadata.permissions().readonly() {
            return Err(SchedulerError::WriteProtected(path.to_string()));
        }
    }

    write_fields_to(File::create(path)?, fields)?;
    tracing::info!("Wrote {} fields to {path}", fields.len());

    if write_protect {
        let mut permissions = fs::metadata(path)?.permissions();
        permissions.set_readonly(true);
        fs::set_permissions(path, permissions)?;
    }
    Ok(())
}

/// Read observation windows from any reader (header row, then `start,end` records).
pub fn read_windows_from<R: Read>(reader: R) -> Result<ObservationWindows, SchedulerError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut windows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let (Some(start), Some(end)) = (record.get(0), record.get(1)) else {
            return Err(SchedulerError::InvalidDate(record.iter().collect::<Vec<_>>().join(",")));
        };
        windows.push(ObservationWindow::new(parse_date(start)?, parse_date(end)?)?);
    }
    ObservationWindows::new(windows)
}

/// Read an observation window file.
pub fn read_windows(path: &Utf8Path) -> Result<ObservationWindows, SchedulerError> {
    read_windows_from(File::open(path)?)
}

/// Read a list of hexes (`ID,RA,DEC`) from any reader.
pub fn read_hexes_from<R: Read>(reader: R, source: &str) -> Result<Vec<Hex>, SchedulerError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    check_columns(&mut csv_reader, &REQUIRED_HEX_COLUMNS, source)?;

    csv_reader
        .deserialize::<HexRecord>()
        .map(|record| {
            let HexRecord { id, ra, dec } = record?;
            Ok(Hex { id, ra, dec })
        })
        .collect()
}

/// Read a hex list file.
pub fn read_hexes(path: &Utf8Path) -> Result<Vec<Hex>, SchedulerError> {
    read_hexes_from(File::open(path)?, path.as_str())
}
