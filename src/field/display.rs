//! # Tabular display for fields
//!
//! The display adaptor [`FieldsDisplay`] borrows a slice of [`Field`]s and renders it with
//! Rust formatting, without cloning the data.
//!
//! Two layouts are available:
//!
//! - **Default** (compact, fixed-width, one line per exposure):
//!   `# | ID | DATE | RA | DEC | AIRMASS | SLEW | HA`
//! - **Table** (uses `comfy-table`): adds the moon angle and the priority, angles in
//!   sexagesimal as well as decimal degrees.
//!
//! Fields without an observation show empty date and condition columns.
//!
//! ```rust,ignore
//! use obsplan::field::display::FieldsDisplayExt;
//!
//! println!("{}", scheduled.show());
//! println!("{}", scheduled.table().sorted());
//! ```
use std::fmt;

use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Row, Table};

use crate::conversion::deg_to_dms;
use crate::field::Field;
use crate::time::format_date;

enum DisplayMode {
    Compact,
    Table,
}

pub struct FieldsDisplay<'a> {
    fields: &'a [Field],
    mode: DisplayMode,
    precision: usize,
    sorted: bool,
}

impl<'a> FieldsDisplay<'a> {
    pub fn new(fields: &'a [Field]) -> Self {
        Self {
            fields,
            mode: DisplayMode::Compact,
            precision: 2,
            sorted: false,
        }
    }

    pub fn table(mut self) -> Self {
        self.mode = DisplayMode::Table;
        self
    }

    /// Number of decimals printed for angles and airmass.
    pub fn with_precision(mut self, p: usize) -> Self {
        self.precision = p;
        self
    }

    /// Print rows by observation date; unobserved fields come last. The `#` column keeps
    /// the original index.
    pub fn sorted(mut self) -> Self {
        self.sorted = true;
        self
    }

    fn row_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.fields.len()).collect();
        if self.sorted {
            order.sort_by(|&a, &b| {
                let (da, db) = (self.fields[a].date(), self.fields[b].date());
                match (da, db) {
                    (Some(x), Some(y)) => x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                }
            });
        }
        order
    }

    fn render_compact(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.precision;
        writeln!(
            f,
            "{:>4}  {:<12}  {:<23}  {:>9}  {:>9}  {:>7}  {:>7}  {:>8}",
            "#", "ID", "DATE", "RA", "DEC", "AIRMASS", "SLEW", "HA"
        )?;
        for i in self.row_order() {
            let field = &self.fields[i];
            let (date, airmass, slew, ha) = match &field.observation {
                Some(o) => (
                    format_date(&o.date),
                    format!("{:.p$}", o.airmass),
                    format!("{:.p$}", o.slew),
                    format!("{:.p$}", o.hour_angle),
                ),
                None => Default::default(),
            };
            writeln!(
                f,
                "{:>4}  {:<12}  {:<23}  {:>9.p$}  {:>9.p$}  {:>7}  {:>7}  {:>8}",
                i,
                field.id().to_string(),
                date,
                field.ra,
                field.dec,
                airmass,
                slew,
                ha
            )?;
        }
        Ok(())
    }

    fn render_table(&self) -> String {
        let p = self.precision;
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![
            Cell::new("#"),
            Cell::new("ID"),
            Cell::new("Priority"),
            Cell::new("Date (UTC)"),
            Cell::new("RA [deg]"),
            Cell::new("DEC [dms]"),
            Cell::new("Airmass"),
            Cell::new("Slew [deg]"),
            Cell::new("Moon [deg]"),
            Cell::new("HA [deg]"),
        ]);

        for i in self.row_order() {
            let field = &self.fields[i];
            let obs = field.observation.as_ref();
            let num = |v: Option<f64>| v.map(|x| format!("{x:.p$}")).unwrap_or_default();

            table.add_row(Row::from(vec![
                Cell::new(i).set_alignment(CellAlignment::Right),
                Cell::new(field.id()),
                Cell::new(field.priority).set_alignment(CellAlignment::Right),
                Cell::new(obs.map(|o| format_date(&o.date)).unwrap_or_default()),
                Cell::new(format!("{:.p$}", field.ra)).set_alignment(CellAlignment::Right),
                Cell::new(deg_to_dms(field.dec)).set_alignment(CellAlignment::Right),
                Cell::new(num(obs.map(|o| o.airmass))).set_alignment(CellAlignment::Right),
                Cell::new(num(obs.map(|o| o.slew))).set_alignment(CellAlignment::Right),
                Cell::new(num(obs.map(|o| o.moon_angle))).set_alignment(CellAlignment::Right),
                Cell::new(num(obs.map(|o| o.hour_angle))).set_alignment(CellAlignment::Right),
            ]));
        }
        table.to_string()
    }
}

/// Convenience constructors for [`FieldsDisplay`] on any slice of fields.
pub trait FieldsDisplayExt {
    /// Compact fixed-width listing.
    fn show(&self) -> FieldsDisplay<'_>;

    /// comfy-table rendering.
    fn table(&self) -> FieldsDisplay<'_>;
}

impl FieldsDisplayExt for [Field] {
    fn show(&self) -> FieldsDisplay<'_> {
        FieldsDisplay::new(self)
    }

    fn table(&self) -> FieldsDisplay<'_> {
        FieldsDisplay::new(self).table()
    }
}

impl fmt::Display for FieldsDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            DisplayMode::Compact => self.render_compact(f),
            DisplayMode::Table => writeln!(f, "{}", self.render_table()),
        }
    }
}

#[cfg(test)]
mod display_test {
    use super::*;
    use crate::field::Exposure;
    use crate::time::parse_date;

    fn sample() -> Vec<Field> {
        vec![
            Field::new(12, 1, "g", 10.0, -60.0).observed(Exposure {
                date: parse_date("2016/02/11 03:02:00").unwrap(),
                airmass: 1.234,
                slew: 0.0,
                moon_angle: 95.0,
                hour_angle: -3.5,
            }),
            Field::new(11, 1, "g", 12.0, -61.0),
            Field::new(10, 1, "g", 11.0, -60.5).observed(Exposure {
                date: parse_date("2016/02/11 03:00:00").unwrap(),
                airmass: 1.3,
                slew: 6.0,
                moon_angle: 90.0,
                hour_angle: -4.0,
            }),
        ]
    }

    #[test]
    fn test_compact_display() {
        let fields = sample();
        let out = fields.show().to_string();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("AIRMASS"));
        assert!(lines[1].contains("12-01-g"));
        assert!(lines[1].contains("2016/02/11 03:02:00.000"));
        assert!(lines[1].contains("1.23"));

        let out = fields.show().with_precision(3).to_string();
        assert!(out.contains("1.234"));
    }

    #[test]
    fn test_sorted_table() {
        let fields = sample();
        let out = fields.table().sorted().to_string();
        let first = out.find("10-01-g").unwrap();
        let second = out.find("12-01-g").unwrap();
        let third = out.find("11-01-g").unwrap();
        assert!(first < second && second < third);
        assert!(out.contains("-60:30:00.0"));
    }
}
