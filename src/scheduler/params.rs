//! # Scheduler parameters
//!
//! [`SchedulerParams`] gathers every tunable of the field selection and time stepping, with
//! the Blanco/DECam survey values as defaults.
//!
//! ## Groups
//!
//! - **Scoring**: the [`ScoringMode`] and the look-ahead used by `airmass2`.
//! - **Timing**: the wall-clock time of one exposure, the settle penalty charged after long
//!   slews, the idle gap after which the previous pointing is forgotten, and the default run
//!   and chunk lengths.
//! - **Cuts**: hard airmass ceiling, southern reach, hour-angle safety buffer.
//! - **Ad hoc nites**: offsets from sunset/sunrise used when a requested nite has no configured
//!   window.
//!
//! ## Example
//!
//! ```rust,no_run
//! use obsplan::scheduler::params::SchedulerParams;
//! use obsplan::selection::scoring::ScoringMode;
//!
//! let params = SchedulerParams::builder()
//!     .mode(ScoringMode::Balance3)
//!     .field_time(150.0)
//!     .default_chunk(30.0)
//!     .build()?;
//! println!("{params:#}");
//! # Ok::<(), obsplan::scheduler_errors::SchedulerError>(())
//! ```
//!
//! ## Configuration files
//!
//! Parameters can be read from TOML ([`SchedulerParams::from_toml_file`]); missing keys keep
//! their default, and the result goes through the same validation as the builder:
//!
//! ```toml
//! mode = "balance3"
//! field_time = 150.0
//! hour_angle_buffer = 2.0
//! ```
use std::cmp::Ordering::{Equal, Greater};
use std::fmt;
use std::fs;

use camino::Utf8Path;
use serde::Deserialize;

use crate::constants::{
    Degree, Hour, Minute, Second, AIRMASS_CEILING, AIRMASS_LOOKAHEAD, DEFAULT_CHUNK, DEFAULT_RUN,
    FIELDTIME, HOUR_ANGLE_BUFFER, SETTLE_PENALTY, SETTLE_SLEW, SLEW_RESET_GAP, SOUTHERN_REACH,
};
use crate::scheduler_errors::SchedulerError;
use crate::selection::scoring::ScoringMode;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerParams {
    // --- Scoring ---
    pub mode: ScoringMode,
    pub airmass_lookahead: Degree,

    // --- Timing ---
    pub field_time: Second,
    pub settle_slew: Degree,
    pub settle_penalty: Second,
    pub slew_reset_gap: Minute,
    pub default_run: Minute,
    pub default_chunk: Minute,

    // --- Cuts ---
    pub airmass_ceiling: f64,
    pub southern_reach: Degree,
    pub hour_angle_buffer: Degree,

    // --- Ad hoc nites ---
    pub fallback_start_offset: Hour,
    pub fallback_end_offset: Hour,
}

impl SchedulerParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> SchedulerParamsBuilder {
        SchedulerParamsBuilder::new()
    }

    /// Parse and validate parameters from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, SchedulerError> {
        let params: SchedulerParams = toml::from_str(text)?;
        SchedulerParamsBuilder { params }.build()
    }

    /// Read and validate parameters from a TOML file.
    pub fn from_toml_file(path: &Utf8Path) -> Result<Self, SchedulerError> {
        let params = Self::from_toml_str(&fs::read_to_string(path)?)?;
        tracing::debug!("Loaded scheduler parameters from {path}");
        Ok(params)
    }
}

impl Default for SchedulerParams {
    fn default() -> Self {
        SchedulerParams {
            mode: ScoringMode::Balance,
            airmass_lookahead: AIRMASS_LOOKAHEAD,

            field_time: FIELDTIME,
            settle_slew: SETTLE_SLEW,
            settle_penalty: SETTLE_PENALTY,
            slew_reset_gap: SLEW_RESET_GAP,
            default_run: DEFAULT_RUN,
            default_chunk: DEFAULT_CHUNK,

            airmass_ceiling: AIRMASS_CEILING,
            southern_reach: SOUTHERN_REACH,
            hour_angle_buffer: HOUR_ANGLE_BUFFER,

            fallback_start_offset: 1.0,
            fallback_end_offset: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SchedulerParamsBuilder {
    params: SchedulerParams,
}

impl SchedulerParamsBuilder {
    /// Create a new builder initialized with default values.
    pub fn new() -> Self {
        Self {
            params: SchedulerParams::default(),
        }
    }

    // --- Scoring ---
    pub fn mode(mut self, v: ScoringMode) -> Self {
        self.params.mode = v;
        self
    }
    pub fn airmass_lookahead(mut self, v: Degree) -> Self {
        self.params.airmass_lookahead = v;
        self
    }

    // --- Timing ---
    pub fn field_time(mut self, v: Second) -> Self {
        self.params.field_time = v;
        self
    }
    pub fn settle_slew(mut self, v: Degree) -> Self {
        self.params.settle_slew = v;
        self
    }
    pub fn settle_penalty(mut self, v: Second) -> Self {
        self.params.settle_penalty = v;
        self
    }
    pub fn slew_reset_gap(mut self, v: Minute) -> Self {
        self.params.slew_reset_gap = v;
        self
    }
    pub fn default_run(mut self, v: Minute) -> Self {
        self.params.default_run = v;
        self
    }
    pub fn default_chunk(mut self, v: Minute) -> Self {
        self.params.default_chunk = v;
        self
    }

    // --- Cuts ---
    pub fn airmass_ceiling(mut self, v: f64) -> Self {
        self.params.airmass_ceiling = v;
        self
    }
    pub fn southern_reach(mut self, v: Degree) -> Self {
        self.params.southern_reach = v;
        self
    }
    pub fn hour_angle_buffer(mut self, v: Degree) -> Self {
        self.params.hour_angle_buffer = v;
        self
    }

    // --- Ad hoc nites ---
    pub fn fallback_start_offset(mut self, v: Hour) -> Self {
        self.params.fallback_start_offset = v;
        self
    }
    pub fn fallback_end_offset(mut self, v: Hour) -> Self {
        self.params.fallback_end_offset = v;
        self
    }

    /// Return true iff x > 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn gt0(x: f64) -> bool {
        x.partial_cmp(&0.0) == Some(Greater)
    }

    /// Return true iff x >= 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn ge0(x: f64) -> bool {
        matches!(x.partial_cmp(&0.0), Some(Greater) | Some(Equal))
    }

    /// Finalize the builder and produce a [`SchedulerParams`] instance.
    ///
    /// Validation rules
    /// -----------------
    /// * `field_time > 0`, `default_run > 0`, `default_chunk > 0` – the clock must move forward.
    /// * `settle_slew >= 0`, `settle_penalty >= 0`, `slew_reset_gap >= 0`.
    /// * `airmass_ceiling >= 1` – no target can be observed below airmass 1.
    /// * `-90 <= southern_reach <= 90`.
    /// * `hour_angle_buffer >= 0`, `airmass_lookahead >= 0`.
    /// * `fallback_start_offset`, `fallback_end_offset` finite (negative values widen the
    ///   ad hoc window past sunset/sunrise).
    ///
    /// Returns
    /// -----------------
    /// * `Ok(SchedulerParams)` if all values are valid.
    /// * `Err(SchedulerError::InvalidParameter)` naming the first failing rule.
    pub fn build(self) -> Result<SchedulerParams, SchedulerError> {
        let p = &self.params;
        let invalid = |msg: &str| Err(SchedulerError::InvalidParameter(msg.into()));

        // --- Strictly positive durations ---
        if !Self::gt0(p.field_time) {
            return invalid("field_time must be > 0");
        }
        if !Self::gt0(p.default_run) || !Self::gt0(p.default_chunk) {
            return invalid("default_run and default_chunk must be > 0");
        }

        // --- Non-negative thresholds ---
        if !Self::ge0(p.settle_slew) || !Self::ge0(p.settle_penalty) {
            return invalid("settle_slew and settle_penalty must be >= 0");
        }
        if !Self::ge0(p.slew_reset_gap) {
            return invalid("slew_reset_gap must be >= 0");
        }
        if !Self::ge0(p.hour_angle_buffer) {
            return invalid("hour_angle_buffer must be >= 0");
        }
        if !Self::ge0(p.airmass_lookahead) {
            return invalid("airmass_lookahead must be >= 0");
        }

        // --- Cuts ---
        if !Self::ge0(p.airmass_ceiling - 1.0) {
            return invalid("airmass_ceiling must be >= 1");
        }
        if !(-90.0..=90.0).contains(&p.southern_reach) {
            return invalid("southern_reach must lie in [-90, 90]");
        }

        if !p.fallback_start_offset.is_finite() || !p.fallback_end_offset.is_finite() {
            return invalid("fallback offsets must be finite");
        }

        Ok(self.params)
    }
}

impl fmt::Display for SchedulerParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            const PARAM_COL: usize = 40; // width reserved for "name = value"
            writeln!(f, "Scheduler Parameters")?;
            writeln!(f, "--------------------")?;

            macro_rules! line {
                ($fmt:expr, $val:expr, $comment:expr) => {{
                    let s = format!($fmt, $val);
                    let pad = if s.len() < PARAM_COL {
                        " ".repeat(PARAM_COL - s.len())
                    } else {
                        " ".to_string()
                    };
                    writeln!(f, "  {}{}# {}", s, pad, $comment)
                }};
            }

            writeln!(f, "[Scoring]")?;
            line!("mode                  = {}", self.mode, "Cost function")?;
            line!(
                "airmass_lookahead     = {:.2} deg",
                self.airmass_lookahead,
                "Zenith advance for airmass2"
            )?;

            writeln!(f, "\n[Timing]")?;
            line!(
                "field_time            = {:.1} s",
                self.field_time,
                "Exposure + overhead"
            )?;
            line!(
                "settle_slew           = {:.2} deg",
                self.settle_slew,
                "Slew triggering the settle penalty"
            )?;
            line!(
                "settle_penalty        = {:.1} s",
                self.settle_penalty,
                "Added once per field group"
            )?;
            line!(
                "slew_reset_gap        = {:.1} min",
                self.slew_reset_gap,
                "Idle time forgetting the last pointing"
            )?;
            line!(
                "default_run           = {:.1} min",
                self.default_run,
                "Run length without stop time"
            )?;
            line!(
                "default_chunk         = {:.1} min",
                self.default_chunk,
                "Chunk length of nite scheduling"
            )?;

            writeln!(f, "\n[Cuts]")?;
            line!(
                "airmass_ceiling       = {:.2}",
                self.airmass_ceiling,
                "Hard airmass limit"
            )?;
            line!(
                "southern_reach        = {:.2} deg",
                self.southern_reach,
                "Southernmost declination"
            )?;
            line!(
                "hour_angle_buffer     = {:.2} deg",
                self.hour_angle_buffer,
                "Subtracted from the HA limit table"
            )?;

            writeln!(f, "\n[Ad hoc nites]")?;
            line!(
                "fallback_start_offset = {:.2} h",
                self.fallback_start_offset,
                "After sunset"
            )?;
            line!(
                "fallback_end_offset   = {:.2} h",
                self.fallback_end_offset,
                "Before sunrise"
            )?;

            Ok(())
        } else {
            write!(
                f,
                "SchedulerParams(mode={}, field_time={:.0}s, settle={:.0}s@{:.1}deg, reset_gap={:.0}min, airmass<{:.2}, dec>{:.1}, ha_buffer={:.2}deg)",
                self.mode,
                self.field_time,
                self.settle_penalty,
                self.settle_slew,
                self.slew_reset_gap,
                self.airmass_ceiling,
                self.southern_reach,
                self.hour_angle_buffer
            )
        }
    }
}
