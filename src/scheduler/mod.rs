//! # Time-stepping scheduler
//!
//! [`Scheduler`] drives a simulated clock through observing time, one greedy
//! [`select_field`] step after the other.
//!
//! ## Operations
//!
//! | operation | interval | window check |
//! |---|---|---|
//! | [`Scheduler::run`] | `[tstart, tstop]` (default length `default_run`) | stop (`clip`) or warn |
//! | [`Scheduler::schedule_chunk`] | `[tstart, tstart + chunk]` | same as `run` |
//! | [`Scheduler::schedule_nite`] | the window of one nite, in chunks | caller's choice |
//! | [`Scheduler::schedule_survey`] | every configured window | always clipped |
//!
//! ## State
//!
//! Everything that changes while scheduling lives in a [`SchedulerState`] owned by the caller
//! and passed by `&mut` reference: the observing history, the exposures of the last `run`, the
//! clock and the [`RunStatus`]. The scheduler itself (catalog, windows, site, ephemeris,
//! parameters) is never mutated, so a state can be cloned to try alternatives and a failed
//! call keeps everything committed before the failure.
//!
//! ```text
//!          run()                clock > tstop
//!   Idle ─────────► Running ─────────────────► Completed
//!                      │  clock > tstop, nothing admissible
//!                      ├─────────────────────► Exhausted
//!                      │  out of window & clip
//!                      ├─────────────────────► Clipped
//!                      │  error
//!                      └─────────────────────► Aborted
//! ```
//!
//! ## Run loop
//!
//! At each step the clock is checked against the observation windows, the previous pointing is
//! forgotten if the last exposure is older than `slew_reset_gap`, and the selected group is
//! committed. The clock then moves to the end of the group's last exposure. When no candidate
//! is admissible the clock idles for one `field_time` and the loop goes on, so a run always ends
//! on its time bound. Idle steps are counted in [`SchedulerState::idle_steps`]; a run that reaches
//! its stop time without committing anything because nothing was admissible ends
//! [`RunStatus::Exhausted`].
pub mod params;

use std::collections::BTreeMap;

use hifitime::Epoch;

use crate::constants::{Degree, Minute};
use crate::ephemeris::Ephemeris;
use crate::field::{CompletedFields, FieldArray, TargetCatalog};
use crate::observatory::Observatory;
use crate::scheduler_errors::SchedulerError;
use crate::selection::constraints::{ConstraintFilter, PointingLimits};
use crate::selection::geometry::SkySnapshot;
use crate::selection::select_field;
use crate::time::{format_date, hours, minutes, seconds, Nite};
use crate::windows::{ObservationWindow, ObservationWindows};

use params::SchedulerParams;

/// Where the last `run` stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunStatus {
    #[default]
    Idle,
    Running,
    /// The clock passed the stop time.
    Completed,
    /// The clock passed the stop time without a single admissible candidate.
    Exhausted,
    /// The clock left the observation windows with clipping enabled.
    Clipped,
    /// The run stopped on an error.
    Aborted,
}

/// Mutable scheduling state, owned by the caller.
#[derive(Debug, Clone, Default)]
pub struct SchedulerState {
    /// Every observed exposure, prior nights included
    pub completed: CompletedFields,
    /// Exposures committed by the last `run`
    pub scheduled: FieldArray,
    /// Simulated time, `None` before the first run
    pub clock: Option<Epoch>,
    pub status: RunStatus,
    /// Steps of the last `run` that found no admissible field
    pub idle_steps: usize,
}

impl SchedulerState {
    pub fn new(completed: CompletedFields) -> Self {
        SchedulerState {
            completed,
            ..Default::default()
        }
    }
}

/// Greedy field scheduler over a fixed catalog, window list and site.
#[derive(Debug, Clone)]
pub struct Scheduler<E: Ephemeris> {
    catalog: TargetCatalog,
    windows: ObservationWindows,
    observatory: Observatory,
    ephemeris: E,
    constraints: ConstraintFilter,
    params: SchedulerParams,
}

impl<E: Ephemeris> Scheduler<E> {
    /// Create a scheduler with the Blanco pointing limits.
    ///
    /// Arguments
    /// ---------
    /// * `catalog`: candidate exposures
    /// * `windows`: permitted observing intervals (may be empty)
    /// * `observatory`: the site
    /// * `ephemeris`: astronomy provider
    /// * `params`: validated scheduler parameters
    pub fn new(
        catalog: TargetCatalog,
        windows: ObservationWindows,
        observatory: Observatory,
        ephemeris: E,
        params: SchedulerParams,
    ) -> Result<Self, SchedulerError> {
        let limits = PointingLimits::blanco(params.hour_angle_buffer)?;
        let constraints =
            ConstraintFilter::new(limits, params.airmass_ceiling, params.southern_reach);

        tracing::info!(
            "Scheduler at {observatory}: {} candidate fields, {} window(s), mode {}",
            catalog.len(),
            windows.len(),
            params.mode
        );

        Ok(Scheduler {
            catalog,
            windows,
            observatory,
            ephemeris,
            constraints,
            params,
        })
    }

    /// Replace the pointing limit tables.
    pub fn with_limits(mut self, limits: PointingLimits) -> Self {
        self.constraints.limits = limits;
        self
    }

    pub fn catalog(&self) -> &TargetCatalog {
        &self.catalog
    }

    pub fn windows(&self) -> &ObservationWindows {
        &self.windows
    }

    pub fn observatory(&self) -> &Observatory {
        &self.observatory
    }

    pub fn ephemeris(&self) -> &E {
        &self.ephemeris
    }

    pub fn constraints(&self) -> &ConstraintFilter {
        &self.constraints
    }

    pub fn params(&self) -> &SchedulerParams {
        &self.params
    }

    /// A fresh state seeded with prior observations.
    pub fn initial_state(&self, completed: CompletedFields) -> SchedulerState {
        SchedulerState::new(completed)
    }

    /// Zenith and Moon at `date`.
    pub fn sky(&self, date: &Epoch) -> SkySnapshot {
        let (zenith_ra, zenith_dec) = self.ephemeris.zenith_ra_dec(&self.observatory, date);
        let (moon_ra, moon_dec, moon_phase) = self.ephemeris.moon_ra_dec_phase(date);
        SkySnapshot {
            zenith_ra,
            zenith_dec,
            moon_ra,
            moon_dec,
            moon_phase,
        }
    }

    /// Pointing slews are measured from, unless the last exposure is too old.
    fn previous_pointing(
        &self,
        completed: &CompletedFields,
        date: &Epoch,
    ) -> Option<(Degree, Degree)> {
        let last = completed.last()?;
        let last_date = last.date()?;
        if *date - *last_date > minutes(self.params.slew_reset_gap) {
            None
        } else {
            Some((last.ra, last.dec))
        }
    }

    /// Schedule exposures from `tstart` until the clock passes `tstop`.
    ///
    /// Arguments
    /// ---------
    /// * `state`: scheduling state; its `scheduled` list is reset, its history extended
    /// * `tstart`: first selection instant
    /// * `tstop`: stop time, `tstart + default_run` when `None`
    /// * `clip`: stop as soon as the clock leaves the observation windows (otherwise only warn)
    ///
    /// Return
    /// ------
    /// * the exposures committed by this run, in time order, or
    ///   [`SchedulerError::InvalidInterval`] when `tstop < tstart`
    pub fn run(
        &self,
        state: &mut SchedulerState,
        tstart: Epoch,
        tstop: Option<Epoch>,
        clip: bool,
    ) -> Result<FieldArray, SchedulerError> {
        let tstop = tstop.unwrap_or(tstart + minutes(self.params.default_run));
        if tstop < tstart {
            return Err(SchedulerError::InvalidInterval {
                tstart: format_date(&tstart),
                tstop: format_date(&tstop),
            });
        }

        tracing::debug!("Run {} -- {}", format_date(&tstart), format_date(&tstop));
        state.scheduled.clear();
        state.status = RunStatus::Running;
        state.idle_steps = 0;

        let field_time = seconds(self.params.field_time);
        let mut clock = tstart;

        loop {
            state.clock = Some(clock);

            if !self.windows.contains(&clock) {
                if clip {
                    tracing::debug!("{} is outside the observation windows", format_date(&clock));
                    state.status = RunStatus::Clipped;
                    break;
                }
                tracing::warn!("Date outside of nominal observing windows: {}", format_date(&clock));
            }

            let previous = self.previous_pointing(&state.completed, &clock);
            let sky = self.sky(&clock);
            let selection = select_field(
                &self.catalog,
                &state.completed,
                &self.constraints,
                &self.params,
                &sky,
                clock,
                previous,
            );

            match selection {
                Ok(group) => {
                    for field in &group {
                        if let Some(obs) = &field.observation {
                            tracing::info!(
                                "{}  {}  airmass={:.3}  slew={:.2}",
                                format_date(&obs.date),
                                field.id(),
                                obs.airmass,
                                obs.slew
                            );
                        }
                    }
                    if let Some(last) = group.last().and_then(|f| f.date()) {
                        clock = *last + field_time;
                    }
                    state.completed.extend(group.iter().cloned());
                    state.scheduled.extend(group);
                }
                Err(SchedulerError::NoAdmissibleField { date }) => {
                    if state.idle_steps == 0 {
                        tracing::warn!("No admissible field at {date}, idling");
                    }
                    state.idle_steps += 1;
                    clock = clock + field_time;
                }
                Err(e) => {
                    state.status = RunStatus::Aborted;
                    return Err(e);
                }
            }

            if clock > tstop {
                state.clock = Some(clock);
                state.status = if state.scheduled.is_empty() && state.idle_steps > 0 {
                    tracing::warn!(
                        "Nothing admissible between {} and {}",
                        format_date(&tstart),
                        format_date(&tstop)
                    );
                    RunStatus::Exhausted
                } else {
                    RunStatus::Completed
                };
                break;
            }
        }

        Ok(state.scheduled.clone())
    }

    /// Chunk length to use, rejecting non-positive or non-finite lengths.
    fn chunk_length(&self, chunk: Option<Minute>) -> Result<Minute, SchedulerError> {
        match chunk.unwrap_or(self.params.default_chunk) {
            chunk if chunk.is_finite() && chunk > 0.0 => Ok(chunk),
            chunk => Err(SchedulerError::InvalidParameter(format!(
                "chunk length must be a positive number of minutes, got {chunk}"
            ))),
        }
    }

    /// Run over `[tstart, tstart + chunk]`, `chunk` in minutes (default `default_chunk`).
    pub fn schedule_chunk(
        &self,
        state: &mut SchedulerState,
        tstart: Epoch,
        chunk: Option<Minute>,
        clip: bool,
    ) -> Result<FieldArray, SchedulerError> {
        let chunk = self.chunk_length(chunk)?;
        self.run(state, tstart, Some(tstart + minutes(chunk)), clip)
    }

    /// Observing window of `nite`: the configured one if any, otherwise from one hour
    /// (`fallback_start_offset`) after sunset to one hour (`fallback_end_offset`) before the
    /// next sunrise.
    pub fn nite_window(&self, nite: &Nite) -> Result<ObservationWindow, SchedulerError> {
        let longitude = self.observatory.longitude;
        if let Some(window) = self.windows.find_nite(nite, longitude) {
            return Ok(*window);
        }

        let known: Vec<String> = self
            .windows
            .iter()
            .map(|w| w.nite(longitude).to_string())
            .collect();
        tracing::warn!(
            "Requested nite not found in windows: {nite} : [{}]",
            known.join(", ")
        );

        let noon = nite.local_noon(longitude);
        let sunset = self.ephemeris.next_sunset(&self.observatory, &noon)?;
        let start = sunset + hours(self.params.fallback_start_offset);
        let sunrise = self.ephemeris.next_sunrise(&self.observatory, &start)?;
        let end = sunrise - hours(self.params.fallback_end_offset);

        let window = ObservationWindow::new(start, end)?;
        tracing::debug!("Ad hoc window for {nite}: {window}");
        Ok(window)
    }

    fn schedule_window(
        &self,
        state: &mut SchedulerState,
        window: &ObservationWindow,
        chunk: Minute,
        clip: bool,
    ) -> Result<Vec<FieldArray>, SchedulerError> {
        let mut chunks = Vec::new();
        let mut start = window.start;
        let mut i = 0;

        while start < window.end {
            i += 1;
            tracing::debug!("Scheduling {} -- Chunk {i}", format_date(&start));
            let end = start + minutes(chunk);
            chunks.push(self.run(state, start, Some(end), clip)?);

            start = match state.clock {
                Some(clock) if clock > end => clock,
                _ => end,
            };
        }
        Ok(chunks)
    }

    /// Schedule one nite in successive chunks.
    ///
    /// Arguments
    /// ---------
    /// * `state`: scheduling state
    /// * `nite`: the nite to schedule
    /// * `chunk`: chunk length in minutes (default `default_chunk`)
    /// * `clip`: forwarded to every [`run`](Self::run)
    ///
    /// Return
    /// ------
    /// * the exposures of each chunk, in order, or [`SchedulerError::InvalidParameter`] when
    ///   the chunk length is not a positive number of minutes
    pub fn schedule_nite(
        &self,
        state: &mut SchedulerState,
        nite: &Nite,
        chunk: Option<Minute>,
        clip: bool,
    ) -> Result<Vec<FieldArray>, SchedulerError> {
        let chunk = self.chunk_length(chunk)?;
        let window = self.nite_window(nite)?;
        tracing::info!("Scheduling nite {nite}: {window}");
        self.schedule_window(state, &window, chunk, clip)
    }

    /// Schedule every configured window, clipped to the windows.
    ///
    /// Return
    /// ------
    /// * the chunks of each nite, keyed by nite
    pub fn schedule_survey(
        &self,
        state: &mut SchedulerState,
        chunk: Option<Minute>,
    ) -> Result<BTreeMap<Nite, Vec<FieldArray>>, SchedulerError> {
        let chunk = self.chunk_length(chunk)?;
        let mut nites: BTreeMap<Nite, Vec<FieldArray>> = BTreeMap::new();

        for window in &self.windows {
            let nite = window.nite(self.observatory.longitude);
            tracing::info!("Scheduling nite {nite}: {window}");
            let chunks = self.schedule_window(state, window, chunk, true)?;
            tracing::info!(
                "Nite {nite}: {} exposures",
                chunks.iter().map(Vec::len).sum::<usize>()
            );
            nites.entry(nite).or_default().extend(chunks);
        }
        Ok(nites)
    }
}
