//! # obsplan
//!
//! Greedy, night-by-night field scheduling for wide-field imaging surveys.
//!
//! Given a catalog of candidate exposures, the observing windows of the survey and the
//! exposures already taken, the scheduler repeatedly picks the cheapest admissible field group
//! under a selectable [`ScoringMode`](selection::scoring::ScoringMode), stamps its exposures and
//! advances a simulated clock, until a time bound or the end of a window is reached.
//!
//! ## Modules
//!
//! - [`field`]: exposures, the target catalog, the observing history and their CSV files
//! - [`windows`]: observing windows and nite lookup
//! - [`selection`]: one selection step (geometry, constraints, scoring)
//! - [`scheduler`]: the time-stepping driver and its parameters
//! - [`ephemeris`]: the astronomy capability consumed by the scheduler
//! - [`survey`]: preparation of the target catalog from a list of pointings
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use camino::Utf8Path;
//! use obsplan::ephemeris::LowPrecisionEphemeris;
//! use obsplan::field::{io, TargetCatalog};
//! use obsplan::observatory::Observatory;
//! use obsplan::scheduler::{params::SchedulerParams, Scheduler};
//!
//! let catalog = TargetCatalog::new(io::read_fields(Utf8Path::new("target_fields.csv"))?);
//! let windows = io::read_windows(Utf8Path::new("observation_windows.csv"))?;
//! let completed = io::read_completed(&[])?;
//!
//! let scheduler = Scheduler::new(
//!     catalog,
//!     windows,
//!     Observatory::ctio(),
//!     LowPrecisionEphemeris,
//!     SchedulerParams::default(),
//! )?;
//! let mut state = scheduler.initial_state(completed);
//! let nites = scheduler.schedule_survey(&mut state, None)?;
//! # Ok::<(), obsplan::scheduler_errors::SchedulerError>(())
//! ```
pub mod constants;
pub mod conversion;
pub mod ephemeris;
pub mod field;
pub mod observatory;
pub mod projector;
pub mod scheduler;
pub mod scheduler_errors;
pub mod selection;
pub mod survey;
pub mod time;
pub mod windows;

pub use field::{CompletedFields, Field, FieldArray, FieldId, TargetCatalog};
pub use scheduler::{params::SchedulerParams, RunStatus, Scheduler, SchedulerState};
pub use scheduler_errors::SchedulerError;
