//! # Observation windows
//!
//! An [`ObservationWindow`] is a permitted observing interval, usually one night.
//! [`ObservationWindows`] is the configured list of them.
//!
//! A window ending before it starts is rejected with [`SchedulerError::InvalidWindow`].
//! Windows are expected to be sorted and disjoint; when they are not, a warning is logged and
//! the list is kept as given.
use std::fmt;

use hifitime::Epoch;

use crate::constants::Degree;
use crate::scheduler_errors::SchedulerError;
use crate::time::{format_date, Nite};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservationWindow {
    pub start: Epoch,
    pub end: Epoch,
}

impl ObservationWindow {
    pub fn new(start: Epoch, end: Epoch) -> Result<Self, SchedulerError> {
        if end < start {
            return Err(SchedulerError::InvalidWindow {
                start: format_date(&start),
                end: format_date(&end),
            });
        }
        Ok(ObservationWindow { start, end })
    }

    /// Whether `date` lies in `[start, end]`.
    pub fn contains(&self, date: &Epoch) -> bool {
        self.start <= *date && *date <= self.end
    }

    /// The nite this window opens, for a site at `longitude`.
    pub fn nite(&self, longitude: Degree) -> Nite {
        Nite::from_epoch(&self.start, longitude)
    }
}

impl fmt::Display for ObservationWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -- {}", format_date(&self.start), format_date(&self.end))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationWindows {
    windows: Vec<ObservationWindow>,
}

impl ObservationWindows {
    /// Collect windows, checking each one and logging ordering problems.
    ///
    /// Return
    /// ------
    /// * [`SchedulerError::InvalidWindow`] for the first window ending before it starts
    pub fn new(windows: Vec<ObservationWindow>) -> Result<Self, SchedulerError> {
        for w in &windows {
            ObservationWindow::new(w.start, w.end)?;
        }

        tracing::info!("{} observation window(s)", windows.len());
        for w in &windows {
            tracing::debug!("  {w}");
        }

        for pair in windows.windows(2) {
            let (previous, next) = (&pair[0], &pair[1]);
            if next.start < previous.start {
                tracing::warn!("Observation windows are not sorted: {next} starts before {previous}");
            } else if next.start < previous.end {
                tracing::warn!("Observation windows overlap: {previous} and {next}");
            }
        }

        Ok(ObservationWindows { windows })
    }

    /// Whether any window contains `date` (bounds included).
    pub fn contains(&self, date: &Epoch) -> bool {
        self.windows.iter().any(|w| w.contains(date))
    }

    /// The first window whose start falls on `nite`, for a site at `longitude`.
    pub fn find_nite(&self, nite: &Nite, longitude: Degree) -> Option<&ObservationWindow> {
        self.windows.iter().find(|w| w.nite(longitude) == *nite)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ObservationWindow> {
        self.windows.iter()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

impl<'a> IntoIterator for &'a ObservationWindows {
    type Item = &'a ObservationWindow;
    type IntoIter = std::slice::Iter<'a, ObservationWindow>;

    fn into_iter(self) -> Self::IntoIter {
        self.windows.iter()
    }
}
