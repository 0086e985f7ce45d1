//! Per-cell occupancy bookkeeping.

use std::time::Duration;

use grid_tactics_core::{CellDisplay, Occupancy, ReconcileMode};

/// Input that may change a cell's occupancy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum OccupancySignal {
    /// A unit-tagged body began overlapping the cell.
    Entered,
    /// A unit-tagged body stopped overlapping the cell.
    Exited,
    /// A reconciliation probe observed the cell.
    Observed {
        /// Whether the probe found a unit on the cell.
        occupied: bool,
    },
}

/// Occupancy state reached after a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Transition {
    pub(crate) occupancy: Occupancy,
    pub(crate) occupants: u32,
    pub(crate) display: CellDisplay,
}

/// Occupancy tracker owned by a single cell.
///
/// Enter/exit events and reconciliation probes are two independent writers;
/// both go through [`OccupancyTracker::record`], which keeps
/// `occupied == (occupants > 0)` after every call.
#[derive(Clone, Debug)]
pub struct OccupancyTracker {
    occupancy: Occupancy,
    occupants: u32,
    since_check: Duration,
    startup_pending: bool,
    forced_pending: bool,
}

impl OccupancyTracker {
    pub(crate) fn new() -> Self {
        Self {
            occupancy: Occupancy::Empty,
            occupants: 0,
            since_check: Duration::ZERO,
            startup_pending: true,
            forced_pending: false,
        }
    }

    /// Current occupancy state.
    #[must_use]
    pub const fn occupancy(&self) -> Occupancy {
        self.occupancy
    }

    /// Reports whether at least one unit stands on the cell.
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        self.occupancy.is_occupied()
    }

    /// Number of unit bodies currently counted on the cell.
    #[must_use]
    pub const fn occupants(&self) -> u32 {
        self.occupants
    }

    /// Display state derived from the occupancy.
    #[must_use]
    pub const fn display(&self) -> CellDisplay {
        CellDisplay::for_occupancy(self.occupancy)
    }

    /// Applies a signal and reports the new state if the occupancy flipped.
    pub(crate) fn record(&mut self, signal: OccupancySignal) -> Option<Transition> {
        let before = self.occupancy;
        match signal {
            OccupancySignal::Entered => self.occupants = self.occupants.saturating_add(1),
            OccupancySignal::Exited => self.occupants = self.occupants.saturating_sub(1),
            OccupancySignal::Observed { occupied } => {
                if occupied != before.is_occupied() {
                    self.occupants = u32::from(occupied);
                }
            }
        }
        self.occupancy = Occupancy::from_count(self.occupants);

        (self.occupancy != before).then_some(Transition {
            occupancy: self.occupancy,
            occupants: self.occupants,
            display: self.display(),
        })
    }

    /// Accumulates simulated time and reports which probe, if any, is due.
    pub(crate) fn advance(&mut self, dt: Duration, interval: Duration) -> Option<ReconcileMode> {
        if self.startup_pending {
            self.startup_pending = false;
            self.since_check = Duration::ZERO;
            return Some(ReconcileMode::Startup);
        }

        self.since_check = self.since_check.saturating_add(dt);
        if self.since_check >= interval {
            self.since_check = Duration::ZERO;
            return Some(ReconcileMode::Periodic);
        }
        None
    }

    pub(crate) fn request_forced_check(&mut self) {
        self.forced_pending = true;
    }

    pub(crate) fn take_forced_check(&mut self) -> bool {
        std::mem::take(&mut self.forced_pending)
    }
}
