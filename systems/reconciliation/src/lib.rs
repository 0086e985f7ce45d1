#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Reconciliation system that re-derives cell occupancy from spatial probes.
//!
//! Enter/exit notifications can be missed when bodies teleport or when a cell
//! is created underneath a unit. The world therefore schedules probes through
//! [`Event::ReconciliationDue`]; this system answers each of them with a
//! [`Command::ReconcileOccupancy`] built from live [`SpatialQuery`] results.

use glam::Vec3;
use grid_tactics_core::{Aabb, Command, Event, Ray, ReconcileMode, SpatialQuery};
use tracing::debug;

/// Pure system that turns scheduled probes into occupancy observations.
#[derive(Debug, Default)]
pub struct Reconciler {
    probes_run: u64,
}

impl Reconciler {
    /// Creates a reconciler that has not run any probe yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers every [`Event::ReconciliationDue`] in `events` with an observation.
    pub fn handle<Q>(&mut self, events: &[Event], spatial: &Q, out: &mut Vec<Command>)
    where
        Q: SpatialQuery + ?Sized,
    {
        for event in events {
            if let Event::ReconciliationDue {
                cell,
                position,
                mode,
            } = event
            {
                let occupied = probe(spatial, *position, *mode);
                self.probes_run = self.probes_run.saturating_add(1);
                debug!(?cell, ?mode, occupied, "occupancy probed");
                out.push(Command::ReconcileOccupancy {
                    cell: *cell,
                    occupied,
                });
            }
        }
    }

    /// Number of probes answered since construction.
    #[must_use]
    pub const fn probes_run(&self) -> u64 {
        self.probes_run
    }
}

/// Reports whether a unit-tagged body stands on the cell at `position`.
///
/// Every mode runs the overlap probe. The startup pass additionally casts a
/// short ray upwards when the overlap finds nothing.
pub fn probe<Q>(spatial: &Q, position: Vec3, mode: ReconcileMode) -> bool
where
    Q: SpatialQuery + ?Sized,
{
    let overlapping = spatial
        .overlap(&Aabb::occupancy_probe(position))
        .iter()
        .any(|body| body.tag.is_unit());
    if overlapping || mode != ReconcileMode::Startup {
        return overlapping;
    }

    spatial
        .raycast(&Ray::upward_probe(position))
        .iter()
        .any(|hit| hit.tag.is_unit())
}
