#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Grid Tactics.
//!
//! The world owns the board, the occupancy tracker of every cell and the
//! unit registry. It changes only through [`apply`] and is read only through
//! the [`query`] module.

mod board;
mod occupancy;
mod units;

use std::time::Duration;

use glam::Vec3;
use grid_tactics_core::{
    BoardGeneration, CellId, Command, Event, MoveRange, ReconcileMode, SetupError, Spacing,
    SpawnRejection, TeamId, UnitId, DEFAULT_RECONCILE_INTERVAL, MOVE_CLEARANCE,
};
use grid_tactics_system_formation::FormationCatalog;
use tracing::{debug, info, warn};

pub use board::{BoardBuilder, CellPlacement};
pub use occupancy::OccupancyTracker;

use board::Board;
use occupancy::{OccupancySignal, Transition};
use units::UnitRegistry;

/// Represents the authoritative Grid Tactics world state.
#[derive(Debug)]
pub struct World {
    builder: BoardBuilder,
    board: Board,
    units: UnitRegistry,
    reconcile_interval: Duration,
}

impl World {
    /// Creates an empty world backed by the standard formation catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::with_catalog(FormationCatalog::standard())
    }

    /// Creates an empty world backed by a custom formation catalog.
    #[must_use]
    pub fn with_catalog(catalog: FormationCatalog) -> Self {
        Self {
            builder: BoardBuilder::new(catalog),
            board: Board::new(),
            units: UnitRegistry::new(),
            reconcile_interval: DEFAULT_RECONCILE_INTERVAL,
        }
    }

    /// Overrides the simulated time between periodic reconciliation passes.
    #[must_use]
    pub fn with_reconcile_interval(mut self, interval: Duration) -> Self {
        self.reconcile_interval = interval;
        self
    }

    fn relink_units(&mut self, out_events: &mut Vec<Event>) {
        for unit in self.units.iter_mut() {
            let cell = self.board.cell_under(unit.position);
            if unit.cell != cell {
                unit.cell = cell;
                out_events.push(Event::UnitRelinked {
                    unit: unit.id,
                    cell,
                });
            }
        }
    }

    fn record_occupancy(
        &mut self,
        cell: CellId,
        signal: OccupancySignal,
        out_events: &mut Vec<Event>,
    ) {
        let Some(target) = self.board.cell_mut(cell) else {
            debug!(?cell, ?signal, "ignoring occupancy signal for stale cell");
            return;
        };

        if let Some(Transition {
            occupancy,
            occupants,
            display,
        }) = target.tracker.record(signal)
        {
            debug!(?cell, ?occupancy, occupants, "cell occupancy changed");
            out_events.push(Event::OccupancyChanged {
                cell,
                occupancy,
                occupants,
                display,
            });
        }

        if matches!(signal, OccupancySignal::Observed { .. }) && target.tracker.take_forced_check()
        {
            out_events.push(Event::CellDisplayRefreshed {
                cell,
                display: target.tracker.display(),
            });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Discards the current board and lays out a new one.
///
/// On failure the board is left empty and the error is returned; the matching
/// [`Event::BoardRebuildRejected`] is still pushed to `out_events`.
pub fn rebuild_board(
    world: &mut World,
    team_size: u32,
    spacing: Spacing,
    out_events: &mut Vec<Event>,
) -> Result<BoardGeneration, SetupError> {
    if let Some(generation) = world.board.clear() {
        out_events.push(Event::BoardCleared { generation });
    }

    let result = world.builder.layout(team_size, &spacing);
    let outcome = match result {
        Ok(placements) => {
            world.board.populate(spacing, placements);
            let generation = world.board.generation();
            let cell_count = world.board.cells().len();
            info!(team_size, cell_count, generation = generation.get(), "board rebuilt");
            out_events.push(Event::BoardRebuilt {
                generation,
                cell_count,
            });
            Ok(generation)
        }
        Err(reason) => {
            warn!(team_size, %reason, "board rebuild rejected");
            out_events.push(Event::BoardRebuildRejected { team_size, reason });
            Err(reason)
        }
    };

    world.relink_units(out_events);
    outcome
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::RebuildBoard { team_size, spacing } => {
            let _ = rebuild_board(world, team_size, spacing, out_events);
        }
        Command::SpawnUnit {
            team,
            cell,
            move_range,
        } => spawn_unit(world, team, cell, move_range, out_events),
        Command::Tick { dt } => {
            let interval = world.reconcile_interval;
            for cell in world.board.cells_mut() {
                if let Some(mode) = cell.tracker.advance(dt, interval) {
                    out_events.push(Event::ReconciliationDue {
                        cell: cell.id,
                        position: cell.position,
                        mode,
                    });
                }
            }
        }
        Command::BodyEntered { cell, body } => {
            if body.tag.is_unit() {
                world.record_occupancy(cell, OccupancySignal::Entered, out_events);
            }
        }
        Command::BodyExited { cell, body } => {
            if body.tag.is_unit() {
                world.record_occupancy(cell, OccupancySignal::Exited, out_events);
            }
        }
        Command::ReconcileOccupancy { cell, occupied } => {
            world.record_occupancy(cell, OccupancySignal::Observed { occupied }, out_events);
        }
        Command::ForceCheck { cell } => {
            let Some(target) = world.board.cell_mut(cell) else {
                debug!(?cell, "ignoring forced check for stale cell");
                return;
            };
            target.tracker.request_forced_check();
            out_events.push(Event::ReconciliationDue {
                cell,
                position: target.position,
                mode: ReconcileMode::Forced,
            });
        }
        Command::CaptureReturnAnchor { unit } => {
            if let Some(state) = world.units.get_mut(unit) {
                state.anchor = state.position;
                out_events.push(Event::ReturnAnchorCaptured {
                    unit,
                    anchor: state.anchor,
                });
            }
        }
        Command::MoveUnit { unit, cell } => move_unit(world, unit, cell, out_events),
        Command::TriggerBattle { attacker, defender } => {
            if world.units.get(defender).is_none() {
                warn!(?attacker, ?defender, "battle requested against unknown unit");
                return;
            }
            let Some(state) = world.units.get_mut(attacker) else {
                warn!(?attacker, ?defender, "battle requested by unknown unit");
                return;
            };
            state.has_moved = true;
            state.animating = true;
            info!(?attacker, ?defender, "battle triggered");
            out_events.push(Event::BattleTriggered { attacker, defender });
        }
        Command::AdjustMoveRange { unit, delta } => {
            if let Some(state) = world.units.get_mut(unit) {
                state.move_range = state.move_range.adjusted(delta);
                debug!(?unit, range = state.move_range.get(), "move range adjusted");
                out_events.push(Event::MoveRangeChanged {
                    unit,
                    range: state.move_range,
                });
            }
        }
        Command::ResetTurn { unit } => {
            if let Some(state) = world.units.get_mut(unit) {
                state.has_moved = false;
                out_events.push(Event::TurnReset { unit });
            }
        }
        Command::AnimationCompleted { unit } => {
            if let Some(state) = world.units.get_mut(unit) {
                if std::mem::take(&mut state.animating) {
                    out_events.push(Event::AnimationSettled { unit });
                }
            }
        }
    }
}

fn spawn_unit(
    world: &mut World,
    team: TeamId,
    cell: CellId,
    move_range: MoveRange,
    out_events: &mut Vec<Event>,
) {
    let Some(target) = world.board.cell(cell) else {
        out_events.push(Event::UnitSpawnRejected {
            team,
            cell,
            reason: SpawnRejection::UnknownCell,
        });
        return;
    };
    if world.units.linked_to(cell).is_some() {
        out_events.push(Event::UnitSpawnRejected {
            team,
            cell,
            reason: SpawnRejection::CellTaken,
        });
        return;
    }

    let position = resting_position(target.position);
    let unit = world.units.insert(team, cell, position, move_range);
    debug!(?unit, ?team, ?cell, "unit spawned");
    out_events.push(Event::UnitSpawned {
        unit,
        team,
        cell,
        position,
    });
}

fn move_unit(world: &mut World, unit: UnitId, cell: CellId, out_events: &mut Vec<Event>) {
    let Some(target) = world.board.cell(cell) else {
        warn!(?unit, ?cell, "move requested onto stale cell");
        return;
    };
    let position = resting_position(target.position);
    let Some(state) = world.units.get_mut(unit) else {
        warn!(?unit, ?cell, "move requested for unknown unit");
        return;
    };

    let from = state.cell.replace(cell);
    state.position = position;
    state.anchor = position;
    state.has_moved = true;
    state.animating = true;
    info!(?unit, ?from, to = ?cell, "unit moved");
    out_events.push(Event::UnitMoved {
        unit,
        from,
        to: cell,
        position,
    });
}

fn resting_position(cell_position: Vec3) -> Vec3 {
    cell_position + Vec3::Y * MOVE_CLEARANCE
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use grid_tactics_core::{
        BoardGeneration, BoardView, CellId, CellSnapshot, Spacing, UnitId, UnitSnapshot, UnitView,
    };

    use super::{OccupancyTracker, World};

    /// Captures a read-only view of the current board.
    #[must_use]
    pub fn board_view(world: &World) -> BoardView {
        let cells = world
            .board
            .cells()
            .iter()
            .map(|cell| CellSnapshot {
                id: cell.id,
                position: cell.position,
                occupancy: cell.tracker.occupancy(),
                occupants: cell.tracker.occupants(),
            })
            .collect();
        BoardView::from_snapshots(world.board.generation(), world.board.spacing(), cells)
    }

    /// Captures a read-only view of every unit.
    #[must_use]
    pub fn unit_view(world: &World) -> UnitView {
        UnitView::from_snapshots(world.units.iter().map(|unit| unit.snapshot()).collect())
    }

    /// Captures a single unit, if it exists.
    #[must_use]
    pub fn unit(world: &World, unit: UnitId) -> Option<UnitSnapshot> {
        world.units.get(unit).map(|state| state.snapshot())
    }

    /// Handles of every cell on the current board in deterministic order.
    #[must_use]
    pub fn cell_ids(world: &World) -> Vec<CellId> {
        world.board.cells().iter().map(|cell| cell.id).collect()
    }

    /// Occupancy tracker of a cell on the current board.
    #[must_use]
    pub fn occupancy(world: &World, cell: CellId) -> Option<&OccupancyTracker> {
        world.board.cell(cell).map(|cell| &cell.tracker)
    }

    /// Reports whether a cell on the current board is occupied.
    #[must_use]
    pub fn is_occupied(world: &World, cell: CellId) -> Option<bool> {
        occupancy(world, cell).map(OccupancyTracker::is_occupied)
    }

    /// Generation of the current board.
    #[must_use]
    pub fn generation(world: &World) -> BoardGeneration {
        world.board.generation()
    }

    /// Spacing the current board was laid out with.
    #[must_use]
    pub fn spacing(world: &World) -> Spacing {
        world.board.spacing()
    }
}
