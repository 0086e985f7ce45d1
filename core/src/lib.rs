#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Grid Tactics engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to. Systems read immutable views ([`BoardView`],
//! [`UnitView`]), consult the [`SpatialQuery`] collaborator when they need live
//! physical facts, and respond with new command batches plus
//! [`PresentationIntent`] values for the presentation layer.

mod error;
mod spatial;

use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

pub use error::SetupError;
pub use spatial::{
    Aabb, BodyId, BodyRef, BodyTag, Ray, RayHit, SpatialQuery, OCCUPANCY_PROBE_HALF_EXTENTS,
    OCCUPANCY_PROBE_LIFT, OCCUPANT_PROBE_HALF_EXTENTS, STARTUP_RAY_LENGTH,
};

/// Height above a cell at which a unit settles after moving onto it.
pub const MOVE_CLEARANCE: f32 = 0.1;
/// Height a unit is lifted by while it is selected.
pub const HOVER_HEIGHT: f32 = 0.3;
/// Simulated time between two periodic reconciliation passes of one cell.
pub const DEFAULT_RECONCILE_INTERVAL: Duration = Duration::from_secs(1);

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Discards every cell and lays out a fresh board for both teams.
    RebuildBoard {
        /// Number of cells each team receives.
        team_size: u32,
        /// Spacing used to convert formation offsets into world positions.
        spacing: Spacing,
    },
    /// Places a new unit on the provided cell.
    SpawnUnit {
        /// Team the unit fights for.
        team: TeamId,
        /// Cell the unit starts on.
        cell: CellId,
        /// Number of grid steps the unit may cover per turn.
        move_range: MoveRange,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Reports that a body began overlapping a cell's detection volume.
    BodyEntered {
        /// Cell whose detection volume was entered.
        cell: CellId,
        /// Body that entered the volume.
        body: BodyRef,
    },
    /// Reports that a body stopped overlapping a cell's detection volume.
    BodyExited {
        /// Cell whose detection volume was left.
        cell: CellId,
        /// Body that left the volume.
        body: BodyRef,
    },
    /// Supplies the result of a reconciliation query for a cell.
    ReconcileOccupancy {
        /// Cell that was probed.
        cell: CellId,
        /// Whether the probe found a unit-tagged body on the cell.
        occupied: bool,
    },
    /// Requests an out-of-band reconciliation of a cell.
    ForceCheck {
        /// Cell to reconcile.
        cell: CellId,
    },
    /// Records the unit's current position as the point it returns to.
    CaptureReturnAnchor {
        /// Unit whose anchor is captured.
        unit: UnitId,
    },
    /// Moves a unit onto an empty cell and consumes its turn.
    MoveUnit {
        /// Unit that moves.
        unit: UnitId,
        /// Destination cell.
        cell: CellId,
    },
    /// Starts a battle between two units and consumes the attacker's turn.
    TriggerBattle {
        /// Unit initiating the battle.
        attacker: UnitId,
        /// Unit being attacked.
        defender: UnitId,
    },
    /// Shifts a unit's move range by `delta`, clamped to the permitted interval.
    AdjustMoveRange {
        /// Unit whose range changes.
        unit: UnitId,
        /// Signed number of steps to add.
        delta: i32,
    },
    /// Makes a unit selectable again for a new turn.
    ResetTurn {
        /// Unit whose turn resets.
        unit: UnitId,
    },
    /// Signals that the presentation finished animating the unit.
    AnimationCompleted {
        /// Unit whose animation completed.
        unit: UnitId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that every cell of the given generation was discarded.
    BoardCleared {
        /// Generation whose cells were destroyed.
        generation: BoardGeneration,
    },
    /// Announces that a new board was laid out.
    BoardRebuilt {
        /// Generation assigned to the new cells.
        generation: BoardGeneration,
        /// Number of cells created across both teams.
        cell_count: usize,
    },
    /// Reports that a rebuild failed and the board was left empty.
    BoardRebuildRejected {
        /// Team size provided in the rebuild request.
        team_size: u32,
        /// Specific reason the rebuild failed.
        reason: SetupError,
    },
    /// Confirms that a unit was created.
    UnitSpawned {
        /// Identifier assigned to the new unit.
        unit: UnitId,
        /// Team the unit fights for.
        team: TeamId,
        /// Cell the unit stands on.
        cell: CellId,
        /// World position the unit rests at.
        position: Vec3,
    },
    /// Reports that a spawn request was rejected.
    UnitSpawnRejected {
        /// Team provided in the spawn request.
        team: TeamId,
        /// Cell provided in the spawn request.
        cell: CellId,
        /// Specific reason the spawn failed.
        reason: SpawnRejection,
    },
    /// Reports that a unit's cell reference changed after a rebuild.
    UnitRelinked {
        /// Unit whose reference changed.
        unit: UnitId,
        /// Cell under the unit on the new board, if any.
        cell: Option<CellId>,
    },
    /// Confirms that a cell's occupancy state changed.
    OccupancyChanged {
        /// Cell whose occupancy changed.
        cell: CellId,
        /// Occupancy after the transition.
        occupancy: Occupancy,
        /// Number of bodies counted on the cell after the transition.
        occupants: u32,
        /// Display state derived from the new occupancy.
        display: CellDisplay,
    },
    /// Re-announces a cell's occupancy-derived display after a forced check.
    CellDisplayRefreshed {
        /// Cell whose display was refreshed.
        cell: CellId,
        /// Display state derived from the cell's occupancy.
        display: CellDisplay,
    },
    /// Asks the reconciliation system to probe a cell.
    ReconciliationDue {
        /// Cell that needs probing.
        cell: CellId,
        /// World position of the cell surface.
        position: Vec3,
        /// Which probes the reconciliation should run.
        mode: ReconcileMode,
    },
    /// Confirms that a unit's return anchor was captured.
    ReturnAnchorCaptured {
        /// Unit whose anchor was captured.
        unit: UnitId,
        /// Position stored as the anchor.
        anchor: Vec3,
    },
    /// Confirms that a unit moved between two cells.
    UnitMoved {
        /// Unit that moved.
        unit: UnitId,
        /// Cell the unit stood on before moving, if it was linked to one.
        from: Option<CellId>,
        /// Cell the unit stands on after moving.
        to: CellId,
        /// World position the unit settles at.
        position: Vec3,
    },
    /// Announces that a battle started. Resolving it is left to other systems.
    BattleTriggered {
        /// Unit that initiated the battle.
        attacker: UnitId,
        /// Unit being attacked.
        defender: UnitId,
    },
    /// Confirms a unit's new move range.
    MoveRangeChanged {
        /// Unit whose range changed.
        unit: UnitId,
        /// Range after clamping.
        range: MoveRange,
    },
    /// Confirms that a unit may act again.
    TurnReset {
        /// Unit whose turn was reset.
        unit: UnitId,
    },
    /// Confirms that a unit is no longer animating.
    AnimationSettled {
        /// Unit that settled.
        unit: UnitId,
    },
}

/// Requests sent to the presentation layer. The engine never waits on them
/// except through [`Command::AnimationCompleted`].
#[derive(Clone, Debug, PartialEq)]
pub enum PresentationIntent {
    /// Tints a candidate cell.
    Highlight {
        /// Cell to tint.
        cell: CellId,
        /// Tint matching the candidate kind.
        tint: HighlightTint,
    },
    /// Removes any tint from a cell.
    ClearHighlight {
        /// Cell to restore.
        cell: CellId,
    },
    /// Raises a freshly selected unit.
    Lift {
        /// Unit to raise.
        unit: UnitId,
        /// Height to raise the unit by.
        hover: f32,
    },
    /// Lowers a deselected unit back to its anchor.
    ReturnToAnchor {
        /// Unit to lower.
        unit: UnitId,
        /// Position to return to.
        anchor: Vec3,
    },
    /// Carries a unit across the board: translate at hover height, then settle.
    MoveAlong {
        /// Unit being carried.
        unit: UnitId,
        /// Intermediate and final positions, visited in order.
        waypoints: [Vec3; 2],
    },
    /// Shakes a unit to signal a denied request.
    Deny {
        /// Unit to shake.
        unit: UnitId,
    },
    /// Plays the attack lunge from one unit towards another.
    BattleLunge {
        /// Unit performing the lunge.
        attacker: UnitId,
        /// Unit being lunged at.
        defender: UnitId,
    },
}

/// Tint applied to candidate cells while a unit is selected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HighlightTint {
    /// Empty cell the unit may move onto.
    Move,
    /// Enemy-held cell the unit may attack.
    Attack,
}

impl From<CandidateKind> for HighlightTint {
    fn from(kind: CandidateKind) -> Self {
        match kind {
            CandidateKind::Move => Self::Move,
            CandidateKind::Attack => Self::Attack,
        }
    }
}

/// Side of the board a team's formation is laid out on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TeamSide {
    /// Formation laid out towards negative `z`.
    Near,
    /// Formation laid out towards positive `z`.
    Far,
}

impl TeamSide {
    /// Both sides in layout order.
    pub const ALL: [TeamSide; 2] = [TeamSide::Near, TeamSide::Far];

    /// Sign of the separation axis pointing from the board centre to this side.
    #[must_use]
    pub const fn direction(self) -> f32 {
        match self {
            Self::Near => -1.0,
            Self::Far => 1.0,
        }
    }
}

/// Unique identifier assigned to a team.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(u8);

impl TeamId {
    /// Creates a new team identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// Unique identifier assigned to a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Counter bumped every time the board is rebuilt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoardGeneration(u32);

impl BoardGeneration {
    /// Creates a generation marker with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the generation.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Generation that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Stable handle of a cell: board generation, owning side and formation slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId {
    generation: BoardGeneration,
    side: TeamSide,
    slot: u16,
}

impl CellId {
    /// Creates a new cell handle.
    #[must_use]
    pub const fn new(generation: BoardGeneration, side: TeamSide, slot: u16) -> Self {
        Self {
            generation,
            side,
            slot,
        }
    }

    /// Board generation the cell was created in.
    #[must_use]
    pub const fn generation(&self) -> BoardGeneration {
        self.generation
    }

    /// Side of the board the cell belongs to.
    #[must_use]
    pub const fn side(&self) -> TeamSide {
        self.side
    }

    /// Index of the cell within its side's formation.
    #[must_use]
    pub const fn slot(&self) -> u16 {
        self.slot
    }
}

/// Validated distances used to lay out the board and measure grid distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spacing {
    horizontal: f32,
    vertical: f32,
    team_distance: f32,
    board_height: f32,
}

impl Spacing {
    /// Validates and creates a spacing configuration.
    ///
    /// `horizontal`, `vertical` and `team_distance` must be positive and
    /// finite; `board_height` only has to be finite.
    pub fn new(
        horizontal: f32,
        vertical: f32,
        team_distance: f32,
        board_height: f32,
    ) -> Result<Self, SetupError> {
        require_positive("horizontal", horizontal)?;
        require_positive("vertical", vertical)?;
        require_positive("team_distance", team_distance)?;
        if !board_height.is_finite() {
            return Err(SetupError::InvalidSpacing {
                field: "board_height",
                value: board_height,
            });
        }

        Ok(Self {
            horizontal,
            vertical,
            team_distance,
            board_height,
        })
    }

    /// World distance between neighbouring columns.
    #[must_use]
    pub const fn horizontal(&self) -> f32 {
        self.horizontal
    }

    /// World distance between neighbouring rows.
    #[must_use]
    pub const fn vertical(&self) -> f32 {
        self.vertical
    }

    /// World distance between the two teams' front rows.
    #[must_use]
    pub const fn team_distance(&self) -> f32 {
        self.team_distance
    }

    /// Height every cell is placed at.
    #[must_use]
    pub const fn board_height(&self) -> f32 {
        self.board_height
    }

    /// Offset along `z` of the front row of the given side.
    #[must_use]
    pub fn team_center_offset(&self, side: TeamSide) -> f32 {
        side.direction() * self.team_distance / 2.0
    }

    /// Manhattan distance between two world positions, in grid steps.
    ///
    /// Each axis delta is divided by its spacing and rounded to the nearest
    /// integer (ties to even) before the axes are summed.
    #[must_use]
    pub fn grid_distance(&self, from: Vec3, to: Vec3) -> u32 {
        let columns = ((from.x - to.x).abs() / self.horizontal).round_ties_even();
        let rows = ((from.z - to.z).abs() / self.vertical).round_ties_even();
        (columns as u32).saturating_add(rows as u32)
    }
}

impl Default for Spacing {
    fn default() -> Self {
        Self {
            horizontal: 2.5,
            vertical: 2.0,
            team_distance: 6.0,
            board_height: 1.01,
        }
    }
}

fn require_positive(field: &'static str, value: f32) -> Result<(), SetupError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SetupError::InvalidSpacing { field, value })
    }
}

/// Number of grid steps a unit may cover in one turn, always within `1..=5`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MoveRange(u8);

impl MoveRange {
    /// Smallest permitted range.
    pub const MIN: u8 = 1;
    /// Largest permitted range.
    pub const MAX: u8 = 5;

    /// Validates and creates a move range.
    pub fn new(value: i64) -> Result<Self, SetupError> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(SetupError::InvalidMoveRange { value })
        }
    }

    /// Creates a move range, clamping `value` into the permitted interval.
    #[must_use]
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8)
    }

    /// Range shifted by `delta` steps and clamped.
    #[must_use]
    pub fn adjusted(self, delta: i32) -> Self {
        Self::clamped(i64::from(self.0) + i64::from(delta))
    }

    /// Retrieves the numeric range.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Reports whether a cell `distance` steps away can be targeted.
    #[must_use]
    pub const fn reaches(&self, distance: u32) -> bool {
        distance > 0 && distance <= self.0 as u32
    }
}

impl Default for MoveRange {
    fn default() -> Self {
        Self(2)
    }
}

/// Authoritative occupancy state of a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Occupancy {
    /// No unit stands on the cell.
    #[default]
    Empty,
    /// At least one unit stands on the cell.
    Occupied,
}

impl Occupancy {
    /// Occupancy implied by an occupant count.
    #[must_use]
    pub const fn from_count(occupants: u32) -> Self {
        if occupants > 0 {
            Self::Occupied
        } else {
            Self::Empty
        }
    }

    /// Reports whether the state is [`Occupancy::Occupied`].
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        matches!(self, Self::Occupied)
    }
}

/// Colour state a cell shows when no highlight overrides it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellDisplay {
    /// Colour of an empty cell.
    Empty,
    /// Colour of an occupied cell.
    Occupied,
}

impl CellDisplay {
    /// Display implied by an occupancy state.
    #[must_use]
    pub const fn for_occupancy(occupancy: Occupancy) -> Self {
        match occupancy {
            Occupancy::Empty => Self::Empty,
            Occupancy::Occupied => Self::Occupied,
        }
    }
}

/// Probes a reconciliation pass runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReconcileMode {
    /// First pass after the cell is created: overlap probe, then upward ray.
    Startup,
    /// Interval-driven pass: overlap probe only.
    Periodic,
    /// Out-of-band pass requested through [`Command::ForceCheck`].
    Forced,
}

/// Reasons a spawn request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnRejection {
    /// The cell does not belong to the current board.
    UnknownCell,
    /// Another unit is already linked to the cell.
    CellTaken,
}

/// How a candidate cell may be used by the selected unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CandidateKind {
    /// The cell is empty and may be moved onto.
    Move,
    /// The cell holds an enemy that may be attacked.
    Attack,
}

/// Cell reachable by the selected unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Candidate {
    /// Cell that qualifies.
    pub cell: CellId,
    /// Whether the cell is a move or an attack target.
    pub kind: CandidateKind,
    /// Grid distance from the unit's cell.
    pub distance: u32,
}

/// Result of a selection request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// The unit became the selected unit.
    Selected {
        /// Unit that was selected.
        unit: UnitId,
        /// Number of empty cells within reach.
        move_candidates: usize,
        /// Number of enemy-held cells within reach.
        attack_candidates: usize,
    },
    /// The unit was already selected, so the request toggled it off.
    Deselected {
        /// Unit that was deselected.
        unit: UnitId,
    },
    /// The unit already acted this turn.
    TurnAlreadyUsed {
        /// Unit that was refused.
        unit: UnitId,
    },
    /// The unit is still playing a move or battle animation.
    Busy {
        /// Unit that was refused.
        unit: UnitId,
    },
    /// The unit is not linked to a cell of the current board.
    NotOnBoard {
        /// Unit that was refused.
        unit: UnitId,
    },
    /// No unit with the identifier exists.
    UnknownUnit {
        /// Identifier that failed the lookup.
        unit: UnitId,
    },
}

/// Result of resolving a destination for the selected unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The unit moved onto an empty cell.
    Moved {
        /// Unit that moved.
        unit: UnitId,
        /// Cell the unit left.
        from: CellId,
        /// Cell the unit moved onto.
        to: CellId,
    },
    /// The unit attacked an enemy standing on the target cell.
    BattleTriggered {
        /// Unit that attacked.
        attacker: UnitId,
        /// Unit that was attacked.
        defender: UnitId,
        /// Cell the defender stands on.
        cell: CellId,
    },
    /// The target cell holds an ally.
    BlockedByAlly {
        /// Unit that was refused.
        unit: UnitId,
        /// Ally standing on the target cell.
        ally: UnitId,
        /// Target cell.
        cell: CellId,
    },
    /// The target cell is the unit's own cell or lies beyond its range.
    OutOfRange {
        /// Unit that was refused.
        unit: UnitId,
        /// Target cell.
        cell: CellId,
        /// Grid distance to the target.
        distance: u32,
    },
    /// The target cell is flagged occupied but no other unit stands on it.
    OccupancyInconsistency {
        /// Unit that was refused.
        unit: UnitId,
        /// Cell with the stale flag.
        cell: CellId,
    },
    /// No unit is selected.
    NoSelection,
    /// The target cell does not belong to the current board.
    UnknownCell {
        /// Identifier that failed the lookup.
        cell: CellId,
    },
}

/// Immutable representation of a single cell's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellSnapshot {
    /// Handle of the cell.
    pub id: CellId,
    /// World position of the cell surface.
    pub position: Vec3,
    /// Current occupancy of the cell.
    pub occupancy: Occupancy,
    /// Number of bodies counted on the cell.
    pub occupants: u32,
}

/// Read-only snapshot describing every cell of the current board.
#[derive(Clone, Debug, Default)]
pub struct BoardView {
    generation: BoardGeneration,
    spacing: Spacing,
    cells: Vec<CellSnapshot>,
}

impl BoardView {
    /// Creates a new board view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(
        generation: BoardGeneration,
        spacing: Spacing,
        mut cells: Vec<CellSnapshot>,
    ) -> Self {
        cells.sort_by_key(|cell| cell.id);
        Self {
            generation,
            spacing,
            cells,
        }
    }

    /// Generation of the captured board.
    #[must_use]
    pub const fn generation(&self) -> BoardGeneration {
        self.generation
    }

    /// Spacing the captured board was laid out with.
    #[must_use]
    pub const fn spacing(&self) -> Spacing {
        self.spacing
    }

    /// Iterator over the captured cells in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &CellSnapshot> {
        self.cells.iter()
    }

    /// Looks up a captured cell.
    #[must_use]
    pub fn cell(&self, id: CellId) -> Option<&CellSnapshot> {
        self.cells
            .binary_search_by_key(&id, |cell| cell.id)
            .ok()
            .map(|index| &self.cells[index])
    }

    /// Number of captured cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the board has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Immutable representation of a single unit's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitSnapshot {
    /// Unique identifier assigned to the unit.
    pub id: UnitId,
    /// Team the unit fights for.
    pub team: TeamId,
    /// Cell the unit stands on, if it is linked to one.
    pub cell: Option<CellId>,
    /// Resting world position of the unit.
    pub position: Vec3,
    /// Position the unit returns to when deselected.
    pub anchor: Vec3,
    /// Current move range.
    pub move_range: MoveRange,
    /// Whether the unit already acted this turn.
    pub has_moved: bool,
    /// Whether a move or battle animation is still playing.
    pub animating: bool,
}

/// Read-only snapshot describing all units in the match.
#[derive(Clone, Debug, Default)]
pub struct UnitView {
    snapshots: Vec<UnitSnapshot>,
}

impl UnitView {
    /// Creates a new unit view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<UnitSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured unit snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a captured unit.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&UnitSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_distance_rounds_each_axis_independently() {
        let spacing = Spacing::default();
        let back = Vec3::new(0.0, 1.01, -5.0);
        let front_left = Vec3::new(-0.92 * 2.5, 1.01, -3.0);
        assert_eq!(spacing.grid_distance(back, front_left), 2);
        assert_eq!(spacing.grid_distance(front_left, back), 2);
        assert_eq!(spacing.grid_distance(back, back), 0);
    }

    #[test]
    fn grid_distance_ignores_height() {
        let spacing = Spacing::default();
        let low = Vec3::new(0.0, 0.0, 0.0);
        let high = Vec3::new(2.5, 10.0, 0.0);
        assert_eq!(spacing.grid_distance(low, high), 1);
    }

    #[test]
    fn spacing_rejects_non_positive_values() {
        assert_eq!(
            Spacing::new(0.0, 2.0, 6.0, 1.0),
            Err(SetupError::InvalidSpacing {
                field: "horizontal",
                value: 0.0,
            })
        );
        assert!(Spacing::new(2.5, -2.0, 6.0, 1.0).is_err());
        assert!(Spacing::new(2.5, 2.0, f32::NAN, 1.0).is_err());
        assert!(Spacing::new(2.5, 2.0, 6.0, f32::INFINITY).is_err());
        assert!(Spacing::new(2.5, 2.0, 6.0, -3.0).is_ok());
    }

    #[test]
    fn team_center_offset_points_away_from_centre() {
        let spacing = Spacing::default();
        assert_eq!(spacing.team_center_offset(TeamSide::Near), -3.0);
        assert_eq!(spacing.team_center_offset(TeamSide::Far), 3.0);
    }

    #[test]
    fn move_range_is_clamped_into_interval() {
        assert_eq!(MoveRange::default().get(), 2);
        assert_eq!(MoveRange::clamped(9).get(), MoveRange::MAX);
        assert_eq!(MoveRange::clamped(-4).get(), MoveRange::MIN);
        assert_eq!(MoveRange::clamped(3).adjusted(1).get(), 4);
        assert_eq!(MoveRange::clamped(5).adjusted(1).get(), 5);
        assert_eq!(MoveRange::clamped(1).adjusted(-1).get(), 1);
        assert_eq!(
            MoveRange::new(0),
            Err(SetupError::InvalidMoveRange { value: 0 })
        );
    }

    #[test]
    fn move_range_excludes_own_cell() {
        let range = MoveRange::clamped(2);
        assert!(!range.reaches(0));
        assert!(range.reaches(1));
        assert!(range.reaches(2));
        assert!(!range.reaches(3));
    }

    #[test]
    fn occupancy_follows_count() {
        assert_eq!(Occupancy::from_count(0), Occupancy::Empty);
        assert_eq!(Occupancy::from_count(3), Occupancy::Occupied);
        assert_eq!(
            CellDisplay::for_occupancy(Occupancy::Occupied),
            CellDisplay::Occupied
        );
    }

    #[test]
    fn board_view_looks_up_cells_by_handle() {
        let generation = BoardGeneration::new(1);
        let far = CellId::new(generation, TeamSide::Far, 0);
        let near = CellId::new(generation, TeamSide::Near, 1);
        let snapshot = |id| CellSnapshot {
            id,
            position: Vec3::ZERO,
            occupancy: Occupancy::Empty,
            occupants: 0,
        };
        let view = BoardView::from_snapshots(
            generation,
            Spacing::default(),
            vec![snapshot(far), snapshot(near)],
        );

        assert_eq!(view.len(), 2);
        assert_eq!(view.iter().next().map(|cell| cell.id), Some(near));
        assert!(view.cell(far).is_some());
        assert!(view
            .cell(CellId::new(generation, TeamSide::Far, 9))
            .is_none());
    }
}
