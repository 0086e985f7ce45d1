//! Authoritative unit state management utilities.

use std::collections::BTreeMap;

use glam::Vec3;
use grid_tactics_core::{CellId, MoveRange, TeamId, UnitId, UnitSnapshot};

/// State of a unit stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Unit {
    pub(crate) id: UnitId,
    pub(crate) team: TeamId,
    /// Relation only: the board owns the cell.
    pub(crate) cell: Option<CellId>,
    pub(crate) position: Vec3,
    pub(crate) anchor: Vec3,
    pub(crate) move_range: MoveRange,
    pub(crate) has_moved: bool,
    pub(crate) animating: bool,
}

impl Unit {
    pub(crate) fn snapshot(&self) -> UnitSnapshot {
        UnitSnapshot {
            id: self.id,
            team: self.team,
            cell: self.cell,
            position: self.position,
            anchor: self.anchor,
            move_range: self.move_range,
            has_moved: self.has_moved,
            animating: self.animating,
        }
    }
}

/// Registry that stores units and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct UnitRegistry {
    entries: BTreeMap<UnitId, Unit>,
    next_unit_id: UnitId,
}

impl UnitRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_unit_id: UnitId::new(0),
        }
    }

    pub(crate) fn insert(
        &mut self,
        team: TeamId,
        cell: CellId,
        position: Vec3,
        move_range: MoveRange,
    ) -> UnitId {
        let id = self.next_unit_id;
        self.next_unit_id = UnitId::new(id.get().wrapping_add(1));
        let _ = self.entries.insert(
            id,
            Unit {
                id,
                team,
                cell: Some(cell),
                position,
                anchor: position,
                move_range,
                has_moved: false,
                animating: false,
            },
        );
        id
    }

    pub(crate) fn get(&self, id: UnitId) -> Option<&Unit> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Unit> {
        self.entries.values_mut()
    }

    pub(crate) fn linked_to(&self, cell: CellId) -> Option<UnitId> {
        self.entries
            .values()
            .find(|unit| unit.cell == Some(cell))
            .map(|unit| unit.id)
    }
}
