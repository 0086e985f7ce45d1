//! Board layout and cell lifecycle.

use glam::Vec3;
use grid_tactics_core::{Aabb, BoardGeneration, CellId, SetupError, Spacing, TeamSide};
use grid_tactics_system_formation::FormationCatalog;

use crate::occupancy::OccupancyTracker;

/// World placement computed for one cell of a formation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellPlacement {
    /// Side of the board the cell belongs to.
    pub side: TeamSide,
    /// Index of the cell within its side's formation.
    pub slot: u16,
    /// World position of the cell surface.
    pub position: Vec3,
}

/// Converts catalog formations into world placements for both teams.
#[derive(Clone, Debug)]
pub struct BoardBuilder {
    catalog: FormationCatalog,
}

impl BoardBuilder {
    /// Creates a builder backed by the provided catalog.
    #[must_use]
    pub fn new(catalog: FormationCatalog) -> Self {
        Self { catalog }
    }

    /// Computes the placements of every cell for a `team_size` match.
    ///
    /// The result is a pure function of the arguments: near-side cells come
    /// first, each side in formation order.
    pub fn layout(
        &self,
        team_size: u32,
        spacing: &Spacing,
    ) -> Result<Vec<CellPlacement>, SetupError> {
        let offsets = self.catalog.layout_for(team_size)?;
        let mut placements = Vec::with_capacity(offsets.len() * TeamSide::ALL.len());

        for side in TeamSide::ALL {
            let direction = side.direction();
            let z_offset = spacing.team_center_offset(side);
            for (index, offset) in offsets.iter().enumerate() {
                placements.push(CellPlacement {
                    side,
                    slot: u16::try_from(index).unwrap_or(u16::MAX),
                    position: Vec3::new(
                        offset.x * spacing.horizontal(),
                        spacing.board_height(),
                        z_offset + direction * offset.y * spacing.vertical(),
                    ),
                });
            }
        }

        Ok(placements)
    }
}

impl Default for BoardBuilder {
    fn default() -> Self {
        Self::new(FormationCatalog::standard())
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Cell {
    pub(crate) id: CellId,
    pub(crate) position: Vec3,
    pub(crate) tracker: OccupancyTracker,
}

/// Cells of the current match, owned exclusively by the world.
#[derive(Clone, Debug)]
pub(crate) struct Board {
    generation: BoardGeneration,
    spacing: Spacing,
    cells: Vec<Cell>,
}

impl Board {
    pub(crate) fn new() -> Self {
        Self {
            generation: BoardGeneration::default(),
            spacing: Spacing::default(),
            cells: Vec::new(),
        }
    }

    pub(crate) const fn generation(&self) -> BoardGeneration {
        self.generation
    }

    pub(crate) const fn spacing(&self) -> Spacing {
        self.spacing
    }

    pub(crate) fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Destroys every cell and moves to a new generation so that handles to
    /// the discarded cells can no longer resolve.
    pub(crate) fn clear(&mut self) -> Option<BoardGeneration> {
        let discarded = (!self.cells.is_empty()).then_some(self.generation);
        self.cells.clear();
        self.generation = self.generation.next();
        discarded
    }

    pub(crate) fn populate(&mut self, spacing: Spacing, placements: Vec<CellPlacement>) {
        self.spacing = spacing;
        let generation = self.generation;
        self.cells = placements
            .into_iter()
            .map(|placement| Cell {
                id: CellId::new(generation, placement.side, placement.slot),
                position: placement.position,
                tracker: OccupancyTracker::new(),
            })
            .collect();
        self.cells.sort_by_key(|cell| cell.id);
    }

    pub(crate) fn cell(&self, id: CellId) -> Option<&Cell> {
        if id.generation() != self.generation {
            return None;
        }
        self.cells
            .binary_search_by_key(&id, |cell| cell.id)
            .ok()
            .map(|index| &self.cells[index])
    }

    pub(crate) fn cell_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        if id.generation() != self.generation {
            return None;
        }
        self.cells
            .binary_search_by_key(&id, |cell| cell.id)
            .ok()
            .map(|index| &mut self.cells[index])
    }

    /// Cell whose occupancy probe footprint contains `position` on the ground plane.
    pub(crate) fn cell_under(&self, position: Vec3) -> Option<CellId> {
        self.cells
            .iter()
            .find(|cell| Aabb::occupancy_probe(cell.position).contains_xz(position))
            .map(|cell| cell.id)
    }
}
