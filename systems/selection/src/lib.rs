#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Selection and movement resolution for Grid Tactics turns.
//!
//! The [`Resolver`] owns the single selection slot of a match. Selecting a
//! unit caches its candidate cells; resolving a destination decides between
//! moving, attacking and being denied, and responds with world commands plus
//! presentation intents. Nothing here mutates the world directly.

use glam::Vec3;
use grid_tactics_core::{
    Aabb, BoardView, Candidate, CandidateKind, CellId, CellSnapshot, Command, Event, HighlightTint,
    MoveOutcome, MoveRange, PresentationIntent, SelectionOutcome, SpatialQuery, TeamId, UnitId,
    UnitView, HOVER_HEIGHT, MOVE_CLEARANCE,
};
use tracing::{debug, info, warn};

/// Unit found standing on a cell by the occupant probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Occupant {
    /// A unit of another team.
    Enemy(UnitId),
    /// A unit of the same team.
    Ally(UnitId),
    /// No unit other than the acting one was found.
    Nobody,
}

/// Identifies who stands on the cell at `position`, ignoring `acting`.
///
/// Enemies take precedence: when several bodies are found the first enemy
/// wins, and an ally is only reported if no enemy is present.
pub fn occupant<Q>(spatial: &Q, position: Vec3, acting: UnitId, team: TeamId) -> Occupant
where
    Q: SpatialQuery + ?Sized,
{
    let mut ally = None;
    for body in spatial.overlap(&Aabb::occupant_probe(position)) {
        let (Some(unit), Some(other_team)) = (body.tag.unit(), body.tag.team()) else {
            continue;
        };
        if unit == acting {
            continue;
        }
        if other_team != team {
            return Occupant::Enemy(unit);
        }
        if ally.is_none() {
            ally = Some(unit);
        }
    }
    ally.map_or(Occupant::Nobody, Occupant::Ally)
}

/// Computes the cells a unit standing at `origin` may move onto or attack.
///
/// Cells of both teams are eligible. Empty cells become move candidates,
/// enemy-held cells attack candidates, and ally-held cells are skipped.
pub fn candidate_set<Q>(
    board: &BoardView,
    spatial: &Q,
    unit: UnitId,
    team: TeamId,
    origin: Vec3,
    range: MoveRange,
) -> Vec<Candidate>
where
    Q: SpatialQuery + ?Sized,
{
    let spacing = board.spacing();
    board
        .iter()
        .filter_map(|cell| {
            let distance = spacing.grid_distance(origin, cell.position);
            if !range.reaches(distance) {
                return None;
            }
            let kind = if !cell.occupancy.is_occupied() {
                CandidateKind::Move
            } else if let Occupant::Enemy(_) = occupant(spatial, cell.position, unit, team) {
                CandidateKind::Attack
            } else {
                return None;
            };
            Some(Candidate {
                cell: cell.id,
                kind,
                distance,
            })
        })
        .collect()
}

#[derive(Clone, Debug)]
struct Selection {
    unit: UnitId,
    team: TeamId,
    cell: CellId,
    origin: Vec3,
    anchor: Vec3,
    range: MoveRange,
    candidates: Vec<Candidate>,
}

impl Selection {
    fn highlight(&self, intents: &mut Vec<PresentationIntent>) {
        for candidate in &self.candidates {
            intents.push(PresentationIntent::Highlight {
                cell: candidate.cell,
                tint: HighlightTint::from(candidate.kind),
            });
        }
    }

    fn counts(&self) -> (usize, usize) {
        let moves = self
            .candidates
            .iter()
            .filter(|candidate| candidate.kind == CandidateKind::Move)
            .count();
        (moves, self.candidates.len() - moves)
    }
}

/// How the selected unit leaves the selected state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Release {
    /// The unit drops back to its return anchor.
    ReturnToAnchor,
    /// The unit is being carried elsewhere by a move.
    Carried,
    /// The board the selection referred to no longer exists.
    BoardDiscarded,
}

/// Turn-logic core holding the match's single selection slot.
#[derive(Debug, Default)]
pub struct Resolver {
    selection: Option<Selection>,
}

impl Resolver {
    /// Creates a resolver with nothing selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Unit currently selected, if any.
    #[must_use]
    pub fn selected(&self) -> Option<UnitId> {
        self.selection.as_ref().map(|selection| selection.unit)
    }

    /// Candidate cells cached for the current selection.
    #[must_use]
    pub fn candidates(&self) -> &[Candidate] {
        self.selection
            .as_ref()
            .map(|selection| selection.candidates.as_slice())
            .unwrap_or_default()
    }

    /// Handles a click on `unit`: selects it, or toggles it off if it is
    /// already the selected unit.
    pub fn select<Q>(
        &mut self,
        unit: UnitId,
        board: &BoardView,
        units: &UnitView,
        spatial: &Q,
        commands: &mut Vec<Command>,
        intents: &mut Vec<PresentationIntent>,
    ) -> SelectionOutcome
    where
        Q: SpatialQuery + ?Sized,
    {
        self.discard_stale(board, commands, intents);
        if self.selected() == Some(unit) {
            let _ = self.deselect(commands, intents);
            return SelectionOutcome::Deselected { unit };
        }

        let Some(snapshot) = units.unit(unit) else {
            return SelectionOutcome::UnknownUnit { unit };
        };
        if snapshot.has_moved {
            debug!(?unit, "selection refused, turn already used");
            intents.push(PresentationIntent::Deny { unit });
            return SelectionOutcome::TurnAlreadyUsed { unit };
        }
        if snapshot.animating {
            debug!(?unit, "selection refused, unit still animating");
            return SelectionOutcome::Busy { unit };
        }
        let Some(cell) = snapshot.cell.and_then(|cell| board.cell(cell)) else {
            return SelectionOutcome::NotOnBoard { unit };
        };

        let _ = self.deselect(commands, intents);

        let selection = Selection {
            unit,
            team: snapshot.team,
            cell: cell.id,
            origin: cell.position,
            anchor: snapshot.position,
            range: snapshot.move_range,
            candidates: candidate_set(
                board,
                spatial,
                unit,
                snapshot.team,
                cell.position,
                snapshot.move_range,
            ),
        };
        commands.push(Command::CaptureReturnAnchor { unit });
        intents.push(PresentationIntent::Lift {
            unit,
            hover: HOVER_HEIGHT,
        });
        selection.highlight(intents);

        let (move_candidates, attack_candidates) = selection.counts();
        info!(?unit, move_candidates, attack_candidates, "unit selected");
        self.selection = Some(selection);
        SelectionOutcome::Selected {
            unit,
            move_candidates,
            attack_candidates,
        }
    }

    /// Clears the selection, reverting every highlighted cell to its
    /// occupancy-derived display. Returns the unit that was selected.
    pub fn deselect(
        &mut self,
        commands: &mut Vec<Command>,
        intents: &mut Vec<PresentationIntent>,
    ) -> Option<UnitId> {
        let selection = self.selection.take()?;
        let unit = selection.unit;
        release(selection, Release::ReturnToAnchor, commands, intents);
        Some(unit)
    }

    /// Resolves a click on `target` for the selected unit.
    pub fn resolve<Q>(
        &mut self,
        target: CellId,
        board: &BoardView,
        spatial: &Q,
        commands: &mut Vec<Command>,
        intents: &mut Vec<PresentationIntent>,
    ) -> MoveOutcome
    where
        Q: SpatialQuery + ?Sized,
    {
        self.discard_stale(board, commands, intents);
        let Some(selection) = self.selection.as_ref() else {
            return MoveOutcome::NoSelection;
        };
        let Some(cell) = board.cell(target) else {
            return MoveOutcome::UnknownCell { cell: target };
        };
        let unit = selection.unit;

        let distance = board
            .spacing()
            .grid_distance(selection.origin, cell.position);
        if !selection.range.reaches(distance) {
            warn!(
                ?unit,
                cell = ?target,
                distance,
                range = selection.range.get(),
                "destination outside the candidate set"
            );
            intents.push(PresentationIntent::Deny { unit });
            return MoveOutcome::OutOfRange {
                unit,
                cell: target,
                distance,
            };
        }

        let Some(selection) = self.selection.take() else {
            return MoveOutcome::NoSelection;
        };
        if !cell.occupancy.is_occupied() {
            return move_onto(selection, cell, commands, intents);
        }

        match occupant(spatial, cell.position, unit, selection.team) {
            Occupant::Enemy(defender) => {
                info!(attacker = ?unit, ?defender, cell = ?target, "battle triggered");
                commands.push(Command::TriggerBattle {
                    attacker: unit,
                    defender,
                });
                intents.push(PresentationIntent::BattleLunge {
                    attacker: unit,
                    defender,
                });
                release(selection, Release::ReturnToAnchor, commands, intents);
                MoveOutcome::BattleTriggered {
                    attacker: unit,
                    defender,
                    cell: target,
                }
            }
            Occupant::Ally(ally) => {
                info!(?unit, ?ally, cell = ?target, "move blocked by ally");
                intents.push(PresentationIntent::Deny { unit });
                release(selection, Release::ReturnToAnchor, commands, intents);
                MoveOutcome::BlockedByAlly {
                    unit,
                    ally,
                    cell: target,
                }
            }
            Occupant::Nobody => {
                warn!(?unit, cell = ?target, "cell flagged occupied but no occupant found");
                let candidate = selection
                    .candidates
                    .iter()
                    .any(|candidate| candidate.cell == target);
                if !candidate {
                    commands.push(Command::ForceCheck { cell: target });
                }
                intents.push(PresentationIntent::Deny { unit });
                release(selection, Release::ReturnToAnchor, commands, intents);
                MoveOutcome::OccupancyInconsistency { unit, cell: target }
            }
        }
    }

    /// Drops a selection made on an earlier board generation than `board`.
    fn discard_stale(
        &mut self,
        board: &BoardView,
        commands: &mut Vec<Command>,
        intents: &mut Vec<PresentationIntent>,
    ) {
        let stale = self
            .selection
            .as_ref()
            .is_some_and(|selection| selection.cell.generation() != board.generation());
        if !stale {
            return;
        }
        if let Some(selection) = self.selection.take() {
            debug!(unit = ?selection.unit, "selection refers to a discarded board");
            release(selection, Release::BoardDiscarded, commands, intents);
        }
    }

    /// Reacts to world events: rebuilds invalidate the selection and range
    /// changes of the selected unit refresh its candidate set.
    pub fn handle<Q>(
        &mut self,
        events: &[Event],
        board: &BoardView,
        spatial: &Q,
        commands: &mut Vec<Command>,
        intents: &mut Vec<PresentationIntent>,
    ) where
        Q: SpatialQuery + ?Sized,
    {
        for event in events {
            match event {
                Event::BoardCleared { .. }
                | Event::BoardRebuilt { .. }
                | Event::BoardRebuildRejected { .. } => {
                    if let Some(selection) = self.selection.take() {
                        debug!(unit = ?selection.unit, "selection discarded by board rebuild");
                        release(selection, Release::BoardDiscarded, commands, intents);
                    }
                }
                Event::MoveRangeChanged { unit, range } => {
                    if let Some(selection) = self.selection.as_mut() {
                        if selection.unit == *unit {
                            refresh_candidates(selection, *range, board, spatial, commands, intents);
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

fn move_onto(
    selection: Selection,
    cell: &CellSnapshot,
    commands: &mut Vec<Command>,
    intents: &mut Vec<PresentationIntent>,
) -> MoveOutcome {
    let unit = selection.unit;
    let from = selection.cell;
    let settle = cell.position + Vec3::Y * MOVE_CLEARANCE;
    let carry = Vec3::new(settle.x, selection.anchor.y + HOVER_HEIGHT, settle.z);

    info!(?unit, ?from, to = ?cell.id, "unit moved");
    commands.push(Command::MoveUnit {
        unit,
        cell: cell.id,
    });
    intents.push(PresentationIntent::MoveAlong {
        unit,
        waypoints: [carry, settle],
    });
    release(selection, Release::Carried, commands, intents);
    MoveOutcome::Moved {
        unit,
        from,
        to: cell.id,
    }
}

fn refresh_candidates<Q>(
    selection: &mut Selection,
    range: MoveRange,
    board: &BoardView,
    spatial: &Q,
    commands: &mut Vec<Command>,
    intents: &mut Vec<PresentationIntent>,
) where
    Q: SpatialQuery + ?Sized,
{
    let refreshed = candidate_set(
        board,
        spatial,
        selection.unit,
        selection.team,
        selection.origin,
        range,
    );
    for stale in &selection.candidates {
        if !refreshed.iter().any(|candidate| candidate.cell == stale.cell) {
            intents.push(PresentationIntent::ClearHighlight { cell: stale.cell });
            commands.push(Command::ForceCheck { cell: stale.cell });
        }
    }
    selection.range = range;
    selection.candidates = refreshed;
    selection.highlight(intents);
    debug!(unit = ?selection.unit, range = range.get(), "candidate set refreshed");
}

fn release(
    selection: Selection,
    mode: Release,
    commands: &mut Vec<Command>,
    intents: &mut Vec<PresentationIntent>,
) {
    if mode != Release::BoardDiscarded {
        for candidate in &selection.candidates {
            intents.push(PresentationIntent::ClearHighlight {
                cell: candidate.cell,
            });
            commands.push(Command::ForceCheck {
                cell: candidate.cell,
            });
        }
    }
    if mode != Release::Carried {
        intents.push(PresentationIntent::ReturnToAnchor {
            unit: selection.unit,
            anchor: selection.anchor,
        });
    }
    debug!(unit = ?selection.unit, ?mode, "unit deselected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_tactics_core::{
        BodyId, BodyRef, BodyTag, BoardGeneration, CellSnapshot, Occupancy, Ray, RayHit, Spacing,
        TeamSide, UnitSnapshot,
    };

    #[derive(Default)]
    struct Bodies(Vec<(Aabb, BodyTag)>);

    impl SpatialQuery for Bodies {
        fn overlap(&self, volume: &Aabb) -> Vec<BodyRef> {
            self.0
                .iter()
                .enumerate()
                .filter(|(_, (body, _))| body.intersects(volume))
                .map(|(index, (_, tag))| BodyRef {
                    id: BodyId::new(index as u32),
                    tag: *tag,
                })
                .collect()
        }

        fn raycast(&self, _ray: &Ray) -> Vec<RayHit> {
            Vec::new()
        }
    }

    fn unit_at(bodies: &mut Bodies, position: Vec3, unit: u32, team: u8) {
        bodies.0.push((
            Aabb::new(position + Vec3::Y * 0.5, Vec3::new(0.3, 0.5, 0.3)),
            BodyTag::Unit {
                unit: UnitId::new(unit),
                team: TeamId::new(team),
            },
        ));
    }

    fn line_board(occupied: &[u16]) -> BoardView {
        let generation = BoardGeneration::new(1);
        let cells = (0..5u16)
            .map(|slot| {
                let occupancy = if occupied.contains(&slot) {
                    Occupancy::Occupied
                } else {
                    Occupancy::Empty
                };
                CellSnapshot {
                    id: CellId::new(generation, TeamSide::Near, slot),
                    position: Vec3::new(f32::from(slot) * 2.5, 1.0, 0.0),
                    occupancy,
                    occupants: u32::from(occupancy.is_occupied()),
                }
            })
            .collect();
        BoardView::from_snapshots(generation, Spacing::default(), cells)
    }

    fn slot(index: u16) -> CellId {
        CellId::new(BoardGeneration::new(1), TeamSide::Near, index)
    }

    fn snapshot(unit: u32, team: u8, cell: u16, has_moved: bool) -> UnitSnapshot {
        let position = Vec3::new(f32::from(cell) * 2.5, 1.1, 0.0);
        UnitSnapshot {
            id: UnitId::new(unit),
            team: TeamId::new(team),
            cell: Some(slot(cell)),
            position,
            anchor: position,
            move_range: MoveRange::clamped(2),
            has_moved,
            animating: false,
        }
    }

    #[test]
    fn candidates_tag_empty_and_enemy_cells_only() {
        let board = line_board(&[1, 2, 3]);
        let mut bodies = Bodies::default();
        unit_at(&mut bodies, Vec3::new(0.0, 1.0, 0.0), 0, 0);
        unit_at(&mut bodies, Vec3::new(2.5, 1.0, 0.0), 1, 0);
        unit_at(&mut bodies, Vec3::new(5.0, 1.0, 0.0), 2, 1);

        let candidates = candidate_set(
            &board,
            &bodies,
            UnitId::new(0),
            TeamId::new(0),
            Vec3::new(0.0, 1.0, 0.0),
            MoveRange::clamped(2),
        );
        assert_eq!(
            candidates,
            vec![Candidate {
                cell: slot(2),
                kind: CandidateKind::Attack,
                distance: 2,
            }]
        );
    }

    #[test]
    fn occupant_prefers_enemies_and_skips_the_actor() {
        let mut bodies = Bodies::default();
        let position = Vec3::new(0.0, 1.0, 0.0);
        unit_at(&mut bodies, position, 0, 0);
        assert_eq!(
            occupant(&bodies, position, UnitId::new(0), TeamId::new(0)),
            Occupant::Nobody
        );
        unit_at(&mut bodies, position, 1, 0);
        unit_at(&mut bodies, position, 2, 1);
        assert_eq!(
            occupant(&bodies, position, UnitId::new(0), TeamId::new(0)),
            Occupant::Enemy(UnitId::new(2))
        );
        assert_eq!(
            occupant(&bodies, position, UnitId::new(2), TeamId::new(1)),
            Occupant::Enemy(UnitId::new(0))
        );
    }

    #[test]
    fn used_unit_cannot_be_selected() {
        let board = line_board(&[0]);
        let units = UnitView::from_snapshots(vec![snapshot(0, 0, 0, true)]);
        let mut resolver = Resolver::new();
        let mut commands = Vec::new();
        let mut intents = Vec::new();

        let outcome = resolver.select(
            UnitId::new(0),
            &board,
            &units,
            &Bodies::default(),
            &mut commands,
            &mut intents,
        );
        assert_eq!(
            outcome,
            SelectionOutcome::TurnAlreadyUsed {
                unit: UnitId::new(0)
            }
        );
        assert_eq!(resolver.selected(), None);
        assert!(commands.is_empty());
    }

    #[test]
    fn selecting_twice_toggles_off_and_reverts_highlights() {
        let board = line_board(&[0]);
        let units = UnitView::from_snapshots(vec![snapshot(0, 0, 0, false)]);
        let mut resolver = Resolver::new();
        let mut commands = Vec::new();
        let mut intents = Vec::new();
        let unit = UnitId::new(0);

        let selected = resolver.select(
            unit,
            &board,
            &units,
            &Bodies::default(),
            &mut commands,
            &mut intents,
        );
        assert_eq!(
            selected,
            SelectionOutcome::Selected {
                unit,
                move_candidates: 2,
                attack_candidates: 0,
            }
        );
        assert_eq!(commands, vec![Command::CaptureReturnAnchor { unit }]);

        commands.clear();
        intents.clear();
        let toggled = resolver.select(
            unit,
            &board,
            &units,
            &Bodies::default(),
            &mut commands,
            &mut intents,
        );
        assert_eq!(toggled, SelectionOutcome::Deselected { unit });
        assert_eq!(
            commands,
            vec![
                Command::ForceCheck { cell: slot(1) },
                Command::ForceCheck { cell: slot(2) },
            ]
        );
        assert!(intents.contains(&PresentationIntent::ReturnToAnchor {
            unit,
            anchor: Vec3::new(0.0, 1.1, 0.0),
        }));
        assert_eq!(resolver.selected(), None);
    }

    #[test]
    fn out_of_range_keeps_selection() {
        let board = line_board(&[0]);
        let units = UnitView::from_snapshots(vec![snapshot(0, 0, 0, false)]);
        let mut resolver = Resolver::new();
        let mut commands = Vec::new();
        let mut intents = Vec::new();
        let unit = UnitId::new(0);
        let _ = resolver.select(
            unit,
            &board,
            &units,
            &Bodies::default(),
            &mut commands,
            &mut intents,
        );
        commands.clear();

        for (target, distance) in [(0, 0), (4, 4)] {
            let outcome = resolver.resolve(
                slot(target),
                &board,
                &Bodies::default(),
                &mut commands,
                &mut intents,
            );
            assert_eq!(
                outcome,
                MoveOutcome::OutOfRange {
                    unit,
                    cell: slot(target),
                    distance,
                }
            );
        }
        assert_eq!(resolver.selected(), Some(unit));
        assert!(commands.is_empty());
    }

    #[test]
    fn resolve_without_selection_is_rejected() {
        let mut resolver = Resolver::new();
        let outcome = resolver.resolve(
            slot(1),
            &line_board(&[]),
            &Bodies::default(),
            &mut Vec::new(),
            &mut Vec::new(),
        );
        assert_eq!(outcome, MoveOutcome::NoSelection);
    }

    #[test]
    fn move_emits_two_step_carry() {
        let board = line_board(&[0]);
        let units = UnitView::from_snapshots(vec![snapshot(0, 0, 0, false)]);
        let mut resolver = Resolver::new();
        let mut commands = Vec::new();
        let mut intents = Vec::new();
        let unit = UnitId::new(0);
        let _ = resolver.select(
            unit,
            &board,
            &units,
            &Bodies::default(),
            &mut commands,
            &mut intents,
        );
        commands.clear();
        intents.clear();

        let outcome = resolver.resolve(
            slot(1),
            &board,
            &Bodies::default(),
            &mut commands,
            &mut intents,
        );
        assert_eq!(
            outcome,
            MoveOutcome::Moved {
                unit,
                from: slot(0),
                to: slot(1),
            }
        );
        assert_eq!(commands[0], Command::MoveUnit { unit, cell: slot(1) });
        let settle = Vec3::new(2.5, 1.0 + MOVE_CLEARANCE, 0.0);
        assert_eq!(
            intents[0],
            PresentationIntent::MoveAlong {
                unit,
                waypoints: [Vec3::new(2.5, 1.1 + HOVER_HEIGHT, 0.0), settle],
            }
        );
        assert!(!intents
            .iter()
            .any(|intent| matches!(intent, PresentationIntent::ReturnToAnchor { .. })));
        assert_eq!(resolver.selected(), None);
    }

    #[test]
    fn stale_occupied_flag_is_reported() {
        let board = line_board(&[0, 1]);
        let mut bodies = Bodies::default();
        unit_at(&mut bodies, Vec3::new(0.0, 1.0, 0.0), 0, 0);
        let units = UnitView::from_snapshots(vec![snapshot(0, 0, 0, false)]);
        let mut resolver = Resolver::new();
        let mut commands = Vec::new();
        let mut intents = Vec::new();
        let unit = UnitId::new(0);
        let _ = resolver.select(unit, &board, &units, &bodies, &mut commands, &mut intents);
        commands.clear();

        let outcome = resolver.resolve(slot(1), &board, &bodies, &mut commands, &mut intents);
        assert_eq!(
            outcome,
            MoveOutcome::OccupancyInconsistency {
                unit,
                cell: slot(1),
            }
        );
        assert!(commands.contains(&Command::ForceCheck { cell: slot(1) }));
        assert!(!commands.iter().any(|command| matches!(
            command,
            Command::MoveUnit { .. } | Command::TriggerBattle { .. }
        )));
        assert_eq!(resolver.selected(), None);
    }

    #[test]
    fn rebuild_discards_selection_without_touching_old_cells() {
        let board = line_board(&[0]);
        let units = UnitView::from_snapshots(vec![snapshot(0, 0, 0, false)]);
        let mut resolver = Resolver::new();
        let mut commands = Vec::new();
        let mut intents = Vec::new();
        let _ = resolver.select(
            UnitId::new(0),
            &board,
            &units,
            &Bodies::default(),
            &mut commands,
            &mut intents,
        );
        commands.clear();

        resolver.handle(
            &[Event::BoardCleared {
                generation: BoardGeneration::new(1),
            }],
            &board,
            &Bodies::default(),
            &mut commands,
            &mut intents,
        );
        assert_eq!(resolver.selected(), None);
        assert!(commands.is_empty());
    }

    #[test]
    fn range_change_refreshes_candidates() {
        let board = line_board(&[0]);
        let units = UnitView::from_snapshots(vec![snapshot(0, 0, 0, false)]);
        let mut resolver = Resolver::new();
        let mut commands = Vec::new();
        let mut intents = Vec::new();
        let unit = UnitId::new(0);
        let _ = resolver.select(
            unit,
            &board,
            &units,
            &Bodies::default(),
            &mut commands,
            &mut intents,
        );
        assert_eq!(resolver.candidates().len(), 2);

        commands.clear();
        resolver.handle(
            &[Event::MoveRangeChanged {
                unit,
                range: MoveRange::clamped(1),
            }],
            &board,
            &Bodies::default(),
            &mut commands,
            &mut intents,
        );
        assert_eq!(resolver.candidates().len(), 1);
        assert_eq!(commands, vec![Command::ForceCheck { cell: slot(2) }]);

        resolver.handle(
            &[Event::MoveRangeChanged {
                unit,
                range: MoveRange::clamped(4),
            }],
            &board,
            &Bodies::default(),
            &mut commands,
            &mut intents,
        );
        assert_eq!(resolver.candidates().len(), 4);
    }
}
