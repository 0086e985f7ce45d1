use std::{fmt, time::Duration};

use anyhow::{bail, Result};
use grid_tactics_core::{
    BodyTag, Candidate, CandidateKind, CellDisplay, CellId, Command, Event, MoveOutcome,
    PresentationIntent, SelectionOutcome, TeamId, TeamSide, UnitId,
};
use grid_tactics_presentation::{CellPaint, Choreographer, Color, Palette};
use grid_tactics_spatial::SpatialScene;
use grid_tactics_system_reconciliation::Reconciler;
use grid_tactics_system_selection::Resolver;
use grid_tactics_world::{self as world, query, World};
use tracing::{info, warn};

use crate::config::MatchSettings;

/// Simulated time advanced per frame while animations play.
const FRAME: Duration = Duration::from_millis(100);
/// Upper bound on frames spent waiting for one unit's animation.
const MAX_SETTLE_FRAMES: u32 = 50;

/// Team that fights from the near side.
pub(crate) const HOME_TEAM: TeamId = TeamId::new(0);
/// Team that fights from the far side.
pub(crate) const AWAY_TEAM: TeamId = TeamId::new(1);

/// What happened to one unit during a scripted turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TurnRecord {
    pub(crate) unit: UnitId,
    pub(crate) selection: SelectionOutcome,
    pub(crate) outcome: Option<MoveOutcome>,
}

/// Headless match wiring the world, the systems and the adapters together.
pub(crate) struct Session {
    world: World,
    scene: SpatialScene,
    reconciler: Reconciler,
    resolver: Resolver,
    paint: CellPaint,
    choreographer: Choreographer,
}

impl Session {
    /// Builds the board and spawns the opening units of both teams.
    pub(crate) fn start(settings: &MatchSettings) -> Result<Self> {
        let mut session = Self {
            world: World::new().with_reconcile_interval(settings.reconcile_interval),
            scene: SpatialScene::new(),
            reconciler: Reconciler::new(),
            resolver: Resolver::new(),
            paint: CellPaint::new(Palette::default()),
            choreographer: Choreographer::new(),
        };

        let events = session.pump(
            vec![
                Command::RebuildBoard {
                    team_size: settings.team_size,
                    spacing: settings.spacing,
                },
                Command::Tick { dt: FRAME },
            ],
            Vec::new(),
        );
        if let Some(reason) = events.iter().find_map(|event| match event {
            Event::BoardRebuildRejected { reason, .. } => Some(*reason),
            _ => None,
        }) {
            bail!("board rebuild rejected: {reason}");
        }

        let mut spawns = Vec::new();
        for cell in query::cell_ids(&session.world) {
            if cell.slot() % 2 != 0 {
                continue;
            }
            let team = match cell.side() {
                TeamSide::Near => HOME_TEAM,
                TeamSide::Far => AWAY_TEAM,
            };
            spawns.push(Command::SpawnUnit {
                team,
                cell,
                move_range: settings.move_range,
            });
        }
        let events = session.pump(spawns, Vec::new());
        for event in &events {
            if let Event::UnitSpawnRejected { cell, reason, .. } = event {
                warn!(?cell, ?reason, "opening unit was not placed");
            }
        }

        Ok(session)
    }

    /// Plays one turn for `team`: every ready unit attacks if it can,
    /// otherwise moves, and the team's turns are reset afterwards.
    pub(crate) fn play_turn(&mut self, team: TeamId) -> Vec<TurnRecord> {
        let roster: Vec<UnitId> = query::unit_view(&self.world)
            .iter()
            .filter(|unit| unit.team == team)
            .map(|unit| unit.id)
            .collect();

        let mut records = Vec::with_capacity(roster.len());
        for unit in roster {
            let record = self.act(unit);
            info!(
                ?unit,
                selection = ?record.selection,
                outcome = ?record.outcome,
                "unit finished its action"
            );
            records.push(record);
        }

        let resets = records
            .iter()
            .map(|record| Command::ResetTurn { unit: record.unit })
            .collect();
        let _ = self.pump(resets, Vec::new());
        records
    }

    fn act(&mut self, unit: UnitId) -> TurnRecord {
        let mut commands = Vec::new();
        let mut intents = Vec::new();
        let selection = self.resolver.select(
            unit,
            &query::board_view(&self.world),
            &query::unit_view(&self.world),
            &self.scene,
            &mut commands,
            &mut intents,
        );
        let _ = self.pump(commands, intents);
        if !matches!(selection, SelectionOutcome::Selected { .. }) {
            return TurnRecord {
                unit,
                selection,
                outcome: None,
            };
        }

        let target = preferred_target(self.resolver.candidates());
        let mut commands = Vec::new();
        let mut intents = Vec::new();
        let outcome = match target {
            Some(cell) => Some(self.resolver.resolve(
                cell,
                &query::board_view(&self.world),
                &self.scene,
                &mut commands,
                &mut intents,
            )),
            None => {
                let _ = self.resolver.deselect(&mut commands, &mut intents);
                None
            }
        };
        let _ = self.pump(commands, intents);
        self.settle();

        TurnRecord {
            unit,
            selection,
            outcome,
        }
    }

    fn settle(&mut self) {
        for _ in 0..MAX_SETTLE_FRAMES {
            if self.choreographer.is_idle() {
                return;
            }
            let mut commands = vec![Command::Tick { dt: FRAME }];
            self.choreographer.advance(FRAME, &mut commands);
            let _ = self.pump(commands, Vec::new());
        }
        warn!("animations did not settle in time");
    }

    fn pump(
        &mut self,
        mut commands: Vec<Command>,
        mut intents: Vec<PresentationIntent>,
    ) -> Vec<Event> {
        let mut log = Vec::new();
        loop {
            self.paint.apply_intents(&intents);
            self.choreographer.observe(&intents);
            intents.clear();
            if commands.is_empty() {
                break;
            }

            let mut events = Vec::new();
            for command in commands.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }

            self.paint.apply_events(&events);
            for event in &events {
                match event {
                    Event::BoardRebuilt { .. } => {
                        let board = query::board_view(&self.world);
                        self.scene.sync_sensors(&board);
                        self.paint.sync(&board);
                    }
                    Event::UnitSpawned {
                        unit,
                        team,
                        position,
                        ..
                    } => {
                        let _ = self.scene.spawn_body(
                            SpatialScene::unit_volume(*position),
                            BodyTag::Unit {
                                unit: *unit,
                                team: *team,
                            },
                            &mut commands,
                        );
                    }
                    Event::UnitMoved { unit, position, .. } => {
                        let _ = self.scene.place_unit(*unit, *position, &mut commands);
                    }
                    _ => {}
                }
            }

            self.reconciler.handle(&events, &self.scene, &mut commands);
            self.resolver.handle(
                &events,
                &query::board_view(&self.world),
                &self.scene,
                &mut commands,
                &mut intents,
            );
            log.extend(events);
        }
        log
    }

    /// Snapshot of the board used for the closing summary.
    pub(crate) fn report(&self) -> BoardReport {
        let board = query::board_view(&self.world);
        let units = query::unit_view(&self.world);
        let rows = board
            .iter()
            .map(|cell| ReportRow {
                cell: cell.id,
                x: cell.position.x,
                z: cell.position.z,
                display: CellDisplay::for_occupancy(cell.occupancy),
                color: self.paint.color(cell.id),
                unit: units
                    .iter()
                    .find(|unit| unit.cell == Some(cell.id))
                    .map(|unit| (unit.id, unit.team)),
            })
            .collect();
        BoardReport { rows }
    }
}

fn preferred_target(candidates: &[Candidate]) -> Option<CellId> {
    candidates
        .iter()
        .find(|candidate| candidate.kind == CandidateKind::Attack)
        .or_else(|| candidates.iter().max_by_key(|candidate| candidate.distance))
        .map(|candidate| candidate.cell)
}

#[derive(Clone, Debug)]
struct ReportRow {
    cell: CellId,
    x: f32,
    z: f32,
    display: CellDisplay,
    color: Option<Color>,
    unit: Option<(UnitId, TeamId)>,
}

/// Printable summary of every cell and who stands on it.
#[derive(Clone, Debug)]
pub(crate) struct BoardReport {
    rows: Vec<ReportRow>,
}

impl BoardReport {
    /// Number of cells shown as occupied.
    pub(crate) fn occupied(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| row.display == CellDisplay::Occupied)
            .count()
    }
}

impl fmt::Display for BoardReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "side  slot       x       z  state     colour")?;
        for row in &self.rows {
            let side = match row.cell.side() {
                TeamSide::Near => "near",
                TeamSide::Far => "far",
            };
            let state = match row.display {
                CellDisplay::Empty => "empty",
                CellDisplay::Occupied => "occupied",
            };
            let colour = row.color.map_or_else(
                || String::from("-"),
                |color| {
                    format!(
                        "rgba({:.2}, {:.2}, {:.2}, {:.2})",
                        color.red, color.green, color.blue, color.alpha
                    )
                },
            );
            write!(
                f,
                "{side:<5} {:>4} {:>7.2} {:>7.2}  {state:<9} {colour}",
                row.cell.slot(),
                row.x,
                row.z
            )?;
            if let Some((unit, team)) = row.unit {
                write!(f, "  unit {} (team {})", unit.get(), team.get())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_tactics_core::{BoardGeneration, MoveRange, Spacing};

    fn settings(team_size: u32) -> MatchSettings {
        MatchSettings {
            team_size,
            spacing: Spacing::default(),
            move_range: MoveRange::clamped(3),
            reconcile_interval: Duration::from_secs(1),
        }
    }

    #[test]
    fn opening_spawns_mark_cells_occupied() {
        let session = Session::start(&settings(3)).expect("session starts");
        let report = session.report();
        assert_eq!(report.occupied(), 4);
        assert!(report.to_string().contains("occupied"));
    }

    #[test]
    fn home_turn_attacks_before_moving() {
        let mut session = Session::start(&settings(3)).expect("session starts");
        let records = session.play_turn(HOME_TEAM);
        assert_eq!(records.len(), 2);
        assert!(records.iter().any(|record| matches!(
            record.outcome,
            Some(MoveOutcome::BattleTriggered { .. })
        )));
        assert!(query::unit_view(&session.world)
            .iter()
            .all(|unit| !unit.has_moved && !unit.animating));
    }

    #[test]
    fn attack_candidates_are_preferred() {
        let cell = |slot| CellId::new(BoardGeneration::new(1), TeamSide::Far, slot);
        let candidates = [
            Candidate {
                cell: cell(0),
                kind: CandidateKind::Move,
                distance: 2,
            },
            Candidate {
                cell: cell(1),
                kind: CandidateKind::Attack,
                distance: 1,
            },
        ];
        assert_eq!(preferred_target(&candidates), Some(cell(1)));
        assert_eq!(preferred_target(&candidates[..1]), Some(cell(0)));
        assert_eq!(preferred_target(&[]), None);
    }
}
