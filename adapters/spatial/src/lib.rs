#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Box-only spatial backend for Grid Tactics.
//!
//! [`SpatialScene`] stands in for a physics engine: it stores tagged
//! axis-aligned bodies, keeps one trigger sensor per board cell, reports
//! contact changes as [`Command::BodyEntered`] / [`Command::BodyExited`] and
//! answers [`SpatialQuery`] requests.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec3;
use grid_tactics_core::{
    Aabb, BodyId, BodyRef, BodyTag, BoardView, CellId, Command, Ray, RayHit, SpatialQuery, UnitId,
};
use tracing::debug;

/// Half extents of the collider given to a unit body.
pub const UNIT_HALF_EXTENTS: Vec3 = Vec3::new(0.3, 0.5, 0.3);

#[derive(Clone, Copy, Debug)]
struct SceneBody {
    volume: Aabb,
    tag: BodyTag,
}

#[derive(Clone, Debug)]
struct Sensor {
    volume: Aabb,
    contacts: BTreeSet<BodyId>,
}

/// Collection of tagged bodies and per-cell trigger sensors.
#[derive(Clone, Debug, Default)]
pub struct SpatialScene {
    bodies: BTreeMap<BodyId, SceneBody>,
    sensors: BTreeMap<CellId, Sensor>,
    next_body: u32,
}

impl SpatialScene {
    /// Creates an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collider of a unit whose feet rest at `position`.
    #[must_use]
    pub fn unit_volume(position: Vec3) -> Aabb {
        Aabb::new(position + Vec3::Y * UNIT_HALF_EXTENTS.y, UNIT_HALF_EXTENTS)
    }

    /// Adds a body and reports the sensors it starts overlapping.
    pub fn spawn_body(&mut self, volume: Aabb, tag: BodyTag, out: &mut Vec<Command>) -> BodyId {
        let id = BodyId::new(self.next_body);
        self.next_body = self.next_body.wrapping_add(1);
        let _ = self.bodies.insert(id, SceneBody { volume, tag });
        self.refresh_contacts(id, out);
        id
    }

    /// Moves a body so its collider is centred at `center`.
    ///
    /// Returns `false` when the body does not exist.
    pub fn move_body(&mut self, id: BodyId, center: Vec3, out: &mut Vec<Command>) -> bool {
        let Some(body) = self.bodies.get_mut(&id) else {
            return false;
        };
        body.volume = body.volume.recentered(center);
        self.refresh_contacts(id, out);
        true
    }

    /// Moves a unit body so that its feet rest at `position`.
    pub fn place_unit(&mut self, unit: UnitId, position: Vec3, out: &mut Vec<Command>) -> bool {
        match self.body_of_unit(unit) {
            Some(id) => self.move_body(id, Self::unit_volume(position).center(), out),
            None => false,
        }
    }

    /// Removes a body, reporting an exit for every sensor it overlapped.
    pub fn remove_body(&mut self, id: BodyId, out: &mut Vec<Command>) -> bool {
        let Some(body) = self.bodies.remove(&id) else {
            return false;
        };
        let body_ref = BodyRef { id, tag: body.tag };
        for (cell, sensor) in &mut self.sensors {
            if sensor.contacts.remove(&id) {
                out.push(Command::BodyExited {
                    cell: *cell,
                    body: body_ref,
                });
            }
        }
        true
    }

    /// Body carrying the tag of `unit`.
    #[must_use]
    pub fn body_of_unit(&self, unit: UnitId) -> Option<BodyId> {
        self.bodies
            .iter()
            .find(|(_, body)| body.tag.unit() == Some(unit))
            .map(|(id, _)| *id)
    }

    /// Number of sensors currently installed.
    #[must_use]
    pub fn sensor_count(&self) -> usize {
        self.sensors.len()
    }

    /// Replaces the sensors so that they match the cells of `board`.
    ///
    /// Sensors of vanished cells are dropped without exit reports. New
    /// sensors start with the bodies already inside them as silent contacts,
    /// the way a trigger created around a resting collider does; the startup
    /// probe is what discovers those bodies.
    pub fn sync_sensors(&mut self, board: &BoardView) {
        let before = self.sensors.len();
        self.sensors
            .retain(|cell, _| board.cell(*cell).is_some());
        let retained = self.sensors.len();

        for cell in board.iter() {
            if self.sensors.contains_key(&cell.id) {
                continue;
            }
            let volume = Aabb::occupancy_probe(cell.position);
            let contacts = self
                .bodies
                .iter()
                .filter(|(_, body)| body.volume.intersects(&volume))
                .map(|(id, _)| *id)
                .collect();
            let _ = self.sensors.insert(cell.id, Sensor { volume, contacts });
        }
        debug!(
            dropped = before - retained,
            installed = self.sensors.len() - retained,
            "sensors synchronised"
        );
    }

    fn refresh_contacts(&mut self, id: BodyId, out: &mut Vec<Command>) {
        let Some(body) = self.bodies.get(&id).copied() else {
            return;
        };
        let body_ref = BodyRef { id, tag: body.tag };
        for (cell, sensor) in &mut self.sensors {
            let touching = sensor.volume.intersects(&body.volume);
            if touching && sensor.contacts.insert(id) {
                out.push(Command::BodyEntered {
                    cell: *cell,
                    body: body_ref,
                });
            } else if !touching && sensor.contacts.remove(&id) {
                out.push(Command::BodyExited {
                    cell: *cell,
                    body: body_ref,
                });
            }
        }
    }
}

impl SpatialQuery for SpatialScene {
    fn overlap(&self, volume: &Aabb) -> Vec<BodyRef> {
        self.bodies
            .iter()
            .filter(|(_, body)| body.volume.intersects(volume))
            .map(|(id, body)| BodyRef {
                id: *id,
                tag: body.tag,
            })
            .collect()
    }

    fn raycast(&self, ray: &Ray) -> Vec<RayHit> {
        let mut hits: Vec<RayHit> = self
            .bodies
            .iter()
            .filter_map(|(id, body)| {
                body.volume.ray_entry(ray).map(|distance| RayHit {
                    id: *id,
                    tag: body.tag,
                    distance,
                })
            })
            .collect();
        hits.sort_by(|left, right| {
            left.distance
                .total_cmp(&right.distance)
                .then(left.id.cmp(&right.id))
        });
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_tactics_core::{
        BoardGeneration, CellSnapshot, Occupancy, Spacing, TeamId, TeamSide,
    };

    fn board(generation: u32, positions: &[Vec3]) -> BoardView {
        let generation = BoardGeneration::new(generation);
        let cells = positions
            .iter()
            .enumerate()
            .map(|(slot, position)| CellSnapshot {
                id: CellId::new(generation, TeamSide::Near, slot as u16),
                position: *position,
                occupancy: Occupancy::Empty,
                occupants: 0,
            })
            .collect();
        BoardView::from_snapshots(generation, Spacing::default(), cells)
    }

    fn unit_tag(unit: u32) -> BodyTag {
        BodyTag::Unit {
            unit: UnitId::new(unit),
            team: TeamId::new(0),
        }
    }

    #[test]
    fn moving_a_unit_between_sensors_reports_exit_and_enter() {
        let left = Vec3::new(0.0, 1.0, 0.0);
        let right = Vec3::new(3.0, 1.0, 0.0);
        let view = board(1, &[left, right]);
        let left_cell = view.iter().next().map(|cell| cell.id).expect("left");
        let right_cell = view.iter().nth(1).map(|cell| cell.id).expect("right");

        let mut scene = SpatialScene::new();
        scene.sync_sensors(&view);
        let mut commands = Vec::new();
        let body = scene.spawn_body(SpatialScene::unit_volume(left), unit_tag(0), &mut commands);
        let body_ref = BodyRef {
            id: body,
            tag: unit_tag(0),
        };
        assert_eq!(
            commands,
            vec![Command::BodyEntered {
                cell: left_cell,
                body: body_ref,
            }]
        );

        commands.clear();
        assert!(scene.place_unit(UnitId::new(0), right, &mut commands));
        assert_eq!(
            commands,
            vec![
                Command::BodyExited {
                    cell: left_cell,
                    body: body_ref,
                },
                Command::BodyEntered {
                    cell: right_cell,
                    body: body_ref,
                },
            ]
        );
    }

    #[test]
    fn new_sensors_adopt_resting_bodies_silently() {
        let position = Vec3::new(0.0, 1.0, 0.0);
        let mut scene = SpatialScene::new();
        let mut commands = Vec::new();
        let body = scene.spawn_body(
            SpatialScene::unit_volume(position),
            unit_tag(4),
            &mut commands,
        );
        scene.sync_sensors(&board(1, &[position]));
        assert!(commands.is_empty());

        assert!(scene.remove_body(body, &mut commands));
        assert!(matches!(commands[..], [Command::BodyExited { .. }]));
    }

    #[test]
    fn sync_drops_sensors_of_previous_generation() {
        let position = Vec3::new(0.0, 1.0, 0.0);
        let mut scene = SpatialScene::new();
        scene.sync_sensors(&board(1, &[position, Vec3::new(5.0, 1.0, 0.0)]));
        assert_eq!(scene.sensor_count(), 2);
        scene.sync_sensors(&board(2, &[position]));
        assert_eq!(scene.sensor_count(), 1);
    }

    #[test]
    fn raycast_orders_hits_by_distance() {
        let mut scene = SpatialScene::new();
        let mut commands = Vec::new();
        let high = scene.spawn_body(
            Aabb::new(Vec3::new(0.0, 1.5, 0.0), Vec3::splat(0.1)),
            BodyTag::Scenery,
            &mut commands,
        );
        let low = scene.spawn_body(
            Aabb::new(Vec3::new(0.0, 0.5, 0.0), Vec3::splat(0.1)),
            unit_tag(1),
            &mut commands,
        );
        let _ = scene.spawn_body(
            Aabb::new(Vec3::new(4.0, 0.5, 0.0), Vec3::splat(0.1)),
            unit_tag(2),
            &mut commands,
        );

        let hits = scene.raycast(&Ray::upward_probe(Vec3::ZERO));
        let order: Vec<BodyId> = hits.iter().map(|hit| hit.id).collect();
        assert_eq!(order, vec![low, high]);
    }

    #[test]
    fn overlap_reports_tagged_bodies() {
        let mut scene = SpatialScene::new();
        let mut commands = Vec::new();
        let position = Vec3::new(0.0, 1.0, 0.0);
        let _ = scene.spawn_body(SpatialScene::unit_volume(position), unit_tag(7), &mut commands);

        let found = scene.overlap(&Aabb::occupant_probe(position));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tag.unit(), Some(UnitId::new(7)));
        assert!(scene
            .overlap(&Aabb::occupant_probe(Vec3::new(2.0, 1.0, 0.0)))
            .is_empty());
    }
}
