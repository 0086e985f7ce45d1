//! Contract for the physics collaborator that answers volume and ray queries.
//!
//! The engine never owns a physics simulation. Occupancy reconciliation and
//! occupant lookup go through [`SpatialQuery`], which any backend can
//! implement as long as it reports bodies together with their [`BodyTag`].

use glam::Vec3;

use crate::{TeamId, UnitId};

/// Centre offset, above the cell surface, of the occupancy probe volume.
pub const OCCUPANCY_PROBE_LIFT: f32 = 0.5;
/// Half extents of the volume used to re-derive a cell's occupancy.
pub const OCCUPANCY_PROBE_HALF_EXTENTS: Vec3 = Vec3::new(0.5, 1.0, 0.5);
/// Half extents of the tighter volume used to identify a cell's occupant.
pub const OCCUPANT_PROBE_HALF_EXTENTS: Vec3 = Vec3::new(0.4, 0.5, 0.4);
/// Length of the upward ray cast during startup reconciliation.
pub const STARTUP_RAY_LENGTH: f32 = 2.0;

/// Opaque handle the spatial backend assigns to a body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(u32);

impl BodyId {
    /// Creates a new body handle with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Classification attached to every body known to the spatial backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyTag {
    /// Body belonging to a unit standing on the board.
    Unit {
        /// Unit that owns the body.
        unit: UnitId,
        /// Team the unit fights for.
        team: TeamId,
    },
    /// Any other collider (terrain, props, cursors).
    Scenery,
}

impl BodyTag {
    /// Reports whether the body carries the unit tag.
    #[must_use]
    pub const fn is_unit(&self) -> bool {
        matches!(self, Self::Unit { .. })
    }

    /// Unit owning the body, if the body is tagged as a unit.
    #[must_use]
    pub const fn unit(&self) -> Option<UnitId> {
        match self {
            Self::Unit { unit, .. } => Some(*unit),
            Self::Scenery => None,
        }
    }

    /// Team of the unit owning the body, if the body is tagged as a unit.
    #[must_use]
    pub const fn team(&self) -> Option<TeamId> {
        match self {
            Self::Unit { team, .. } => Some(*team),
            Self::Scenery => None,
        }
    }
}

/// Body reported by an overlap query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyRef {
    /// Handle of the overlapping body.
    pub id: BodyId,
    /// Classification of the overlapping body.
    pub tag: BodyTag,
}

/// Body struck by a ray query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Handle of the struck body.
    pub id: BodyId,
    /// Classification of the struck body.
    pub tag: BodyTag,
    /// Distance along the ray at which the body was entered.
    pub distance: f32,
}

/// Axis-aligned box described by its centre and half extents.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    center: Vec3,
    half_extents: Vec3,
}

impl Aabb {
    /// Creates a box from its centre and non-negative half extents.
    #[must_use]
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents: half_extents.abs(),
        }
    }

    /// Volume probed when re-deriving the occupancy of a cell at `cell_position`.
    #[must_use]
    pub fn occupancy_probe(cell_position: Vec3) -> Self {
        Self::new(
            cell_position + Vec3::Y * OCCUPANCY_PROBE_LIFT,
            OCCUPANCY_PROBE_HALF_EXTENTS,
        )
    }

    /// Volume probed when identifying the unit standing on a cell.
    #[must_use]
    pub fn occupant_probe(cell_position: Vec3) -> Self {
        Self::new(
            cell_position + Vec3::Y * OCCUPANCY_PROBE_LIFT,
            OCCUPANT_PROBE_HALF_EXTENTS,
        )
    }

    /// Centre of the box.
    #[must_use]
    pub const fn center(&self) -> Vec3 {
        self.center
    }

    /// Smallest corner of the box.
    #[must_use]
    pub fn min(&self) -> Vec3 {
        self.center - self.half_extents
    }

    /// Largest corner of the box.
    #[must_use]
    pub fn max(&self) -> Vec3 {
        self.center + self.half_extents
    }

    /// Returns a copy of the box moved so that its centre lies at `center`.
    #[must_use]
    pub fn recentered(&self, center: Vec3) -> Self {
        Self {
            center,
            half_extents: self.half_extents,
        }
    }

    /// Reports whether the two boxes overlap. Touching faces count as overlap.
    #[must_use]
    pub fn intersects(&self, other: &Aabb) -> bool {
        let delta = (self.center - other.center).abs();
        let reach = self.half_extents + other.half_extents;
        delta.x <= reach.x && delta.y <= reach.y && delta.z <= reach.z
    }

    /// Reports whether `point` lies inside the box projected onto the ground plane.
    #[must_use]
    pub fn contains_xz(&self, point: Vec3) -> bool {
        let delta = (self.center - point).abs();
        delta.x <= self.half_extents.x && delta.z <= self.half_extents.z
    }

    /// Distance along `ray` at which it enters the box, if it does within range.
    ///
    /// A ray starting inside the box reports a distance of zero.
    #[must_use]
    pub fn ray_entry(&self, ray: &Ray) -> Option<f32> {
        let min = self.min();
        let max = self.max();
        let mut near = 0.0_f32;
        let mut far = ray.max_distance();

        for axis in 0..3 {
            let origin = ray.origin()[axis];
            let direction = ray.direction()[axis];
            if direction.abs() <= f32::EPSILON {
                if origin < min[axis] || origin > max[axis] {
                    return None;
                }
                continue;
            }

            let inverse = 1.0 / direction;
            let mut entry = (min[axis] - origin) * inverse;
            let mut exit = (max[axis] - origin) * inverse;
            if entry > exit {
                std::mem::swap(&mut entry, &mut exit);
            }
            near = near.max(entry);
            far = far.min(exit);
            if near > far {
                return None;
            }
        }

        Some(near)
    }
}

/// Half-line with a bounded length used for ray queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
}

impl Ray {
    /// Creates a ray. The direction is normalised; a zero direction yields `None`.
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Self> {
        let direction = direction.try_normalize()?;
        Some(Self {
            origin,
            direction,
            max_distance: max_distance.max(0.0),
        })
    }

    /// Upward ray used by startup reconciliation from a cell's surface.
    #[must_use]
    pub fn upward_probe(cell_position: Vec3) -> Self {
        Self {
            origin: cell_position,
            direction: Vec3::Y,
            max_distance: STARTUP_RAY_LENGTH,
        }
    }

    /// Starting point of the ray.
    #[must_use]
    pub const fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Unit-length direction of travel.
    #[must_use]
    pub const fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Maximum distance the ray travels.
    #[must_use]
    pub const fn max_distance(&self) -> f32 {
        self.max_distance
    }
}

/// Physics collaborator consulted for live spatial facts.
///
/// Implementations must return ray hits ordered by increasing distance.
pub trait SpatialQuery {
    /// Bodies whose colliders overlap `volume`, in a backend-defined order.
    fn overlap(&self, volume: &Aabb) -> Vec<BodyRef>;

    /// Every body struck by `ray`, nearest first.
    fn raycast(&self, ray: &Ray) -> Vec<RayHit>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boxes_sharing_a_face_intersect() {
        let left = Aabb::new(Vec3::ZERO, Vec3::splat(0.5));
        let right = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::splat(0.5));
        assert!(left.intersects(&right));
        let far = Aabb::new(Vec3::new(1.01, 0.0, 0.0), Vec3::splat(0.5));
        assert!(!left.intersects(&far));
    }

    #[test]
    fn upward_ray_enters_box_above_origin() {
        let body = Aabb::new(Vec3::new(0.0, 1.5, 0.0), Vec3::splat(0.25));
        let ray = Ray::upward_probe(Vec3::ZERO);
        let entry = body.ray_entry(&ray).expect("ray should strike the box");
        assert!((entry - 1.25).abs() < 1e-5);
    }

    #[test]
    fn ray_stops_at_max_distance() {
        let body = Aabb::new(Vec3::new(0.0, 3.0, 0.0), Vec3::splat(0.25));
        assert_eq!(body.ray_entry(&Ray::upward_probe(Vec3::ZERO)), None);
    }

    #[test]
    fn ray_starting_inside_reports_zero() {
        let body = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert_eq!(body.ray_entry(&Ray::upward_probe(Vec3::ZERO)), Some(0.0));
    }

    #[test]
    fn zero_direction_is_rejected() {
        assert!(Ray::new(Vec3::ZERO, Vec3::ZERO, 1.0).is_none());
    }

    #[test]
    fn scenery_has_no_team() {
        assert!(!BodyTag::Scenery.is_unit());
        assert_eq!(BodyTag::Scenery.team(), None);
    }
}
