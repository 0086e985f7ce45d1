#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Catalog of hand-tuned team formations keyed by team size.
//!
//! Offsets are designed data: `x` counts columns from the board's centre line
//! and `y` counts rows back from the team's front row. Fractional values nudge
//! individual cells and must be preserved exactly.

use std::collections::BTreeMap;

use grid_tactics_core::SetupError;

/// Relative position of one cell within a formation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FormationOffset {
    /// Column offset, multiplied by the horizontal spacing.
    pub x: f32,
    /// Row offset, multiplied by the vertical spacing.
    pub y: f32,
}

impl FormationOffset {
    /// Creates a new formation offset.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

const SOLO: [FormationOffset; 1] = [FormationOffset::new(0.0, 0.0)];

const TRIO: [FormationOffset; 3] = [
    // front
    FormationOffset::new(-0.92, 0.0),
    FormationOffset::new(1.0, 0.0),
    // back
    FormationOffset::new(0.0, 1.0),
];

const SQUAD: [FormationOffset; 6] = [
    // front
    FormationOffset::new(-0.92, 0.0),
    FormationOffset::new(1.0, 0.0),
    FormationOffset::new(2.92, 0.0),
    // middle
    FormationOffset::new(0.04, 1.0),
    FormationOffset::new(1.97, 1.0),
    // back
    FormationOffset::new(1.0, 2.045),
];

const PLATOON: [FormationOffset; 10] = [
    FormationOffset::new(-2.92, 0.0),
    FormationOffset::new(-0.92, 0.0),
    FormationOffset::new(1.0, 0.0),
    FormationOffset::new(2.92, 0.0),
    FormationOffset::new(-1.97, 1.0),
    FormationOffset::new(0.0, 1.0),
    FormationOffset::new(1.97, 1.0),
    FormationOffset::new(-0.97, 2.0),
    FormationOffset::new(0.97, 2.0),
    FormationOffset::new(0.0, 3.045),
];

/// Lookup table from team size to formation.
///
/// The team size of a formation is the number of offsets it holds, so a
/// registered size can never disagree with its layout.
#[derive(Clone, Debug, Default)]
pub struct FormationCatalog {
    layouts: BTreeMap<u32, Vec<FormationOffset>>,
}

impl FormationCatalog {
    /// Creates a catalog without any formations.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates the catalog with the built-in 1, 3, 6 and 10 unit formations.
    #[must_use]
    pub fn standard() -> Self {
        let mut catalog = Self::empty();
        for layout in [&SOLO[..], &TRIO[..], &SQUAD[..], &PLATOON[..]] {
            let _ = catalog.register(layout.to_vec());
        }
        catalog
    }

    /// Registers a formation under its own length, returning the layout it replaced.
    pub fn register(&mut self, offsets: Vec<FormationOffset>) -> Option<Vec<FormationOffset>> {
        let team_size = u32::try_from(offsets.len()).unwrap_or(u32::MAX);
        self.layouts.insert(team_size, offsets)
    }

    /// Retrieves the offsets for `team_size`.
    pub fn layout_for(&self, team_size: u32) -> Result<&[FormationOffset], SetupError> {
        self.layouts
            .get(&team_size)
            .filter(|offsets| !offsets.is_empty())
            .map(Vec::as_slice)
            .ok_or(SetupError::UnknownFormation { team_size })
    }

    /// Team sizes that have a registered formation, in ascending order.
    pub fn team_sizes(&self) -> impl Iterator<Item = u32> + '_ {
        self.layouts
            .iter()
            .filter(|(_, offsets)| !offsets.is_empty())
            .map(|(team_size, _)| *team_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_catalog_rejects_every_size() {
        let catalog = FormationCatalog::empty();
        assert_eq!(
            catalog.layout_for(1),
            Err(SetupError::UnknownFormation { team_size: 1 })
        );
    }

    #[test]
    fn empty_layout_is_never_served() {
        let mut catalog = FormationCatalog::empty();
        let _ = catalog.register(Vec::new());
        assert!(catalog.layout_for(0).is_err());
        assert_eq!(catalog.team_sizes().count(), 0);
    }

    #[test]
    fn register_replaces_existing_layout() {
        let mut catalog = FormationCatalog::standard();
        let replaced = catalog.register(vec![FormationOffset::new(4.0, 0.0)]);
        assert_eq!(replaced, Some(SOLO.to_vec()));
        assert_eq!(
            catalog.layout_for(1).expect("solo layout"),
            &[FormationOffset::new(4.0, 0.0)]
        );
    }
}
