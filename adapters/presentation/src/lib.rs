#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Presentation-side models for Grid Tactics adapters.
//!
//! [`CellPaint`] folds world events and presentation intents into the colour
//! every cell shows. [`Choreographer`] times the move and battle animations
//! and reports their completion back to the world.

use std::{collections::BTreeMap, time::Duration};

use grid_tactics_core::{
    BoardView, CellDisplay, CellId, Command, Event, HighlightTint, PresentationIntent, UnitId,
};

/// RGBA color used when presenting cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Returns the same color with a different alpha channel.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }
}

/// Colours a cell may be painted with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Display colour of an empty cell.
    pub empty: Color,
    /// Display colour of an occupied cell.
    pub occupied: Color,
    /// Highlight of a cell the selected unit may move onto.
    pub move_highlight: Color,
    /// Highlight of a cell the selected unit may attack.
    pub attack_highlight: Color,
}

impl Palette {
    /// Colour of a cell in the given display state.
    #[must_use]
    pub const fn display(&self, display: CellDisplay) -> Color {
        match display {
            CellDisplay::Empty => self.empty,
            CellDisplay::Occupied => self.occupied,
        }
    }

    /// Colour of a highlight tint.
    #[must_use]
    pub const fn highlight(&self, tint: HighlightTint) -> Color {
        match tint {
            HighlightTint::Move => self.move_highlight,
            HighlightTint::Attack => self.attack_highlight,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        let green = Color::new(0.0, 1.0, 0.0, 1.0);
        let red = Color::new(1.0, 0.0, 0.0, 1.0);
        Self {
            empty: green,
            occupied: red,
            move_highlight: green.with_alpha(0.5),
            attack_highlight: red.with_alpha(0.5),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CellLook {
    display: CellDisplay,
    highlight: Option<HighlightTint>,
}

/// Colour state of every cell on the current board.
#[derive(Clone, Debug, Default)]
pub struct CellPaint {
    palette: Palette,
    cells: BTreeMap<CellId, CellLook>,
}

impl CellPaint {
    /// Creates an empty paint model using `palette`.
    #[must_use]
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            cells: BTreeMap::new(),
        }
    }

    /// Replaces the tracked cells with those of `board`, painted by occupancy.
    pub fn sync(&mut self, board: &BoardView) {
        self.cells = board
            .iter()
            .map(|cell| {
                (
                    cell.id,
                    CellLook {
                        display: CellDisplay::for_occupancy(cell.occupancy),
                        highlight: None,
                    },
                )
            })
            .collect();
    }

    /// Folds world events into the cell colours.
    pub fn apply_events(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::BoardCleared { .. } => self.cells.clear(),
                Event::OccupancyChanged { cell, display, .. } => {
                    if let Some(look) = self.cells.get_mut(cell) {
                        look.display = *display;
                    }
                }
                Event::CellDisplayRefreshed { cell, display } => {
                    if let Some(look) = self.cells.get_mut(cell) {
                        look.display = *display;
                        look.highlight = None;
                    }
                }
                _ => {}
            }
        }
    }

    /// Folds presentation intents into the cell colours.
    pub fn apply_intents(&mut self, intents: &[PresentationIntent]) {
        for intent in intents {
            match intent {
                PresentationIntent::Highlight { cell, tint } => {
                    if let Some(look) = self.cells.get_mut(cell) {
                        look.highlight = Some(*tint);
                    }
                }
                PresentationIntent::ClearHighlight { cell } => {
                    if let Some(look) = self.cells.get_mut(cell) {
                        look.highlight = None;
                    }
                }
                _ => {}
            }
        }
    }

    /// Colour the cell currently shows. Highlights win over the display state.
    #[must_use]
    pub fn color(&self, cell: CellId) -> Option<Color> {
        self.cells.get(&cell).map(|look| match look.highlight {
            Some(tint) => self.palette.highlight(tint),
            None => self.palette.display(look.display),
        })
    }

    /// Number of cells currently highlighted.
    #[must_use]
    pub fn highlighted(&self) -> usize {
        self.cells
            .values()
            .filter(|look| look.highlight.is_some())
            .count()
    }
}

/// Time a move takes: translate at hover height, then settle.
pub const MOVE_DURATION: Duration = Duration::from_millis(500);
/// Time a battle lunge takes: dash, shake and return.
pub const LUNGE_DURATION: Duration = Duration::from_millis(800);

/// Tracks in-flight move and battle animations.
#[derive(Clone, Debug, Default)]
pub struct Choreographer {
    remaining: BTreeMap<UnitId, Duration>,
}

impl Choreographer {
    /// Creates a choreographer with nothing playing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the animations requested by `intents`.
    pub fn observe(&mut self, intents: &[PresentationIntent]) {
        for intent in intents {
            let (unit, duration) = match intent {
                PresentationIntent::MoveAlong { unit, .. } => (*unit, MOVE_DURATION),
                PresentationIntent::BattleLunge { attacker, .. } => (*attacker, LUNGE_DURATION),
                _ => continue,
            };
            let _ = self.remaining.insert(unit, duration);
        }
    }

    /// Advances every animation and reports the ones that finished.
    pub fn advance(&mut self, dt: Duration, out: &mut Vec<Command>) {
        self.remaining.retain(|unit, remaining| {
            *remaining = remaining.saturating_sub(dt);
            if remaining.is_zero() {
                out.push(Command::AnimationCompleted { unit: *unit });
                false
            } else {
                true
            }
        });
    }

    /// Reports whether any animation is still playing.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.remaining.is_empty()
    }
}
