// Inputbind State
// Per-frame edge counters and held flags for physical inputs and binds

mod tracker;

pub use tracker::StateTracker;

use crate::key::Vec2I;
use crate::modifier::KeyMod;

/// Activity of one tracked key, button or bind.
///
/// A state exists while it is held or has edges this frame; the frame reset
/// drops it once both are gone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    presses: u32,
    releases: u32,
    held: bool,
    mods: KeyMod,
    press_positions: Vec<Vec2I>,
    release_positions: Vec<Vec2I>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Presses seen since the last frame reset
    pub fn presses(&self) -> u32 {
        self.presses
    }

    /// Releases seen since the last frame reset
    pub fn releases(&self) -> u32 {
        self.releases
    }

    pub fn held(&self) -> bool {
        self.held
    }

    /// Modifier bits contributed by a held modifier key (keys only)
    pub fn mods(&self) -> KeyMod {
        self.mods
    }

    /// Click positions of this frame's presses (mouse only)
    pub fn press_positions(&self) -> &[Vec2I] {
        &self.press_positions
    }

    /// Positions of this frame's releases (mouse only)
    pub fn release_positions(&self) -> &[Vec2I] {
        &self.release_positions
    }

    pub fn press(&mut self) {
        self.presses += 1;
        self.held = true;
    }

    pub fn release(&mut self) {
        self.releases += 1;
        self.held = false;
    }

    /// Clear edge counters and recorded positions; the held flag survives
    pub fn reset(&mut self) {
        self.presses = 0;
        self.releases = 0;
        self.press_positions.clear();
        self.release_positions.clear();
    }

    pub(crate) fn add_mods(&mut self, mods: KeyMod) {
        self.mods |= mods;
    }

    pub(crate) fn remove_mods(&mut self, mods: KeyMod) {
        self.mods &= !mods;
    }

    pub(crate) fn push_press_position(&mut self, position: Vec2I) {
        self.press_positions.push(position);
    }

    pub(crate) fn push_release_position(&mut self, position: Vec2I) {
        self.release_positions.push(position);
    }
}
