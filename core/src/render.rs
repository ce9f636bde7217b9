use crate::{Coord2, TileView};

/// The three fixed text lines of the status area, named after their
/// in-play content. The end-of-game banner overwrites all three.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StatusSlot {
    FlagCount,
    ModeLabel,
    Message,
}

/// Display collaborator. The session reports *what* changed; redrawing a
/// single tile must leave every other tile untouched (cursor movement
/// relies on it).
pub trait Renderer {
    /// Wipe the whole display, grid and status area both.
    fn clear(&mut self);

    fn draw_tile(&mut self, coords: Coord2, view: TileView);

    fn draw_status(&mut self, slot: StatusSlot, text: &str);

    fn clear_status(&mut self);
}
