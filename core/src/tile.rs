use serde::{Deserialize, Serialize};

use crate::Mode;

/// What a cell holds, fixed once bombs are placed. `Safe` carries the
/// number of Chebyshev-adjacent bombs (0-8).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellContent {
    Safe(u8),
    Bomb,
}

impl CellContent {
    pub const fn is_bomb(self) -> bool {
        matches!(self, Self::Bomb)
    }
}

impl Default for CellContent {
    fn default() -> Self {
        Self::Safe(0)
    }
}

/// Player-visible tag. Hidden and flagged convert into each other;
/// revealed is terminal.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellState {
    Hidden,
    Flagged,
    Revealed,
}

impl CellState {
    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed)
    }

    pub const fn is_covered(self) -> bool {
        matches!(self, Self::Hidden | Self::Flagged)
    }
}

impl Default for CellState {
    fn default() -> Self {
        Self::Hidden
    }
}

/// One board position.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub state: CellState,
    pub content: CellContent,
}

/// Read-only projection handed to the renderer: what a tile should show,
/// never how to draw it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TileView {
    pub state: CellState,
    /// Present when the rules expose the tile's content: revealed cells
    /// during play, every cell once the board is won.
    pub content: Option<CellContent>,
    /// Present when the tile sits under the player cursor; carries the
    /// active mode so the highlight can reflect it.
    pub cursor: Option<Mode>,
}

impl TileView {
    pub fn is_bomb(self) -> bool {
        matches!(self.content, Some(CellContent::Bomb))
    }

    pub(crate) fn with_cursor(self, mode: Mode) -> Self {
        Self {
            cursor: Some(mode),
            ..self
        }
    }
}
