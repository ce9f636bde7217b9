#![no_std]

extern crate alloc;

use serde::{Deserialize, Serialize};

pub use board::*;
pub use error::*;
pub use input::*;
pub use render::*;
pub use rng::*;
pub use session::*;
pub use tile::*;
pub use types::*;

mod board;
mod error;
mod input;
mod render;
mod rng;
mod session;
mod tile;
mod types;

/// Board geometry and bomb budget for one game.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub bombs: CellCount,
}

impl GameConfig {
    /// The configuration shipped on the target hardware.
    pub const FORTUNA: Self = Self {
        size: (9, 9),
        bombs: 10,
    };

    pub const fn new_unchecked(size: Coord2, bombs: CellCount) -> Self {
        Self { size, bombs }
    }

    pub fn new((rows, cols): Coord2, bombs: CellCount) -> Self {
        let rows = rows.clamp(1, Coord::MAX);
        let cols = cols.clamp(1, Coord::MAX);
        let bombs = bombs.min(mult(rows, cols));
        Self::new_unchecked((rows, cols), bombs)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }
}

/// Outcome of a reveal request.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    Noop,
    Cleared,
    Detonated,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            Noop => false,
            Cleared => true,
            Detonated => true,
        }
    }
}

/// Outcome of a flag toggle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FlagOutcome {
    Noop,
    Flagged,
    Unflagged,
}

impl FlagOutcome {
    pub const fn has_update(self) -> bool {
        use FlagOutcome::*;
        match self {
            Noop => false,
            Flagged => true,
            Unflagged => true,
        }
    }
}
