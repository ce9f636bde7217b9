use alloc::format;
use serde::{Deserialize, Serialize};

use crate::*;

/// Coarse game lifecycle. `Won` and `Lost` are terminal for the current
/// board; the only exit is the activate press that starts a new game.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Phase {
    AwaitingSeed,
    Playing,
    Won,
    Lost,
}

impl Phase {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for Phase {
    fn default() -> Self {
        Self::AwaitingSeed
    }
}

/// How an activate press is interpreted.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Mode {
    Reveal,
    Flag,
}

impl Mode {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Reveal => Self::Flag,
            Self::Flag => Self::Reveal,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Reveal => "REVEAL MODE",
            Self::Flag => "FLAG MODE",
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Self::Reveal
    }
}

/// Input-driven state machine on top of [`Board`]: owns the cursor, the
/// activate mode, and the game phase, and turns actions into board
/// mutations plus renderer notifications. It performs no I/O of its own.
pub struct GameSession<R, S, E> {
    board: Board,
    cursor: Coord2,
    mode: Mode,
    phase: Phase,
    renderer: R,
    rng: S,
    entropy: E,
}

impl<R, S, E> GameSession<R, S, E>
where
    R: Renderer,
    S: RandomSource,
    E: EntropySource,
{
    pub fn new(renderer: R, rng: S, entropy: E) -> Self {
        Self {
            board: Board::fortuna(),
            cursor: (0, 0),
            mode: Mode::default(),
            phase: Phase::default(),
            renderer,
            rng,
            entropy,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn cursor(&self) -> Coord2 {
        self.cursor
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Drain one polling tick worth of input.
    pub fn poll<I: InputSource>(&mut self, input: &mut I) {
        while let Some(action) = input.next_action() {
            self.handle(action);
        }
    }

    pub fn handle(&mut self, action: Action) {
        match self.phase {
            Phase::AwaitingSeed => {
                if matches!(action, Action::Activate) {
                    let entropy = self.entropy.read();
                    self.rng.seed(entropy);
                    log::debug!("random source seeded");
                    self.start_new_game();
                }
            }
            Phase::Playing => self.handle_playing(action),
            Phase::Won | Phase::Lost => {
                if matches!(action, Action::Activate) {
                    self.start_new_game();
                }
            }
        }
    }

    fn handle_playing(&mut self, action: Action) {
        match action {
            Action::MoveUp => self.move_cursor((-1, 0)),
            Action::MoveRight => self.move_cursor((0, 1)),
            Action::MoveDown => self.move_cursor((1, 0)),
            Action::MoveLeft => self.move_cursor((0, -1)),
            Action::Activate => match self.mode {
                Mode::Reveal => self.activate_reveal(),
                Mode::Flag => self.activate_flag(),
            },
            Action::ToggleMode => {
                self.mode = self.mode.toggled();
                self.draw_mode();
                // the cursor highlight encodes the mode
                self.draw_tile(self.cursor);
            }
        }
    }

    /// One cell in-bounds, no wraparound; a blocked move draws nothing.
    fn move_cursor(&mut self, (d_row, d_col): (i8, i8)) {
        let (rows, cols) = self.board.size();
        let Some(row) = self.cursor.0.checked_add_signed(d_row) else {
            return;
        };
        let Some(col) = self.cursor.1.checked_add_signed(d_col) else {
            return;
        };
        if row >= rows || col >= cols {
            return;
        }

        let prev = core::mem::replace(&mut self.cursor, (row, col));
        self.draw_tile(prev);
        self.draw_tile(self.cursor);
    }

    fn activate_reveal(&mut self) {
        let outcome = self.board.reveal(self.cursor);
        self.draw_flag_count();
        self.draw_board();

        match outcome {
            RevealOutcome::Detonated => {
                self.phase = Phase::Lost;
                self.draw_banner("GAME OVER!");
            }
            RevealOutcome::Cleared | RevealOutcome::Noop => {
                if self.board.is_won() {
                    self.phase = Phase::Won;
                    log::debug!("board cleared");
                    // redraw with every cell's true content exposed
                    self.draw_board();
                    self.draw_banner("GAME WON!");
                }
            }
        }
    }

    fn activate_flag(&mut self) {
        if self.board.toggle_flag(self.cursor).has_update() {
            self.draw_flag_count();
        }
    }

    /// Fresh board on the existing session: the cursor stays where it
    /// was, the mode resets to reveal, and the random stream continues
    /// without reseeding.
    fn start_new_game(&mut self) {
        self.renderer.clear();
        self.board.reset();
        self.board.place_bombs(&mut self.rng);
        self.phase = Phase::Playing;
        self.mode = Mode::Reveal;
        self.draw_board();
        self.draw_flag_count();
        self.draw_mode();
    }

    fn view_at(&self, coords: Coord2) -> TileView {
        let view = if matches!(self.phase, Phase::Won) {
            self.board.tile_view_disclosed(coords)
        } else {
            self.board.tile_view(coords)
        };

        if coords == self.cursor {
            view.with_cursor(self.mode)
        } else {
            view
        }
    }

    fn draw_tile(&mut self, coords: Coord2) {
        let view = self.view_at(coords);
        self.renderer.draw_tile(coords, view);
    }

    fn draw_board(&mut self) {
        let (rows, cols) = self.board.size();
        for row in 0..rows {
            for col in 0..cols {
                self.draw_tile((row, col));
            }
        }
    }

    fn draw_flag_count(&mut self) {
        let text = format!("Flags left: {}", self.board.flags_remaining());
        self.renderer.draw_status(StatusSlot::FlagCount, &text);
    }

    fn draw_mode(&mut self) {
        self.renderer.draw_status(StatusSlot::ModeLabel, self.mode.label());
    }

    fn draw_banner(&mut self, headline: &str) {
        self.renderer.clear_status();
        self.renderer.draw_status(StatusSlot::FlagCount, headline);
        self.renderer.draw_status(StatusSlot::ModeLabel, "Press to start");
        self.renderer.draw_status(StatusSlot::Message, "over!");
    }
}
