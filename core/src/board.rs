use alloc::collections::VecDeque;
use hashbrown::HashSet;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// The minefield and its per-cell player-visible state.
///
/// Every gameplay operation is total: out-of-range coordinates and
/// requests that do not apply to the current cell state come back as
/// `Noop`, never as an error or a panic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cells: Array2<Cell>,
    bomb_budget: CellCount,
    flags_remaining: CellCount,
}

impl Board {
    pub fn new(config: GameConfig) -> Self {
        Self {
            cells: Array2::default(config.size.to_nd_index()),
            bomb_budget: config.bombs,
            flags_remaining: config.bombs,
        }
    }

    /// The game shipped on the target hardware: 9x9 grid, ten bombs.
    pub fn fortuna() -> Self {
        Self::new(GameConfig::FORTUNA)
    }

    /// Build a board with a fixed bomb layout; adjacency counts are
    /// derived from the layout. Duplicate coordinates collapse into one
    /// bomb.
    pub fn from_bomb_coords(size: Coord2, bomb_coords: &[Coord2]) -> Result<Self> {
        let config = GameConfig::new_unchecked(size, 0);
        if bomb_coords.len() > usize::from(config.total_cells()) {
            return Err(GameError::TooManyBombs);
        }

        let mut board = Self::new(config);
        for &coords in bomb_coords {
            if !board.contains(coords) {
                return Err(GameError::InvalidCoords);
            }
            board.place_bomb_at(coords);
        }

        let placed = board
            .cells
            .iter()
            .filter(|cell| cell.content.is_bomb())
            .count()
            .try_into()
            .unwrap();
        board.bomb_budget = placed;
        board.flags_remaining = placed;
        Ok(board)
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.cells.dim();
        (dim.0.try_into().unwrap(), dim.1.try_into().unwrap())
    }

    pub fn total_cells(&self) -> CellCount {
        self.cells.len().try_into().unwrap()
    }

    pub fn bomb_budget(&self) -> CellCount {
        self.bomb_budget
    }

    pub fn flags_remaining(&self) -> CellCount {
        self.flags_remaining
    }

    pub fn cell_at(&self, coords: Coord2) -> Cell {
        self.cells[coords.to_nd_index()]
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        let (rows, cols) = self.size();
        coords.0 < rows && coords.1 < cols
    }

    /// Reset every cell to hidden and empty and restore the flag pool.
    /// Bombs must be placed again before play.
    pub fn reset(&mut self) {
        self.cells.fill(Cell::default());
        self.flags_remaining = self.bomb_budget;
    }

    /// Place the whole bomb budget: each bomb draws `(row, col)` from the
    /// index stream and re-rolls until the draw lands on a bomb-free
    /// cell, then bumps the count of every adjacent safe cell.
    pub fn place_bombs<S: RandomSource + ?Sized>(&mut self, rng: &mut S) {
        let (rows, cols) = self.size();
        let budget = self.bomb_budget.min(self.total_cells());
        if budget < self.bomb_budget {
            log::warn!(
                "bomb budget {} exceeds the {}-cell board, placing {}",
                self.bomb_budget,
                self.total_cells(),
                budget
            );
        }

        for _ in 0..budget {
            loop {
                let row = (rng.next_index() % u32::from(rows)) as Coord;
                let col = (rng.next_index() % u32::from(cols)) as Coord;
                if !self.cell_at((row, col)).content.is_bomb() {
                    self.place_bomb_at((row, col));
                    break;
                }
            }
        }
    }

    fn place_bomb_at(&mut self, coords: Coord2) {
        if self.cells[coords.to_nd_index()].content.is_bomb() {
            return;
        }

        self.cells[coords.to_nd_index()].content = CellContent::Bomb;
        for pos in self.cells.iter_neighbors(coords) {
            if let CellContent::Safe(count) = self.cells[pos.to_nd_index()].content {
                self.cells[pos.to_nd_index()].content = CellContent::Safe(count + 1);
            }
        }
    }

    /// Reveal a cell. A bomb exposes the whole board and reports
    /// `Detonated`; a safe zero-count cell flood-fills through its
    /// orthogonal neighbors.
    pub fn reveal(&mut self, coords: Coord2) -> RevealOutcome {
        use RevealOutcome::*;

        if !self.contains(coords) {
            return Noop;
        }

        let cell = self.cell_at(coords);
        if cell.state.is_revealed() {
            return Noop;
        }

        if cell.content.is_bomb() {
            self.reveal_everything();
            log::debug!("bomb at {:?} detonated", coords);
            return Detonated;
        }

        self.flood_reveal(coords);
        Cleared
    }

    /// Work-list rendition of the recursive reveal. A cell flips to
    /// revealed before its neighbors are queued, and revealed cells
    /// short-circuit, so the walk cannot loop.
    fn flood_reveal(&mut self, start: Coord2) {
        self.reveal_single(start);

        if !matches!(self.cell_at(start).content, CellContent::Safe(0)) {
            return;
        }

        let mut visited = HashSet::new();
        visited.insert(start);
        let mut to_visit: VecDeque<Coord2> = self.cells.iter_orthogonal(start).collect();

        while let Some(coords) = to_visit.pop_front() {
            if !visited.insert(coords) {
                continue;
            }

            if self.cell_at(coords).state.is_revealed() {
                continue;
            }

            self.reveal_single(coords);

            if matches!(self.cell_at(coords).content, CellContent::Safe(0)) {
                to_visit.extend(
                    self.cells
                        .iter_orthogonal(coords)
                        .filter(|pos| !visited.contains(pos)),
                );
            }
        }
    }

    /// A zero-count cell has no adjacent bombs, so the flood never
    /// reaches a bomb; flags in its path are consumed back into the pool.
    fn reveal_single(&mut self, coords: Coord2) {
        let cell = self.cell_at(coords);
        if matches!(cell.state, CellState::Flagged) {
            self.flags_remaining += 1;
        }
        self.cells[coords.to_nd_index()].state = CellState::Revealed;
        log::trace!("revealed {:?} as {:?}", coords, cell.content);
    }

    fn reveal_everything(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.state = CellState::Revealed;
        }
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> FlagOutcome {
        use FlagOutcome::*;

        if !self.contains(coords) {
            return Noop;
        }

        match self.cell_at(coords).state {
            CellState::Revealed => Noop,
            CellState::Flagged => {
                self.cells[coords.to_nd_index()].state = CellState::Hidden;
                self.flags_remaining += 1;
                Unflagged
            }
            CellState::Hidden if self.flags_remaining > 0 => {
                self.cells[coords.to_nd_index()].state = CellState::Flagged;
                self.flags_remaining -= 1;
                Flagged
            }
            CellState::Hidden => Noop,
        }
    }

    /// Won when no cell is simultaneously safe and unrevealed. Flags on
    /// bombs play no part.
    pub fn is_won(&self) -> bool {
        self.cells
            .iter()
            .all(|cell| cell.content.is_bomb() || cell.state.is_revealed())
    }

    pub fn adjacent_bomb_count(&self, coords: Coord2) -> u8 {
        self.cells
            .iter_neighbors(coords)
            .filter(|&pos| self.cell_at(pos).content.is_bomb())
            .count()
            .try_into()
            .unwrap()
    }

    /// In-play renderer projection: content is exposed for revealed
    /// cells only.
    pub fn tile_view(&self, coords: Coord2) -> TileView {
        let cell = self.cell_at(coords);
        TileView {
            state: cell.state,
            content: cell.state.is_revealed().then_some(cell.content),
            cursor: None,
        }
    }

    /// Post-win projection: covered cells keep their state but their true
    /// content is exposed, matching the original end-of-game board.
    pub fn tile_view_disclosed(&self, coords: Coord2) -> TileView {
        let cell = self.cell_at(coords);
        TileView {
            state: cell.state,
            content: Some(cell.content),
            cursor: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    /// Replays a fixed index script.
    struct SeqSource {
        script: Vec<u32>,
        next: usize,
    }

    impl SeqSource {
        fn new(script: &[u32]) -> Self {
            Self {
                script: Vec::from(script),
                next: 0,
            }
        }
    }

    impl RandomSource for SeqSource {
        fn seed(&mut self, _entropy: u64) {}

        fn next_index(&mut self) -> u32 {
            let value = self.script[self.next % self.script.len()];
            self.next += 1;
            value
        }
    }

    /// Ten bombs: the whole bottom row plus (7,8).
    fn bottom_row_board() -> Board {
        let mut bombs: Vec<Coord2> = (0..9).map(|col| (8, col)).collect();
        bombs.push((7, 8));
        Board::from_bomb_coords((9, 9), &bombs).unwrap()
    }

    #[test]
    fn place_bombs_places_exact_budget_despite_collisions() {
        // The second draw repeats (0,0) and must be re-rolled.
        let script = [
            0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 0, 8,
        ];
        let mut board = Board::fortuna();

        board.place_bombs(&mut SeqSource::new(&script));

        let bombs = (0..9)
            .flat_map(|row| (0..9).map(move |col| (row, col)))
            .filter(|&coords| board.cell_at(coords).content.is_bomb())
            .count();
        assert_eq!(bombs, 10);
        assert!(board.cell_at((0, 0)).content.is_bomb());
        assert!(board.cell_at((0, 8)).content.is_bomb());
    }

    #[test]
    fn adjacency_counts_match_neighborhoods() {
        let script = [
            0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 0, 8,
        ];
        let mut board = Board::fortuna();
        board.place_bombs(&mut SeqSource::new(&script));

        for row in 0..9 {
            for col in 0..9 {
                let cell = board.cell_at((row, col));
                if let CellContent::Safe(count) = cell.content {
                    assert_eq!(
                        count,
                        board.adjacent_bomb_count((row, col)),
                        "count mismatch at {:?}",
                        (row, col)
                    );
                }
            }
        }
    }

    #[test]
    fn from_bomb_coords_rejects_out_of_range() {
        assert_eq!(
            Board::from_bomb_coords((2, 2), &[(2, 0)]),
            Err(GameError::InvalidCoords)
        );
    }

    #[test]
    fn from_bomb_coords_rejects_overfull_layouts() {
        let bombs = [(0, 0), (0, 1), (1, 0), (1, 1), (0, 0)];
        assert_eq!(
            Board::from_bomb_coords((2, 2), &bombs),
            Err(GameError::TooManyBombs)
        );
    }

    #[test]
    fn reveal_out_of_bounds_is_noop() {
        let mut board = bottom_row_board();

        assert_eq!(board.reveal((9, 0)), RevealOutcome::Noop);
        assert_eq!(board.reveal((0, 9)), RevealOutcome::Noop);
    }

    #[test]
    fn reveal_is_idempotent() {
        let mut board = Board::from_bomb_coords((2, 2), &[(0, 0)]).unwrap();

        assert_eq!(board.reveal((1, 1)), RevealOutcome::Cleared);
        assert_eq!(board.reveal((1, 1)), RevealOutcome::Noop);
    }

    #[test]
    fn flood_fill_opens_zero_region_and_numbered_border() {
        let mut board = bottom_row_board();

        assert_eq!(board.reveal((0, 0)), RevealOutcome::Cleared);

        // The orthogonally connected zero region spans rows 0-5 plus
        // (6,0)-(6,6); its border numbers open with it.
        for row in 0..=6 {
            for col in 0..9 {
                assert!(
                    board.cell_at((row, col)).state.is_revealed(),
                    "expected {:?} revealed",
                    (row, col)
                );
            }
        }
        for col in 0..=6 {
            assert!(board.cell_at((7, col)).state.is_revealed());
        }
        assert_eq!(board.cell_at((6, 7)).content, CellContent::Safe(1));
        assert_eq!(board.cell_at((7, 6)).content, CellContent::Safe(3));

        // (7,7) touches no zero cell orthogonally and stays covered, as
        // does every bomb.
        assert!(board.cell_at((7, 7)).state.is_covered());
        assert!(board.cell_at((7, 8)).state.is_covered());
        for col in 0..9 {
            assert!(board.cell_at((8, col)).state.is_covered());
        }
        assert!(!board.is_won());
    }

    #[test]
    fn revealing_last_safe_cell_wins() {
        let mut board = bottom_row_board();
        board.reveal((0, 0));

        assert_eq!(board.reveal((7, 7)), RevealOutcome::Cleared);
        assert_eq!(board.cell_at((7, 7)).content, CellContent::Safe(4));
        assert!(board.is_won());
    }

    #[test]
    fn flood_fill_covers_a_bombless_board_from_the_corner() {
        let mut board = Board::from_bomb_coords((9, 9), &[]).unwrap();

        assert_eq!(board.reveal((0, 0)), RevealOutcome::Cleared);

        for row in 0..9 {
            for col in 0..9 {
                assert!(board.cell_at((row, col)).state.is_revealed());
            }
        }
        assert!(board.is_won());
    }

    #[test]
    fn detonation_exposes_the_whole_board() {
        let mut board = Board::from_bomb_coords((3, 3), &[(1, 1)]).unwrap();
        assert_eq!(board.toggle_flag((0, 0)), FlagOutcome::Flagged);

        assert_eq!(board.reveal((1, 1)), RevealOutcome::Detonated);

        for row in 0..3 {
            for col in 0..3 {
                assert!(board.cell_at((row, col)).state.is_revealed());
            }
        }
        // Detonation does not return flags to the pool.
        assert_eq!(board.flags_remaining(), 0);
    }

    #[test]
    fn flag_does_not_shield_a_bomb_from_reveal() {
        let mut board = Board::from_bomb_coords((2, 2), &[(0, 0)]).unwrap();
        board.toggle_flag((0, 0));

        assert_eq!(board.reveal((0, 0)), RevealOutcome::Detonated);
    }

    #[test]
    fn toggle_flag_round_trips_the_pool() {
        let mut board = bottom_row_board();

        assert_eq!(board.toggle_flag((4, 4)), FlagOutcome::Flagged);
        assert_eq!(board.flags_remaining(), 9);
        assert_eq!(board.toggle_flag((4, 4)), FlagOutcome::Unflagged);
        assert_eq!(board.flags_remaining(), 10);
    }

    #[test]
    fn toggle_flag_is_noop_on_revealed_and_out_of_bounds() {
        let mut board = Board::from_bomb_coords((2, 2), &[(0, 0)]).unwrap();
        board.reveal((1, 1));

        assert_eq!(board.toggle_flag((1, 1)), FlagOutcome::Noop);
        assert_eq!(board.toggle_flag((5, 5)), FlagOutcome::Noop);
    }

    #[test]
    fn flag_supply_exhausts_at_the_bomb_budget() {
        let mut board = Board::from_bomb_coords((2, 2), &[(0, 0)]).unwrap();

        assert_eq!(board.toggle_flag((0, 1)), FlagOutcome::Flagged);
        assert_eq!(board.flags_remaining(), 0);
        assert_eq!(board.toggle_flag((1, 0)), FlagOutcome::Noop);
        assert_eq!(board.flags_remaining(), 0);
    }

    #[test]
    fn revealing_a_flagged_cell_returns_its_flag() {
        let mut board = Board::from_bomb_coords((2, 2), &[(0, 0)]).unwrap();
        board.toggle_flag((0, 1));
        assert_eq!(board.flags_remaining(), 0);

        assert_eq!(board.reveal((0, 1)), RevealOutcome::Cleared);

        assert!(board.cell_at((0, 1)).state.is_revealed());
        assert_eq!(board.flags_remaining(), 1);
    }

    #[test]
    fn flagging_every_bomb_and_clearing_the_rest_wins() {
        let mut board = bottom_row_board();
        for col in 0..9 {
            assert_eq!(board.toggle_flag((8, col)), FlagOutcome::Flagged);
        }
        assert_eq!(board.toggle_flag((7, 8)), FlagOutcome::Flagged);
        assert_eq!(board.flags_remaining(), 0);

        board.reveal((0, 0));
        assert_eq!(board.reveal((7, 7)), RevealOutcome::Cleared);

        assert!(board.is_won());
        assert_eq!(board.flags_remaining(), 0);
    }

    #[test]
    fn win_does_not_require_flagging_bombs() {
        let mut board = Board::from_bomb_coords((2, 1), &[(0, 0)]).unwrap();

        assert_eq!(board.reveal((1, 0)), RevealOutcome::Cleared);

        assert!(board.is_won());
        assert!(board.cell_at((0, 0)).state.is_covered());
    }

    #[test]
    fn reset_restores_cover_and_flag_pool() {
        let mut board = Board::from_bomb_coords((2, 2), &[(0, 0)]).unwrap();
        board.toggle_flag((0, 1));
        board.reveal((1, 1));

        board.reset();

        for row in 0..2 {
            for col in 0..2 {
                assert_eq!(board.cell_at((row, col)), Cell::default());
            }
        }
        assert_eq!(board.flags_remaining(), 1);
    }

    #[test]
    fn tile_views_expose_content_by_rule() {
        let mut board = Board::from_bomb_coords((2, 2), &[(0, 0)]).unwrap();
        board.toggle_flag((0, 0));
        board.reveal((1, 1));

        assert_eq!(board.tile_view((0, 1)).content, None);
        assert_eq!(
            board.tile_view((1, 1)).content,
            Some(CellContent::Safe(1))
        );

        let disclosed = board.tile_view_disclosed((0, 0));
        assert_eq!(disclosed.state, CellState::Flagged);
        assert_eq!(disclosed.content, Some(CellContent::Bomb));
        assert!(disclosed.is_bomb());
    }
}
