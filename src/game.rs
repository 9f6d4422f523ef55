use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::engine::{Board, BoardError, Move, SIZE, WIN_TILE};

/// Game lifecycle status, derived from the board on every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The board still equals its initial configuration; nothing happened yet.
    Idle,
    /// Moves are possible and no tile has reached the winning value.
    Playing,
    /// A tile of value 2048 or higher is on the board.
    Win,
    /// No empty cell and no equal adjacent pair remain.
    Lose,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Idle => "idle",
            Status::Playing => "playing",
            Status::Win => "win",
            Status::Lose => "lose",
        };
        write!(f, "{}", name)
    }
}

/// The stateful 2048 engine: working board, the initial snapshot it was
/// constructed from, and the running score.
///
/// The snapshot is captured once at construction and never mutated; it only
/// serves to detect [`Status::Idle`] and as the reset target for
/// [`Game::restart`]. All randomized operations come in pairs, a seedable
/// `_with` variant and a thread-RNG convenience.
///
/// ```
/// use game_2048::engine::Move;
/// use game_2048::game::{Game, Status};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let mut game = Game::new();
/// assert_eq!(game.status(), Status::Idle);
///
/// game.start_with(&mut rng);
/// assert_eq!(game.state().count_empty(), 14);
///
/// for dir in Move::ALL {
///     game.make_move_with(dir, &mut rng);
/// }
/// assert_ne!(game.status(), Status::Idle);
/// ```
pub struct Game {
    board: Board,
    initial: Board,
    score: u64,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Create a game over an empty board.
    pub fn new() -> Self {
        Game {
            board: Board::EMPTY,
            initial: Board::EMPTY,
            score: 0,
        }
    }

    /// Create a game starting from `rows`; the grid is validated and kept
    /// as the snapshot that defines [`Status::Idle`].
    pub fn with_board(rows: [[u32; SIZE]; SIZE]) -> Result<Self, BoardError> {
        Ok(Self::from_board(Board::from_rows(rows)?))
    }

    /// Create a game from an already validated board.
    pub fn from_board(board: Board) -> Self {
        Game {
            board,
            initial: board,
            score: 0,
        }
    }

    /// Populate two starting tiles via the spawn algorithm.
    ///
    /// Seeding only applies to a pristine board: once the board differs
    /// from its initial snapshot, `start` is a no-op, so calling it twice
    /// (or mid-game) changes nothing.
    pub fn start_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.board != self.initial {
            return;
        }
        self.board = self.board.with_random_tile(rng).with_random_tile(rng);
    }

    /// Thread-RNG convenience for [`Game::start_with`].
    pub fn start(&mut self) {
        self.start_with(&mut rand::thread_rng());
    }

    /// Reset the board to the initial snapshot and the score to zero, then
    /// populate two starting tiles.
    pub fn restart_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.board = self.initial;
        self.score = 0;
        self.board = self.board.with_random_tile(rng).with_random_tile(rng);
    }

    /// Thread-RNG convenience for [`Game::restart_with`].
    pub fn restart(&mut self) {
        self.restart_with(&mut rand::thread_rng());
    }

    /// Shift the board toward `dir`. If any tile moved or merged, commit
    /// the shifted board, add the merge gains to the score, and spawn one
    /// random tile into an empty cell. Returns whether the board changed.
    ///
    /// A shift that changes nothing has no side effects at all: no spawn,
    /// no score change.
    pub fn make_move_with<R: Rng + ?Sized>(&mut self, dir: Move, rng: &mut R) -> bool {
        let (shifted, gained) = self.board.shift(dir);
        if shifted == self.board {
            return false;
        }
        self.score += gained;
        self.board = shifted.with_random_tile(rng);
        true
    }

    /// Thread-RNG convenience for [`Game::make_move_with`].
    pub fn make_move(&mut self, dir: Move) -> bool {
        self.make_move_with(dir, &mut rand::thread_rng())
    }

    /// Merge tiles upward.
    pub fn move_up(&mut self) {
        self.make_move(Move::Up);
    }

    /// Merge tiles downward.
    pub fn move_down(&mut self) {
        self.make_move(Move::Down);
    }

    /// Merge tiles to the left.
    pub fn move_left(&mut self) {
        self.make_move(Move::Left);
    }

    /// Merge tiles to the right.
    pub fn move_right(&mut self) {
        self.make_move(Move::Right);
    }

    /// The accumulated score: the sum of every merged tile's resulting
    /// value since the last (re)start.
    pub fn score(&self) -> u64 {
        self.score
    }

    /// A copy of the current board.
    pub fn state(&self) -> Board {
        self.board
    }

    /// Compute the current status from the board. Never cached: the answer
    /// reflects the board at the instant of the call.
    pub fn status(&self) -> Status {
        if self.board == self.initial {
            Status::Idle
        } else if self.board.highest_tile() >= WIN_TILE {
            Status::Win
        } else if !self.board.has_moves() {
            Status::Lose
        } else {
            Status::Playing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn new_game_is_idle_with_zero_score() {
        let game = Game::new();
        assert_eq!(game.status(), Status::Idle);
        assert_eq!(game.score(), 0);
        assert_eq!(game.state(), Board::EMPTY);
    }

    #[test]
    fn custom_initial_board_is_idle_until_changed() {
        let game = Game::with_board([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
        assert_eq!(game.status(), Status::Idle);
        assert_eq!(game.state().tile(0, 0), 2);
        assert!(Game::with_board([[7, 0, 0, 0], [0; 4], [0; 4], [0; 4]]).is_err());
    }

    #[test]
    fn start_spawns_two_tiles_once() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut game = Game::new();
        game.start_with(&mut rng);
        assert_eq!(game.state().count_empty(), 14);
        assert_eq!(game.status(), Status::Playing);

        let snapshot = game.state();
        game.start_with(&mut rng);
        assert_eq!(game.state(), snapshot);
    }

    #[test]
    fn restart_resets_board_and_score() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut game = Game::with_board([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
        assert!(game.make_move_with(Move::Left, &mut rng));
        assert_eq!(game.score(), 4);

        game.restart_with(&mut rng);
        assert_eq!(game.score(), 0);
        // initial snapshot (2 tiles) plus two fresh spawns
        assert_eq!(game.state().count_empty(), 12);
        assert_eq!(game.status(), Status::Playing);
    }

    #[test]
    fn no_op_move_changes_nothing_and_spawns_nothing() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut game = Game::with_board([[2, 4, 8, 16], [0; 4], [0; 4], [0; 4]]).unwrap();
        let before = game.state();
        assert!(!game.make_move_with(Move::Left, &mut rng));
        assert_eq!(game.state(), before);
        assert_eq!(game.score(), 0);
        assert_eq!(game.status(), Status::Idle);
    }

    #[test]
    fn merge_move_updates_score_and_spawns_one_tile() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut game = Game::with_board([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
        assert!(game.make_move_with(Move::Left, &mut rng));
        assert_eq!(game.score(), 4);

        let rows = game.state().rows();
        assert_eq!(rows[0][0], 4);
        let nonzero: Vec<u32> = rows.iter().flatten().copied().filter(|&v| v != 0).collect();
        assert_eq!(nonzero.len(), 2);
        assert!(nonzero.iter().all(|&v| v == 2 || v == 4));
    }

    #[test]
    fn reaching_the_win_tile_wins() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut game = Game::with_board([[1024, 1024, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
        assert_eq!(game.status(), Status::Idle);
        assert!(game.make_move_with(Move::Left, &mut rng));
        assert_eq!(game.status(), Status::Win);
        assert_eq!(game.score(), 2048);
    }

    #[test]
    fn tiles_beyond_the_win_value_still_win() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut game = Game::with_board([[2048, 2048, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
        assert!(game.make_move_with(Move::Left, &mut rng));
        assert_eq!(game.state().tile(0, 0), 4096);
        assert_eq!(game.status(), Status::Win);
    }

    #[test]
    fn stuck_board_loses() {
        let mut game = Game::new();
        game.board =
            Board::from_rows([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]).unwrap();
        assert_eq!(game.status(), Status::Lose);
    }

    #[test]
    fn moved_games_spawn_exactly_one_tile() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut policy = StdRng::seed_from_u64(22);
        let mut game = Game::new();
        game.start_with(&mut rng);

        let mut spawns = 0;
        while spawns < 100 {
            if matches!(game.status(), Status::Win | Status::Lose) {
                break;
            }
            let dir = Move::ALL[policy.gen_range(0..4)];
            let (pure, _) = game.state().shift(dir);
            if !game.make_move_with(dir, &mut rng) {
                continue;
            }
            let after = game.state();
            let mut diff = Vec::new();
            for row in 0..SIZE {
                for col in 0..SIZE {
                    if after.tile(row, col) != pure.tile(row, col) {
                        diff.push((row, col));
                    }
                }
            }
            assert_eq!(diff.len(), 1);
            let (row, col) = diff[0];
            assert_eq!(pure.tile(row, col), 0);
            assert!(matches!(after.tile(row, col), 2 | 4));
            spawns += 1;
        }
        assert!(spawns > 0);
    }

    #[test]
    fn score_is_monotonic_over_play() {
        let mut rng = StdRng::seed_from_u64(31);
        let mut game = Game::new();
        game.start_with(&mut rng);
        let mut last = 0;
        for turn in 0..300 {
            game.make_move_with(Move::ALL[turn % 4], &mut rng);
            assert!(game.score() >= last);
            last = game.score();
            if game.status() == Status::Lose {
                break;
            }
        }
    }

    #[test]
    fn seeded_games_are_identical() {
        let play = |seed: u64| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut game = Game::new();
            game.start_with(&mut rng);
            let mut states = vec![game.state()];
            for turn in 0..64 {
                game.make_move_with(Move::ALL[turn % 4], &mut rng);
                states.push(game.state());
            }
            (states, game.score())
        };
        assert_eq!(play(99), play(99));
    }

    #[test]
    fn status_names_render_lowercase() {
        assert_eq!(Status::Playing.to_string(), "playing");
        assert_eq!(serde_json::to_string(&Status::Lose).unwrap(), "\"lose\"");
    }
}
