//! game-2048: the core engine for the 2048 sliding-tile merging puzzle
//!
//! This crate provides:
//! - A value-grid `Board` type with ergonomic methods (`shift`,
//!   `with_random_tile`, `has_moves`, ...) over a fixed 4x4 grid
//! - A stateful `Game` engine tracking score, lifecycle (start/restart),
//!   and the derived idle/playing/win/lose status
//!
//! Quick start:
//! ```
//! use game_2048::engine::Move;
//! use game_2048::game::{Game, Status};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // Deterministic play with a seeded RNG
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut game = Game::new();
//! assert_eq!(game.status(), Status::Idle);
//!
//! game.start_with(&mut rng);
//! game.make_move_with(Move::Left, &mut rng);
//! assert!(game.state().count_empty() <= 14);
//! ```
//!
//! Note: every randomized operation also has a thread-RNG convenience
//! (e.g. `Game::start`, `Game::make_move`, the `move_up`/`move_down`/
//! `move_left`/`move_right` wrappers). Prefer the `_with` methods when you
//! need determinism.
//!
//! Rendering, input handling, and persistence are collaborator concerns:
//! the engine exposes the board as plain rows (and as serde data in the
//! same shape) and nothing else.

pub mod engine;
pub mod game;
