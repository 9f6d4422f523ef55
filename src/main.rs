use clap::Parser;
use game_2048::engine::Move;
use game_2048::game::{Game, Status};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

#[derive(Parser, Debug)]
#[command(
    name = "game-2048",
    version,
    about = "Self-play 2048 games with a uniformly random move policy"
)]
struct Cli {
    /// RNG seed for reproducible runs (drives both tiles and policy)
    #[arg(long)]
    seed: Option<u64>,
    /// Number of games to play
    #[arg(short = 'n', long, default_value_t = 1)]
    games: u64,
    /// Safety cap on moves per game
    #[arg(long, default_value_t = 100_000)]
    max_moves: u64,
    /// Print the board after every move
    #[arg(long)]
    show_board: bool,
}

struct GameReport {
    status: Status,
    score: u64,
    highest_tile: u32,
    moves: u64,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    if cli.games <= 1 {
        let report = play_game(&mut rng, cli.max_moves, cli.show_board);
        println!(
            "{} after {} moves: score {}, highest tile {}",
            report.status, report.moves, report.score, report.highest_tile
        );
        return;
    }

    let pb = ProgressBar::new(cli.games);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} games ({eta})",
        )
        .unwrap()
        .progress_chars("=>-"),
    );

    let mut wins = 0u64;
    let mut best = GameReport {
        status: Status::Idle,
        score: 0,
        highest_tile: 0,
        moves: 0,
    };
    let mut total_moves = 0u64;
    for game_idx in 0..cli.games {
        let report = play_game(&mut rng, cli.max_moves, cli.show_board);
        info!(
            "game {}: {} after {} moves (score {}, highest tile {})",
            game_idx, report.status, report.moves, report.score, report.highest_tile
        );
        if report.status == Status::Win {
            wins += 1;
        }
        total_moves += report.moves;
        if report.score > best.score {
            best = report;
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    println!("Games: {}, wins: {}, losses: {}", cli.games, wins, cli.games - wins);
    println!(
        "Best score: {} (highest tile {}), mean moves per game: {:.1}",
        best.score,
        best.highest_tile,
        total_moves as f64 / cli.games as f64
    );
}

/// Play one game to completion, picking a random legal direction each turn.
fn play_game(rng: &mut StdRng, max_moves: u64, show_board: bool) -> GameReport {
    let mut game = Game::new();
    game.start_with(rng);
    let mut moves = 0;
    while moves < max_moves {
        if matches!(game.status(), Status::Win | Status::Lose) {
            break;
        }
        let mut dirs = Move::ALL;
        dirs.shuffle(rng);
        let mut moved = false;
        for dir in dirs {
            if game.make_move_with(dir, rng) {
                moved = true;
                moves += 1;
                debug!("move {}: {} (score {})", moves, dir, game.score());
                if show_board {
                    println!("{}", game.state());
                }
                break;
            }
        }
        if !moved {
            break;
        }
    }
    GameReport {
        status: game.status(),
        score: game.score(),
        highest_tile: game.state().highest_tile(),
        moves,
    }
}
