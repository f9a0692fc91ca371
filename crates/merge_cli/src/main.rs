//! CLI probe for `merge_core`.
//!
//! # Responsibility
//! - Verify core linkage (`merge_cli` with no arguments).
//! - Drive a seeded headless game against a real state store
//!   (`merge_cli play <db-path> [seed] [config.json]`).
//! - Log to `$MERGE_LOG_DIR` when set.

use merge_core::db::open_db;
use merge_core::{
    default_log_level, init_logging, load_config, remote_from_config, Catalog, CoreConfig,
    Direction, EconomyCoordinator, EconomyError, GridEngine, ShopCoordinator, ShopError,
    SqliteStateStore,
};
use std::error::Error;
use std::process::ExitCode;

const USAGE: &str = "usage: merge_cli [play <db-path> [seed] [config.json]]";
const LOG_DIR_ENV: &str = "MERGE_LOG_DIR";
const DEFAULT_SEED: u64 = 2048;
const MAX_MOVES: usize = 10_000;
const BOOST_ITEM_ID: &str = "spawn_boost_1";

fn main() -> ExitCode {
    if let Ok(log_dir) = std::env::var(LOG_DIR_ENV) {
        if let Err(err) = init_logging(default_log_level(), &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None => {
            println!("merge_core ping={}", merge_core::ping());
            println!("merge_core version={}", merge_core::core_version());
            ExitCode::SUCCESS
        }
        Some("play") => match play(&args[1..]) {
            Ok(summary) => {
                println!("{summary}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("play failed: {err}");
                ExitCode::FAILURE
            }
        },
        Some(other) => {
            eprintln!("unknown command `{other}`; {USAGE}");
            ExitCode::from(2)
        }
    }
}

fn play(args: &[String]) -> Result<String, Box<dyn Error>> {
    let db_path = args.first().ok_or(USAGE)?;
    let seed = args
        .get(1)
        .map(|raw| raw.parse::<u64>())
        .transpose()?
        .unwrap_or(DEFAULT_SEED);

    let config = match args.get(2) {
        Some(path) => load_config(path)?,
        None => CoreConfig::default(),
    };
    let conn = open_db(db_path)?;
    let catalog = Catalog::standard();
    let store = SqliteStateStore::with_record_key(&conn, config.economy.state_record_key.clone());
    let economy =
        EconomyCoordinator::with_config(store, remote_from_config(&config.remote), &config.economy);
    let mut shop = ShopCoordinator::new(&catalog, economy);

    let onboarding = shop.economy_mut().award_onboarding_if_needed(None)?;
    let mut board = GridEngine::with_seed(&config.board, seed)?;

    let boosted = match shop.purchase_and_apply(None, BOOST_ITEM_ID) {
        Ok(purchase) => {
            board.apply_effect(purchase.effect.as_ref());
            true
        }
        Err(ShopError::Economy(EconomyError::InsufficientFunds { .. })) => false,
        Err(err) => return Err(err.into()),
    };

    let mut attempts = 0;
    let mut effective_moves = 0;
    while board.can_continue() && attempts < MAX_MOVES {
        let direction = Direction::ALL[attempts % Direction::ALL.len()];
        if board.move_tiles(direction).moved {
            effective_moves += 1;
        }
        attempts += 1;
    }

    SqliteStateStore::new(&conn).save_board_snapshot(&board.snapshot())?;
    let balance = shop.economy().get_state(None)?;

    Ok(format!(
        "seed={seed} onboarding_awarded={} boosted={boosted} moves={effective_moves} score={} max_tile={} game_over={} coins={} source={}",
        onboarding.awarded,
        board.score(),
        board.max_tile(),
        !board.can_continue(),
        balance.state.coins,
        balance.source.as_str(),
    ))
}
