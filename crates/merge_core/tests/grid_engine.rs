use merge_core::engine::line::resolve_line;
use merge_core::{BoardConfig, BoardSnapshot, Direction, GameplayEffect, GridEngine};
use proptest::prelude::*;

fn board_from(cells: Vec<Vec<u32>>, spawn_values: Vec<u32>) -> GridEngine {
    let config = BoardConfig {
        rows: cells.len(),
        cols: cells[0].len(),
        ..BoardConfig::default()
    };
    let mut board = GridEngine::with_seed(&config, 42).unwrap();
    board.restore(&BoardSnapshot {
        cells,
        score: 0,
        spawn_values,
        score_multiplier: 1.0,
    });
    board
}

/// Board contents after sliding, before the spawn.
fn slid(cells: &[Vec<u32>], direction: Direction) -> Vec<Vec<u32>> {
    let rows = cells.len();
    let cols = cells[0].len();
    let reverse = matches!(direction, Direction::Right | Direction::Down);
    let mut out = cells.to_vec();
    match direction {
        Direction::Left | Direction::Right => {
            for (row, line) in cells.iter().enumerate() {
                out[row] = resolve_line(line, reverse, 1.0).cells;
            }
        }
        Direction::Up | Direction::Down => {
            for col in 0..cols {
                let line: Vec<u32> = (0..rows).map(|row| cells[row][col]).collect();
                let resolved = resolve_line(&line, reverse, 1.0).cells;
                for row in 0..rows {
                    out[row][col] = resolved[row];
                }
            }
        }
    }
    out
}

fn grid_strategy(rows: usize, cols: usize) -> impl Strategy<Value = Vec<Vec<u32>>> {
    prop::collection::vec(
        prop::collection::vec(prop::sample::select(vec![0u32, 0, 2, 4, 8, 16]), cols),
        rows,
    )
}

fn direction_strategy() -> impl Strategy<Value = Direction> {
    prop::sample::select(Direction::ALL.to_vec())
}

#[test]
fn move_left_merges_leading_pair_then_keeps_tail() {
    let mut board = board_from(
        vec![
            vec![2, 2, 4, 0],
            vec![0, 0, 0, 0],
            vec![0, 0, 0, 0],
            vec![0, 0, 0, 0],
        ],
        vec![2],
    );

    let outcome = board.move_tiles(Direction::Left);

    assert!(outcome.moved);
    assert_eq!(outcome.score_delta, 4);
    assert_eq!(board.score(), 4);
    assert_eq!(board.cells()[0][..2], [4, 4]);
    // One spawned tile lands somewhere in the remaining 14 empty cells.
    assert_eq!(board.empty_cell_count(), 13);
}

#[test]
fn score_multiplier_scales_move_delta() {
    let mut board = board_from(
        vec![
            vec![2, 2, 4, 0],
            vec![0, 0, 0, 0],
            vec![0, 0, 0, 0],
            vec![0, 0, 0, 0],
        ],
        vec![2],
    );
    board.apply_effect(Some(&GameplayEffect::ScoreMultiplier { multiplier: 2.0 }));

    let outcome = board.move_tiles(Direction::Left);
    assert_eq!(outcome.score_delta, 8);
    assert_eq!(board.score(), 8);
}

#[test]
fn full_checkerboard_without_equal_neighbours_is_terminal() {
    let board = board_from(
        vec![
            vec![2, 4, 2, 4],
            vec![4, 2, 4, 2],
            vec![2, 4, 2, 4],
            vec![4, 2, 4, 2],
        ],
        vec![2],
    );
    assert!(!board.can_continue());
}

#[test]
fn full_board_with_vertical_pair_can_continue() {
    let board = board_from(
        vec![
            vec![2, 4, 2, 4],
            vec![4, 2, 4, 2],
            vec![2, 4, 2, 8],
            vec![4, 2, 4, 8],
        ],
        vec![2],
    );
    assert!(board.can_continue());
}

#[test]
fn terminal_board_rejects_every_direction_without_spawning() {
    let cells = vec![vec![2, 4, 2], vec![4, 2, 4]];
    let mut board = board_from(cells.clone(), vec![2]);
    for direction in Direction::ALL {
        let outcome = board.move_tiles(direction);
        assert!(!outcome.moved);
        assert_eq!(board.cells(), cells);
    }
}

#[test]
fn spawn_override_controls_new_tiles() {
    let mut board = board_from(
        vec![
            vec![0, 0, 0, 2],
            vec![0, 0, 0, 0],
            vec![0, 0, 0, 0],
            vec![0, 0, 0, 0],
        ],
        vec![2],
    );
    board.apply_effect(Some(&GameplayEffect::SpawnDistributionOverride {
        values: vec![64],
    }));

    assert!(board.move_tiles(Direction::Left).moved);
    let spawned: Vec<u32> = board
        .cells()
        .concat()
        .into_iter()
        .filter(|value| *value != 0 && *value != 2)
        .collect();
    assert_eq!(spawned, vec![64]);
}

#[test]
fn spawn_tile_on_full_board_returns_false() {
    let cells = vec![vec![2, 4], vec![8, 16]];
    let mut board = board_from(cells.clone(), vec![2]);
    assert!(!board.spawn_tile());
    assert_eq!(board.cells(), cells);
}

#[test]
fn spawn_positions_cover_every_empty_cell() {
    let mut hits = [0u32; 4];
    let config = BoardConfig {
        rows: 1,
        cols: 4,
        spawn_values: vec![2],
    };
    for seed in 0..400 {
        let mut board = GridEngine::with_seed(&config, seed).unwrap();
        board.restore(&BoardSnapshot {
            cells: vec![vec![0, 0, 0, 0]],
            score: 0,
            spawn_values: vec![2],
            score_multiplier: 1.0,
        });
        assert!(board.spawn_tile());
        let cells = board.cells();
        let position = cells[0].iter().position(|value| *value != 0).unwrap();
        hits[position] += 1;
    }
    // Uniform choice: each of the four cells expects ~100 hits.
    for count in hits {
        assert!((50..=150).contains(&count), "skewed spawn histogram {hits:?}");
    }
}

#[test]
fn supports_non_square_boards() {
    let mut board = board_from(vec![vec![2, 0], vec![2, 0], vec![4, 4]], vec![2]);
    let outcome = board.move_tiles(Direction::Up);
    assert!(outcome.moved);
    assert_eq!(board.cell(0, 0), Some(4));
    assert_eq!(board.cell(1, 0), Some(4));
    assert_eq!(outcome.score_delta, 4);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Score never decreases and the reported delta is exactly what was added.
    #[test]
    fn prop_score_monotonic_and_delta_exact(
        seed in any::<u64>(),
        directions in prop::collection::vec(direction_strategy(), 1..64)
    ) {
        let mut board = GridEngine::with_seed(&BoardConfig::default(), seed).unwrap();
        for direction in directions {
            let before = board.score();
            let outcome = board.move_tiles(direction);
            prop_assert_eq!(board.score(), before + outcome.score_delta);
            if !outcome.moved {
                prop_assert_eq!(outcome.score_delta, 0);
            }
        }
    }

    /// An unmoved board is left bit-for-bit identical.
    #[test]
    fn prop_noop_move_changes_nothing(
        cells in grid_strategy(4, 4),
        direction in direction_strategy()
    ) {
        let mut board = board_from(cells.clone(), vec![2]);
        let expected = slid(&cells, direction);
        let outcome = board.move_tiles(direction);

        prop_assert_eq!(outcome.moved, expected != cells);
        if !outcome.moved {
            prop_assert_eq!(board.cells(), cells);
        }
    }

    /// A successful move adds exactly one tile, in a cell left empty by the slide.
    #[test]
    fn prop_single_spawn_into_empty_cell(
        cells in grid_strategy(4, 4),
        direction in direction_strategy()
    ) {
        let mut board = board_from(cells.clone(), vec![2, 4]);
        let expected = slid(&cells, direction);
        let outcome = board.move_tiles(direction);
        prop_assume!(outcome.moved);

        let after = board.cells();
        let mut differences = Vec::new();
        for row in 0..4 {
            for col in 0..4 {
                if after[row][col] != expected[row][col] {
                    differences.push((expected[row][col], after[row][col]));
                }
            }
        }
        prop_assert_eq!(differences.len(), 1);
        let (was, now) = differences[0];
        prop_assert_eq!(was, 0);
        prop_assert!(now == 2 || now == 4);
    }

    /// Tiles merge pairwise at most once: sums are preserved and the tile
    /// count can at most halve.
    #[test]
    fn prop_line_merges_are_pairwise(
        line in prop::collection::vec(prop::sample::select(vec![0u32, 2, 2, 4, 8]), 1..10),
        reverse in any::<bool>()
    ) {
        let resolved = resolve_line(&line, reverse, 1.0);
        let tiles_in = line.iter().filter(|value| **value != 0).count();
        let tiles_out = resolved.cells.iter().filter(|value| **value != 0).count();

        prop_assert_eq!(resolved.cells.len(), line.len());
        prop_assert_eq!(
            line.iter().map(|v| u64::from(*v)).sum::<u64>(),
            resolved.cells.iter().map(|v| u64::from(*v)).sum::<u64>()
        );
        prop_assert!(tiles_out * 2 >= tiles_in);
        prop_assert_eq!(resolved.score_delta == 0, tiles_in == tiles_out);
        prop_assert_eq!(resolved.score_delta % 4, 0);
    }

    /// Snapshot/restore reproduces any reachable board.
    #[test]
    fn prop_snapshot_roundtrip(
        seed in any::<u64>(),
        directions in prop::collection::vec(direction_strategy(), 0..32)
    ) {
        let mut board = GridEngine::with_seed(&BoardConfig::square(5), seed).unwrap();
        for direction in directions {
            board.move_tiles(direction);
        }
        let snapshot = board.snapshot();

        let mut restored = GridEngine::with_seed(&BoardConfig::square(5), seed ^ 1).unwrap();
        restored.restore(&snapshot);
        prop_assert_eq!(restored.cells(), board.cells());
        prop_assert_eq!(restored.score(), board.score());
        prop_assert_eq!(restored.spawn_distribution(), board.spawn_distribution());
    }
}
