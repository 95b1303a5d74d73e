use std::collections::BTreeMap;

use proptest::prelude::*;
use reelspin_core::{
    evaluate, generate, seeded_rng, spin_once, BetContext, GameConfig, Grid, LineWin,
    ProvablyFairRng, SlotError, Symbol, SymbolCounts, SymbolTable,
};

fn reference_counts() -> SymbolCounts {
    SymbolTable::reference().counts().clone()
}

fn column(s: &str) -> Vec<Symbol> {
    s.chars().map(|c| Symbol::from_char(c).unwrap()).collect()
}

#[test]
fn rng_repeatable() {
    let config = GameConfig::reference();
    let bet = BetContext::new(3, 1);
    let mut rng1 = ProvablyFairRng::new("s", "c", 42);
    let mut rng2 = ProvablyFairRng::new("s", "c", 42);
    for _ in 0..10 {
        assert_eq!(
            spin_once(&mut rng1, &config, &bet).unwrap(),
            spin_once(&mut rng2, &config, &bet).unwrap()
        );
    }
}

#[test]
fn row_frequencies_match_pool_weights() {
    let counts = reference_counts();
    let cols = 20_000;
    let grid = generate(3, cols, &counts, &mut seeded_rng(2024)).unwrap();
    for row in 0..3 {
        let mut seen: BTreeMap<Symbol, usize> = BTreeMap::new();
        for s in grid.row(row) {
            *seen.entry(s).or_default() += 1;
        }
        for (symbol, &count) in &counts {
            let expected = f64::from(count) / 20.0;
            let actual = *seen.get(symbol).unwrap_or(&0) as f64 / cols as f64;
            assert!(
                (actual - expected).abs() < 0.03,
                "row {row} symbol {symbol}: {actual} vs {expected}"
            );
        }
    }
}

#[test]
fn three_a_columns_pay_one_line() {
    let grid = Grid::from_columns(vec![column("AAA"), column("AAA"), column("AAA")]).unwrap();
    let values = BTreeMap::from([(Symbol::A, 10)]);
    let out = evaluate(&grid, 1, 10, &values).unwrap();
    assert_eq!(out.total_winnings, 100);
    assert_eq!(
        out.line_wins,
        vec![LineWin {
            line: 1,
            symbol: Symbol::A,
            winnings: 100
        }]
    );
}

#[test]
fn mismatched_top_row_pays_nothing() {
    let grid = Grid::from_columns(vec![column("ABC"), column("BCD"), column("ADB")]).unwrap();
    let out = evaluate(&grid, 1, 5, SymbolTable::reference().values()).unwrap();
    assert_eq!(out.total_winnings, 0);
    assert!(out.line_wins.is_empty());
}

#[test]
fn outer_rows_match_in_order() {
    // rows: C C C / A B D / D D D
    let grid = Grid::from_columns(vec![column("CAD"), column("CBD"), column("CDD")]).unwrap();
    let values = SymbolTable::reference().values().clone();
    let out = evaluate(&grid, 3, 7, &values).unwrap();
    let lines: Vec<u32> = out.line_wins.iter().map(|w| w.line).collect();
    assert_eq!(lines, vec![1, 3]);
    assert_eq!(out.line_wins[0].symbol, Symbol::C);
    assert_eq!(out.line_wins[1].symbol, Symbol::D);
    assert_eq!(out.total_winnings, 3 * 7 + 2 * 7);
}

#[test]
fn oversized_rows_is_configuration_error() {
    let err = generate(21, 3, &reference_counts(), &mut seeded_rng(0)).unwrap_err();
    assert!(matches!(err, SlotError::Configuration(_)));
    assert!(generate(20, 3, &reference_counts(), &mut seeded_rng(0)).is_ok());
}

fn counts_strategy() -> impl Strategy<Value = SymbolCounts> {
    proptest::collection::btree_map(
        prop::sample::select(Symbol::ALL.to_vec()),
        1u32..8,
        1..=4,
    )
}

proptest! {
    #[test]
    fn prop_generated_grid_respects_shape_and_counts(
        counts in counts_strategy(),
        rows in 1usize..6,
        cols in 1usize..6,
        seed in any::<u64>(),
    ) {
        let pool: u32 = counts.values().sum();
        prop_assume!(pool as usize >= rows);
        let grid = generate(rows, cols, &counts, &mut seeded_rng(seed)).unwrap();
        prop_assert_eq!(grid.cols(), cols);
        for col in grid.columns() {
            prop_assert_eq!(col.len(), rows);
            for (symbol, &limit) in &counts {
                let used = col.iter().filter(|s| *s == symbol).count();
                prop_assert!(used <= limit as usize);
            }
            prop_assert!(col.iter().all(|s| counts.contains_key(s)));
        }
    }

    #[test]
    fn prop_evaluate_is_pure_and_consistent(
        seed in any::<u64>(),
        lines in 1u32..=3,
        bet in 1u64..=100,
    ) {
        let table = SymbolTable::reference();
        let grid = generate(3, 3, table.counts(), &mut seeded_rng(seed)).unwrap();
        let first = evaluate(&grid, lines, bet, table.values()).unwrap();
        let second = evaluate(&grid, lines, bet, table.values()).unwrap();
        prop_assert_eq!(&first, &second);

        let sum: u64 = first.line_wins.iter().map(|w| w.winnings).sum();
        prop_assert_eq!(first.total_winnings, sum);
        prop_assert!(first.line_wins.windows(2).all(|w| w[0].line < w[1].line));
        for win in &first.line_wins {
            prop_assert!(win.line >= 1 && win.line <= lines);
            let row = (win.line - 1) as usize;
            prop_assert!(grid.row(row).all(|s| s == win.symbol));
            prop_assert_eq!(win.winnings, table.value(win.symbol).unwrap() * bet);
        }
    }
}
