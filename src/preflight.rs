//! Pre-flight infeasibility oracle (spec §4.3).
//!
//! Cheap necessary-condition tests that run before the exact-cover search.
//! Every failing test contributes one human-readable reason; the oracle
//! passes iff no reason fires. None of these tests are sufficient on their
//! own — they rule out obviously-impossible boards fast, without building
//! the placement table.

use crate::board::Board;
use crate::problem::TileType;

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// A shape is parity-neutral iff its cells split evenly between the two
/// checkerboard colors. Translation, 90-degree rotation, and reflection all
/// preserve `(x + y) mod 2` up to a uniform shift, so testing the base shape
/// once covers every orientation and every placement offset. For a
/// rectangular tile this reduces to "at least one side is even".
fn is_parity_neutral(tile: &TileType) -> bool {
    let (mut black, mut white) = (0i64, 0i64);
    for &(x, y) in &tile.base {
        if (x + y).rem_euclid(2) == 0 {
            black += 1;
        } else {
            white += 1;
        }
    }
    black == white
}

/// Runs every pre-flight test, returning one reason per failing test.
/// Infeasible iff the returned list is non-empty.
pub fn run(board: &Board, tile_types: &[TileType]) -> Vec<String> {
    let mut reasons = Vec::new();
    let n = board.n();

    // 1. No tiles available.
    if tile_types.iter().all(|t| t.count == Some(0)) {
        reasons.push(
            "no tiles are available: every tile type has a stock count of 0".to_string(),
        );
        return reasons;
    }

    let available: Vec<&TileType> = tile_types.iter().filter(|t| t.has_stock()).collect();

    // 2. Total area.
    if available.iter().all(|t| t.count.is_some()) {
        let max_area: u64 = available
            .iter()
            .map(|t| t.count.unwrap() as u64 * t.area() as u64)
            .sum();
        if max_area < n as u64 {
            reasons.push(format!(
                "maximum coverable area ({max_area}) is less than the {n} free cells"
            ));
        }
    }

    // 3. Parity of count: an odd free-cell count can never be covered by
    // tiles that all cover an even number of cells.
    if n % 2 == 1 && available.iter().all(|t| t.area() % 2 == 0) {
        reasons.push(
            "the board has an odd number of unit cells, but all available tiles cover an even number of cells"
                .to_string(),
        );
    }

    // 4. GCD divisibility.
    if let Some(&first) = available.first() {
        let g = available
            .iter()
            .skip(1)
            .fold(first.area(), |acc, t| gcd(acc, t.area()));
        if g > 0 && n % g != 0 {
            reasons.push(format!(
                "the free-cell count ({n}) is not divisible by the gcd ({g}) of the available tile areas"
            ));
        }
    }

    // 5. Checkerboard parity.
    if !available.is_empty() && available.iter().all(|t| is_parity_neutral(t)) {
        let (mut black, mut white) = (0i64, 0i64);
        for &(x, y) in &board.free_cells {
            if (x + y).rem_euclid(2) == 0 {
                black += 1;
            } else {
                white += 1;
            }
        }
        let imbalance = (black - white).unsigned_abs();
        if imbalance != 0 {
            reasons.push(format!(
                "checkerboard imbalance of {imbalance} cells, but every available tile is parity-neutral"
            ));
        }
    }

    reasons
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domino() -> TileType {
        TileType {
            name: "domino".into(),
            base: vec![(0, 0), (1, 0)],
            allow_rotate: true,
            allow_reflect: false,
            count: None,
        }
    }

    #[test]
    fn three_by_three_dominoes_fail_parity() {
        let board = Board::new(3, 3, &[]).unwrap();
        let reasons = run(&board, &[domino()]);
        assert!(reasons.iter().any(|r| r.contains("odd number of unit cells")));
    }

    #[test]
    fn eight_by_eight_opposite_corner_holes_fail_checkerboard() {
        let board = Board::new(8, 8, &[(0, 0), (7, 7)]).unwrap();
        let reasons = run(&board, &[domino()]);
        assert!(reasons.iter().any(|r| r.contains("checkerboard imbalance")));
    }

    #[test]
    fn three_by_one_dominoes_fail() {
        let board = Board::new(3, 1, &[]).unwrap();
        let reasons = run(&board, &[domino()]);
        assert!(!reasons.is_empty());
    }

    #[test]
    fn feasible_two_by_two_passes() {
        let board = Board::new(2, 2, &[]).unwrap();
        let reasons = run(&board, &[domino()]);
        assert!(reasons.is_empty());
    }

    #[test]
    fn zero_stock_everywhere_fails_immediately() {
        let board = Board::new(2, 2, &[]).unwrap();
        let mut t = domino();
        t.count = Some(0);
        let reasons = run(&board, &[t]);
        assert_eq!(reasons.len(), 1);
        assert!(reasons[0].contains("no tiles are available"));
    }

    #[test]
    fn insufficient_total_area_fails() {
        let board = Board::new(6, 4, &[]).unwrap();
        let mut t = domino();
        t.count = Some(2); // covers 4 cells, board has 24
        let reasons = run(&board, &[t]);
        assert!(reasons.iter().any(|r| r.contains("maximum coverable area")));
    }
}
