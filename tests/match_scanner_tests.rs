//! Match detection over scripted boards.

use std::rc::Rc;

use gemfall::core::{Grid, MatchScanner, Piece, PieceId};
use gemfall::{GemData, GemKind, GridPosition, PieceState};

/// Build a grid from rows of kind letters, top row first.
/// `.` leaves the cell empty.
fn board(rows: &[&str]) -> Grid {
    let height = rows.len() as i32;
    let width = rows[0].len() as i32;
    let mut grid = Grid::new(width, height);
    let mut next_id = 0u64;

    for (row_idx, row) in rows.iter().enumerate() {
        let y = height - 1 - row_idx as i32;
        for (x, ch) in row.chars().enumerate() {
            let kind = match ch {
                'B' => GemKind::Blue,
                'G' => GemKind::Green,
                'R' => GemKind::Red,
                'Y' => GemKind::Yellow,
                'P' => GemKind::Purple,
                '.' => continue,
                other => panic!("unknown kind letter {other:?}"),
            };
            let piece = Piece::new(
                PieceId(next_id),
                GemData::normal(kind, 10),
                GridPosition::new(x as i32, y),
                PieceState::Idle,
            );
            next_id += 1;
            grid.set(x as i32, y, Some(piece)).unwrap();
        }
    }
    grid
}

fn contains_pos(cluster: &gemfall::core::MatchCluster, x: i32, y: i32) -> bool {
    cluster.positions().any(|p| p == GridPosition::new(x, y))
}

#[test]
fn test_horizontal_run_of_three() {
    let grid = board(&[
        "BGBGB", //
        "GRRRG", //
        "BGBGB",
    ]);
    let clusters = MatchScanner::scan(&grid, None);
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].len(), 3);
    for x in 1..=3 {
        assert!(contains_pos(&clusters[0], x, 1));
    }
}

#[test]
fn test_run_of_two_is_not_a_match() {
    let grid = board(&[
        "BGBGB", //
        "GRRBG", //
        "BGBGB",
    ]);
    assert!(MatchScanner::scan(&grid, None).is_empty());
}

#[test]
fn test_vertical_run_spanning_gap_does_not_match() {
    let grid = board(&[
        "R....", //
        ".....", //
        "R....", //
        "R....",
    ]);
    assert!(MatchScanner::scan(&grid, None).is_empty());
}

#[test]
fn test_cross_runs_merge_into_one_cluster() {
    // Vertical and horizontal red runs sharing the center cell.
    let grid = board(&[
        "BGRGB", //
        "GBRBG", //
        "RRRRR", //
        "GBRBG", //
        "BGRGB",
    ]);
    let clusters = MatchScanner::scan(&grid, None);
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].len(), 9);
}

#[test]
fn test_disjoint_runs_stay_separate() {
    let grid = board(&[
        "RRRGB", //
        "GBGBG", //
        "BGYYY",
    ]);
    let clusters = MatchScanner::scan(&grid, None);
    assert_eq!(clusters.len(), 2);
}

#[test]
fn test_anchor_taken_from_swap_endpoint() {
    let grid = board(&[
        "BGBGB", //
        "GRRRG", //
        "BGBGB",
    ]);
    let anchor = GridPosition::new(2, 1);
    let clusters = MatchScanner::scan(&grid, Some((anchor, GridPosition::new(2, 2))));
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].anchor, Some(anchor));
}

#[test]
fn test_no_anchor_when_swap_endpoints_miss_the_cluster() {
    let grid = board(&[
        "BGBGB", //
        "GRRRG", //
        "BGBGB",
    ]);
    let far = (GridPosition::new(0, 0), GridPosition::new(0, 2));
    let clusters = MatchScanner::scan(&grid, Some(far));
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].anchor, None);
}

#[test]
fn test_scan_is_stable_without_mutation() {
    let grid = board(&[
        "RRRGB", //
        "GBGBG", //
        "BGYYY",
    ]);
    let first = MatchScanner::scan(&grid, None);
    let second = MatchScanner::scan(&grid, None);

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        let mut pa: Vec<_> = a.positions().collect();
        let mut pb: Vec<_> = b.positions().collect();
        pa.sort_by_key(|p| (p.x, p.y));
        pb.sort_by_key(|p| (p.x, p.y));
        assert_eq!(pa, pb);
    }
}

#[test]
fn test_clusters_hold_live_piece_refs() {
    let grid = board(&[
        "RRR", //
        "GBG",
    ]);
    let clusters = MatchScanner::scan(&grid, None);
    let piece: &Rc<Piece> = clusters[0].first().unwrap();
    assert_eq!(piece.kind(), GemKind::Red);
}
