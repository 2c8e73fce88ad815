//! Tests for the pure board engine.

use gridmatch::{Board, Cell, GameError, Mark, Outcome};

fn board_from(marks: &[(usize, Mark)]) -> Board {
    let mut board = Board::new();
    for &(pos, mark) in marks {
        board.apply(pos, mark).expect("setup move failed");
    }
    board
}

#[test]
fn test_evaluate_is_deterministic_across_copies() {
    let board = board_from(&[(0, Mark::X), (4, Mark::O), (8, Mark::X)]);
    let copy = board.clone();
    assert_eq!(board.evaluate(), copy.evaluate());
    assert_eq!(board.evaluate(), board.evaluate());
}

#[test]
fn test_evaluate_returns_exactly_one_outcome() {
    let boards = [
        Board::new(),
        board_from(&[(0, Mark::X), (1, Mark::X), (2, Mark::X)]),
        board_from(&[
            (0, Mark::X),
            (1, Mark::O),
            (2, Mark::X),
            (3, Mark::X),
            (4, Mark::O),
            (5, Mark::O),
            (6, Mark::O),
            (7, Mark::X),
            (8, Mark::X),
        ]),
    ];
    for board in &boards {
        let outcome = board.evaluate();
        let matches = [
            matches!(outcome, Outcome::Ongoing),
            matches!(outcome, Outcome::Win { .. }),
            matches!(outcome, Outcome::Draw),
        ];
        assert_eq!(matches.iter().filter(|m| **m).count(), 1);
    }
}

#[test]
fn test_top_row_completion_wins_with_line() {
    // Board [X, X, _, O, O, _, _, _, _], X plays cell 2.
    let mut board = board_from(&[(0, Mark::X), (1, Mark::X), (3, Mark::O), (4, Mark::O)]);
    assert_eq!(board.evaluate(), Outcome::Ongoing);

    board.apply(2, Mark::X).expect("move failed");
    assert_eq!(
        board.evaluate(),
        Outcome::Win {
            mark: Mark::X,
            line: [0, 1, 2]
        }
    );
}

#[test]
fn test_full_board_without_line_is_draw() {
    let board = board_from(&[
        (0, Mark::X),
        (1, Mark::O),
        (2, Mark::X),
        (3, Mark::X),
        (4, Mark::O),
        (5, Mark::O),
        (6, Mark::O),
        (7, Mark::X),
        (8, Mark::X),
    ]);
    assert_eq!(board.evaluate(), Outcome::Draw);
}

#[test]
fn test_column_and_diagonal_wins() {
    let column = board_from(&[(1, Mark::O), (4, Mark::O), (7, Mark::O)]);
    assert_eq!(
        column.evaluate(),
        Outcome::Win {
            mark: Mark::O,
            line: [1, 4, 7]
        }
    );

    let diagonal = board_from(&[(2, Mark::X), (4, Mark::X), (6, Mark::X)]);
    assert_eq!(
        diagonal.evaluate(),
        Outcome::Win {
            mark: Mark::X,
            line: [2, 4, 6]
        }
    );
}

#[test]
fn test_cells_reflect_applied_moves() {
    let board = board_from(&[(0, Mark::X), (4, Mark::O)]);
    let cells = board.cells();
    assert_eq!(cells[0], Cell::Taken(Mark::X));
    assert_eq!(cells[4], Cell::Taken(Mark::O));
    assert_eq!(cells.iter().filter(|c| **c == Cell::Empty).count(), 7);
}

#[test]
fn test_display_renders_grid_rows() {
    assert_eq!(Board::new().display(), ".|.|.\n-+-+-\n.|.|.\n-+-+-\n.|.|.");

    let board = board_from(&[(0, Mark::X), (4, Mark::O), (8, Mark::X)]);
    assert_eq!(board.display(), "X|.|.\n-+-+-\n.|O|.\n-+-+-\n.|.|X");
}

#[test]
fn test_apply_rejects_bad_moves_without_mutation() {
    let mut board = board_from(&[(0, Mark::X)]);
    let before = board.clone();

    assert_eq!(board.apply(0, Mark::O), Err(GameError::InvalidMove));
    assert_eq!(board.apply(9, Mark::O), Err(GameError::InvalidMove));
    assert_eq!(board, before);
    assert_eq!(board.get(0), Some(Cell::Taken(Mark::X)));
}
