//! Tests for the game engine and snapshot text through the public API.

use strictly_duel::{Game, Mark, Move, Snapshot, Status};

fn play(moves: &[(usize, usize)]) -> Game {
    let mut game = Game::new();
    for &(row, col) in moves {
        game.place_mark(row, col).unwrap();
        game.advance_turn();
    }
    game
}

#[test]
fn test_top_row_win_reports_win_for_next_player() {
    let game = play(&[(0, 0), (1, 1), (0, 1), (2, 2), (0, 2)]);
    let snapshot = Snapshot::capture(&game, false);

    assert_eq!(snapshot.turn(), Mark::O);
    assert_eq!(snapshot.status(), Status::Win);
    assert_eq!(
        snapshot.to_string(),
        "X,X,X;-,O,-;-,-,O;currentPlayer=O;result=win;"
    );
}

#[test]
fn test_full_board_without_line_is_draw() {
    let game = play(&[
        (0, 0),
        (0, 1),
        (0, 2),
        (1, 1),
        (1, 0),
        (1, 2),
        (2, 1),
        (2, 0),
        (2, 2),
    ]);
    let snapshot = Snapshot::capture(&game, false);
    assert_eq!(snapshot.status(), Status::Draw);
    assert!(game.is_over());
}

#[test]
fn test_occupied_cell_leaves_game_untouched() {
    let mut game = play(&[(1, 1)]);
    let before = Snapshot::capture(&game, false);

    assert!(game.place_mark(1, 1).is_err());
    assert_eq!(Snapshot::capture(&game, false), before);
}

#[test]
fn test_suspended_game_is_waiting_regardless_of_board() {
    let game = play(&[(0, 0), (1, 1), (0, 1), (2, 2), (0, 2)]);
    assert_eq!(Snapshot::capture(&game, true).status(), Status::Waiting);
}

#[test]
fn test_snapshot_text_round_trips() {
    let text = "X,-,-;O,-,-;X,O,-;currentPlayer=X;result=ongoing;";
    let snapshot: Snapshot = text.parse().unwrap();
    assert_eq!(snapshot.to_string(), text);

    let game = Game::from_snapshot(&snapshot);
    assert_eq!(game.turn(), Mark::X);
    assert!(!game.is_over());
}

#[test]
fn test_move_lines_parse() {
    let mv: Move = "2,1".parse().unwrap();
    assert_eq!((mv.row(), mv.col()), (2, 1));
    assert!("3,1".parse::<Move>().is_err());
    assert!("a,b".parse::<Move>().is_err());
    assert!("11".parse::<Move>().is_err());
}
