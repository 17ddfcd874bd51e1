//! End-to-end navigation and branching through the HTTP API.

mod common;

use serde_json::{json, Value};

const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
const AFTER_E5: &str = "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2";
const AFTER_NF3: &str = "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2";
const AFTER_NC6: &str = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
const AFTER_NF6: &str = "rnbqkb1r/pppp1ppp/5n2/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";

const RUY_LOPEZ: &str = "1. e4 e5 2. Nf3 Nc6 3. Bb5";

fn nav(action: &str) -> Value {
    json!({ "action": action })
}

fn jump(index: isize) -> Value {
    json!({ "action": "jump", "index": index })
}

#[tokio::test]
async fn test_new_session_starts_empty() {
    let app = common::spawn_default_app().await;
    let id = app.create_session().await;

    let view: Value = app
        .get(&format!("/api/sessions/{id}"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(view["fen"], START);
    assert_eq!(view["index"], -1);
    assert_eq!(view["status"], "Start position, White to move");
    assert_eq!(view["canGoBack"], false);
    assert_eq!(view["canGoForward"], false);

    // Next and Last are no-ops on an empty line.
    for action in ["next", "last", "previous"] {
        let view = app.navigate(&id, nav(action)).await;
        assert_eq!(view["moved"], false);
        assert_eq!(view["index"], -1);
        assert_eq!(view["fen"], START);
    }
}

#[tokio::test]
async fn test_stepping_shows_literal_positions() {
    let app = common::spawn_default_app().await;
    let id = app.create_session().await;

    let view = app.load_pgn(&id, RUY_LOPEZ).await;
    assert_eq!(view["index"], -1);
    assert_eq!(view["fen"], START);
    assert_eq!(view["mainLineLength"], 5);

    let expected = [AFTER_E4, AFTER_E5, AFTER_NF3, AFTER_NC6];
    for (i, fen) in expected.iter().enumerate() {
        let view = app.navigate(&id, nav("next")).await;
        assert_eq!(view["index"], i as i64);
        assert_eq!(view["fen"], *fen);
    }

    let view = app.navigate(&id, nav("last")).await;
    assert_eq!(view["index"], 4);
    assert_eq!(view["canGoForward"], false);
    assert_eq!(view["lastMove"]["san"], "Bb5");
}

#[tokio::test]
async fn test_previous_then_next_is_identity() {
    let app = common::spawn_default_app().await;
    let id = app.create_session().await;
    app.load_pgn(&id, common::OPERA_GAME).await;

    for index in [3, 10, 20] {
        let before = app.navigate(&id, jump(index)).await;
        app.navigate(&id, nav("previous")).await;
        let after = app.navigate(&id, nav("next")).await;
        assert_eq!(before["fen"], after["fen"]);
        assert_eq!(after["index"], index);
    }
}

#[tokio::test]
async fn test_branch_leaves_main_line_untouched() {
    let app = common::spawn_default_app().await;
    let id = app.create_session().await;
    app.load_pgn(&id, RUY_LOPEZ).await;

    app.navigate(&id, jump(2)).await;
    let resp = app.play(&id, "g8f6").await;
    assert_eq!(resp.status(), 200);
    let view: Value = resp.json().await.unwrap();

    assert_eq!(view["onBranch"], true);
    assert_eq!(view["branch"]["base"], 2);
    assert_eq!(view["index"], 3);
    assert_eq!(view["fen"], AFTER_NF6);
    assert_eq!(view["played"]["san"], "Nf6");
    assert_eq!(view["mainLineLength"], 5);
    assert_eq!(view["moveList"]["variation"]["pairs"][0]["white"]["san"], "Nf3");
    assert_eq!(view["moveList"]["variation"]["pairs"][0]["black"]["san"], "Nf6");

    let pgn: Value = app
        .get(&format!("/api/sessions/{id}/pgn"))
        .await
        .json()
        .await
        .unwrap();
    let pgn = pgn["pgn"].as_str().unwrap();
    assert!(pgn.contains("2. Nf3 Nc6 3. Bb5"));
    assert!(!pgn.contains("Nf6"));
}

#[tokio::test]
async fn test_previous_collapses_branch() {
    let app = common::spawn_default_app().await;
    let id = app.create_session().await;
    app.load_pgn(&id, RUY_LOPEZ).await;

    app.navigate(&id, jump(2)).await;
    app.play(&id, "g8f6").await;

    let view = app.navigate(&id, nav("previous")).await;
    assert_eq!(view["onBranch"], false);
    assert_eq!(view["index"], 2);
    assert_eq!(view["fen"], AFTER_NF3);
    assert!(view["moveList"]["variation"].is_null());
}

#[tokio::test]
async fn test_jump_clears_branch() {
    let app = common::spawn_default_app().await;
    let id = app.create_session().await;
    app.load_pgn(&id, RUY_LOPEZ).await;

    app.navigate(&id, jump(2)).await;
    app.play(&id, "g8f6").await;
    app.play(&id, "b1c3").await;

    let view = app.navigate(&id, jump(4)).await;
    assert_eq!(view["onBranch"], false);
    assert_eq!(view["index"], 4);
    assert_eq!(view["lastMove"]["san"], "Bb5");
}

#[tokio::test]
async fn test_branch_from_start_position() {
    let app = common::spawn_default_app().await;
    let id = app.create_session().await;
    app.load_pgn(&id, RUY_LOPEZ).await;

    let view: Value = app.play(&id, "d2d4").await.json().await.unwrap();
    assert_eq!(view["onBranch"], true);
    assert_eq!(view["branch"]["base"], -1);
    assert_eq!(view["index"], 0);
    assert_eq!(view["moveList"]["main"], json!([]));

    let view = app.navigate(&id, nav("previous")).await;
    assert_eq!(view["onBranch"], false);
    assert_eq!(view["fen"], START);
}

#[tokio::test]
async fn test_move_at_tip_extends_main_line() {
    let app = common::spawn_default_app().await;
    let id = app.create_session().await;
    app.load_pgn(&id, RUY_LOPEZ).await;
    app.navigate(&id, nav("last")).await;

    let view: Value = app.play(&id, "a7a6").await.json().await.unwrap();
    assert_eq!(view["onBranch"], false);
    assert_eq!(view["index"], 5);
    assert_eq!(view["mainLineLength"], 6);
    assert_eq!(view["status"], "Move 4, White to move");

    // Squares with an explicit promotion field are accepted too.
    let resp = app
        .post(
            &format!("/api/sessions/{id}/moves"),
            json!({ "from": "b5", "to": "a4" }),
        )
        .await;
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_out_of_range_jumps_clamp() {
    let app = common::spawn_default_app().await;
    let id = app.create_session().await;
    app.load_pgn(&id, RUY_LOPEZ).await;

    assert_eq!(app.navigate(&id, jump(99)).await["index"], 4);
    assert_eq!(app.navigate(&id, jump(-7)).await["index"], -1);
}

#[tokio::test]
async fn test_bad_input_leaves_session_unchanged() {
    let app = common::spawn_default_app().await;
    let id = app.create_session().await;
    app.load_pgn(&id, RUY_LOPEZ).await;
    let before = app.navigate(&id, jump(3)).await;

    let resp = app
        .post(
            &format!("/api/sessions/{id}/pgn"),
            json!({ "pgn": "1. e4 e5 2. Ke3 Nc6" }),
        )
        .await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("Ke3"));

    let resp = app.play(&id, "e1e3").await;
    assert_eq!(resp.status(), 400);

    let resp = app
        .post(&format!("/api/sessions/{id}/navigate"), json!({ "action": "sideways" }))
        .await;
    assert_eq!(resp.status(), 400);

    let after: Value = app
        .get(&format!("/api/sessions/{id}"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(after["fen"], before["fen"]);
    assert_eq!(after["index"], 3);
    assert_eq!(after["mainLineLength"], 5);
}

#[tokio::test]
async fn test_new_game_and_delete() {
    let app = common::spawn_default_app().await;
    let id = app.create_session().await;
    app.load_pgn(&id, common::OPERA_GAME).await;

    let view: Value = app
        .post(&format!("/api/sessions/{id}/new-game"), json!({}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(view["mainLineLength"], 0);
    assert_eq!(view["metadata"]["white"], "Unknown");

    let resp = app
        .client
        .delete(app.url(&format!("/api/sessions/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);
    assert_eq!(app.get(&format!("/api/sessions/{id}")).await.status(), 404);
}

#[tokio::test]
async fn test_opera_game_metadata_and_status() {
    let app = common::spawn_default_app().await;
    let id = app.create_session().await;
    let view = app.load_pgn(&id, common::OPERA_GAME).await;
    assert_eq!(view["metadata"]["white"], "Paul Morphy");
    assert_eq!(view["metadata"]["result"], "1-0");
    assert_eq!(view["mainLineLength"], 33);

    let view = app.navigate(&id, nav("last")).await;
    assert_eq!(view["lastMove"]["san"], "Rd8#");
    assert_eq!(view["status"], "Move 17, Black to move");
}
