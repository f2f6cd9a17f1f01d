mod helpers;

use ankibridge::application::Practice;
use ankibridge::domain::GameSession;
use ankibridge::util::testing::{MockReply, MockTransport};
use helpers::TestBridge;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use std::io::Cursor;

const SEED: u64 = 2024;

/// Answers for the first `rounds` problems of a seeded game: the first try of
/// each problem is wrong, the second right
fn answers(rounds: usize) -> String {
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut session = GameSession::new(&mut rng);
    let mut input = String::new();
    for _ in 0..rounds {
        let choices = session.problem().choices(&mut rng);
        let answer = session.problem().answer();
        let right = choices.iter().position(|&c| c == answer).unwrap() + 1;
        let wrong = if right == 1 { 2 } else { 1 };
        input.push_str(&format!("{wrong}\n{right}\n"));
        session.answer(answer);
        session.next_problem(&mut rng);
    }
    input
}

#[tokio::test]
async fn given_save_enabled_when_solving_then_each_solved_problem_becomes_a_note() {
    // Arrange
    let transport = MockTransport::builder()
        .with_reply("addNote", MockReply::json(json!({"result": 1, "error": null})))
        .build();
    let stack = TestBridge::new(transport).await;
    let mut output = Vec::new();
    let mut practice = Practice::new(StdRng::seed_from_u64(SEED)).saving_to(&stack.bridge);

    // Act
    let board = practice
        .run(Cursor::new(answers(3)), &mut output, Some(3))
        .await
        .unwrap();

    // Assert
    assert_eq!(board.score, 3);
    assert_eq!(stack.transport.calls_for("addNote"), 3);
    let text = String::from_utf8(output).unwrap();
    assert_eq!(text.matches("Saved to Anki! 🎉").count(), 3);
    assert_eq!(text.matches("Not quite. Let's try again!").count(), 3);

    let fronts: Vec<String> = stack
        .transport
        .requests()
        .iter()
        .filter(|request| request["action"] == "addNote")
        .map(|request| request["params"]["note"]["fields"]["Front"].as_str().unwrap().to_string())
        .collect();
    assert!(fronts.iter().all(|front| front.ends_with(" = ?")));
}

#[tokio::test]
async fn given_anki_rejects_notes_when_solving_then_failure_shown_and_game_continues() {
    let transport = MockTransport::builder()
        .with_reply(
            "addNote",
            MockReply::json(json!({"result": null, "error": "cannot create note because it is a duplicate"})),
        )
        .build();
    let stack = TestBridge::new(transport).await;
    let mut output = Vec::new();
    let mut practice = Practice::new(StdRng::seed_from_u64(SEED)).saving_to(&stack.bridge);

    let board = practice
        .run(Cursor::new(answers(2)), &mut output, Some(2))
        .await
        .unwrap();

    assert_eq!(board.score, 2);
    let text = String::from_utf8(output).unwrap();
    assert_eq!(text.matches("Failed to save to Anki").count(), 2);
}
