// src/ports/status.rs
use crate::domain::game::Scoreboard;
use crate::domain::{AnswerOutcome, BridgeError, ErrorKind, Level, Outcome, Problem};

const ANKI_NOT_RUNNING: &str = "Make sure Anki is running and AnkiConnect add-on is installed.";

/// User-facing text for bridge results and game feedback.
///
/// Raw transport or parse errors are replaced by a friendlier hint; the
/// distinction between them stays in the logs.
#[derive(Debug, Default)]
pub struct StatusPresenter;

impl StatusPresenter {
    pub fn new() -> Self {
        Self
    }

    pub fn connection(&self, result: &Result<Outcome, BridgeError>) -> String {
        match result {
            Ok(outcome) if outcome.success => "Connected to Anki".to_string(),
            Ok(outcome) => match (outcome.error_kind, outcome.error.as_deref()) {
                (Some(ErrorKind::MalformedResponse), _) | (Some(ErrorKind::Transport), _) => {
                    format!("Not connected to Anki. {ANKI_NOT_RUNNING}")
                }
                (_, Some(error)) => format!("Not connected to Anki. {error}"),
                (_, None) => "Not connected to Anki. Permission was not granted.".to_string(),
            },
            Err(BridgeError::Timeout(_)) => {
                "Not connected to Anki. The browser extension did not answer.".to_string()
            }
            Err(BridgeError::MalformedResponse(_)) | Err(BridgeError::Transport(_)) => {
                format!("Not connected to Anki. {ANKI_NOT_RUNNING}")
            }
            Err(BridgeError::Application(message)) => format!("Not connected to Anki. {message}"),
            Err(err) => format!("Not connected to Anki. {err}"),
        }
    }

    pub fn save(&self, result: &Result<Outcome, BridgeError>) -> String {
        match result {
            Ok(outcome) if outcome.success => "Saved to Anki! 🎉".to_string(),
            _ => "Failed to save to Anki".to_string(),
        }
    }

    pub fn problem(&self, problem: &Problem, choices: &[u32]) -> String {
        let options = choices
            .iter()
            .enumerate()
            .map(|(i, choice)| format!("[{}] {}", i + 1, choice))
            .collect::<Vec<_>>()
            .join("   ");
        format!("{problem}\n{options}")
    }

    pub fn answer(&self, outcome: &AnswerOutcome) -> String {
        match outcome {
            AnswerOutcome::Correct { level_up: None, .. } => {
                "Great job! That's correct! 🎉".to_string()
            }
            AnswerOutcome::Correct {
                level_up: Some(level),
                ..
            } => self.level_up(*level),
            AnswerOutcome::Incorrect { hint } => {
                format!("Not quite. Let's try again!\nHint: {hint}")
            }
        }
    }

    fn level_up(&self, level: Level) -> String {
        match level.value() {
            2 => "Level up! Now try some bigger numbers!".to_string(),
            _ => "Level up! You're doing great with these bigger numbers!".to_string(),
        }
    }

    pub fn scoreboard(&self, board: &Scoreboard) -> String {
        format!(
            "Score: {}   Streak: {}/{}   Level: {}",
            board.score,
            board.streak,
            crate::domain::game::STREAK_TO_LEVEL_UP,
            board.level
        )
    }
}
