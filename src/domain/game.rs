// src/domain/game.rs
use crate::domain::problem::{Level, Problem};
use crate::domain::Card;
use rand::Rng;
use serde::Serialize;

/// Correct answers in a row needed to move up a level
pub const STREAK_TO_LEVEL_UP: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct {
        /// Card for the solved problem, at the level it was solved on
        mastered: Card,
        level_up: Option<Level>,
    },
    Incorrect {
        hint: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scoreboard {
    pub score: u32,
    pub streak: u32,
    pub level: Level,
}

/// Score, streak and level of one practice run
#[derive(Debug, Clone)]
pub struct GameSession {
    problem: Problem,
    score: u32,
    streak: u32,
    level: Level,
}

impl GameSession {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let level = Level::default();
        Self {
            problem: Problem::generate(level, rng),
            score: 0,
            streak: 0,
            level,
        }
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn scoreboard(&self) -> Scoreboard {
        Scoreboard {
            score: self.score,
            streak: self.streak,
            level: self.level,
        }
    }

    pub fn answer(&mut self, choice: u32) -> AnswerOutcome {
        if choice != self.problem.answer() {
            self.streak = 0;
            return AnswerOutcome::Incorrect {
                hint: self.problem.hint(),
            };
        }

        let mastered = self.problem.card(self.level);
        self.score += 1;
        self.streak += 1;

        let level_up = if self.streak >= STREAK_TO_LEVEL_UP {
            self.level.next()
        } else {
            None
        };
        if let Some(next) = level_up {
            self.level = next;
            self.streak = 0;
        }

        AnswerOutcome::Correct { mastered, level_up }
    }

    pub fn next_problem<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &Problem {
        self.problem = Problem::generate(self.level, rng);
        &self.problem
    }
}
