// src/domain/problem.rs
use crate::domain::Card;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::fmt;

pub const MAX_LEVEL: u8 = 3;
const CHOICE_COUNT: usize = 4;
const DISTRACTOR_SPREAD: i64 = 2;
const LEVEL_ONE_MAX_SUM: u32 = 10;

/// Difficulty level, always within `1..=MAX_LEVEL`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Level(u8);

impl Level {
    pub fn new(level: u8) -> Self {
        Self(level.clamp(1, MAX_LEVEL))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Largest operand drawn at this level
    pub fn max_operand(self) -> u32 {
        match self.0 {
            1 => 5,
            2 => 10,
            _ => 20,
        }
    }

    pub fn next(self) -> Option<Level> {
        (self.0 < MAX_LEVEL).then(|| Level(self.0 + 1))
    }
}

impl Default for Level {
    fn default() -> Self {
        Level(1)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Problem {
    pub left: u32,
    pub right: u32,
}

impl Problem {
    pub fn generate<R: Rng + ?Sized>(level: Level, rng: &mut R) -> Self {
        let max = level.max_operand();
        let mut left = rng.gen_range(1..=max);
        let mut right = rng.gen_range(1..=max);

        if level == Level(1) && left + right > LEVEL_ONE_MAX_SUM {
            left = left.min(5);
            right = right.min(LEVEL_ONE_MAX_SUM - left);
        }

        Self { left, right }
    }

    pub fn answer(&self) -> u32 {
        self.left + self.right
    }

    /// The answer plus three distinct positive distractors within ±2 of it, shuffled
    pub fn choices<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<u32> {
        let answer = i64::from(self.answer());
        let mut distractors: Vec<u32> = (answer - DISTRACTOR_SPREAD..=answer + DISTRACTOR_SPREAD)
            .filter(|&candidate| candidate > 0 && candidate != answer)
            .filter_map(|candidate| u32::try_from(candidate).ok())
            .collect();
        distractors.shuffle(rng);

        let mut options = vec![self.answer()];
        options.extend(distractors.into_iter().take(CHOICE_COUNT - 1));
        options.shuffle(rng);
        options
    }

    pub fn front(&self) -> String {
        format!("{} + {} = ?", self.left, self.right)
    }

    pub fn hint(&self) -> String {
        format!(
            "Try counting all the objects together, or count up from {} by adding {} more.",
            self.left, self.right
        )
    }

    /// Flashcard for this problem, tagged with the level it was solved at
    pub fn card(&self, level: Level) -> Card {
        Card {
            front: self.front(),
            back: self.answer().to_string(),
            level: level.value(),
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {} = ?", self.left, self.right)
    }
}
