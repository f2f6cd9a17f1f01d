// src/application/practice.rs
use crate::application::PageBridge;
use crate::domain::game::Scoreboard;
use crate::domain::{AnswerOutcome, GameSession};
use crate::ports::StatusPresenter;
use anyhow::{Context, Result};
use rand::Rng;
use std::io::{BufRead, Write};
use tracing::{debug, info};

/// Terminal practice loop: show a problem, read a choice, give feedback
pub struct Practice<'a, R: Rng> {
    rng: R,
    bridge: Option<&'a PageBridge>,
    presenter: StatusPresenter,
}

impl<'a, R: Rng> Practice<'a, R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            bridge: None,
            presenter: StatusPresenter::new(),
        }
    }

    /// Save mastered problems through this bridge
    pub fn saving_to(mut self, bridge: &'a PageBridge) -> Self {
        self.bridge = Some(bridge);
        self
    }

    /// Play until `rounds` problems are solved, `q` is entered or input ends
    pub async fn run<I, O>(&mut self, input: I, output: &mut O, rounds: Option<u32>) -> Result<Scoreboard>
    where
        I: BufRead,
        O: Write,
    {
        let mut session = GameSession::new(&mut self.rng);
        let mut lines = input.lines();
        let mut solved = 0u32;

        'problems: while rounds.map_or(true, |limit| solved < limit) {
            let choices = session.problem().choices(&mut self.rng);
            writeln!(output, "{}", self.presenter.problem(session.problem(), &choices))?;

            loop {
                write!(output, "> ")?;
                output.flush()?;
                let Some(line) = lines.next() else {
                    break 'problems;
                };
                let line = line.context("Failed to read answer")?;
                let line = line.trim();
                if line.eq_ignore_ascii_case("q") {
                    break 'problems;
                }

                let Some(choice) = pick(line, &choices) else {
                    writeln!(output, "Pick 1-{} or q to quit", choices.len())?;
                    continue;
                };
                debug!(choice, "Answer submitted");

                let outcome = session.answer(choice);
                writeln!(output, "{}", self.presenter.answer(&outcome))?;
                if let AnswerOutcome::Correct { mastered, .. } = outcome {
                    if let Some(bridge) = self.bridge {
                        let result = bridge.save_card(mastered).await;
                        writeln!(output, "{}", self.presenter.save(&result))?;
                    }
                    solved += 1;
                    session.next_problem(&mut self.rng);
                    writeln!(output, "{}", self.presenter.scoreboard(&session.scoreboard()))?;
                    break;
                }
            }
        }

        let board = session.scoreboard();
        info!(score = board.score, level = %board.level, "Practice finished");
        Ok(board)
    }
}

/// Accept a 1-based choice index
fn pick(line: &str, choices: &[u32]) -> Option<u32> {
    let index: usize = line.parse().ok()?;
    index.checked_sub(1).and_then(|i| choices.get(i)).copied()
}
