//! Stateless triage traversal.
//!
//! The session lives with the client: a request carries the scenario id and the full list of
//! answers given so far, and [`TriageEngine::step`] replays them from the root. Nothing is stored
//! between calls, so any number of requests can run against the same engine concurrently.

use crate::error::{MediMapError, MediMapResult};
use crate::triage::forest::{Scenario, ScenarioForest};
use crate::triage::tree::{DecisionNode, Outcome};
use medimap_types::Level;
use serde::Serialize;
use std::sync::Arc;

/// One answered question in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub question: String,
    pub answer: String,
}

/// Where a session stands after replaying its answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriageStep<'a> {
    /// More input is needed.
    Question {
        node: &'a DecisionNode,
        history: Vec<HistoryEntry>,
    },
    /// The scenario resolved to a severity level.
    Level {
        level: Level,
        history: Vec<HistoryEntry>,
    },
}

impl TriageStep<'_> {
    pub fn history(&self) -> &[HistoryEntry] {
        match self {
            TriageStep::Question { history, .. } | TriageStep::Level { history, .. } => history,
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self {
            TriageStep::Level { level, .. } => Some(*level),
            TriageStep::Question { .. } => None,
        }
    }
}

/// Human label for a severity level.
pub fn severity_label(level: Level) -> &'static str {
    match level.get() {
        4 => "critical",
        3 => "urgent",
        2 => "semi-urgent",
        _ => "non-urgent",
    }
}

/// Assigns a level directly, without traversing any tree.
///
/// # Errors
///
/// Returns [`MediMapError::InvalidLevel`] unless `1 <= n <= 4`.
pub fn manual_level(n: i64) -> MediMapResult<Level> {
    let level = Level::new(n).map_err(MediMapError::InvalidLevel)?;
    tracing::debug!(level = level.get(), "manual severity override");
    Ok(level)
}

/// [`manual_level`] as a terminal [`Outcome`].
pub fn manual_override(n: i64) -> MediMapResult<Outcome> {
    manual_level(n).map(Outcome::Level)
}

/// Read-only triage engine over a loaded [`ScenarioForest`].
///
/// Cloning is cheap; clones share the forest.
#[derive(Debug, Clone)]
pub struct TriageEngine {
    forest: Arc<ScenarioForest>,
}

impl TriageEngine {
    pub fn new(forest: ScenarioForest) -> Self {
        Self {
            forest: Arc::new(forest),
        }
    }

    /// Engine over the built-in scenarios.
    pub fn builtin() -> MediMapResult<Self> {
        Ok(Self::new(ScenarioForest::builtin()?))
    }

    pub fn forest(&self) -> &ScenarioForest {
        &self.forest
    }

    /// Scenario ids in definition order.
    pub fn scenarios(&self) -> Vec<&str> {
        self.forest.ids().collect()
    }

    /// # Errors
    ///
    /// Returns [`MediMapError::UnknownScenario`] if `id` is not in the forest.
    pub fn select_scenario(&self, id: &str) -> MediMapResult<&Scenario> {
        self.forest
            .get(id)
            .ok_or_else(|| MediMapError::UnknownScenario(id.to_string()))
    }

    /// Replays `answers` from the root of scenario `scenario_id`.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`MediMapError::UnknownScenario`] if the scenario does not exist,
    /// - [`MediMapError::InvalidAnswer`] if an answer is not an option of its question,
    /// - [`MediMapError::AnswerAfterResolution`] if answers remain after a level was reached.
    pub fn step<S: AsRef<str>>(
        &self,
        scenario_id: &str,
        answers: &[S],
    ) -> MediMapResult<TriageStep<'_>> {
        let scenario = self.select_scenario(scenario_id)?;
        let mut current = scenario.root();
        let mut history = Vec::with_capacity(answers.len());

        for answer in answers {
            let label = answer.as_ref();
            let node = match current {
                Outcome::Next(node) => node,
                Outcome::Level(_) => {
                    return Err(MediMapError::AnswerAfterResolution {
                        scenario: scenario.id().to_string(),
                        label: label.to_string(),
                    })
                }
            };
            current = node.answer(label)?;
            history.push(HistoryEntry {
                question: node.question().to_string(),
                answer: label.to_string(),
            });
        }

        let step = match current {
            Outcome::Level(level) => {
                tracing::debug!(
                    scenario = scenario.id(),
                    level = level.get(),
                    steps = history.len(),
                    "triage resolved"
                );
                TriageStep::Level {
                    level: *level,
                    history,
                }
            }
            Outcome::Next(node) => TriageStep::Question { node, history },
        };
        Ok(step)
    }

    /// Steps back one question: replays every answer except the last.
    ///
    /// An empty answer list rewinds to the root.
    pub fn rewind<S: AsRef<str>>(
        &self,
        scenario_id: &str,
        answers: &[S],
    ) -> MediMapResult<TriageStep<'_>> {
        let keep = answers.len().saturating_sub(1);
        self.step(scenario_id, &answers[..keep])
    }
}
