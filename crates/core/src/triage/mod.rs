//! Triage classification: decision trees, the scenario forest and the traversal engine.

pub mod engine;
pub mod forest;
pub mod tree;

pub use engine::{manual_level, manual_override, severity_label, HistoryEntry, TriageEngine, TriageStep};
pub use forest::{Scenario, ScenarioForest};
pub use tree::{AnswerOption, DecisionNode, Outcome};
