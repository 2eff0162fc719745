use medimap_core::triage::{severity_label, HistoryEntry, TriageStep};
use medimap_core::Level;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScenariosRes {
    pub scenarios: Vec<String>,
}

/// A session step: the scenario and every answer given so far, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TriageStepReq {
    pub scenario_id: String,
    #[serde(default)]
    pub answers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HistoryEntryDto {
    pub question: String,
    pub answer: String,
}

impl From<&HistoryEntry> for HistoryEntryDto {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            question: entry.question.clone(),
            answer: entry.answer.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NextQuestion {
    pub question: String,
    pub options: Vec<String>,
}

/// Either `next_question` or `final_level` is set, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TriageStepRes {
    pub scenario_id: String,
    pub history: Vec<HistoryEntryDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_question: Option<NextQuestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

impl TriageStepRes {
    pub fn from_step(scenario_id: &str, step: &TriageStep<'_>) -> Self {
        let history = step.history().iter().map(HistoryEntryDto::from).collect();
        match step {
            TriageStep::Question { node, .. } => Self {
                scenario_id: scenario_id.to_string(),
                history,
                next_question: Some(NextQuestion {
                    question: node.question().to_string(),
                    options: node.labels().map(str::to_string).collect(),
                }),
                final_level: None,
                severity: None,
            },
            TriageStep::Level { level, .. } => Self {
                scenario_id: scenario_id.to_string(),
                history,
                next_question: None,
                final_level: Some(level.get()),
                severity: Some(severity_label(*level).to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ManualReq {
    pub level: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ManualRes {
    pub final_level: u8,
    pub severity: String,
}

impl From<Level> for ManualRes {
    fn from(level: Level) -> Self {
        Self {
            final_level: level.get(),
            severity: severity_label(level).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medimap_core::TriageEngine;

    #[test]
    fn question_step_lists_options() {
        let engine = TriageEngine::builtin().unwrap();
        let step = engine.step("Fainted/Unconscious", &["No"]).unwrap();
        let res = TriageStepRes::from_step("Fainted/Unconscious", &step);
        let next = res.next_question.expect("question");
        assert_eq!(next.question, "Is patient breathing?");
        assert_eq!(next.options, vec!["Yes", "No"]);
        assert_eq!(res.final_level, None);

        let json = serde_json::to_value(
            TriageStepRes::from_step("Fainted/Unconscious", &engine.step("Fainted/Unconscious", &["No"]).unwrap()),
        )
        .unwrap();
        assert!(json.get("final_level").is_none());
    }

    #[test]
    fn level_step_reports_severity() {
        let engine = TriageEngine::builtin().unwrap();
        let step = engine.step("Fainted/Unconscious", &["No", "No"]).unwrap();
        let res = TriageStepRes::from_step("Fainted/Unconscious", &step);
        assert_eq!(res.final_level, Some(4));
        assert_eq!(res.severity.as_deref(), Some("critical"));
        assert_eq!(res.history.len(), 2);
    }

    #[test]
    fn step_request_answers_default_to_empty() {
        let req: TriageStepReq = serde_json::from_str(r#"{"scenario_id": "Burns"}"#).unwrap();
        assert!(req.answers.is_empty());
    }
}
