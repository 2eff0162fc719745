//! Scenario forest loading and validation.
//!
//! Scenario definitions are YAML. They are parsed against a strict wire schema (unknown keys
//! are rejected) and then validated into immutable [`DecisionNode`] trees. Any defect fails the
//! whole load with [`MediMapError::InvalidScenarioDefinition`] naming the offending path, so a
//! malformed definition stops start-up instead of surfacing during a call.
//!
//! Wire shape:
//!
//! ```yaml
//! scenarios:
//!   - id: Fainted/Unconscious
//!     root:
//!       question: Is the patient awake?
//!       options:
//!         - label: "Yes"
//!           level: 2
//!         - label: "No"
//!           next:
//!             question: Is the patient breathing?
//!             options:
//!               - { label: "Yes", level: 3 }
//!               - { label: "No", level: 4 }
//!   - id: Minor complaint
//!     level: 1
//! ```
//!
//! A scenario has exactly one of `root` (a question) or `level` (terminal root). Each option
//! has exactly one of `next` or `level`.

use crate::constants::{BUILTIN_SCENARIOS_YAML, MAX_LABEL_LEN, MAX_TREE_DEPTH};
use crate::error::{MediMapError, MediMapResult};
use crate::triage::tree::{AnswerOption, DecisionNode, Outcome};
use medimap_types::{Level, NonEmptyText};
use serde::Deserialize;
use std::path::Path;

/// A named decision tree for one category of emergency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    id: NonEmptyText,
    description: Option<String>,
    root: Outcome,
}

impl Scenario {
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The scenario's entry point. A terminal root resolves without any question.
    pub fn root(&self) -> &Outcome {
        &self.root
    }
}

/// The fixed set of scenarios, in definition order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioForest {
    scenarios: Vec<Scenario>,
}

impl ScenarioForest {
    /// The forest compiled into the binary.
    ///
    /// # Errors
    ///
    /// Only fails if the embedded definition is malformed.
    pub fn builtin() -> MediMapResult<Self> {
        Self::from_yaml_str(BUILTIN_SCENARIOS_YAML)
    }

    /// Loads a forest from a YAML file.
    pub fn from_path(path: &Path) -> MediMapResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| MediMapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let forest = Self::from_yaml_str(&text)?;
        tracing::info!(
            path = %path.display(),
            scenarios = forest.len(),
            "loaded scenario definitions"
        );
        Ok(forest)
    }

    /// Parses and validates a forest from YAML text.
    ///
    /// This uses `serde_path_to_error` so schema mismatches report the failing path
    /// (e.g. `scenarios[2].root.options[0].label`).
    ///
    /// # Errors
    ///
    /// Returns [`MediMapError::InvalidScenarioDefinition`] if:
    /// - the YAML does not match the wire schema or has unknown keys,
    /// - the forest is empty or two scenarios share an id,
    /// - a question is blank, has no options, or repeats a label,
    /// - a level is outside `1..=4`,
    /// - a tree is deeper than [`MAX_TREE_DEPTH`] questions.
    pub fn from_yaml_str(yaml_text: &str) -> MediMapResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);
        let wire = match serde_path_to_error::deserialize::<_, ForestWire>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() || path == "." {
                    "<root>".to_string()
                } else {
                    path
                };
                return Err(invalid(path, format!("schema mismatch: {source}")));
            }
        };

        if wire.scenarios.is_empty() {
            return Err(invalid("scenarios", "at least one scenario is required"));
        }

        let mut scenarios: Vec<Scenario> = Vec::with_capacity(wire.scenarios.len());
        for (i, scenario) in wire.scenarios.into_iter().enumerate() {
            let path = format!("scenarios[{i}]");
            let scenario = scenario_from_wire(scenario, &path)?;
            if scenarios.iter().any(|s| s.id == scenario.id) {
                return Err(invalid(
                    format!("{path}.id"),
                    format!("duplicate scenario id '{}'", scenario.id),
                ));
            }
            scenarios.push(scenario);
        }

        Ok(Self { scenarios })
    }

    /// Looks up a scenario by id (exact match).
    pub fn get(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id.as_str() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.scenarios.iter().map(|s| s.id())
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ForestWire {
    scenarios: Vec<ScenarioWire>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioWire {
    id: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    root: Option<NodeWire>,
    #[serde(default)]
    level: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NodeWire {
    question: String,
    #[serde(default)]
    options: Vec<OptionWire>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct OptionWire {
    label: String,
    #[serde(default)]
    next: Option<NodeWire>,
    #[serde(default)]
    level: Option<i64>,
}

// ============================================================================
// Validation (internal)
// ============================================================================

fn invalid(path: impl Into<String>, reason: impl Into<String>) -> MediMapError {
    MediMapError::InvalidScenarioDefinition {
        path: path.into(),
        reason: reason.into(),
    }
}

fn scenario_from_wire(wire: ScenarioWire, path: &str) -> MediMapResult<Scenario> {
    let id = NonEmptyText::new(&wire.id)
        .map_err(|_| invalid(format!("{path}.id"), "scenario id cannot be empty"))?;

    let root = match (wire.root, wire.level) {
        (Some(node), None) => Outcome::Next(Box::new(node_from_wire(
            node,
            &format!("{path}.root"),
            1,
        )?)),
        (None, Some(raw)) => Outcome::Level(level_from_wire(raw, &format!("{path}.level"))?),
        (Some(_), Some(_)) => {
            return Err(invalid(
                path.to_string(),
                "scenario must have either 'root' or 'level', not both",
            ))
        }
        (None, None) => {
            return Err(invalid(
                path.to_string(),
                "scenario must have a 'root' question or a terminal 'level'",
            ))
        }
    };

    let description = wire
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    Ok(Scenario {
        id,
        description,
        root,
    })
}

fn node_from_wire(wire: NodeWire, path: &str, depth: usize) -> MediMapResult<DecisionNode> {
    if depth > MAX_TREE_DEPTH {
        return Err(invalid(
            path.to_string(),
            format!("tree exceeds maximum depth of {MAX_TREE_DEPTH} questions"),
        ));
    }

    let question = NonEmptyText::new(&wire.question)
        .map_err(|_| invalid(format!("{path}.question"), "question cannot be empty"))?;

    if wire.options.is_empty() {
        return Err(invalid(
            format!("{path}.options"),
            format!("question '{question}' must have at least one option"),
        ));
    }

    let mut options: Vec<AnswerOption> = Vec::with_capacity(wire.options.len());
    for (i, option) in wire.options.into_iter().enumerate() {
        let option_path = format!("{path}.options[{i}]");
        let label = NonEmptyText::new(&option.label)
            .map_err(|_| invalid(format!("{option_path}.label"), "label cannot be empty"))?;
        if label.as_str().len() > MAX_LABEL_LEN {
            return Err(invalid(
                format!("{option_path}.label"),
                format!("label exceeds {MAX_LABEL_LEN} characters"),
            ));
        }
        if options.iter().any(|o| o.label == label) {
            return Err(invalid(
                format!("{option_path}.label"),
                format!("duplicate option '{label}' for question '{question}'"),
            ));
        }

        let outcome = match (option.next, option.level) {
            (Some(next), None) => Outcome::Next(Box::new(node_from_wire(
                next,
                &format!("{option_path}.next"),
                depth + 1,
            )?)),
            (None, Some(raw)) => {
                Outcome::Level(level_from_wire(raw, &format!("{option_path}.level"))?)
            }
            (Some(_), Some(_)) => {
                return Err(invalid(
                    option_path,
                    "option must have either 'next' or 'level', not both",
                ))
            }
            (None, None) => {
                return Err(invalid(
                    option_path,
                    "option must lead to a 'next' question or a terminal 'level'",
                ))
            }
        };

        options.push(AnswerOption { label, outcome });
    }

    DecisionNode::new(question, options).map_err(|e| invalid(path.to_string(), e.to_string()))
}

fn level_from_wire(raw: i64, path: &str) -> MediMapResult<Level> {
    Level::new(raw).map_err(|e| invalid(path.to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn reason_of(err: MediMapError) -> (String, String) {
        match err {
            MediMapError::InvalidScenarioDefinition { path, reason } => (path, reason),
            other => panic!("expected InvalidScenarioDefinition, got {other:?}"),
        }
    }

    #[test]
    fn builtin_forest_loads() {
        let forest = ScenarioForest::builtin().expect("embedded scenarios are valid");
        assert!(forest.len() >= 5);
        assert!(forest.get("Fainted/Unconscious").is_some());
        for scenario in forest.iter() {
            assert!(scenario.root().depth() <= MAX_TREE_DEPTH);
        }
    }

    #[test]
    fn terminal_root_is_accepted() {
        let forest = ScenarioForest::from_yaml_str(
            r#"scenarios:
  - id: Minor complaint
    level: 1
"#,
        )
        .unwrap();
        let scenario = forest.get("Minor complaint").unwrap();
        assert_eq!(scenario.root().level().map(Level::get), Some(1));
    }

    #[test]
    fn preserves_option_order() {
        let forest = ScenarioForest::from_yaml_str(
            r#"scenarios:
  - id: Burns
    root:
      question: How large is the burn?
      options:
        - { label: Small, level: 1 }
        - { label: Medium, level: 2 }
        - { label: Large, level: 3 }
"#,
        )
        .unwrap();
        let node = forest.get("Burns").unwrap().root().node().unwrap();
        assert_eq!(
            node.labels().collect::<Vec<_>>(),
            vec!["Small", "Medium", "Large"]
        );
    }

    #[test]
    fn rejects_unknown_keys_with_path() {
        let err = ScenarioForest::from_yaml_str(
            r#"scenarios:
  - id: Burns
    root:
      question: Is it large?
      options:
        - label: "Yes"
          level: 3
          colour: red
"#,
        )
        .expect_err("unknown key");
        let (path, reason) = reason_of(err);
        assert!(path.contains("scenarios[0].root.options[0]"), "path was {path}");
        assert!(reason.contains("colour"), "reason was {reason}");
    }

    #[test]
    fn rejects_duplicate_labels() {
        let err = ScenarioForest::from_yaml_str(
            r#"scenarios:
  - id: Burns
    root:
      question: Is it large?
      options:
        - { label: "Yes", level: 3 }
        - { label: "Yes", level: 2 }
"#,
        )
        .expect_err("duplicate label");
        let (path, reason) = reason_of(err);
        assert_eq!(path, "scenarios[0].root.options[1].label");
        assert!(reason.contains("duplicate option"));
    }

    #[test]
    fn rejects_empty_options() {
        let err = ScenarioForest::from_yaml_str(
            r#"scenarios:
  - id: Burns
    root:
      question: Is it large?
      options: []
"#,
        )
        .expect_err("no options");
        let (path, _) = reason_of(err);
        assert_eq!(path, "scenarios[0].root.options");
    }

    #[test]
    fn rejects_out_of_range_level() {
        let err = ScenarioForest::from_yaml_str(
            r#"scenarios:
  - id: Burns
    root:
      question: Is it large?
      options:
        - { label: "Yes", level: 5 }
"#,
        )
        .expect_err("level 5");
        let (path, reason) = reason_of(err);
        assert_eq!(path, "scenarios[0].root.options[0].level");
        assert!(reason.contains("between 1 and 4"));
    }

    #[test]
    fn rejects_option_with_both_next_and_level() {
        let err = ScenarioForest::from_yaml_str(
            r#"scenarios:
  - id: Burns
    root:
      question: Is it large?
      options:
        - label: "Yes"
          level: 3
          next:
            question: Deep?
            options:
              - { label: "Yes", level: 4 }
"#,
        )
        .expect_err("ambiguous option");
        let (_, reason) = reason_of(err);
        assert!(reason.contains("not both"));
    }

    #[test]
    fn rejects_duplicate_scenario_ids() {
        let err = ScenarioForest::from_yaml_str(
            r#"scenarios:
  - { id: Burns, level: 2 }
  - { id: Burns, level: 3 }
"#,
        )
        .expect_err("duplicate id");
        let (path, _) = reason_of(err);
        assert_eq!(path, "scenarios[1].id");
    }

    #[test]
    fn rejects_empty_forest() {
        let err = ScenarioForest::from_yaml_str("scenarios: []\n").expect_err("empty");
        let (path, _) = reason_of(err);
        assert_eq!(path, "scenarios");
    }

    #[test]
    fn rejects_excessive_depth() {
        let mut yaml = String::from("scenarios:\n  - id: Deep\n    root:\n");
        let mut indent = 6;
        for _ in 0..=MAX_TREE_DEPTH {
            let pad = " ".repeat(indent);
            yaml.push_str(&format!("{pad}question: Again?\n{pad}options:\n"));
            yaml.push_str(&format!("{pad}  - label: \"Yes\"\n{pad}    next:\n"));
            indent += 8;
        }
        let pad = " ".repeat(indent);
        yaml.push_str(&format!(
            "{pad}question: Last?\n{pad}options:\n{pad}  - {{ label: \"Yes\", level: 1 }}\n"
        ));

        let err = ScenarioForest::from_yaml_str(&yaml).expect_err("too deep");
        let (_, reason) = reason_of(err);
        assert!(reason.contains("maximum depth"), "reason was {reason}");
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "scenarios:\n  - {{ id: Fever, level: 1 }}").unwrap();
        let forest = ScenarioForest::from_path(file.path()).unwrap();
        assert_eq!(forest.ids().collect::<Vec<_>>(), vec!["Fever"]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ScenarioForest::from_path(Path::new("/definitely/not/here.yaml"))
            .expect_err("missing file");
        assert!(matches!(err, MediMapError::Io { .. }));
    }
}
