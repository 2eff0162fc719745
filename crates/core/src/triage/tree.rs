//! Decision tree types.
//!
//! A [`DecisionNode`] is one question with an ordered, closed set of answer labels. Each label
//! leads to an [`Outcome`]: either a terminal severity [`Level`] or another question.
//! Trees are built once by the forest loader and never mutated.

use crate::error::{MediMapError, MediMapResult};
use medimap_types::{Level, NonEmptyText};

/// Result of answering a question (or the root of a scenario).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Terminal severity level.
    Level(Level),
    /// Traversal continues with another question.
    Next(Box<DecisionNode>),
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Outcome::Level(_))
    }

    pub fn level(&self) -> Option<Level> {
        match self {
            Outcome::Level(level) => Some(*level),
            Outcome::Next(_) => None,
        }
    }

    pub fn node(&self) -> Option<&DecisionNode> {
        match self {
            Outcome::Level(_) => None,
            Outcome::Next(node) => Some(node),
        }
    }

    /// Number of questions on the longest path below this outcome.
    pub fn depth(&self) -> usize {
        match self {
            Outcome::Level(_) => 0,
            Outcome::Next(node) => node.depth(),
        }
    }

    /// Visits every terminal level reachable from this outcome, in presentation order.
    pub fn for_each_leaf(&self, f: &mut impl FnMut(Level)) {
        match self {
            Outcome::Level(level) => f(*level),
            Outcome::Next(node) => {
                for option in node.options() {
                    option.outcome.for_each_leaf(f);
                }
            }
        }
    }
}

/// One selectable answer on a [`DecisionNode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOption {
    pub label: NonEmptyText,
    pub outcome: Outcome,
}

/// One question in a scenario.
///
/// Construction goes through [`DecisionNode::new`], which enforces a non-empty, duplicate-free
/// option list. Lookup by label is therefore a closed match: a label either belongs to the node
/// or is rejected with [`MediMapError::InvalidAnswer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionNode {
    question: NonEmptyText,
    options: Vec<AnswerOption>,
}

impl DecisionNode {
    /// # Errors
    ///
    /// Returns [`MediMapError::InvalidInput`] if `options` is empty or two options share a
    /// label.
    pub fn new(question: NonEmptyText, options: Vec<AnswerOption>) -> MediMapResult<Self> {
        if options.is_empty() {
            return Err(MediMapError::InvalidInput(format!(
                "question '{question}' has no options"
            )));
        }
        for (i, option) in options.iter().enumerate() {
            if options[..i].iter().any(|o| o.label == option.label) {
                return Err(MediMapError::InvalidInput(format!(
                    "question '{question}' repeats option '{}'",
                    option.label
                )));
            }
        }
        Ok(Self { question, options })
    }

    pub fn question(&self) -> &str {
        self.question.as_str()
    }

    pub fn options(&self) -> &[AnswerOption] {
        &self.options
    }

    /// Option labels in presentation order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|o| o.label.as_str())
    }

    /// Follows the option labelled `label`.
    ///
    /// Pure: the same `(node, label)` always yields the same outcome.
    ///
    /// # Errors
    ///
    /// Returns [`MediMapError::InvalidAnswer`] if `label` is not one of this node's labels.
    pub fn answer(&self, label: &str) -> MediMapResult<&Outcome> {
        self.options
            .iter()
            .find(|o| o.label.as_str() == label)
            .map(|o| &o.outcome)
            .ok_or_else(|| MediMapError::InvalidAnswer {
                question: self.question.to_string(),
                label: label.to_string(),
            })
    }

    /// Number of questions on the longest path starting at this node (this node counts as 1).
    pub fn depth(&self) -> usize {
        1 + self
            .options
            .iter()
            .map(|o| o.outcome.depth())
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> NonEmptyText {
        NonEmptyText::new(s).unwrap()
    }

    fn level(n: i64) -> Outcome {
        Outcome::Level(Level::new(n).unwrap())
    }

    fn breathing() -> DecisionNode {
        DecisionNode::new(
            text("Is the patient breathing?"),
            vec![
                AnswerOption {
                    label: text("Yes"),
                    outcome: level(3),
                },
                AnswerOption {
                    label: text("No"),
                    outcome: level(4),
                },
            ],
        )
        .unwrap()
    }

    #[test]
    fn answer_follows_matching_label() {
        let node = breathing();
        assert_eq!(node.answer("No").unwrap(), &level(4));
        assert_eq!(node.answer("Yes").unwrap(), &level(3));
    }

    #[test]
    fn answer_is_repeatable() {
        let node = breathing();
        assert_eq!(node.answer("No").unwrap(), node.answer("No").unwrap());
    }

    #[test]
    fn unknown_label_is_invalid_answer() {
        let err = breathing().answer("Sometimes").expect_err("not an option");
        match err {
            MediMapError::InvalidAnswer { question, label } => {
                assert_eq!(question, "Is the patient breathing?");
                assert_eq!(label, "Sometimes");
            }
            other => panic!("expected InvalidAnswer, got {other:?}"),
        }
    }

    #[test]
    fn labels_are_case_sensitive() {
        assert!(breathing().answer("no").is_err());
    }

    #[test]
    fn empty_options_rejected() {
        let err = DecisionNode::new(text("Anything?"), vec![]).expect_err("no options");
        assert!(matches!(err, MediMapError::InvalidInput(msg) if msg.contains("no options")));
    }

    #[test]
    fn duplicate_labels_rejected() {
        let err = DecisionNode::new(
            text("Conscious?"),
            vec![
                AnswerOption {
                    label: text("Yes"),
                    outcome: level(1),
                },
                AnswerOption {
                    label: text("Yes"),
                    outcome: level(2),
                },
            ],
        )
        .expect_err("duplicate label");
        assert!(matches!(err, MediMapError::InvalidInput(msg) if msg.contains("repeats")));
    }

    #[test]
    fn single_option_node_is_legal() {
        let node = DecisionNode::new(
            text("Press to continue"),
            vec![AnswerOption {
                label: text("Continue"),
                outcome: level(2),
            }],
        )
        .unwrap();
        assert_eq!(node.labels().collect::<Vec<_>>(), vec!["Continue"]);
    }

    #[test]
    fn depth_counts_questions_on_longest_path() {
        let root = DecisionNode::new(
            text("Is the patient awake?"),
            vec![
                AnswerOption {
                    label: text("Yes"),
                    outcome: level(2),
                },
                AnswerOption {
                    label: text("No"),
                    outcome: Outcome::Next(Box::new(breathing())),
                },
            ],
        )
        .unwrap();
        assert_eq!(root.depth(), 2);

        let mut leaves = Vec::new();
        Outcome::Next(Box::new(root)).for_each_leaf(&mut |l| leaves.push(l.get()));
        assert_eq!(leaves, vec![2, 3, 4]);
    }
}
