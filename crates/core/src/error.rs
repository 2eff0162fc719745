use medimap_types::TypesError;
use serde::Serialize;

/// Errors returned by the triage engine, hospital search and their loaders.
///
/// Every variant is a local validation failure: the caller can recover by supplying corrected
/// input. Nothing here is retried internally.
#[derive(Debug, thiserror::Error)]
pub enum MediMapError {
    #[error("unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("invalid answer '{label}' for question '{question}'")]
    InvalidAnswer { question: String, label: String },

    #[error("answer '{label}' given after scenario '{scenario}' already resolved")]
    AnswerAfterResolution { scenario: String, label: String },

    #[error("invalid level: {0}")]
    InvalidLevel(TypesError),

    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(TypesError),

    #[error("hospital directory is empty; upload hospital data first")]
    EmptyDirectory,

    #[error("invalid scenario definition at {path}: {reason}")]
    InvalidScenarioDefinition { path: String, reason: String },

    #[error("invalid upload '{file}': {reason}")]
    InvalidUpload { file: String, reason: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to read {path}: {source}", path = path.display())]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Stable, serialisable classification of a [`MediMapError`].
///
/// API layers report this alongside the error message so clients can branch on the kind
/// without parsing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnknownScenario,
    InvalidAnswer,
    InvalidLevel,
    InvalidCoordinate,
    EmptyDirectory,
    InvalidScenarioDefinition,
    InvalidUpload,
    InvalidInput,
    Io,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::UnknownScenario => "unknown_scenario",
            ErrorKind::InvalidAnswer => "invalid_answer",
            ErrorKind::InvalidLevel => "invalid_level",
            ErrorKind::InvalidCoordinate => "invalid_coordinate",
            ErrorKind::EmptyDirectory => "empty_directory",
            ErrorKind::InvalidScenarioDefinition => "invalid_scenario_definition",
            ErrorKind::InvalidUpload => "invalid_upload",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Io => "io",
        }
    }
}

impl MediMapError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MediMapError::UnknownScenario(_) => ErrorKind::UnknownScenario,
            MediMapError::InvalidAnswer { .. } | MediMapError::AnswerAfterResolution { .. } => {
                ErrorKind::InvalidAnswer
            }
            MediMapError::InvalidLevel(_) => ErrorKind::InvalidLevel,
            MediMapError::InvalidCoordinate(_) => ErrorKind::InvalidCoordinate,
            MediMapError::EmptyDirectory => ErrorKind::EmptyDirectory,
            MediMapError::InvalidScenarioDefinition { .. } => ErrorKind::InvalidScenarioDefinition,
            MediMapError::InvalidUpload { .. } => ErrorKind::InvalidUpload,
            MediMapError::InvalidInput(_) => ErrorKind::InvalidInput,
            MediMapError::Io { .. } => ErrorKind::Io,
        }
    }
}

pub type MediMapResult<T> = std::result::Result<T, MediMapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_errors_share_a_kind() {
        let unknown = MediMapError::InvalidAnswer {
            question: "Is the patient awake?".into(),
            label: "Maybe".into(),
        };
        let late = MediMapError::AnswerAfterResolution {
            scenario: "Burns".into(),
            label: "Yes".into(),
        };
        assert_eq!(unknown.kind(), ErrorKind::InvalidAnswer);
        assert_eq!(late.kind(), ErrorKind::InvalidAnswer);
        assert_eq!(unknown.kind().as_str(), "invalid_answer");
    }

    #[test]
    fn kind_serialises_as_snake_case() {
        let json = serde_json::to_string(&ErrorKind::EmptyDirectory).unwrap();
        assert_eq!(json, "\"empty_directory\"");
    }
}
