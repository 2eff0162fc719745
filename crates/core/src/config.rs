//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into the services. Request
//! handling never reads environment variables; binaries read them and hand the raw values to the
//! `*_from_env_value` parsers below.

use crate::caller::CallerInfo;
use crate::constants::{DEFAULT_TOP_N, DEFAULT_UPLOAD_DIR, MAX_TOP_N};
use crate::error::{MediMapError, MediMapResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    scenario_file: Option<PathBuf>,
    hospital_data: Option<PathBuf>,
    upload_dir: PathBuf,
    default_top_n: usize,
    caller: Option<CallerInfo>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            scenario_file: None,
            hospital_data: None,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            default_top_n: DEFAULT_TOP_N,
            caller: None,
        }
    }
}

impl CoreConfig {
    /// # Errors
    ///
    /// Returns [`MediMapError::InvalidInput`] if `default_top_n` is zero or above the maximum,
    /// or if a configured scenario or hospital data file does not exist.
    pub fn new(
        scenario_file: Option<PathBuf>,
        hospital_data: Option<PathBuf>,
        upload_dir: PathBuf,
        default_top_n: usize,
        caller: Option<CallerInfo>,
    ) -> MediMapResult<Self> {
        if default_top_n == 0 || default_top_n > MAX_TOP_N {
            return Err(MediMapError::InvalidInput(format!(
                "default top_n must be between 1 and {MAX_TOP_N}, got {default_top_n}"
            )));
        }
        for (what, path) in [("scenario file", &scenario_file), ("hospital data", &hospital_data)] {
            if let Some(path) = path {
                if !path.is_file() {
                    return Err(MediMapError::InvalidInput(format!(
                        "{what} does not exist: {}",
                        path.display()
                    )));
                }
            }
        }

        Ok(Self {
            scenario_file,
            hospital_data,
            upload_dir,
            default_top_n,
            caller,
        })
    }

    pub fn scenario_file(&self) -> Option<&Path> {
        self.scenario_file.as_deref()
    }

    pub fn hospital_data(&self) -> Option<&Path> {
        self.hospital_data.as_deref()
    }

    /// Where accepted uploads are kept.
    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn default_top_n(&self) -> usize {
        self.default_top_n
    }

    pub fn caller(&self) -> Option<&CallerInfo> {
        self.caller.as_ref()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses the default result count. Missing or blank means [`DEFAULT_TOP_N`].
pub fn top_n_from_env_value(value: Option<String>) -> MediMapResult<usize> {
    match non_blank(value) {
        None => Ok(DEFAULT_TOP_N),
        Some(v) => v
            .parse::<usize>()
            .map_err(|_| MediMapError::InvalidInput(format!("invalid top_n '{v}'"))),
    }
}

/// Parses an optional path. Missing or blank means `None`.
pub fn path_from_env_value(value: Option<String>) -> Option<PathBuf> {
    non_blank(value).map(PathBuf::from)
}

/// Parses the configured caller.
///
/// All three values absent means no caller is configured. A partial configuration is an error
/// rather than a silently missing caller.
pub fn caller_from_env_values(
    caller_id: Option<String>,
    lat: Option<String>,
    lng: Option<String>,
) -> MediMapResult<Option<CallerInfo>> {
    match (non_blank(caller_id), non_blank(lat), non_blank(lng)) {
        (None, None, None) => Ok(None),
        (Some(id), Some(lat), Some(lng)) => {
            let parse = |name: &str, raw: &str| {
                raw.parse::<f64>().map_err(|_| {
                    MediMapError::InvalidInput(format!("caller {name} '{raw}' is not a number"))
                })
            };
            Ok(Some(CallerInfo::new(
                &id,
                parse("latitude", &lat)?,
                parse("longitude", &lng)?,
            )?))
        }
        _ => Err(MediMapError::InvalidInput(
            "caller id, latitude and longitude must be configured together".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_n_defaults_when_missing_or_blank() {
        assert_eq!(top_n_from_env_value(None).unwrap(), DEFAULT_TOP_N);
        assert_eq!(top_n_from_env_value(Some("  ".into())).unwrap(), DEFAULT_TOP_N);
        assert_eq!(top_n_from_env_value(Some("12".into())).unwrap(), 12);
        assert!(matches!(
            top_n_from_env_value(Some("many".into())),
            Err(MediMapError::InvalidInput(_))
        ));
    }

    #[test]
    fn caller_requires_all_or_nothing() {
        assert_eq!(caller_from_env_values(None, None, None).unwrap(), None);

        let caller = caller_from_env_values(
            Some("line-1".into()),
            Some("12.9".into()),
            Some("77.6".into()),
        )
        .unwrap()
        .expect("configured");
        assert_eq!(caller.caller_id.as_str(), "line-1");

        let err = caller_from_env_values(Some("line-1".into()), None, Some("77.6".into()))
            .expect_err("partial");
        assert!(matches!(err, MediMapError::InvalidInput(_)));

        let err = caller_from_env_values(Some("x".into()), Some("north".into()), Some("1".into()))
            .expect_err("not a number");
        assert!(matches!(err, MediMapError::InvalidInput(_)));
    }

    #[test]
    fn config_rejects_bad_top_n_and_missing_files() {
        let err = CoreConfig::new(None, None, PathBuf::from("uploads"), 0, None)
            .expect_err("zero top_n");
        assert!(matches!(err, MediMapError::InvalidInput(_)));

        let err = CoreConfig::new(
            Some(PathBuf::from("/no/such/scenarios.yaml")),
            None,
            PathBuf::from("uploads"),
            5,
            None,
        )
        .expect_err("missing file");
        assert!(matches!(err, MediMapError::InvalidInput(_)));
    }

    #[test]
    fn config_accepts_existing_files() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let cfg = CoreConfig::new(
            None,
            Some(file.path().to_path_buf()),
            PathBuf::from("uploads"),
            7,
            None,
        )
        .unwrap();
        assert_eq!(cfg.hospital_data(), Some(file.path()));
        assert_eq!(cfg.default_top_n(), 7);
        assert_eq!(path_from_env_value(Some(" ".into())), None);
    }
}
