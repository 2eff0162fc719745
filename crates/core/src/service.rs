//! The service facade shared by the REST server and the CLI.

use crate::caller::{CallerInfoSource, StaticCallerInfo};
use crate::config::CoreConfig;
use crate::error::MediMapResult;
use crate::hospital::{
    import_batch, import_path, DirectorySnapshot, HospitalDirectory, ImportReport, RecommendQuery,
    Recommendations, SearchQuery, SearchResult,
};
use crate::triage::{ScenarioForest, TriageEngine};
use std::path::Path;
use std::sync::Arc;

/// Result of an upload: the report and, when rows were accepted, the published snapshot.
#[derive(Debug)]
pub struct UploadOutcome {
    pub snapshot: Option<Arc<DirectorySnapshot>>,
    pub report: ImportReport,
}

/// Triage engine, hospital directory and caller source wired from one [`CoreConfig`].
///
/// Cloning is cheap; clones share the directory.
#[derive(Clone)]
pub struct MediMapService {
    cfg: Arc<CoreConfig>,
    triage: TriageEngine,
    directory: Arc<HospitalDirectory>,
    caller: Arc<dyn CallerInfoSource>,
}

impl std::fmt::Debug for MediMapService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediMapService")
            .field("cfg", &self.cfg)
            .field("scenarios", &self.triage.forest().len())
            .field("directory_loaded", &self.directory.is_loaded())
            .finish()
    }
}

impl MediMapService {
    /// Loads the scenario forest and any initial hospital data named by `cfg`.
    ///
    /// # Errors
    ///
    /// Fails if the scenario definitions are invalid, or if initial hospital data is configured
    /// but yields no valid rows.
    pub fn bootstrap(cfg: Arc<CoreConfig>) -> MediMapResult<Self> {
        let forest = match cfg.scenario_file() {
            Some(path) => ScenarioForest::from_path(path)?,
            None => ScenarioForest::builtin()?,
        };
        let directory = Arc::new(HospitalDirectory::new());
        if let Some(path) = cfg.hospital_data() {
            let report = import_path(path);
            for problem in report.error_messages() {
                tracing::warn!(%problem, "initial hospital data");
            }
            directory.publish(report.into_records()?);
        }
        let caller = Arc::new(StaticCallerInfo::new(cfg.caller().cloned()));

        Ok(Self {
            cfg,
            triage: TriageEngine::new(forest),
            directory,
            caller,
        })
    }

    /// Replaces the caller source.
    pub fn with_caller_source(mut self, caller: Arc<dyn CallerInfoSource>) -> Self {
        self.caller = caller;
        self
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    pub fn triage(&self) -> &TriageEngine {
        &self.triage
    }

    pub fn directory(&self) -> &HospitalDirectory {
        &self.directory
    }

    pub fn caller_source(&self) -> &dyn CallerInfoSource {
        self.caller.as_ref()
    }

    /// Searches the current snapshot. `None` uses the configured default result count.
    pub fn search(&self, query: &SearchQuery, top_n: Option<usize>) -> MediMapResult<SearchResult> {
        self.directory
            .search(query, top_n.unwrap_or(self.cfg.default_top_n()))
    }

    /// Recommends from the current snapshot. `None` uses the configured default result count.
    pub fn recommend(
        &self,
        query: &RecommendQuery,
        top_n: Option<usize>,
    ) -> MediMapResult<Recommendations> {
        self.directory
            .recommend(query, top_n.unwrap_or(self.cfg.default_top_n()))
    }

    /// Imports a batch of uploads and publishes them if any row was accepted.
    ///
    /// A batch with no accepted rows leaves the current snapshot untouched.
    pub fn upload<'a, I>(&self, files: I) -> UploadOutcome
    where
        I: IntoIterator<Item = (&'a str, &'a [u8])>,
    {
        let report = import_batch(files);
        let snapshot = if report.records.is_empty() {
            tracing::warn!(
                problems = report.error_messages().len(),
                "upload rejected; keeping current hospital directory"
            );
            None
        } else {
            Some(self.directory.publish(report.records.clone()))
        };
        UploadOutcome { snapshot, report }
    }

    /// Writes accepted upload bytes under the configured upload directory.
    ///
    /// # Errors
    ///
    /// Returns [`crate::MediMapError::Io`] if the directory or file cannot be written.
    pub fn store_upload(&self, file_name: &str, bytes: &[u8]) -> MediMapResult<std::path::PathBuf> {
        let dir = self.cfg.upload_dir();
        std::fs::create_dir_all(dir).map_err(|source| crate::MediMapError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let name = Path::new(file_name)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let path = dir.join(name);
        std::fs::write(&path, bytes).map_err(|source| crate::MediMapError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caller::CallerInfo;
    use crate::MediMapError;
    use std::io::Write;
    use std::path::PathBuf;

    const CSV: &[u8] = b"name,level,latitude,longitude\nA,2,12.91,77.6\nB,3,12.95,77.6\n";

    fn cfg(dir: &Path, hospital_data: Option<PathBuf>) -> Arc<CoreConfig> {
        Arc::new(
            CoreConfig::new(
                None,
                hospital_data,
                dir.join("uploads"),
                5,
                Some(CallerInfo::new("line-1", 12.9, 77.6).unwrap()),
            )
            .unwrap(),
        )
    }

    #[test]
    fn bootstrap_without_data_has_empty_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let service = MediMapService::bootstrap(cfg(tmp.path(), None)).unwrap();
        assert!(!service.triage().scenarios().is_empty());
        let query = SearchQuery::new(12.9, 77.6).unwrap();
        assert!(matches!(
            service.search(&query, None),
            Err(MediMapError::EmptyDirectory)
        ));
        assert!(service.caller_source().current().is_some());
    }

    #[test]
    fn bootstrap_loads_initial_data() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("hospitals.csv");
        std::fs::File::create(&path).unwrap().write_all(CSV).unwrap();
        let service = MediMapService::bootstrap(cfg(tmp.path(), Some(path))).unwrap();
        let query = SearchQuery::new(12.9, 77.6).unwrap();
        assert_eq!(service.search(&query, None).unwrap().len(), 2);

        let query = RecommendQuery::new(12.9, 77.6, crate::Level::MAX).unwrap();
        let recommended = service.recommend(&query, Some(1)).unwrap();
        assert_eq!(recommended.hits.len(), 1);
        assert_eq!(recommended.hits[0].hospital.name.as_str(), "A");
    }

    #[test]
    fn failed_upload_keeps_previous_snapshot() {
        let tmp = tempfile::tempdir().unwrap();
        let service = MediMapService::bootstrap(cfg(tmp.path(), None)).unwrap();

        let first = service.upload([("a.csv", CSV)]);
        assert_eq!(first.snapshot.as_ref().map(|s| s.len()), Some(2));

        let second = service.upload([("b.txt", b"junk".as_slice())]);
        assert!(second.snapshot.is_none());
        assert_eq!(second.report.file_errors.len(), 1);
        assert_eq!(service.directory().snapshot().unwrap().generation(), 1);
    }

    #[test]
    fn store_upload_writes_under_upload_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let service = MediMapService::bootstrap(cfg(tmp.path(), None)).unwrap();
        let path = service.store_upload("../../escape.csv", CSV).unwrap();
        assert_eq!(path, tmp.path().join("uploads").join("escape.csv"));
        assert_eq!(std::fs::read(path).unwrap(), CSV);
    }
}
