//! Hospital records, import, the published directory, proximity search and recommendation.

pub mod directory;
pub mod import;
pub mod record;
pub mod recommend;
pub mod search;
pub mod template;

pub use directory::{DirectorySnapshot, DirectoryStats, HospitalDirectory};
pub use import::{import_batch, import_path, upload_extension, HospitalImporter, ImportReport, RowError};
pub use record::{level_description, HospitalRecord};
pub use recommend::{
    priority_score, recommend, recommendation_reason, RecommendQuery, Recommendation,
    Recommendations, TriageRequirements,
};
pub use search::{search, search_default, SearchHit, SearchQuery, SearchResult};
pub use template::{template_csv, TEMPLATE_FILE_NAME};
