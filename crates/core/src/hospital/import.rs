//! Hospital data import from CSV and JSON uploads.
//!
//! Both formats are reduced to rows of `column -> text` before validation, so they share header
//! normalisation, field parsing and id assignment. A whole file is rejected only when it cannot
//! be read at all or lacks a required column; otherwise bad rows are dropped and reported while
//! the rest of the file is accepted.

use crate::constants::{ALLOWED_UPLOAD_EXTENSIONS, GENERATED_ID_PREFIX};
use crate::error::{MediMapError, MediMapResult};
use crate::hospital::record::HospitalRecord;
use medimap_types::{Coordinate, Level, NonEmptyText};
use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use std::path::Path;

const REQUIRED_COLUMNS: [&str; 4] = ["name", "level", "latitude", "longitude"];
const TRUTHY: [&str; 6] = ["true", "1", "yes", "y", "enabled", "on"];

type RawRow = BTreeMap<String, String>;

/// A rejected row. `row` is 1-based over data rows, excluding the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub source: String,
    pub row: usize,
    pub message: String,
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} row {}: {}", self.source, self.row, self.message)
    }
}

/// Outcome of importing one or more sources.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub records: Vec<HospitalRecord>,
    pub row_errors: Vec<RowError>,
    /// Whole-file rejections, one per failed source.
    pub file_errors: Vec<MediMapError>,
    /// Accepted row count per source that contributed at least one record.
    pub accepted_by_source: BTreeMap<String, usize>,
}

impl ImportReport {
    pub fn accepted(&self) -> usize {
        self.records.len()
    }

    /// True if `source` contributed at least one accepted record.
    pub fn contributed(&self, source: &str) -> bool {
        self.accepted_by_source.contains_key(source)
    }

    /// Every problem as a display line, file errors first.
    pub fn error_messages(&self) -> Vec<String> {
        self.file_errors
            .iter()
            .map(ToString::to_string)
            .chain(self.row_errors.iter().map(ToString::to_string))
            .collect()
    }

    /// The accepted records, or an error when nothing was accepted.
    ///
    /// # Errors
    ///
    /// Returns the first file error, or [`MediMapError::InvalidUpload`] summarising row errors,
    /// when no record survived.
    pub fn into_records(mut self) -> MediMapResult<Vec<HospitalRecord>> {
        if !self.records.is_empty() {
            return Ok(self.records);
        }
        if !self.file_errors.is_empty() {
            return Err(self.file_errors.swap_remove(0));
        }
        Err(MediMapError::InvalidUpload {
            file: self
                .row_errors
                .first()
                .map_or_else(|| "upload".to_string(), |e| e.source.clone()),
            reason: format!("no valid hospital rows ({} rejected)", self.row_errors.len()),
        })
    }
}

/// Stateful importer for one batch.
///
/// Generated ids continue across every source fed to the same importer, and explicit ids must
/// be unique across the batch.
#[derive(Debug, Default)]
pub struct HospitalImporter {
    next_generated: usize,
    seen_ids: HashSet<String>,
    report: ImportReport,
}

impl HospitalImporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Imports an in-memory upload, choosing the format from the file extension.
    ///
    /// Failures are recorded in the report rather than returned, so one bad file does not stop
    /// the batch.
    pub fn add_bytes(&mut self, file_name: &str, bytes: &[u8]) -> &mut Self {
        let outcome = match upload_extension(file_name) {
            Ok(ext) if ext == "json" => self.read_json(file_name, bytes),
            Ok(_) => self.read_csv(file_name, bytes),
            Err(err) => Err(err),
        };
        if let Err(err) = outcome {
            tracing::warn!(file = file_name, error = %err, "rejected hospital data file");
            self.report.file_errors.push(err);
        }
        self
    }

    /// Imports a file from disk.
    pub fn add_path(&mut self, path: &Path) -> &mut Self {
        let name = path.display().to_string();
        match std::fs::read(path) {
            Ok(bytes) => self.add_bytes(&name, &bytes),
            Err(source) => {
                self.report.file_errors.push(MediMapError::Io {
                    path: path.to_path_buf(),
                    source,
                });
                self
            }
        }
    }

    pub fn finish(self) -> ImportReport {
        tracing::info!(
            accepted = self.report.records.len(),
            row_errors = self.report.row_errors.len(),
            file_errors = self.report.file_errors.len(),
            "hospital import finished"
        );
        self.report
    }

    fn read_csv<R: Read>(&mut self, source: &str, reader: R) -> MediMapResult<()> {
        let mut csv = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = normalise_headers(csv.headers().map_err(|e| invalid_upload(source, e))?.iter());
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .into_iter()
            .filter(|col| !headers.iter().any(|h| h.as_str() == *col))
            .collect();
        if !missing.is_empty() {
            return Err(invalid_upload(
                source,
                format!("missing required columns: {}", missing.join(", ")),
            ));
        }

        let mut rows = Vec::new();
        for (idx, record) in csv.records().enumerate() {
            let row = idx + 1;
            match record {
                Ok(record) => rows.push((
                    row,
                    headers
                        .iter()
                        .cloned()
                        .zip(record.iter().map(str::to_string))
                        .collect::<RawRow>(),
                )),
                Err(e) => self.reject(source, row, e.to_string()),
            }
        }
        self.accept_rows(source, rows);
        Ok(())
    }

    fn read_json(&mut self, source: &str, bytes: &[u8]) -> MediMapResult<()> {
        let value: serde_json::Value =
            serde_json::from_slice(bytes).map_err(|e| invalid_upload(source, e))?;
        let items = match value {
            serde_json::Value::Array(items) => items,
            serde_json::Value::Object(mut map) => match map.remove("hospitals") {
                Some(serde_json::Value::Array(items)) => items,
                _ => {
                    return Err(invalid_upload(
                        source,
                        "expected an array of hospital objects or {\"hospitals\": [...]}",
                    ))
                }
            },
            _ => return Err(invalid_upload(source, "expected an array of hospital objects")),
        };

        let mut rows = Vec::with_capacity(items.len());
        for (idx, item) in items.into_iter().enumerate() {
            let row = idx + 1;
            match item {
                serde_json::Value::Object(map) => {
                    let (keys, values): (Vec<String>, Vec<serde_json::Value>) =
                        map.into_iter().unzip();
                    let raw = normalise_headers(keys.iter().map(String::as_str))
                        .into_iter()
                        .zip(values)
                        .filter_map(|(k, v)| json_text(v).map(|v| (k, v)))
                        .collect::<RawRow>();
                    rows.push((row, raw));
                }
                other => self.reject(source, row, format!("expected an object, got {other}")),
            }
        }
        self.accept_rows(source, rows);
        Ok(())
    }

    fn accept_rows(&mut self, source: &str, rows: Vec<(usize, RawRow)>) {
        for (row, raw) in rows {
            match self.build_record(&raw) {
                Ok(record) => {
                    self.seen_ids.insert(record.id.clone());
                    self.report.records.push(record);
                    *self
                        .report
                        .accepted_by_source
                        .entry(source.to_string())
                        .or_default() += 1;
                }
                Err(message) => self.reject(source, row, message),
            }
        }
    }

    fn reject(&mut self, source: &str, row: usize, message: String) {
        tracing::debug!(source, row, %message, "rejected hospital row");
        self.report.row_errors.push(RowError {
            source: source.to_string(),
            row,
            message,
        });
    }

    fn build_record(&mut self, raw: &RawRow) -> Result<HospitalRecord, String> {
        let name = NonEmptyText::new(text(raw, "name").unwrap_or_default())
            .map_err(|_| "hospital name is required".to_string())?;
        let level = parse_level(text(raw, "level"))?;
        let lat = parse_number(raw, "latitude")?;
        let lng = parse_number(raw, "longitude")?;
        let location = Coordinate::new(lat, lng).map_err(|e| e.to_string())?;

        let id = match text(raw, "id") {
            Some(explicit) if self.seen_ids.contains(explicit) => {
                return Err(format!("duplicate hospital id '{explicit}'"));
            }
            Some(explicit) => explicit.to_string(),
            None => self.generate_id(),
        };

        let mut record = HospitalRecord::new(id, name, level, location);
        record.address = text(raw, "address").unwrap_or_default().to_string();
        record.phone = owned(raw, "phone");
        record.area = owned(raw, "area");
        record.availability = owned(raw, "availability");
        record.state = owned(raw, "state");
        record.email = owned(raw, "email");
        record.website = owned(raw, "website");
        record.facilities = split_list(text(raw, "facilities"));
        record.specialties = split_list(text(raw, "specialties"));
        record.emergency_services = text(raw, "emergency_services")
            .map_or(true, |v| TRUTHY.contains(&v.to_lowercase().as_str()));
        record.bed_count = text(raw, "bed_count").and_then(parse_bed_count);
        Ok(record)
    }

    fn generate_id(&mut self) -> String {
        loop {
            self.next_generated += 1;
            let candidate = format!("{GENERATED_ID_PREFIX}{}", self.next_generated);
            if !self.seen_ids.contains(&candidate) {
                return candidate;
            }
        }
    }
}

/// Imports several uploads as one batch.
pub fn import_batch<'a, I>(files: I) -> ImportReport
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let mut importer = HospitalImporter::new();
    for (name, bytes) in files {
        importer.add_bytes(name, bytes);
    }
    importer.finish()
}

/// Imports a single file from disk.
pub fn import_path(path: &Path) -> ImportReport {
    let mut importer = HospitalImporter::new();
    importer.add_path(path);
    importer.finish()
}

/// The lower-cased extension of an upload, if allowed.
///
/// # Errors
///
/// Returns [`MediMapError::InvalidUpload`] for a missing or unsupported extension.
pub fn upload_extension(file_name: &str) -> MediMapResult<String> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if ALLOWED_UPLOAD_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(invalid_upload(
            file_name,
            format!(
                "unsupported file type; allowed: {}",
                ALLOWED_UPLOAD_EXTENSIONS.join(", ")
            ),
        ))
    }
}

fn invalid_upload(file: &str, reason: impl ToString) -> MediMapError {
    MediMapError::InvalidUpload {
        file: file.to_string(),
        reason: reason.to_string(),
    }
}

fn normalise_header(header: &str) -> String {
    header.trim().to_lowercase().replace(' ', "_")
}

fn canonical_column(header: &str) -> Option<&'static str> {
    match header {
        "lat" => Some("latitude"),
        "long" | "lng" | "lon" => Some("longitude"),
        _ => None,
    }
}

/// Lower-cases headers and maps coordinate synonyms onto their canonical column.
///
/// A synonym is renamed only while its canonical column is absent, so an explicit `latitude`
/// is never shadowed by a `lat` column. Of several synonyms the first one wins.
fn normalise_headers<'a, I>(headers: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let lowered: Vec<String> = headers.into_iter().map(normalise_header).collect();
    let mut present: HashSet<String> = lowered.iter().cloned().collect();
    lowered
        .into_iter()
        .map(|header| match canonical_column(&header) {
            Some(canonical) if !present.contains(canonical) => {
                present.insert(canonical.to_string());
                canonical.to_string()
            }
            _ => header,
        })
        .collect()
}

fn json_text(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(json_text)
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(other.to_string()),
    }
}

/// Non-empty trimmed text of a column. `nan` counts as empty.
fn text<'a>(raw: &'a RawRow, column: &str) -> Option<&'a str> {
    raw.get(column)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("nan"))
}

fn owned(raw: &RawRow, column: &str) -> Option<String> {
    text(raw, column).map(str::to_string)
}

fn parse_number(raw: &RawRow, column: &str) -> Result<f64, String> {
    let value = text(raw, column).ok_or_else(|| format!("{column} is required"))?;
    value
        .parse::<f64>()
        .map_err(|_| format!("{column} '{value}' is not a number"))
}

/// Accepts `2` as well as spreadsheet-style `2.0`.
fn parse_level(value: Option<&str>) -> Result<Level, String> {
    let value = value.ok_or_else(|| "hospital level is required".to_string())?;
    let number = value
        .parse::<f64>()
        .ok()
        .filter(|n| n.fract() == 0.0)
        .ok_or_else(|| format!("invalid hospital level '{value}'"))?;
    Level::new(number as i64).map_err(|e| e.to_string())
}

fn parse_bed_count(value: &str) -> Option<u32> {
    value
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n.trunc() as u32)
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(|c| matches!(c, ',' | '|' | ';'))
                .map(str::trim)
                .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("nan"))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CSV: &str = "\
Name,Level,Lat,Long,Address,Facilities,Specialties,Emergency_Services,Bed_Count
City General,3,12.97,77.59,MG Road,ICU|Emergency Room,Cardiology; Neurology,yes,250.0
Rural Clinic,1,12.80,77.40,,Pharmacy,,no,
";

    fn import_csv(text: &str) -> ImportReport {
        import_batch([("hospitals.csv", text.as_bytes())])
    }

    #[test]
    fn csv_with_synonym_headers_imports() {
        let report = import_csv(CSV);
        assert!(report.row_errors.is_empty(), "{:?}", report.row_errors);
        assert_eq!(report.accepted(), 2);

        let general = &report.records[0];
        assert_eq!(general.id, "hospital_1");
        assert_eq!(general.name.as_str(), "City General");
        assert_eq!(general.level.get(), 3);
        assert_eq!(general.location.lat(), 12.97);
        assert_eq!(general.address, "MG Road");
        assert_eq!(general.facilities, vec!["ICU", "Emergency Room"]);
        assert_eq!(general.specialties, vec!["Cardiology", "Neurology"]);
        assert!(general.emergency_services);
        assert_eq!(general.bed_count, Some(250));

        let clinic = &report.records[1];
        assert_eq!(clinic.id, "hospital_2");
        assert!(clinic.address.is_empty());
        assert!(!clinic.emergency_services);
        assert_eq!(clinic.bed_count, None);
    }

    #[test]
    fn canonical_column_wins_over_blank_synonym() {
        let report = import_csv("name,level,latitude,longitude,lat\nA,2,12.9,77.6,\n");
        assert!(report.row_errors.is_empty(), "{:?}", report.row_errors);
        assert_eq!(report.accepted(), 1);
        assert_eq!(report.records[0].location.lat(), 12.9);

        let json = r#"[{"name": "B", "level": 1, "latitude": 13.1, "lat": null, "lon": 77.5, "lng": 0}]"#;
        let report = import_batch([("b.json", json.as_bytes())]);
        assert_eq!(report.accepted(), 1, "{:?}", report.row_errors);
        assert_eq!(report.records[0].location.lat(), 13.1);
    }

    #[test]
    fn missing_required_column_rejects_file() {
        let report = import_csv("name,level,latitude\nA,1,12.0\n");
        assert!(report.records.is_empty());
        assert_eq!(report.file_errors.len(), 1);
        let err = report.into_records().expect_err("missing longitude");
        assert!(
            matches!(err, MediMapError::InvalidUpload { ref reason, .. } if reason.contains("longitude"))
        );
    }

    #[test]
    fn bad_rows_are_dropped_and_reported() {
        let text = "\
name,level,latitude,longitude
Good,2,12.9,77.6
,2,12.9,77.6
Bad Level,7,12.9,77.6
No Coords,2,,
Far North,2,91.0,77.6
Also Good,4.0,13.0,77.7
";
        let report = import_csv(text);
        let ids: Vec<&str> = report.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["hospital_1", "hospital_2"]);
        let rows: Vec<usize> = report.row_errors.iter().map(|e| e.row).collect();
        assert_eq!(rows, vec![2, 3, 4, 5]);
        assert!(report.row_errors[0].message.contains("name"));
    }

    #[test]
    fn duplicate_explicit_ids_rejected() {
        let text = "id,name,level,latitude,longitude\nH1,A,1,1.0,1.0\nH1,B,1,1.0,1.0\n";
        let report = import_csv(text);
        assert_eq!(report.accepted(), 1);
        assert!(report.row_errors[0].message.contains("duplicate"));
    }

    #[test]
    fn generated_ids_skip_explicit_ones() {
        let text = "id,name,level,latitude,longitude\nhospital_1,A,1,1.0,1.0\n,B,1,1.0,1.0\n";
        let report = import_csv(text);
        let ids: Vec<&str> = report.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["hospital_1", "hospital_2"]);
    }

    #[test]
    fn json_rows_import_and_number_across_batch() {
        let json = r#"[
            {"name": "Json One", "level": 2, "lat": 12.5, "lng": 77.5, "facilities": ["ICU", "Lab"]},
            {"name": "Json Two", "level": "4", "latitude": 12.6, "longitude": 77.6, "emergency_services": false},
            42
        ]"#;
        let report = import_batch([
            ("a.csv", "name,level,latitude,longitude\nCsv One,1,12.0,77.0\n".as_bytes()),
            ("b.json", json.as_bytes()),
        ]);
        let ids: Vec<&str> = report.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["hospital_1", "hospital_2", "hospital_3"]);
        assert_eq!(report.records[1].facilities, vec!["ICU", "Lab"]);
        assert!(!report.records[2].emergency_services);
        assert_eq!(report.row_errors.len(), 1);
        assert_eq!(report.row_errors[0].source, "b.json");
    }

    #[test]
    fn unsupported_extension_is_a_file_error() {
        let report = import_batch([
            ("notes.txt", b"hello".as_slice()),
            ("ok.csv", b"name,level,latitude,longitude\nA,1,1.0,1.0\n".as_slice()),
        ]);
        assert_eq!(report.accepted(), 1);
        assert_eq!(report.file_errors.len(), 1);
        assert_eq!(report.error_messages().len(), 1);
        assert!(report.contributed("ok.csv"));
        assert!(!report.contributed("notes.txt"));
        assert!(report.into_records().is_ok());
    }

    #[test]
    fn batch_with_no_rows_fails() {
        let report = import_csv("name,level,latitude,longitude\n,9,,\n");
        let err = report.into_records().expect_err("nothing accepted");
        assert!(matches!(err, MediMapError::InvalidUpload { .. }));
    }

    #[test]
    fn import_path_reads_disk_and_reports_missing_files() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();
        assert_eq!(import_path(file.path()).accepted(), 2);

        let missing = import_path(Path::new("/definitely/not/here.csv"));
        assert!(matches!(missing.file_errors[0], MediMapError::Io { .. }));
    }

    #[test]
    fn list_split_and_truthy_values() {
        assert_eq!(split_list(Some("a, b|c;;nan")), vec!["a", "b", "c"]);
        assert!(split_list(None).is_empty());
        assert_eq!(parse_bed_count("12.9"), Some(12));
        assert_eq!(parse_bed_count("many"), None);
        assert_eq!(normalise_header(" Emergency Services "), "emergency_services");
        assert_eq!(
            normalise_headers(["Lat", "LNG", "long", "Name"]),
            vec!["latitude", "longitude", "long", "name"]
        );
        assert_eq!(
            normalise_headers(["latitude", "lat"]),
            vec!["latitude", "lat"]
        );
    }
}
