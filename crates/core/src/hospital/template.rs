//! Sample hospital data file offered to people preparing an upload.

use crate::error::{MediMapError, MediMapResult};

const COLUMNS: [&str; 12] = [
    "name",
    "latitude",
    "longitude",
    "level",
    "address",
    "phone",
    "email",
    "website",
    "facilities",
    "specialties",
    "emergency_services",
    "bed_count",
];

const ROWS: [[&str; 12]; 2] = [
    [
        "City General Hospital",
        "40.7128",
        "-74.0060",
        "3",
        "123 Main St, New York, NY 10001",
        "+1-555-0123",
        "info@citygeneral.com",
        "https://www.citygeneral.com",
        "Emergency Room, ICU, Surgery",
        "General Medicine, Emergency Medicine",
        "true",
        "200",
    ],
    [
        "Regional Medical Center",
        "34.0522",
        "-118.2437",
        "4",
        "456 Health Ave, Los Angeles, CA 90210",
        "+1-555-0456",
        "contact@regionalmedical.com",
        "https://www.regionalmedical.com",
        "Emergency Room, ICU, Surgery, Cardiology, Oncology",
        "Cardiology, Oncology, Neurology, Emergency Medicine",
        "true",
        "450",
    ],
];

/// File name suggested when the template is downloaded.
pub const TEMPLATE_FILE_NAME: &str = "hospitals_template.csv";

/// A CSV file with every recognised column and two example hospitals.
///
/// # Errors
///
/// Returns [`MediMapError::InvalidInput`] if the CSV writer fails.
pub fn template_csv() -> MediMapResult<String> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(Vec::new());
    wtr.write_record(COLUMNS).map_err(template_error)?;
    for row in ROWS {
        wtr.write_record(row).map_err(template_error)?;
    }
    let bytes = wtr.into_inner().map_err(template_error)?;
    String::from_utf8(bytes).map_err(template_error)
}

fn template_error(e: impl std::fmt::Display) -> MediMapError {
    MediMapError::InvalidInput(format!("could not build template: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hospital::import::import_batch;

    #[test]
    fn template_imports_cleanly() {
        let text = template_csv().unwrap();
        assert!(text.starts_with("name,latitude,longitude,level,"));

        let report = import_batch([(TEMPLATE_FILE_NAME, text.as_bytes())]);
        assert!(report.error_messages().is_empty(), "{:?}", report.error_messages());
        assert_eq!(report.accepted(), 2);
        let regional = &report.records[1];
        assert_eq!(regional.level.get(), 4);
        assert_eq!(regional.address, "456 Health Ave, Los Angeles, CA 90210");
        assert_eq!(regional.facilities.len(), 5);
        assert_eq!(regional.bed_count, Some(450));
    }
}
