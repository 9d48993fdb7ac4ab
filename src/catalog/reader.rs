//! Tab-delimited schedule reader.

use super::CourseRecord;
use crate::error::{CoursebotError, Result};
use std::io::Read;
use std::path::Path;
use tracing::{info, instrument};

/// Read course records from a tab-delimited export with a header row.
///
/// Rows may be shorter or longer than the header, and stray quote characters
/// inside unquoted fields are kept as literal text.
pub fn read_courses<R: Read>(input: R) -> Result<Vec<CourseRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(input);

    let mut courses = Vec::new();
    for (row, record) in reader.deserialize::<CourseRecord>().enumerate() {
        let course = record.map_err(|e| {
            CoursebotError::Ingestion(format!("Failed to parse row {}: {}", row + 2, e))
        })?;
        courses.push(course);
    }

    info!("Successfully read {} records from CSV", courses.len());
    Ok(courses)
}

/// Read course records from a file on disk.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_courses_from_path(path: &Path) -> Result<Vec<CourseRecord>> {
    let file = std::fs::File::open(path).map_err(|e| {
        CoursebotError::Ingestion(format!("Error opening {}: {}", path.display(), e))
    })?;
    read_courses(std::io::BufReader::new(file))
}
