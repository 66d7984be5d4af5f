use thiserror::Error;

/// Errors raised while turning an uploaded sheet into student records.
///
/// None of these ever reach the allocation engine: a failed ingestion
/// leaves the current allotment untouched.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported file format: {0} (expected .xlsx, .xls or .csv)")]
    UnsupportedFormat(String),

    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("CSV parse failed: {0}")]
    CsvParse(String),

    #[error("Excel parse failed: {0}")]
    ExcelParse(String),

    #[error("file read failed: {0}")]
    FileRead(String),
}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        IngestError::FileRead(err.to_string())
    }
}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        IngestError::CsvParse(err.to_string())
    }
}

impl From<calamine::Error> for IngestError {
    fn from(err: calamine::Error) -> Self {
        IngestError::ExcelParse(err.to_string())
    }
}

pub type IngestResult<T> = Result<T, IngestError>;
