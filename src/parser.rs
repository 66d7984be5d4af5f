use std::fmt;
use std::path::Path;

use calamine::{open_workbook_auto, Data, DataType, Reader};
use chrono::NaiveDateTime;
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};

use crate::error::{IngestError, IngestResult};

pub const STUDENT_NAME: &str = "Student Name";
pub const PREFERENCE_1: &str = "Preference 1";
pub const PREFERENCE_2: &str = "Preference 2";
pub const PREFERENCE_3: &str = "Preference 3";
pub const FEE_PAID_DATE: &str = "Fee Paid Date";
pub const FEES_PHOTO: &str = "Fees Photo";

/// Columns an uploaded sheet must carry before allocation may start
pub const REQUIRED_COLUMNS: [&str; 5] = [
    STUDENT_NAME,
    PREFERENCE_1,
    PREFERENCE_2,
    PREFERENCE_3,
    FEE_PAID_DATE,
];

/// A single spreadsheet cell as the allocation engine sees it.
///
/// Hand-entered sheets mix numbers, text and real dates in the same
/// column, so every loosely typed field is carried as one of these.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Missing,
    Number(f64),
    Timestamp(NaiveDateTime),
    Text(String),
}

impl CellValue {
    /// Wraps raw text, treating blank cells as missing
    pub fn text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            CellValue::Missing
        } else {
            CellValue::Text(trimmed.to_string())
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    fn into_optional_string(self) -> Option<String> {
        match self {
            CellValue::Missing => None,
            CellValue::Text(text) => Some(text),
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Missing => Ok(()),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Text(text) => f.write_str(text),
        }
    }
}

/// One student row from the uploaded sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub name: Option<String>,
    pub fee_paid_date: CellValue,
    pub preferences: [CellValue; 3],
    pub receipt_ref: Option<String>,
}

/// Positions of the known columns within a sheet's header row
struct ColumnMap {
    name: usize,
    preferences: [usize; 3],
    fee_paid_date: usize,
    fees_photo: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &[String]) -> IngestResult<Self> {
        let find = |column: &str| headers.iter().position(|h| h == column);

        match (
            find(STUDENT_NAME),
            find(PREFERENCE_1),
            find(PREFERENCE_2),
            find(PREFERENCE_3),
            find(FEE_PAID_DATE),
        ) {
            (Some(name), Some(p1), Some(p2), Some(p3), Some(fee_paid_date)) => Ok(ColumnMap {
                name,
                preferences: [p1, p2, p3],
                fee_paid_date,
                fees_photo: find(FEES_PHOTO),
            }),
            _ => {
                let missing = REQUIRED_COLUMNS
                    .iter()
                    .filter(|column| find(**column).is_none())
                    .map(|column| column.to_string())
                    .collect();
                Err(IngestError::MissingColumns(missing))
            }
        }
    }

    fn record(&self, row: &[CellValue]) -> StudentRecord {
        let cell = |idx: usize| row.get(idx).cloned().unwrap_or_default();

        StudentRecord {
            name: cell(self.name).into_optional_string(),
            fee_paid_date: cell(self.fee_paid_date),
            preferences: self.preferences.map(cell),
            receipt_ref: self
                .fees_photo
                .and_then(|idx| cell(idx).into_optional_string()),
        }
    }
}

/// Maps header cells and data rows onto student records, skipping blank rows
fn build_records<I>(headers: &[String], rows: I) -> IngestResult<Vec<StudentRecord>>
where
    I: IntoIterator<Item = IngestResult<Vec<CellValue>>>,
{
    let columns = ColumnMap::from_headers(headers)?;
    let mut students = Vec::new();

    for row in rows {
        let row = row?;
        if row.iter().all(CellValue::is_missing) {
            continue;
        }
        students.push(columns.record(&row));
    }

    Ok(students)
}

/// Loads student rows from a CSV file. Every cell arrives as text.
pub fn load_students_csv<P: AsRef<Path>>(csv_path: P) -> IngestResult<Vec<StudentRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(csv_path)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let rows = reader.records().map(|result| {
        result
            .map(|record| record.iter().map(CellValue::text).collect())
            .map_err(IngestError::from)
    });

    build_records(&headers, rows)
}

fn excel_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Missing,
        Data::String(text) | Data::DateTimeIso(text) | Data::DurationIso(text) => {
            CellValue::text(text)
        }
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Float(n) => CellValue::Number(*n),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(CellValue::Timestamp)
            .unwrap_or_default(),
    }
}

/// Loads student rows from the first worksheet of an Excel or ODS workbook
pub fn load_students_excel<P: AsRef<Path>>(workbook_path: P) -> IngestResult<Vec<StudentRecord>> {
    let mut workbook = open_workbook_auto(workbook_path)?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IngestError::ExcelParse("workbook has no worksheets".to_string()))?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|header_row| {
            header_row
                .iter()
                .map(|cell| cell.to_string().trim().to_string())
                .collect()
        })
        .unwrap_or_default();

    build_records(
        &headers,
        rows.map(|data_row| Ok(data_row.iter().map(excel_cell).collect())),
    )
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Whether an uploaded file name looks like a sheet this module can read
pub fn is_supported_sheet(filename: &str) -> bool {
    matches!(
        extension(Path::new(filename)).as_str(),
        "csv" | "xlsx" | "xls" | "xlsm" | "xlsb" | "ods"
    )
}

/// Loads student rows from a CSV or spreadsheet file, chosen by extension
pub fn load_students<P: AsRef<Path>>(path: P) -> IngestResult<Vec<StudentRecord>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IngestError::FileNotFound(path.display().to_string()));
    }

    match extension(path).as_str() {
        "csv" => load_students_csv(path),
        "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => load_students_excel(path),
        other => Err(IngestError::UnsupportedFormat(other.to_string())),
    }
}
