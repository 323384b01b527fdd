//! Spreadsheet bulk import and update
//!
//! `.csv` files are read with `csv`; Excel and OpenDocument workbooks with
//! `calamine` (first worksheet only). Headers are normalized to
//! `lower_snake_case`, so `Member Number` and `member_number` are the same
//! column. Row numbers in messages count the header as row 1.

use std::io::Cursor;

use calamine::{Data, Reader};
use shared::client::{BulkUpdateReport, BulkUploadReport};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{MemberCreate, MemberUpdate};
use shared::templates::{MEMBER_IMPORT_COLUMNS, MEMBER_UPDATE_KEY};
use sqlx::SqlitePool;

use crate::db::members;
use crate::error::ServiceResult;
use crate::util::now_millis;

const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// A parsed spreadsheet: normalized headers plus raw cell text
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub headers: Vec<String>,
    rows: Vec<(usize, Vec<String>)>,
}

/// One data row, addressed by normalized column name
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    headers: &'a [String],
    values: &'a [String],
}

impl Record<'_> {
    /// Trimmed cell value; `None` when the column is absent or the cell blank
    pub fn get(&self, column: &str) -> Option<&str> {
        let index = self.headers.iter().position(|h| h == column)?;
        self.values
            .get(index)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn owned(&self, column: &str) -> Option<String> {
        self.get(column).map(str::to_string)
    }

    fn text(&self, column: &str) -> String {
        self.get(column).unwrap_or_default().to_string()
    }
}

/// `" Member Number "` -> `"member_number"`
pub fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

fn extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    Some(ext.to_ascii_lowercase())
}

impl Sheet {
    /// Parse an uploaded file, choosing the reader by extension
    pub fn parse(filename: &str, bytes: &[u8]) -> AppResult<Sheet> {
        if bytes.is_empty() {
            return Err(AppError::new(ErrorCode::EmptyFile));
        }
        let sheet = match extension(filename).as_deref() {
            Some("csv") => Self::from_csv(bytes)?,
            Some(ext) if WORKBOOK_EXTENSIONS.contains(&ext) => Self::from_workbook(bytes)?,
            _ => {
                return Err(AppError::new(ErrorCode::UnsupportedFileFormat)
                    .with_detail("filename", filename));
            }
        };
        if sheet.headers.iter().all(|h| h.is_empty()) {
            return Err(AppError::new(ErrorCode::EmptyFile));
        }
        Ok(sheet)
    }

    fn from_csv(bytes: &[u8]) -> AppResult<Sheet> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers = reader
            .headers()
            .map_err(unreadable)?
            .iter()
            .map(normalize_header)
            .collect();

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record.map_err(unreadable)?;
            rows.push((index + 2, record.iter().map(str::to_string).collect()));
        }
        Ok(Sheet { headers, rows }.without_blank_rows())
    }

    fn from_workbook(bytes: &[u8]) -> AppResult<Sheet> {
        let mut workbook =
            calamine::open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).map_err(unreadable)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| AppError::new(ErrorCode::EmptyFile))?
            .map_err(unreadable)?;

        let mut cells = range.rows();
        let Some(header_row) = cells.next() else {
            return Err(AppError::new(ErrorCode::EmptyFile));
        };
        let headers = header_row
            .iter()
            .map(|cell| normalize_header(&cell_text(cell)))
            .collect();
        let rows = cells
            .enumerate()
            .map(|(index, row)| (index + 2, row.iter().map(cell_text).collect()))
            .collect();
        Ok(Sheet { headers, rows }.without_blank_rows())
    }

    fn without_blank_rows(mut self) -> Self {
        self.rows
            .retain(|(_, values)| values.iter().any(|v| !v.trim().is_empty()));
        self
    }

    /// 400 listing every required column the header row lacks
    pub fn require_columns(&self, required: &[&str]) -> AppResult<()> {
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|column| !self.headers.iter().any(|h| h == column))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        Err(AppError::with_message(
            ErrorCode::MissingColumns,
            format!("Missing required columns: {}", missing.join(", ")),
        )
        .with_detail("missing", missing))
    }

    /// `(row number, record)` pairs; blank rows are skipped
    pub fn records(&self) -> impl Iterator<Item = (usize, Record<'_>)> {
        self.rows.iter().map(|(number, values)| {
            (
                *number,
                Record {
                    headers: &self.headers,
                    values,
                },
            )
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Whole-number floats lose their `.0` so ID numbers survive Excel
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Int(i) => i.to_string(),
        other => other.to_string(),
    }
}

fn unreadable(err: impl std::fmt::Display) -> AppError {
    AppError::with_message(
        ErrorCode::SpreadsheetUnreadable,
        format!("Could not read spreadsheet: {err}"),
    )
}

/// Insert every valid row; existing or repeated member numbers are skipped.
///
/// Runs in one transaction.
pub async fn import_members(pool: &SqlitePool, sheet: &Sheet) -> ServiceResult<BulkUploadReport> {
    sheet.require_columns(&MEMBER_IMPORT_COLUMNS)?;

    let now = now_millis();
    let mut report = BulkUploadReport::default();
    let mut tx = pool.begin().await?;

    for (row, record) in sheet.records() {
        let payload = MemberCreate {
            name: record.text("name"),
            member_number: record.text("member_number"),
            id_number: record.text("id_number"),
            zone: record.text("zone"),
            status: record.owned("status"),
        };
        match payload.validate() {
            Ok(member) => {
                if members::insert_if_absent(&mut *tx, &member, now).await? {
                    report.added += 1;
                } else {
                    report.skipped += 1;
                }
            }
            Err(e) => report.errors.push(format!("Row {row}: {}", e.message)),
        }
    }

    tx.commit().await?;
    tracing::info!(
        added = report.added,
        skipped = report.skipped,
        errors = report.errors.len(),
        "Bulk member import finished"
    );
    Ok(report)
}

/// Update members keyed by `member_number`; blank cells leave fields unchanged.
pub async fn update_members(pool: &SqlitePool, sheet: &Sheet) -> ServiceResult<BulkUpdateReport> {
    sheet.require_columns(&[MEMBER_UPDATE_KEY])?;

    let now = now_millis();
    let mut report = BulkUpdateReport::default();
    let mut tx = pool.begin().await?;

    for (row, record) in sheet.records() {
        let Some(member_number) = record.get(MEMBER_UPDATE_KEY) else {
            report.errors += 1;
            report
                .error_details
                .push(format!("Row {row}: {MEMBER_UPDATE_KEY} is required"));
            continue;
        };

        let update = MemberUpdate {
            name: record.owned("name"),
            member_number: None,
            id_number: record.owned("id_number"),
            zone: record.owned("zone"),
            status: record.owned("status"),
        };
        let changes = match update.normalize() {
            Ok(changes) => changes,
            Err(e) => {
                report.errors += 1;
                report.error_details.push(format!("Row {row}: {}", e.message));
                continue;
            }
        };

        if changes.is_empty() {
            if members::exists_number(&mut *tx, member_number).await? {
                report.unchanged += 1;
            } else {
                report.not_found += 1;
            }
            continue;
        }

        if members::update_by_number(&mut *tx, member_number, &changes, now).await? {
            report.updated += 1;
        } else {
            report.not_found += 1;
        }
    }

    tx.commit().await?;
    tracing::info!(
        updated = report.updated,
        not_found = report.not_found,
        unchanged = report.unchanged,
        errors = report.errors,
        "Bulk member update finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::models::MemberStatus;
    use shared::pagination::PageParams;

    fn csv_sheet(text: &str) -> Sheet {
        Sheet::parse("members.csv", text.as_bytes()).unwrap()
    }

    #[test]
    fn headers_are_normalized() {
        let sheet = csv_sheet("\u{feff} Name ,Member Number,ID  Number,ZONE\nJane,M001,123,Nairobi\n");
        assert_eq!(sheet.headers, ["name", "member_number", "id_number", "zone"]);
        let (row, record) = sheet.records().next().unwrap();
        assert_eq!(row, 2);
        assert_eq!(record.get("member_number"), Some("M001"));
        assert_eq!(record.get("status"), None);
    }

    #[test]
    fn blank_rows_are_dropped_but_numbering_is_kept() {
        let sheet = csv_sheet("name,member_number\nA,M1\n,\nB,M2\n");
        let rows: Vec<usize> = sheet.records().map(|(row, _)| row).collect();
        assert_eq!(rows, [2, 4]);
        assert_eq!(sheet.len(), 2);
    }

    #[test]
    fn missing_columns_are_listed() {
        let sheet = csv_sheet("name,member_number\nA,M1\n");
        let err = sheet.require_columns(&MEMBER_IMPORT_COLUMNS).unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingColumns);
        assert_eq!(err.message, "Missing required columns: id_number, zone");
        let details = err.details.unwrap();
        assert_eq!(details["missing"], serde_json::json!(["id_number", "zone"]));
    }

    #[test]
    fn rejects_unknown_and_empty_files() {
        let err = Sheet::parse("members.txt", b"name\n").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedFileFormat);
        let err = Sheet::parse("members.csv", b"").unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyFile);
        let err = Sheet::parse("members.xlsx", b"not a zip").unwrap_err();
        assert_eq!(err.code, ErrorCode::SpreadsheetUnreadable);
    }

    #[test]
    fn whole_floats_lose_decimal_point() {
        assert_eq!(cell_text(&Data::Float(12345678.0)), "12345678");
        assert_eq!(cell_text(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    #[tokio::test]
    async fn import_counts_added_skipped_and_errors() {
        let db = DbService::in_memory().await.unwrap();
        let sheet = csv_sheet(
            "name,member_number,id_number,zone,status\n\
             Jane Doe,M001,12345678,Nairobi,active\n\
             John Doe,M002,87654321,Mombasa,\n\
             Jane Again,M001,11111111,Nairobi,active\n\
             ,M003,22222222,Kisumu,active\n\
             Bad Status,M004,33333333,Kisumu,suspended\n",
        );

        let report = import_members(&db.pool, &sheet).await.unwrap();
        assert_eq!(report.added, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.errors[0], "Row 5: name is required");
        assert!(report.errors[1].starts_with("Row 6:"));

        let (members, total) = members::list(&db.pool, None, PageParams::default().resolve(50))
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert!(members.iter().all(|m| m.status == MemberStatus::Active));

        // Re-importing the same file only skips
        let again = import_members(&db.pool, &sheet).await.unwrap();
        assert_eq!((again.added, again.skipped), (0, 3));
    }

    #[tokio::test]
    async fn update_leaves_blank_cells_unchanged() {
        let db = DbService::in_memory().await.unwrap();
        let seed = csv_sheet(
            "name,member_number,id_number,zone,status\n\
             Jane Doe,M001,12345678,Nairobi,active\n\
             John Doe,M002,87654321,Mombasa,active\n",
        );
        import_members(&db.pool, &seed).await.unwrap();

        let sheet = csv_sheet(
            "member_number,name,id_number,zone,status\n\
             M001,Jane Wanjiru,,,dormant\n\
             M999,Ghost,,,\n\
             M002,,,,\n\
             ,Nobody,,,\n\
             M002,,,,retired\n",
        );
        let report = update_members(&db.pool, &sheet).await.unwrap();
        assert_eq!(report.updated, 1);
        assert_eq!(report.not_found, 1);
        assert_eq!(report.unchanged, 1);
        assert_eq!(report.errors, 2);
        assert_eq!(report.error_details[0], "Row 5: member_number is required");

        let jane = members::find_by_identity(&db.pool, "M001", "12345678")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(jane.name, "Jane Wanjiru");
        assert_eq!(jane.zone, "Nairobi");
        assert_eq!(jane.status, MemberStatus::Dormant);
    }

    #[tokio::test]
    async fn update_requires_key_column() {
        let db = DbService::in_memory().await.unwrap();
        let sheet = csv_sheet("name,zone\nJane,Nairobi\n");
        let err: AppError = update_members(&db.pool, &sheet).await.unwrap_err().into();
        assert_eq!(err.code, ErrorCode::MissingColumns);
    }
}
