//! Spreadsheet upload controls and template downloads

use std::io;
use std::path::{Path, PathBuf};

use shared::client::{BulkUpdateReport, BulkUploadReport};
use shared::templates::{
    BULK_UPDATE_TEMPLATE_CSV, BULK_UPDATE_TEMPLATE_FILENAME, MEMBER_TEMPLATE_CSV,
    MEMBER_TEMPLATE_FILENAME,
};

use crate::http::Upload;
use crate::{ClientError, ClientResult};

/// Import errors shown to the user
pub const IMPORT_ERROR_LIMIT: usize = 5;
/// Update errors shown to the user
pub const UPDATE_ERROR_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Import,
    Update,
}

/// What the upload control shows after a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSummary {
    pub message: String,
    pub errors: Vec<String>,
    /// Errors beyond the shown ones
    pub hidden_errors: usize,
}

fn bounded(errors: &[String], limit: usize) -> (Vec<String>, usize) {
    let shown = errors.iter().take(limit).cloned().collect();
    (shown, errors.len().saturating_sub(limit))
}

impl From<&BulkUploadReport> for UploadSummary {
    fn from(report: &BulkUploadReport) -> Self {
        let (errors, hidden_errors) = bounded(&report.errors, IMPORT_ERROR_LIMIT);
        let mut message = format!(
            "Upload complete: {} added, {} skipped",
            report.added, report.skipped
        );
        if !report.errors.is_empty() {
            message.push_str(&format!(", {} error(s)", report.errors.len()));
        }
        Self {
            message,
            errors,
            hidden_errors,
        }
    }
}

impl From<&BulkUpdateReport> for UploadSummary {
    fn from(report: &BulkUpdateReport) -> Self {
        let (errors, hidden_errors) = bounded(&report.error_details, UPDATE_ERROR_LIMIT);
        Self {
            message: format!(
                "Update complete: {} updated, {} not found, {} unchanged, {} error(s)",
                report.updated, report.not_found, report.unchanged, report.errors
            ),
            errors,
            hidden_errors,
        }
    }
}

/// One file input plus its submit button
#[derive(Debug, Clone)]
pub struct UploadControl {
    kind: UploadKind,
    selected: Option<Upload>,
    in_flight: bool,
    summary: Option<UploadSummary>,
}

impl UploadControl {
    pub fn new(kind: UploadKind) -> Self {
        Self {
            kind,
            selected: None,
            in_flight: false,
            summary: None,
        }
    }

    pub fn kind(&self) -> UploadKind {
        self.kind
    }

    pub fn select(&mut self, upload: Upload) {
        self.selected = Some(upload);
    }

    pub fn selected(&self) -> Option<&Upload> {
        self.selected.as_ref()
    }

    /// Submit is disabled while a request runs
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn summary(&self) -> Option<&UploadSummary> {
        self.summary.as_ref()
    }

    /// Take the picked file and mark the control busy
    pub fn begin(&mut self) -> ClientResult<Upload> {
        if self.in_flight {
            return Err(ClientError::Busy);
        }
        let upload = self
            .selected
            .clone()
            .ok_or_else(|| ClientError::Validation("Please select a file".to_string()))?;
        self.in_flight = true;
        self.summary = None;
        Ok(upload)
    }

    /// Success or failure, the input is reset
    pub fn finish(&mut self, summary: Option<UploadSummary>) {
        self.in_flight = false;
        self.selected = None;
        self.summary = summary;
    }
}

/// A static CSV offered next to an upload control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub filename: &'static str,
    pub contents: &'static str,
}

impl Template {
    pub const fn for_kind(kind: UploadKind) -> Self {
        match kind {
            UploadKind::Import => Template {
                filename: MEMBER_TEMPLATE_FILENAME,
                contents: MEMBER_TEMPLATE_CSV,
            },
            UploadKind::Update => Template {
                filename: BULK_UPDATE_TEMPLATE_FILENAME,
                contents: BULK_UPDATE_TEMPLATE_CSV,
            },
        }
    }

    pub fn bytes(&self) -> &'static [u8] {
        self.contents.as_bytes()
    }

    /// Write the template into `dir`, returning the file path
    pub fn save_to(&self, dir: &Path) -> io::Result<PathBuf> {
        let path = dir.join(self.filename);
        std::fs::write(&path, self.contents)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errors(n: usize) -> Vec<String> {
        (2..n + 2).map(|row| format!("Row {row}: name is required")).collect()
    }

    #[test]
    fn import_summary_shows_first_five_errors() {
        let report = BulkUploadReport {
            added: 3,
            skipped: 1,
            errors: errors(8),
        };
        let summary = UploadSummary::from(&report);
        assert_eq!(summary.errors.len(), 5);
        assert_eq!(summary.hidden_errors, 3);
        assert_eq!(summary.errors[0], "Row 2: name is required");
        assert_eq!(summary.message, "Upload complete: 3 added, 1 skipped, 8 error(s)");
    }

    #[test]
    fn update_summary_shows_first_ten_errors() {
        let report = BulkUpdateReport {
            updated: 1,
            not_found: 1,
            unchanged: 0,
            errors: 12,
            error_details: errors(12),
        };
        let summary = UploadSummary::from(&report);
        assert_eq!(summary.errors.len(), 10);
        assert_eq!(summary.hidden_errors, 2);
    }

    #[test]
    fn control_refuses_second_submit_and_resets_input() {
        let mut control = UploadControl::new(UploadKind::Import);
        assert!(matches!(control.begin(), Err(ClientError::Validation(_))));

        control.select(Upload::new("members.csv", "name\n"));
        let upload = control.begin().unwrap();
        assert_eq!(upload.filename, "members.csv");
        assert!(control.is_in_flight());
        assert!(matches!(control.begin(), Err(ClientError::Busy)));

        control.finish(None);
        assert!(!control.is_in_flight());
        assert!(control.selected().is_none());
    }

    #[test]
    fn templates_save_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = Template::for_kind(UploadKind::Update).save_to(dir.path()).unwrap();
        assert!(path.ends_with("bulk_update_template.csv"));
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.starts_with("member_number,"));
    }
}
